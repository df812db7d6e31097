//! The cookie boundary: reading the inbound `Cookie` header and writing the
//! outbound `Set-Cookie` header.
//!
//! The lifecycle never touches headers directly; it requests cookie writes
//! through [`CookieSink::refresh`]. [`HeaderCookieSink`] is the reference
//! implementation over a pair of [`http::HeaderMap`]s.

use http::HeaderMap;
use http::header::{COOKIE, SET_COOKIE};

use crate::config::CookieAttributes;
use crate::session::errors::SessionError;

/// An outbound cookie write requested by the session lifecycle.
/// `max_age == 0` expires the cookie on the client.
#[derive(Debug, Clone)]
pub struct OutboundCookie {
    pub name: String,
    pub value: String,
    pub max_age: u64,
    pub attributes: CookieAttributes,
}

impl OutboundCookie {
    pub(crate) fn issue(
        name: &str,
        value: String,
        max_age: u64,
        attributes: &CookieAttributes,
    ) -> Self {
        Self {
            name: name.to_string(),
            value,
            max_age,
            attributes: attributes.clone(),
        }
    }

    pub(crate) fn expire(name: &str, attributes: &CookieAttributes) -> Self {
        Self::issue(name, String::new(), 0, attributes)
    }

    pub(crate) fn render(&self) -> String {
        let attrs = &self.attributes;
        let mut cookie = format!("{}={}; SameSite={}", self.name, self.value, attrs.same_site);
        if let Some(domain) = &attrs.domain {
            cookie.push_str("; Domain=");
            cookie.push_str(domain);
        }
        if attrs.secure {
            cookie.push_str("; Secure");
        }
        if attrs.http_only {
            cookie.push_str("; HttpOnly");
        }
        cookie.push_str(&format!("; Path={}; Max-Age={}", attrs.path, self.max_age));
        cookie
    }
}

/// Where a request's cookies come from and where the session cookie goes.
pub trait CookieSink: Send {
    /// The inbound cookie value stored under `name`, if the request carried
    /// one. Malformed headers are treated as absent, never as errors.
    fn request_token(&self, name: &str) -> Option<String>;

    /// Write or overwrite the outbound session cookie.
    fn refresh(&mut self, cookie: &OutboundCookie) -> Result<(), SessionError>;
}

/// Reference [`CookieSink`] over plain HTTP header maps.
#[derive(Debug, Default)]
pub struct HeaderCookieSink {
    request: HeaderMap,
    response: HeaderMap,
}

impl HeaderCookieSink {
    pub fn new(request: HeaderMap) -> Self {
        Self {
            request,
            response: HeaderMap::new(),
        }
    }

    /// Headers accumulated for the response, `Set-Cookie` included.
    pub fn response_headers(&self) -> &HeaderMap {
        &self.response
    }

    pub fn into_response_headers(self) -> HeaderMap {
        self.response
    }
}

impl CookieSink for HeaderCookieSink {
    fn request_token(&self, name: &str) -> Option<String> {
        let cookie_header = self.request.get(COOKIE)?;
        let Ok(cookie_str) = cookie_header.to_str() else {
            tracing::debug!("Invalid cookie header, treating as absent");
            return None;
        };
        cookie_str.split(';').map(str::trim).find_map(|pair| {
            let mut parts = pair.splitn(2, '=');
            match (parts.next(), parts.next()) {
                (Some(key), Some(value)) if key == name => Some(value.to_string()),
                _ => None,
            }
        })
    }

    fn refresh(&mut self, cookie: &OutboundCookie) -> Result<(), SessionError> {
        let header = cookie.render().parse().map_err(|_| {
            SessionError::Cookie("Failed to encode Set-Cookie header".to_string())
        })?;
        self.response.append(SET_COOKIE, header);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn request_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_request_token_finds_named_cookie() {
        let sink = HeaderCookieSink::new(request_with_cookie(
            "other=1; connect.sid=s:abc.sig; trailing=2",
        ));

        assert_eq!(
            sink.request_token("connect.sid"),
            Some("s:abc.sig".to_string())
        );
    }

    #[test]
    fn test_request_token_ignores_other_cookies() {
        let sink = HeaderCookieSink::new(request_with_cookie("other=1"));

        assert_eq!(sink.request_token("connect.sid"), None);
    }

    #[test]
    fn test_request_token_without_cookie_header() {
        let sink = HeaderCookieSink::default();

        assert_eq!(sink.request_token("connect.sid"), None);
    }

    #[test]
    fn test_refresh_renders_default_attributes() {
        let mut sink = HeaderCookieSink::default();
        let cookie = OutboundCookie::issue(
            "connect.sid",
            "s:abc.sig".to_string(),
            600,
            &CookieAttributes::default(),
        );

        sink.refresh(&cookie).unwrap();

        let header = sink.response_headers().get(SET_COOKIE).unwrap();
        assert_eq!(
            header.to_str().unwrap(),
            "connect.sid=s:abc.sig; SameSite=Lax; Secure; HttpOnly; Path=/; Max-Age=600"
        );
    }

    #[test]
    fn test_refresh_renders_domain_and_overrides() {
        let mut sink = HeaderCookieSink::default();
        let attributes = CookieAttributes {
            path: "/app".to_string(),
            domain: Some("example.com".to_string()),
            http_only: false,
            secure: false,
            same_site: crate::config::SameSite::Strict,
        };
        let cookie = OutboundCookie::issue("sid", "v".to_string(), 60, &attributes);

        sink.refresh(&cookie).unwrap();

        let header = sink.response_headers().get(SET_COOKIE).unwrap();
        assert_eq!(
            header.to_str().unwrap(),
            "sid=v; SameSite=Strict; Domain=example.com; Path=/app; Max-Age=60"
        );
    }

    #[test]
    fn test_expire_sets_max_age_zero() {
        let cookie = OutboundCookie::expire("connect.sid", &CookieAttributes::default());

        assert!(cookie.render().ends_with("Max-Age=0"));
        assert_eq!(cookie.value, "");
    }
}
