//! Session configuration.
//!
//! Everything is injected explicitly through [`SessionConfig::builder`];
//! there is no environment or process-global state. `build()` is the single
//! setup-time validation point: a missing store or secret is rejected here,
//! before any request is served.

use std::fmt;
use std::sync::Arc;

use crate::session::{SessionData, SessionError};
use crate::signer::SecretSet;
use crate::store::SessionStore;

pub const DEFAULT_COOKIE_NAME: &str = "connect.sid";
const DEFAULT_MAX_AGE_SECONDS: u64 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SameSite::Strict => f.write_str("Strict"),
            SameSite::Lax => f.write_str("Lax"),
            SameSite::None => f.write_str("None"),
        }
    }
}

/// Attributes stamped on every outbound session cookie. Kept 1:1 with the
/// currently active session id by the lifecycle.
#[derive(Debug, Clone)]
pub struct CookieAttributes {
    pub path: String,
    pub domain: Option<String>,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSite,
}

impl Default for CookieAttributes {
    fn default() -> Self {
        Self {
            path: "/".to_string(),
            domain: None,
            http_only: true,
            secure: true,
            same_site: SameSite::Lax,
        }
    }
}

/// Store-entry lifetime policy: a fixed number of seconds, or a function of
/// the data being stored (e.g. a shorter TTL for anonymous sessions).
#[derive(Clone)]
pub enum SessionTtl {
    Fixed(u64),
    PerSession(Arc<dyn Fn(&SessionData) -> u64 + Send + Sync>),
}

impl SessionTtl {
    pub(crate) fn seconds_for(&self, data: &SessionData) -> u64 {
        match self {
            SessionTtl::Fixed(seconds) => *seconds,
            SessionTtl::PerSession(f) => f(data),
        }
    }
}

impl fmt::Debug for SessionTtl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionTtl::Fixed(seconds) => write!(f, "Fixed({seconds})"),
            SessionTtl::PerSession(_) => f.write_str("PerSession(..)"),
        }
    }
}

/// Supplies the seed data for sessions created without stored state.
pub type SeedGenerator = Arc<dyn Fn() -> SessionData + Send + Sync>;

/// Validated, process-wide session configuration. Immutable once serving
/// begins; rotating secrets requires building a new configuration.
#[derive(Clone)]
pub struct SessionConfig {
    pub(crate) store: Arc<dyn SessionStore>,
    pub(crate) secrets: SecretSet,
    pub(crate) name: String,
    pub(crate) ttl: SessionTtl,
    pub(crate) cookie: CookieAttributes,
    pub(crate) generate: SeedGenerator,
}

impl SessionConfig {
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }

    pub fn cookie_name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secrets", &self.secrets)
            .field("name", &self.name)
            .field("ttl", &self.ttl)
            .field("cookie", &self.cookie)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
pub struct SessionConfigBuilder {
    store: Option<Arc<dyn SessionStore>>,
    secrets: Vec<Vec<u8>>,
    name: Option<String>,
    ttl: Option<SessionTtl>,
    cookie: Option<CookieAttributes>,
    generate: Option<SeedGenerator>,
}

impl SessionConfigBuilder {
    pub fn store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Append one signing secret. The first secret added is active and
    /// signs new cookies; later ones are retired secrets kept so existing
    /// cookies verify until natural expiry.
    pub fn secret(mut self, secret: impl Into<Vec<u8>>) -> Self {
        self.secrets.push(secret.into());
        self
    }

    /// Append several secrets at once, in rotation order.
    pub fn secrets<I, K>(mut self, secrets: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<Vec<u8>>,
    {
        self.secrets.extend(secrets.into_iter().map(Into::into));
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Fixed store-entry TTL and cookie Max-Age, in seconds.
    pub fn max_age(mut self, seconds: u64) -> Self {
        self.ttl = Some(SessionTtl::Fixed(seconds));
        self
    }

    pub fn ttl(mut self, ttl: SessionTtl) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn cookie(mut self, attributes: CookieAttributes) -> Self {
        self.cookie = Some(attributes);
        self
    }

    /// Seed data for sessions created without stored state. Defaults to an
    /// empty map.
    pub fn generate<F>(mut self, generate: F) -> Self
    where
        F: Fn() -> SessionData + Send + Sync + 'static,
    {
        self.generate = Some(Arc::new(generate));
        self
    }

    pub fn build(self) -> Result<SessionConfig, SessionError> {
        let store = self.store.ok_or_else(|| {
            SessionError::Configuration("a session store is required".to_string())
        })?;
        if self.secrets.is_empty() {
            return Err(SessionError::Configuration(
                "at least one signing secret is required".to_string(),
            ));
        }
        if self.secrets.iter().any(Vec::is_empty) {
            return Err(SessionError::Configuration(
                "signing secrets must not be empty".to_string(),
            ));
        }
        let name = self.name.unwrap_or_else(|| DEFAULT_COOKIE_NAME.to_string());
        if name.is_empty() || name.contains([';', '=']) || name.contains(char::is_whitespace) {
            return Err(SessionError::Configuration(format!(
                "invalid cookie name: {name:?}"
            )));
        }
        Ok(SessionConfig {
            store,
            secrets: SecretSet::new(self.secrets),
            name,
            ttl: self
                .ttl
                .unwrap_or(SessionTtl::Fixed(DEFAULT_MAX_AGE_SECONDS)),
            cookie: self.cookie.unwrap_or_default(),
            generate: self
                .generate
                .unwrap_or_else(|| Arc::new(SessionData::new)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn builder_with_store() -> SessionConfigBuilder {
        SessionConfig::builder().store(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_build_applies_defaults() {
        let config = builder_with_store().secret("keyboard cat").build().unwrap();

        assert_eq!(config.name, "connect.sid");
        assert_eq!(config.ttl.seconds_for(&SessionData::new()), 600);
        assert_eq!(config.cookie.path, "/");
        assert!(config.cookie.http_only);
        assert!(config.cookie.secure);
        assert_eq!(config.cookie.same_site, SameSite::Lax);
        assert!((config.generate)().is_empty());
    }

    #[test]
    fn test_build_without_store_is_a_configuration_error() {
        let result = SessionConfig::builder().secret("keyboard cat").build();

        assert!(matches!(result, Err(SessionError::Configuration(_))));
    }

    #[test]
    fn test_build_without_secret_is_a_configuration_error() {
        let result = builder_with_store().build();

        assert!(matches!(result, Err(SessionError::Configuration(_))));
    }

    #[test]
    fn test_build_rejects_empty_secret() {
        let result = builder_with_store().secret("").build();

        assert!(matches!(result, Err(SessionError::Configuration(_))));
    }

    #[test]
    fn test_build_rejects_malformed_cookie_name() {
        let result = builder_with_store()
            .secret("keyboard cat")
            .name("bad name")
            .build();

        assert!(matches!(result, Err(SessionError::Configuration(_))));
    }

    #[test]
    fn test_secret_order_fixes_the_active_secret() {
        let config = builder_with_store()
            .secret("current")
            .secret("retired")
            .build()
            .unwrap();

        assert_eq!(config.secrets.active(), Some(b"current".as_slice()));
        assert_eq!(config.secrets.len(), 2);
    }

    #[test]
    fn test_per_session_ttl_resolves_against_data() {
        let config = builder_with_store()
            .secret("keyboard cat")
            .ttl(SessionTtl::PerSession(Arc::new(|data: &SessionData| {
                if data.contains_key("user_id") { 3600 } else { 60 }
            })))
            .build()
            .unwrap();

        let anonymous = SessionData::new();
        let mut authenticated = SessionData::new();
        authenticated.insert("user_id".to_string(), serde_json::json!("u1"));

        assert_eq!(config.ttl.seconds_for(&anonymous), 60);
        assert_eq!(config.ttl.seconds_for(&authenticated), 3600);
    }
}
