//! The session state machine.
//!
//! Transitions are free functions over an immutable [`SessionState`]: each
//! one returns a new state and leaves its input untouched, so every
//! snapshot a caller holds stays valid. Collaborators are injected: the
//! process-wide pieces through [`SessionConfig`], the per-request cookie
//! sink as an explicit argument to the transitions that write cookies.
//!
//! `initialize`, `persist`, `reload`, `destroy` and `regenerate` are the
//! only suspension points; `read`, `update` and `replace` are synchronous
//! and pure.

use std::sync::Arc;

use crate::config::SessionConfig;
use crate::session::errors::SessionError;
use crate::session::types::{SessionData, SessionId, SessionState, SessionStatus};
use crate::signer::{sign, verify};
use crate::store::SessionStore;

use super::cookie::{CookieSink, OutboundCookie};

fn guard_live(state: &SessionState, operation: &str) -> Result<(), SessionError> {
    if state.is_destroyed() {
        return Err(SessionError::InvalidSession(format!(
            "{operation} attempted on a destroyed session"
        )));
    }
    Ok(())
}

fn fresh_session(config: &SessionConfig) -> Result<SessionState, SessionError> {
    let id = SessionId::generate()?;
    Ok(SessionState::new_session(id, (config.generate)()))
}

/// Resolve the inbound cookie token into a session state.
///
/// A verified id with stored data loads that session. A verified id with no
/// stored data keeps the id and reseeds the data: the cookie is genuine, so
/// minting a new id would only churn the client's cookie without gaining
/// anything. An absent or unverifiable token starts a fresh session.
pub async fn initialize(
    config: &SessionConfig,
    cookie_token: Option<&str>,
) -> Result<SessionState, SessionError> {
    let Some(token) = cookie_token else {
        tracing::debug!("No session cookie, starting a new session");
        return fresh_session(config);
    };

    let Some(value) = verify(token, &config.secrets) else {
        tracing::debug!("Session cookie failed verification, starting a new session");
        return fresh_session(config);
    };

    let Ok(id) = SessionId::new(value) else {
        tracing::debug!("Verified cookie value is not a usable session id");
        return fresh_session(config);
    };

    match config.store.get(&id).await? {
        Some(data) => Ok(SessionState::loaded(id, data)),
        None => {
            tracing::debug!(session_id = %id, "Verified id has no stored data, reseeding");
            Ok(SessionState::new_session(id, (config.generate)()))
        }
    }
}

/// The frozen view of the session payload.
pub fn read(state: &SessionState) -> Result<&SessionData, SessionError> {
    guard_live(state, "read")?;
    Ok(&state.data)
}

/// Shallow-merge the updater's output over the current data, producing a
/// new state. The prior state's data is untouched.
pub fn update<F>(state: &SessionState, updater: F) -> Result<SessionState, SessionError>
where
    F: FnOnce(&SessionData) -> SessionData,
{
    guard_live(state, "update")?;
    let patch = updater(&state.data);
    let mut merged: SessionData = (*state.data).clone();
    for (key, value) in patch {
        merged.insert(key, value);
    }
    Ok(SessionState {
        id: state.id.clone(),
        data: Arc::new(merged),
        status: state.status,
    })
}

/// Replace the payload wholesale, with no merge.
pub fn replace(state: &SessionState, new_data: SessionData) -> Result<SessionState, SessionError> {
    guard_live(state, "replace")?;
    Ok(SessionState {
        id: state.id.clone(),
        data: Arc::new(new_data),
        status: state.status,
    })
}

/// Write the current payload to the store under the session's id.
pub async fn persist(config: &SessionConfig, state: &SessionState) -> Result<(), SessionError> {
    guard_live(state, "persist")?;
    let ttl = config.ttl.seconds_for(&state.data);
    config.store.set(&state.id, &state.data, ttl).await?;
    Ok(())
}

/// Re-read the payload from the store. A miss falls back to the configured
/// seed data, keeping the id (the same policy `initialize` applies).
pub async fn reload(
    config: &SessionConfig,
    state: &SessionState,
) -> Result<SessionState, SessionError> {
    guard_live(state, "reload")?;
    match config.store.get(&state.id).await? {
        Some(data) => Ok(SessionState::loaded(state.id.clone(), data)),
        None => {
            tracing::debug!(session_id = %state.id, "Reload miss, reseeding session data");
            Ok(SessionState::new_session(
                state.id.clone(),
                (config.generate)(),
            ))
        }
    }
}

/// Remove the store entry and expire the client's cookie. The returned
/// state is terminal: every further transition on it fails fast.
pub async fn destroy(
    config: &SessionConfig,
    state: &SessionState,
    sink: &mut dyn CookieSink,
) -> Result<SessionState, SessionError> {
    guard_live(state, "destroy")?;
    config.store.destroy(&state.id).await?;
    sink.refresh(&OutboundCookie::expire(&config.name, &config.cookie))?;
    Ok(SessionState::destroyed(state.id.clone()))
}

/// Move the session to a freshly minted id, carrying the payload forward.
///
/// Used at privilege boundaries (e.g. post-login) to defeat session
/// fixation. The new entry is persisted BEFORE the old one is deleted, so
/// a failed write cannot leave the session without any stored data.
pub async fn regenerate(
    config: &SessionConfig,
    state: &SessionState,
    sink: &mut dyn CookieSink,
) -> Result<SessionState, SessionError> {
    guard_live(state, "regenerate")?;
    let new_id = SessionId::generate()?;
    let data = Arc::clone(&state.data);

    let ttl = config.ttl.seconds_for(&data);
    config.store.set(&new_id, &data, ttl).await?;
    config.store.destroy(&state.id).await?;

    let next = SessionState {
        id: new_id,
        data,
        status: SessionStatus::Loaded,
    };
    issue_cookie(config, &next, sink)?;
    Ok(next)
}

/// Sign the state's id with the active secret and hand the cookie to the
/// sink.
pub(crate) fn issue_cookie(
    config: &SessionConfig,
    state: &SessionState,
    sink: &mut dyn CookieSink,
) -> Result<(), SessionError> {
    let secret = config.secrets.active().ok_or_else(|| {
        SessionError::Configuration("no active signing secret".to_string())
    })?;
    let token = sign(state.id.as_str(), secret);
    let max_age = config.ttl.seconds_for(&state.data);
    sink.refresh(&OutboundCookie::issue(
        &config.name,
        token,
        max_age,
        &config.cookie,
    ))
}
