//! Per-request session orchestration.
//!
//! [`SessionMiddleware`] is built once from a validated [`SessionConfig`]
//! and shared across requests. [`SessionMiddleware::attach`] runs the
//! parse → verify → load/generate pipeline for one request and parks the
//! resulting [`SessionContext`], the request-scoped session API, in the
//! caller's slot. A second `attach` on an occupied slot is a no-op.

use std::sync::Arc;

use crate::config::SessionConfig;
use crate::session::errors::SessionError;
use crate::session::types::{SessionData, SessionId, SessionState, SessionStatus};
use crate::store::SessionStore;

use super::cookie::CookieSink;
use super::lifecycle;

#[derive(Clone)]
pub struct SessionMiddleware {
    config: Arc<SessionConfig>,
}

impl SessionMiddleware {
    /// The configuration is validated by [`SessionConfig::builder`]'s
    /// `build()`, so construction here cannot fail per-request later.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Establish the session context for one request.
    ///
    /// Idempotent: if `slot` already holds a context, nothing happens and
    /// the passed sink is discarded. Otherwise the inbound cookie is
    /// resolved through [`lifecycle::initialize`]; a session that did not
    /// come from a verified cookie gets a freshly signed cookie, and a
    /// loaded session gets a best-effort TTL refresh that never fails the
    /// request.
    pub async fn attach<S: CookieSink>(
        &self,
        slot: &mut Option<SessionContext<S>>,
        mut sink: S,
    ) -> Result<(), SessionError> {
        if slot.is_some() {
            tracing::debug!("Request already has a session context");
            return Ok(());
        }

        let token = sink.request_token(&self.config.name);
        let state = lifecycle::initialize(&self.config, token.as_deref()).await?;

        match state.status() {
            SessionStatus::New => {
                lifecycle::issue_cookie(&self.config, &state, &mut sink)?;
            }
            SessionStatus::Loaded => {
                let ttl = self.config.ttl.seconds_for(&state.data);
                if let Err(err) = self
                    .config
                    .store
                    .touch(&state.id, &state.data, ttl)
                    .await
                {
                    tracing::warn!(session_id = %state.id, "Failed to refresh session TTL: {err}");
                }
            }
            SessionStatus::Destroyed => unreachable!("initialize never yields a destroyed state"),
        }

        *slot = Some(SessionContext {
            config: Arc::clone(&self.config),
            sink,
            state,
        });
        Ok(())
    }
}

/// The request-scoped session handle.
///
/// Owns the request's cookie sink and the current immutable state; every
/// mutating call swaps in the state returned by the corresponding lifecycle
/// transition. Mutations that change the id (`regenerate`) or end the
/// session (`destroy`) refresh the outbound cookie as part of the
/// transition itself.
pub struct SessionContext<S> {
    config: Arc<SessionConfig>,
    sink: S,
    state: SessionState,
}

impl<S: CookieSink> SessionContext<S> {
    pub fn id(&self) -> &SessionId {
        self.state.id()
    }

    pub fn status(&self) -> SessionStatus {
        self.state.status()
    }

    /// The frozen session payload.
    pub fn data(&self) -> Result<&SessionData, SessionError> {
        lifecycle::read(&self.state)
    }

    /// Shallow-merge the updater's output over the current payload.
    pub fn update<F>(&mut self, updater: F) -> Result<(), SessionError>
    where
        F: FnOnce(&SessionData) -> SessionData,
    {
        self.state = lifecycle::update(&self.state, updater)?;
        Ok(())
    }

    /// Replace the payload wholesale.
    pub fn replace(&mut self, data: SessionData) -> Result<(), SessionError> {
        self.state = lifecycle::replace(&self.state, data)?;
        Ok(())
    }

    /// Persist the current payload to the store.
    pub async fn save(&self) -> Result<(), SessionError> {
        lifecycle::persist(&self.config, &self.state).await
    }

    /// Re-read the payload from the store.
    pub async fn reload(&mut self) -> Result<(), SessionError> {
        self.state = lifecycle::reload(&self.config, &self.state).await?;
        Ok(())
    }

    /// Delete the store entry and expire the client's cookie. The handle
    /// becomes terminal: every further call fails with `InvalidSession`.
    pub async fn destroy(&mut self) -> Result<(), SessionError> {
        self.state = lifecycle::destroy(&self.config, &self.state, &mut self.sink).await?;
        Ok(())
    }

    /// Move the session to a fresh id, carrying the payload forward and
    /// issuing a new signed cookie.
    pub async fn regenerate(&mut self) -> Result<(), SessionError> {
        self.state = lifecycle::regenerate(&self.config, &self.state, &mut self.sink).await?;
        Ok(())
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Hand the sink back to the caller, e.g. to flush accumulated
    /// `Set-Cookie` headers into the response.
    pub fn into_sink(self) -> S {
        self.sink
    }
}
