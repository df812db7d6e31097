use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::session::errors::SessionError;
use crate::signer::FIELD_SEPARATOR;
use crate::utils::gen_random_string;

/// Random bytes behind a freshly minted session id; 32 bytes encode to a
/// 43-character base64url string.
const SESSION_ID_BYTES: usize = 32;

/// Opaque session identifier: the storage key, and the value embedded in
/// the signed cookie.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Accept an identifier from an untrusted source (a verified cookie
    /// value). The token field separator must not appear in an id, or the
    /// cookie it is embedded in would not parse back.
    pub fn new(value: impl Into<String>) -> Result<Self, SessionError> {
        let value = value.into();
        if value.is_empty() {
            return Err(SessionError::Cookie("session id is empty".to_string()));
        }
        if value.contains(FIELD_SEPARATOR) {
            return Err(SessionError::Cookie(
                "session id contains the token field separator".to_string(),
            ));
        }
        Ok(Self(value))
    }

    /// Mint a fresh identifier from the system CSPRNG.
    pub fn generate() -> Result<Self, SessionError> {
        Ok(Self(gen_random_string(SESSION_ID_BYTES)?))
    }

    pub(crate) fn from_raw(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Application-defined session payload. Insertion order is irrelevant.
pub type SessionData = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Freshly generated, not yet matched to a cookie the client holds.
    New,
    /// A verified id whose data was found in the store.
    Loaded,
    /// Terminal. Every further transition fails fast.
    Destroyed,
}

/// Immutable session snapshot.
///
/// `data` is never mutated in place: every logical change goes through a
/// lifecycle transition and produces a new `SessionState` value, so any
/// previously captured snapshot stays valid.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub(crate) id: SessionId,
    pub(crate) data: Arc<SessionData>,
    pub(crate) status: SessionStatus,
}

impl SessionState {
    pub(crate) fn new_session(id: SessionId, data: SessionData) -> Self {
        Self {
            id,
            data: Arc::new(data),
            status: SessionStatus::New,
        }
    }

    pub(crate) fn loaded(id: SessionId, data: SessionData) -> Self {
        Self {
            id,
            data: Arc::new(data),
            status: SessionStatus::Loaded,
        }
    }

    pub(crate) fn destroyed(id: SessionId) -> Self {
        Self {
            id,
            data: Arc::new(SessionData::new()),
            status: SessionStatus::Destroyed,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_destroyed(&self) -> bool {
        self.status == SessionStatus::Destroyed
    }
}
