use thiserror::Error;

use crate::store::StorageError;
use crate::utils::UtilError;

#[derive(Debug, Error, Clone)]
pub enum SessionError {
    /// Fatal setup-time misconfiguration (missing store, empty secret set).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A cookie could not be produced or its value is unusable as a
    /// session id. Signature verification failure is NOT a cookie error;
    /// it selects the anonymous-session path instead.
    #[error("Cookie error: {0}")]
    Cookie(String),

    /// Backend I/O failure, propagated from the session store.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A transition was attempted on a destroyed session handle.
    #[error("Invalid session: {0}")]
    InvalidSession(String),

    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),
}
