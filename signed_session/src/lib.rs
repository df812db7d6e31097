//! signed-session - Tamper-evident cookie sessions for Rust web services
//!
//! This crate gives stateless HTTP request handlers a server-side notion of
//! client identity: an opaque session id travels in an HMAC-SHA256 signed
//! cookie, the session payload lives in a pluggable key/value store, and an
//! immutable state machine drives the session through its lifecycle:
//! create, read, update, persist, reload, destroy, regenerate.
//!
//! Only integrity of the cookie is guaranteed, not confidentiality: the
//! session id is readable by the client, the payload never leaves the
//! server. Verification accepts an ordered set of secrets so signing keys
//! can be rotated without invalidating live sessions.

mod config;
mod session;
mod signer;
mod store;
mod utils;

pub use config::{
    CookieAttributes, DEFAULT_COOKIE_NAME, SameSite, SeedGenerator, SessionConfig,
    SessionConfigBuilder, SessionTtl,
};
pub use session::{
    CookieSink, HeaderCookieSink, OutboundCookie, SessionContext, SessionData, SessionError,
    SessionId, SessionMiddleware, SessionState, SessionStatus, lifecycle,
};
pub use signer::{SecretSet, sign, verify};
pub use store::{MemoryStore, SessionStore, StorageError};
pub use utils::{UtilError, gen_random_string};
