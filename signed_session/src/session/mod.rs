mod errors;
mod main;
mod types;

pub use errors::SessionError;
pub use types::{SessionData, SessionId, SessionState, SessionStatus};

pub use main::lifecycle;
pub use main::{CookieSink, HeaderCookieSink, OutboundCookie, SessionContext, SessionMiddleware};
