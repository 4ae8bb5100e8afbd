//! HTTP middleware for admin.
//!
//! Layer order, outermost first: Sentry, `TraceLayer`, sessions. Auth is
//! enforced per handler through the extractors in [`auth`].

pub mod auth;
pub mod session;

pub use auth::{RequireAdminAuth, RequireOrderManager, clear_current_admin, set_current_admin};
pub use session::{SESSION_COOKIE_NAME, create_session_layer, session_layer};
