//! HTTP middleware stack.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (`http_request` span)
//! 3. Request ID (fills the span's `request_id` field)
//! 4. Session layer (tower-sessions with `PostgreSQL` store)

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::{
    OptionalAuth, RequireAuth, RequireOnboarded, clear_current_user, set_current_user,
};
pub use request_id::request_id_middleware;
pub use session::create_session_layer;
