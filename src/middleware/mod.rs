/// Request-gating middleware: authentication, then role authorization,
/// plus request logging.

mod auth_guard;
mod request_logger;
mod role_guard;

pub use auth_guard::AuthGuard;
pub use request_logger::RequestLogger;
pub use role_guard::{role_allowed, RoleGuard};
