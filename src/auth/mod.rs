/// Authentication primitives: token issuance/verification, claim
/// payloads, and password hashing.

mod claims;
mod password;
mod tokens;

pub use claims::{ActivationClaims, PendingUser, SessionClaims};
pub use password::{hash_password, validate_password, verify_password};
pub use tokens::{
    expired_cookie, SessionTokens, TokenIssuer, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE,
};
