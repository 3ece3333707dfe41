/// Token claim payloads.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Claims carried by access and refresh tokens. Both token classes share
/// this shape; they differ only in signing secret and lifetime.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    /// User id.
    pub sub: String,
    /// Per-issuance id, so two pairs minted within the same second are
    /// still distinct tokens.
    pub jti: String,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

impl SessionClaims {
    pub fn new(user_id: Uuid, lifetime_seconds: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + lifetime_seconds,
        }
    }

    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| AppError::Internal("invalid user id in token".to_string()))
    }
}

/// The not-yet-persisted registration carried inside an activation token.
/// The password travels in plaintext inside the signed token and is only
/// hashed once activation succeeds; no server-side record exists before
/// that.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PendingUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Claims carried by activation tokens. The 4-digit code lives inside the
/// token itself: activation compares the user-supplied code against this
/// field, never against server-side state.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ActivationClaims {
    pub user: PendingUser,
    pub code: String,
    pub iat: i64,
    pub exp: i64,
}

impl ActivationClaims {
    pub fn new(user: PendingUser, code: String, lifetime_seconds: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            user,
            code,
            iat: now,
            exp: now + lifetime_seconds,
        }
    }
}
