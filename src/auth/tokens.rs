/// Token issuance and verification.
///
/// Three token classes, each signed with its own secret: short-lived
/// access tokens, longer-lived refresh tokens, and self-contained
/// activation tokens. Secrets and lifetimes come from `JwtSettings`,
/// constructed once at startup and injected; they are never mutated at
/// runtime.

use actix_web::cookie::{time::Duration, Cookie, SameSite};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use uuid::Uuid;

use crate::auth::claims::{ActivationClaims, PendingUser, SessionClaims};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// Auth cookies are scoped to the API mount point.
const COOKIE_PATH: &str = "/api";

/// A freshly signed access/refresh pair.
#[derive(Debug, Clone)]
pub struct SessionTokens {
    pub access: String,
    pub refresh: String,
}

#[derive(Clone)]
pub struct TokenIssuer {
    settings: JwtSettings,
}

impl TokenIssuer {
    pub fn new(settings: JwtSettings) -> Self {
        Self { settings }
    }

    /// Signs an activation token embedding the pending registration and a
    /// fresh 4-digit code. Self-verifying: no server-side state is
    /// created. Returns the token together with the code, which is
    /// delivered to the user out-of-band.
    pub fn issue_activation_token(
        &self,
        user: PendingUser,
    ) -> Result<(String, String), AppError> {
        let code = rand::thread_rng().gen_range(1000..=9999).to_string();
        let claims =
            ActivationClaims::new(user, code.clone(), self.settings.activation_token_expiry);

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.settings.activation_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("activation token signing failed: {}", e)))?;

        Ok((token, code))
    }

    pub fn verify_activation_token(&self, token: &str) -> Result<ActivationClaims, AppError> {
        decode::<ActivationClaims>(
            token,
            &DecodingKey::from_secret(self.settings.activation_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::warn!("activation token rejected: {}", e);
            AppError::Auth(AuthError::InvalidActivationToken)
        })
    }

    /// Signs a new access/refresh pair for the given user id. The access
    /// token lives 5 minutes by default, the refresh token 3 days; each is
    /// signed with its own secret.
    pub fn issue_session_pair(&self, user_id: Uuid) -> Result<SessionTokens, AppError> {
        let access = self.sign_session_token(
            user_id,
            self.settings.access_token_expiry,
            &self.settings.access_secret,
        )?;
        let refresh = self.sign_session_token(
            user_id,
            self.settings.refresh_token_expiry,
            &self.settings.refresh_secret,
        )?;

        Ok(SessionTokens { access, refresh })
    }

    fn sign_session_token(
        &self,
        user_id: Uuid,
        lifetime_seconds: i64,
        secret: &str,
    ) -> Result<String, AppError> {
        let claims = SessionClaims::new(user_id, lifetime_seconds);
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("token signing failed: {}", e)))
    }

    pub fn verify_access_token(&self, token: &str) -> Result<SessionClaims, AppError> {
        self.verify_session_token(token, &self.settings.access_secret)
            .map_err(|_| AppError::Auth(AuthError::InvalidToken))
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<SessionClaims, AppError> {
        self.verify_session_token(token, &self.settings.refresh_secret)
            .map_err(|_| AppError::Auth(AuthError::RefreshFailed))
    }

    fn verify_session_token(
        &self,
        token: &str,
        secret: &str,
    ) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
        decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
        .inspect_err(|e| tracing::warn!("session token rejected: {}", e))
    }

    /// Cookie for a freshly issued access token. HTTP-only, API-scoped,
    /// max-age matching the token lifetime. `secure` is enabled outside
    /// local development.
    pub fn access_cookie(&self, token: &str, secure: bool) -> Cookie<'static> {
        session_cookie(
            ACCESS_TOKEN_COOKIE,
            token,
            self.settings.access_token_expiry,
            secure,
        )
    }

    pub fn refresh_cookie(&self, token: &str, secure: bool) -> Cookie<'static> {
        session_cookie(
            REFRESH_TOKEN_COOKIE,
            token,
            self.settings.refresh_token_expiry,
            secure,
        )
    }

    pub fn access_token_expiry(&self) -> i64 {
        self.settings.access_token_expiry
    }
}

fn session_cookie(name: &str, token: &str, max_age_seconds: i64, secure: bool) -> Cookie<'static> {
    Cookie::build(name.to_string(), token.to_string())
        .path(COOKIE_PATH)
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::seconds(max_age_seconds))
        .finish()
}

/// An immediately-expiring replacement cookie, used by logout to clear
/// both tokens from the client.
pub fn expired_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build(name, "")
        .path(COOKIE_PATH)
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(0))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_issuer() -> TokenIssuer {
        TokenIssuer::new(JwtSettings {
            access_secret: "access-secret-for-tests-0123456789".to_string(),
            refresh_secret: "refresh-secret-for-tests-0123456789".to_string(),
            activation_secret: "activation-secret-for-tests-0123456789".to_string(),
            access_token_expiry: 300,
            refresh_token_expiry: 259_200,
            activation_token_expiry: 300,
        })
    }

    fn pending_user() -> PendingUser {
        PendingUser {
            name: "John Doe".to_string(),
            email: "john@example.com".to_string(),
            password: "Secret123".to_string(),
        }
    }

    #[test]
    fn session_pair_round_trips() {
        let issuer = test_issuer();
        let user_id = Uuid::new_v4();

        let pair = issuer.issue_session_pair(user_id).unwrap();

        let access = issuer.verify_access_token(&pair.access).unwrap();
        let refresh = issuer.verify_refresh_token(&pair.refresh).unwrap();
        assert_eq!(access.user_id().unwrap(), user_id);
        assert_eq!(refresh.user_id().unwrap(), user_id);
    }

    #[test]
    fn lifetimes_are_embedded_in_the_claims() {
        let issuer = test_issuer();
        let pair = issuer.issue_session_pair(Uuid::new_v4()).unwrap();

        let access = issuer.verify_access_token(&pair.access).unwrap();
        let refresh = issuer.verify_refresh_token(&pair.refresh).unwrap();
        assert_eq!(access.exp - access.iat, 300);
        assert_eq!(refresh.exp - refresh.iat, 259_200);
    }

    #[test]
    fn token_classes_do_not_cross_verify() {
        let issuer = test_issuer();
        let pair = issuer.issue_session_pair(Uuid::new_v4()).unwrap();

        // An access token is not a valid refresh token and vice versa.
        assert!(issuer.verify_refresh_token(&pair.access).is_err());
        assert!(issuer.verify_access_token(&pair.refresh).is_err());
    }

    #[test]
    fn tampered_tokens_are_rejected() {
        let issuer = test_issuer();
        let pair = issuer.issue_session_pair(Uuid::new_v4()).unwrap();

        let tampered = format!("{}x", pair.access);
        assert!(issuer.verify_access_token(&tampered).is_err());
    }

    #[test]
    fn back_to_back_pairs_are_distinct() {
        let issuer = test_issuer();
        let user_id = Uuid::new_v4();

        let first = issuer.issue_session_pair(user_id).unwrap();
        let second = issuer.issue_session_pair(user_id).unwrap();

        assert_ne!(first.access, second.access);
        assert_ne!(first.refresh, second.refresh);
    }

    #[test]
    fn activation_token_embeds_a_four_digit_code() {
        let issuer = test_issuer();
        let (token, code) = issuer.issue_activation_token(pending_user()).unwrap();

        assert_eq!(code.len(), 4);
        assert!(code.chars().all(|c| c.is_ascii_digit()));

        let claims = issuer.verify_activation_token(&token).unwrap();
        assert_eq!(claims.code, code);
        assert_eq!(claims.user.email, "john@example.com");
        assert_eq!(claims.exp - claims.iat, 300);
    }

    #[test]
    fn activation_token_is_not_a_session_token() {
        let issuer = test_issuer();
        let (token, _) = issuer.issue_activation_token(pending_user()).unwrap();
        assert!(issuer.verify_access_token(&token).is_err());
    }

    #[test]
    fn cookies_carry_the_expected_attributes() {
        let issuer = test_issuer();
        let pair = issuer.issue_session_pair(Uuid::new_v4()).unwrap();

        let access = issuer.access_cookie(&pair.access, false);
        assert_eq!(access.name(), ACCESS_TOKEN_COOKIE);
        assert_eq!(access.path(), Some("/api"));
        assert_eq!(access.http_only(), Some(true));
        assert_eq!(access.secure(), Some(false));
        assert_eq!(access.max_age(), Some(Duration::seconds(300)));

        let refresh = issuer.refresh_cookie(&pair.refresh, true);
        assert_eq!(refresh.name(), REFRESH_TOKEN_COOKIE);
        assert_eq!(refresh.secure(), Some(true));
        assert_eq!(refresh.max_age(), Some(Duration::seconds(259_200)));
    }

    #[test]
    fn expired_cookie_clears_immediately() {
        let cookie = expired_cookie(ACCESS_TOKEN_COOKIE);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(Duration::seconds(0)));
    }
}
