/// Account and session lifecycle endpoints.
///
/// Registration hands out a self-contained activation token instead of
/// persisting a pending record; login establishes the Session Cache entry
/// and sets both token cookies; refresh rotates the pair against the live
/// session; logout tears both down. Cookies are only written once a
/// handler has fully succeeded.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::auth::{
    expired_cookie, hash_password, validate_password, verify_password, PendingUser,
    SessionTokens, TokenIssuer, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE,
};
use crate::configuration::ApplicationSettings;
use crate::email_client::EmailClient;
use crate::error::{AppError, AuthError};
use crate::session::SessionStore;
use crate::users::{self, NewUser, SessionUser, User};
use crate::validators::{is_valid_email, is_valid_name};

#[derive(Deserialize)]
pub struct RegistrationRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct RegistrationResponse {
    pub success: bool,
    pub message: String,
    pub activation_token: String,
}

#[derive(Deserialize)]
pub struct ActivationRequest {
    pub activation_token: String,
    pub activation_code: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct SocialAuthRequest {
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
}

/// Body returned by login and social auth: the session snapshot plus the
/// access token (which also travels in the cookie).
#[derive(Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub user: SessionUser,
    pub access_token: String,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub success: bool,
    pub access_token: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Serialize)]
pub struct UserInfoResponse {
    pub success: bool,
    pub user: SessionUser,
}

/// POST /api/v1/registration
///
/// Issues an activation token for a new account and mails the embedded
/// 4-digit code to the address. No record is persisted: the pending
/// registration lives entirely inside the signed token until activation.
pub async fn register(
    form: web::Json<RegistrationRequest>,
    pool: web::Data<PgPool>,
    issuer: web::Data<TokenIssuer>,
    email_client: web::Data<EmailClient>,
) -> Result<HttpResponse, AppError> {
    let name = is_valid_name(&form.name)?;
    let email = is_valid_email(&form.email)?;
    validate_password(&form.password)?;

    if users::email_exists(&pool, &email).await? {
        return Err(AppError::EmailExists);
    }

    let pending = PendingUser {
        name: name.clone(),
        email: email.clone(),
        password: form.password.clone(),
    };
    let (token, code) = issuer.issue_activation_token(pending)?;

    email_client
        .send_activation_email(&email, &name, &code)
        .await?;

    tracing::info!(email = %email, "registration accepted, activation mail sent");

    Ok(HttpResponse::Created().json(RegistrationResponse {
        success: true,
        message: format!(
            "Please check your email: {} to activate your account",
            email
        ),
        activation_token: token,
    }))
}

/// POST /api/v1/activate-user
///
/// Verifies the activation token, compares the supplied code with the
/// code embedded in that same token, re-checks email uniqueness (another
/// registration may have won while the mail was in flight) and only then
/// creates the permanent user record.
pub async fn activate_user(
    form: web::Json<ActivationRequest>,
    pool: web::Data<PgPool>,
    issuer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, AppError> {
    let claims = issuer.verify_activation_token(&form.activation_token)?;

    if claims.code != form.activation_code {
        return Err(AppError::Auth(AuthError::InvalidActivationCode));
    }

    if users::email_exists(&pool, &claims.user.email).await? {
        return Err(AppError::EmailExists);
    }

    let password_hash = hash_password(&claims.user.password)?;
    let user = users::insert(
        &pool,
        NewUser {
            name: claims.user.name,
            email: claims.user.email,
            password_hash: Some(password_hash),
            avatar_url: None,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "account activated");

    Ok(HttpResponse::Created().json(MessageResponse {
        success: true,
        message: "Account activated successfully".to_string(),
    }))
}

/// POST /api/v1/login
pub async fn login(
    form: web::Json<LoginRequest>,
    pool: web::Data<PgPool>,
    issuer: web::Data<TokenIssuer>,
    sessions: web::Data<SessionStore>,
    app: web::Data<ApplicationSettings>,
) -> Result<HttpResponse, AppError> {
    let email = is_valid_email(&form.email)?;

    // Unknown email and wrong password produce the same failure
    let user = users::find_by_email(&pool, &email)
        .await?
        .ok_or(AppError::Auth(AuthError::InvalidCredentials))?;

    let password_hash = user
        .password_hash
        .as_deref()
        .ok_or(AppError::Auth(AuthError::InvalidCredentials))?;
    if !verify_password(&form.password, password_hash)? {
        return Err(AppError::Auth(AuthError::InvalidCredentials));
    }

    tracing::info!(user_id = %user.id, "login succeeded");
    establish_session(&user, &issuer, &sessions, app.secure_cookies(), HttpResponse::Ok()).await
}

/// POST /api/v1/social-auth
///
/// Accepts externally-verified social-login claims. Finds or creates the
/// account (social accounts carry no password hash) and establishes a
/// session exactly like a credential login.
pub async fn social_auth(
    form: web::Json<SocialAuthRequest>,
    pool: web::Data<PgPool>,
    issuer: web::Data<TokenIssuer>,
    sessions: web::Data<SessionStore>,
    app: web::Data<ApplicationSettings>,
) -> Result<HttpResponse, AppError> {
    let name = is_valid_name(&form.name)?;
    let email = is_valid_email(&form.email)?;

    let user = match users::find_by_email(&pool, &email).await? {
        Some(existing) => existing,
        None => {
            let created = users::insert(
                &pool,
                NewUser {
                    name,
                    email,
                    password_hash: None,
                    avatar_url: form.avatar.clone(),
                },
            )
            .await?;
            tracing::info!(user_id = %created.id, "social account created");
            created
        }
    };

    establish_session(&user, &issuer, &sessions, app.secure_cookies(), HttpResponse::Ok()).await
}

/// GET /api/v1/refresh
///
/// Exchanges a valid refresh token for a brand-new pair without asking
/// for credentials again. Four checks run in order: cookie present,
/// signature and expiry valid, session entry alive, reissue. Every
/// failure collapses to the same uninformative message so callers cannot
/// tell an expired token from a tampered one or a session logged out
/// elsewhere.
///
/// Two concurrent refreshes for the same user may both pass the session
/// check and both succeed; the resulting extra valid pair is accepted
/// behavior, not a bug, and no per-user lock is taken.
pub async fn refresh_session(
    req: HttpRequest,
    issuer: web::Data<TokenIssuer>,
    sessions: web::Data<SessionStore>,
    app: web::Data<ApplicationSettings>,
) -> Result<HttpResponse, AppError> {
    let cookie = req
        .cookie(REFRESH_TOKEN_COOKIE)
        .ok_or(AppError::Auth(AuthError::RefreshFailed))?;

    let claims = issuer.verify_refresh_token(cookie.value())?;
    let user_id = claims
        .user_id()
        .map_err(|_| AppError::Auth(AuthError::RefreshFailed))?;

    // Absence here means logout or deletion invalidated the session; the
    // token's signature being valid is not enough
    sessions
        .get(user_id)
        .await?
        .ok_or(AppError::Auth(AuthError::RefreshFailed))?;

    let pair = issuer.issue_session_pair(user_id)?;
    // Snapshot is unchanged; only the entry's lifetime is re-armed
    sessions.touch(user_id).await?;

    tracing::debug!(user_id = %user_id, "session tokens rotated");

    let secure = app.secure_cookies();
    Ok(HttpResponse::Ok()
        .cookie(issuer.access_cookie(&pair.access, secure))
        .cookie(issuer.refresh_cookie(&pair.refresh, secure))
        .json(RefreshResponse {
            success: true,
            access_token: pair.access,
        }))
}

/// GET /api/v1/logout
pub async fn logout(
    user: web::ReqData<SessionUser>,
    sessions: web::Data<SessionStore>,
) -> Result<HttpResponse, AppError> {
    sessions.delete(user.id).await?;

    tracing::info!(user_id = %user.id, "logged out");

    Ok(HttpResponse::Ok()
        .cookie(expired_cookie(ACCESS_TOKEN_COOKIE))
        .cookie(expired_cookie(REFRESH_TOKEN_COOKIE))
        .json(MessageResponse {
            success: true,
            message: "Logged out successfully".to_string(),
        }))
}

/// GET /api/v1/me
///
/// Returns the cached snapshot the auth guard already resolved; no
/// credential-store read happens on this path.
pub async fn current_user(user: web::ReqData<SessionUser>) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(UserInfoResponse {
        success: true,
        user: user.into_inner(),
    }))
}

/// Writes the session snapshot, signs a fresh pair and renders the
/// standard auth response with both cookies set.
async fn establish_session(
    user: &User,
    issuer: &TokenIssuer,
    sessions: &SessionStore,
    secure: bool,
    mut response: actix_web::HttpResponseBuilder,
) -> Result<HttpResponse, AppError> {
    let snapshot = sessions.put(user).await?;
    let SessionTokens { access, refresh } = issuer.issue_session_pair(user.id)?;

    Ok(response
        .cookie(issuer.access_cookie(&access, secure))
        .cookie(issuer.refresh_cookie(&refresh, secure))
        .json(AuthResponse {
            success: true,
            user: snapshot,
            access_token: access,
        }))
}
