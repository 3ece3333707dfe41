//! Token and session-lifecycle properties that hold without any backing
//! infrastructure: everything here exercises the issuer, claims, cookies
//! and the role predicate directly.

use chrono::Utc;
use uuid::Uuid;

use learnhub::auth::{
    expired_cookie, PendingUser, TokenIssuer, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE,
};
use learnhub::configuration::JwtSettings;
use learnhub::middleware::role_allowed;
use learnhub::users::{Role, SessionUser, User};

fn issuer() -> TokenIssuer {
    TokenIssuer::new(JwtSettings {
        access_secret: "lifecycle-access-secret-0123456789".to_string(),
        refresh_secret: "lifecycle-refresh-secret-0123456789".to_string(),
        activation_secret: "lifecycle-activation-secret-0123456789".to_string(),
        access_token_expiry: 300,
        refresh_token_expiry: 259_200,
        activation_token_expiry: 300,
    })
}

fn sample_user() -> User {
    User {
        id: Uuid::new_v4(),
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
        password_hash: Some("$2b$12$abcdefghijklmnopqrstuv".to_string()),
        role: Role::User,
        avatar_url: None,
        courses: vec![Uuid::new_v4()],
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[test]
fn issued_pair_carries_the_documented_lifetimes() {
    let issuer = issuer();
    let pair = issuer.issue_session_pair(Uuid::new_v4()).unwrap();

    let access = issuer.verify_access_token(&pair.access).unwrap();
    let refresh = issuer.verify_refresh_token(&pair.refresh).unwrap();

    // 5 minutes and 3 days, embedded at issuance
    assert_eq!(access.exp - access.iat, 300);
    assert_eq!(refresh.exp - refresh.iat, 259_200);
}

#[test]
fn both_tokens_resolve_to_the_same_user() {
    let issuer = issuer();
    let user_id = Uuid::new_v4();
    let pair = issuer.issue_session_pair(user_id).unwrap();

    assert_eq!(
        issuer
            .verify_access_token(&pair.access)
            .unwrap()
            .user_id()
            .unwrap(),
        user_id
    );
    assert_eq!(
        issuer
            .verify_refresh_token(&pair.refresh)
            .unwrap()
            .user_id()
            .unwrap(),
        user_id
    );
}

#[test]
fn secrets_are_not_interchangeable() {
    let issuer = issuer();
    let pair = issuer.issue_session_pair(Uuid::new_v4()).unwrap();

    assert!(issuer.verify_access_token(&pair.refresh).is_err());
    assert!(issuer.verify_refresh_token(&pair.access).is_err());

    let (activation, _) = issuer
        .issue_activation_token(PendingUser {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "Secret123".to_string(),
        })
        .unwrap();
    assert!(issuer.verify_access_token(&activation).is_err());
    assert!(issuer.verify_refresh_token(&activation).is_err());
}

#[test]
fn concurrent_refreshes_would_each_get_their_own_pair() {
    // Two refresh calls that both passed the session check mint distinct
    // pairs; neither invalidates the other. This documents the accepted
    // non-exclusive refresh behavior.
    let issuer = issuer();
    let user_id = Uuid::new_v4();

    let first = issuer.issue_session_pair(user_id).unwrap();
    let second = issuer.issue_session_pair(user_id).unwrap();

    assert_ne!(first.access, second.access);
    assert_ne!(first.refresh, second.refresh);

    // Both pairs remain verifiable
    assert!(issuer.verify_access_token(&first.access).is_ok());
    assert!(issuer.verify_access_token(&second.access).is_ok());
    assert!(issuer.verify_refresh_token(&first.refresh).is_ok());
    assert!(issuer.verify_refresh_token(&second.refresh).is_ok());
}

#[test]
fn activation_token_is_a_self_verifying_capability() {
    let issuer = issuer();
    let (token, code) = issuer
        .issue_activation_token(PendingUser {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "Secret123".to_string(),
        })
        .unwrap();

    let claims = issuer.verify_activation_token(&token).unwrap();

    // The only valid code is the one inside the token itself
    assert_eq!(claims.code, code);
    assert_eq!(claims.user.email, "ada@example.com");
    assert_eq!(claims.user.password, "Secret123");
    assert_eq!(claims.exp - claims.iat, 300);

    // A code that differs in any way must be treated as invalid
    let wrong = if code == "1234" { "4321" } else { "1234" };
    assert_ne!(claims.code, wrong);
}

#[test]
fn tampered_activation_tokens_are_rejected() {
    let issuer = issuer();
    let (token, _) = issuer
        .issue_activation_token(PendingUser {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "Secret123".to_string(),
        })
        .unwrap();

    let mut tampered = token.clone();
    tampered.push('x');
    assert!(issuer.verify_activation_token(&tampered).is_err());
}

#[test]
fn login_cookies_match_the_token_lifetimes() {
    let issuer = issuer();
    let pair = issuer.issue_session_pair(Uuid::new_v4()).unwrap();

    let access = issuer.access_cookie(&pair.access, false);
    let refresh = issuer.refresh_cookie(&pair.refresh, false);

    assert_eq!(access.name(), ACCESS_TOKEN_COOKIE);
    assert_eq!(refresh.name(), REFRESH_TOKEN_COOKIE);
    assert_eq!(access.http_only(), Some(true));
    assert_eq!(refresh.http_only(), Some(true));
    assert_eq!(
        access.max_age(),
        Some(actix_web::cookie::time::Duration::seconds(300))
    );
    assert_eq!(
        refresh.max_age(),
        Some(actix_web::cookie::time::Duration::seconds(259_200))
    );
}

#[test]
fn logout_cookies_expire_immediately() {
    for name in [ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE] {
        let cookie = expired_cookie(name);
        assert_eq!(cookie.value(), "");
        assert_eq!(
            cookie.max_age(),
            Some(actix_web::cookie::time::Duration::seconds(0))
        );
    }
}

#[test]
fn session_snapshot_holds_no_password_material() {
    let user = sample_user();
    let snapshot = SessionUser::from(&user);
    let json = serde_json::to_value(&snapshot).unwrap();

    assert!(json.get("password").is_none());
    assert!(json.get("password_hash").is_none());
    assert_eq!(json["id"], user.id.to_string());
}

#[test]
fn user_role_is_denied_on_admin_routes() {
    assert!(!role_allowed(Role::User, &[Role::Admin]));
    assert!(role_allowed(Role::Admin, &[Role::Admin]));
}
