/// Profile updates and the admin user-management surface.
///
/// Every mutation that changes a user record also rewrites (or removes)
/// that user's Session Cache entry, so the cached snapshot never outlives
/// the change that invalidated it.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{hash_password, verify_password};
use crate::error::{AppError, AuthError};
use crate::session::SessionStore;
use crate::users::{self, Role, SessionUser};
use crate::validators::{is_valid_email, is_valid_name};

#[derive(Deserialize)]
pub struct UpdateUserInfoRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdatePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Deserialize)]
pub struct UpdateRoleRequest {
    pub id: Uuid,
    pub role: Role,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub success: bool,
    pub user: SessionUser,
}

#[derive(Serialize)]
pub struct UserListResponse {
    pub success: bool,
    pub users: Vec<SessionUser>,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// PUT /api/v1/update-user-info
pub async fn update_user_info(
    user: web::ReqData<SessionUser>,
    form: web::Json<UpdateUserInfoRequest>,
    pool: web::Data<PgPool>,
    sessions: web::Data<SessionStore>,
) -> Result<HttpResponse, AppError> {
    let name = form.name.as_deref().map(is_valid_name).transpose()?;
    let email = form.email.as_deref().map(is_valid_email).transpose()?;

    if let Some(new_email) = email.as_deref() {
        if new_email != user.email && users::email_exists(&pool, new_email).await? {
            return Err(AppError::EmailExists);
        }
    }

    let updated =
        users::update_profile(&pool, user.id, name.as_deref(), email.as_deref()).await?;
    let snapshot = sessions.put(&updated).await?;

    Ok(HttpResponse::Created().json(UserResponse {
        success: true,
        user: snapshot,
    }))
}

/// PUT /api/v1/update-user-password
pub async fn update_password(
    user: web::ReqData<SessionUser>,
    form: web::Json<UpdatePasswordRequest>,
    pool: web::Data<PgPool>,
    sessions: web::Data<SessionStore>,
) -> Result<HttpResponse, AppError> {
    let record = users::find_by_id(&pool, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

    // Social-login accounts have no password to change
    let current_hash = record
        .password_hash
        .as_deref()
        .ok_or(AppError::Auth(AuthError::InvalidCredentials))?;
    if !verify_password(&form.old_password, current_hash)? {
        return Err(AppError::Auth(AuthError::InvalidCredentials));
    }

    let new_hash = hash_password(&form.new_password)?;
    let updated = users::update_password_hash(&pool, user.id, &new_hash).await?;
    let snapshot = sessions.put(&updated).await?;

    tracing::info!(user_id = %user.id, "password updated");

    Ok(HttpResponse::Created().json(UserResponse {
        success: true,
        user: snapshot,
    }))
}

/// GET /api/v1/users -- admin only
pub async fn get_all_users(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let users = users::list_all(&pool).await?;
    Ok(HttpResponse::Ok().json(UserListResponse {
        success: true,
        users,
    }))
}

/// PUT /api/v1/update-user-role -- admin only
pub async fn update_user_role(
    form: web::Json<UpdateRoleRequest>,
    pool: web::Data<PgPool>,
    sessions: web::Data<SessionStore>,
) -> Result<HttpResponse, AppError> {
    if users::find_by_id(&pool, form.id).await?.is_none() {
        return Err(AppError::NotFound("User".to_string()));
    }

    let updated = users::update_role(&pool, form.id, form.role).await?;

    // Only rewrite the snapshot if the target is currently logged in
    if sessions.get(updated.id).await?.is_some() {
        sessions.put(&updated).await?;
    }

    Ok(HttpResponse::Created().json(UserResponse {
        success: true,
        user: SessionUser::from(&updated),
    }))
}

/// DELETE /api/v1/delete-user/{id} -- admin only
///
/// Removing the session entry invalidates every outstanding refresh token
/// for the deleted account.
pub async fn delete_user(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
    sessions: web::Data<SessionStore>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    if !users::delete(&pool, id).await? {
        return Err(AppError::NotFound("User".to_string()));
    }
    sessions.delete(id).await?;

    tracing::info!(user_id = %id, "user deleted");

    Ok(HttpResponse::Created().json(MessageResponse {
        success: true,
        message: "User deleted successfully".to_string(),
    }))
}
