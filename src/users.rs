/// User model and credential-store access.
///
/// The auth subsystem only ever touches single records, by id or by
/// email. Everything here goes through the shared `PgPool`; no caching
/// happens at this layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// None for social-login accounts which never set a password.
    pub password_hash: Option<String>,
    pub role: Role,
    pub avatar_url: Option<String>,
    /// Enrolled course ids.
    pub courses: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The serializable snapshot written to the Session Cache and returned in
/// responses. Carries every `User` field except the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub avatar_url: Option<String>,
    pub courses: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            avatar_url: user.avatar_url.clone(),
            courses: user.courses.clone(),
            created_at: user.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: Option<String>,
    role: String,
    avatar_url: Option<String>,
    courses: Vec<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse::<Role>()
            .map_err(AppError::Internal)?;
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role,
            avatar_url: row.avatar_url,
            courses: row.courses,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const USER_COLUMNS: &str =
    "id, name, email, password_hash, role, avatar_url, courses, created_at, updated_at";

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, AppError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {} FROM users WHERE email = $1",
        USER_COLUMNS
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;

    row.map(User::try_from).transpose()
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, AppError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {} FROM users WHERE id = $1",
        USER_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(User::try_from).transpose()
}

pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, AppError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)",
    )
    .bind(email)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub avatar_url: Option<String>,
}

pub async fn insert(pool: &PgPool, new_user: NewUser) -> Result<User, AppError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        r#"
        INSERT INTO users (id, name, email, password_hash, role, avatar_url, courses, created_at, updated_at)
        VALUES ($1, $2, $3, $4, 'user', $5, '{{}}', $6, $6)
        RETURNING {}
        "#,
        USER_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(&new_user.name)
    .bind(&new_user.email)
    .bind(&new_user.password_hash)
    .bind(&new_user.avatar_url)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    User::try_from(row)
}

pub async fn update_profile(
    pool: &PgPool,
    id: Uuid,
    name: Option<&str>,
    email: Option<&str>,
) -> Result<User, AppError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        r#"
        UPDATE users
        SET name = COALESCE($2, name),
            email = COALESCE($3, email),
            updated_at = $4
        WHERE id = $1
        RETURNING {}
        "#,
        USER_COLUMNS
    ))
    .bind(id)
    .bind(name)
    .bind(email)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    User::try_from(row)
}

pub async fn update_password_hash(
    pool: &PgPool,
    id: Uuid,
    password_hash: &str,
) -> Result<User, AppError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "UPDATE users SET password_hash = $2, updated_at = $3 WHERE id = $1 RETURNING {}",
        USER_COLUMNS
    ))
    .bind(id)
    .bind(password_hash)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    User::try_from(row)
}

pub async fn update_role(pool: &PgPool, id: Uuid, role: Role) -> Result<User, AppError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "UPDATE users SET role = $2, updated_at = $3 WHERE id = $1 RETURNING {}",
        USER_COLUMNS
    ))
    .bind(id)
    .bind(role.as_str())
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    User::try_from(row)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn list_all(pool: &PgPool) -> Result<Vec<SessionUser>, AppError> {
    let rows = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {} FROM users ORDER BY created_at DESC",
        USER_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| User::try_from(row).map(|u| SessionUser::from(&u)))
        .collect()
}
