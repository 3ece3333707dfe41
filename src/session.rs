/// Session Cache client.
///
/// One entry per logged-in user id, holding the JSON `SessionUser`
/// snapshot. The entry is the source of truth for "is this user logged
/// in": deleting it invalidates every outstanding refresh token for that
/// id. A new login simply overwrites the previous entry, so concurrent
/// logins collapse to the latest writer.
///
/// Entries carry a TTL equal to the refresh-token lifetime. An entry that
/// outlives every refresh token that could legitimize it is unreachable,
/// so nothing longer is ever needed; the TTL is re-armed on every token
/// reissue and snapshot rewrite.

use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use uuid::Uuid;

use crate::error::AppError;
use crate::users::{SessionUser, User};

#[derive(Clone)]
pub struct SessionStore {
    conn: ConnectionManager,
    ttl_seconds: u64,
}

impl SessionStore {
    pub fn new(conn: ConnectionManager, ttl_seconds: i64) -> Self {
        Self {
            conn,
            ttl_seconds: ttl_seconds.max(0) as u64,
        }
    }

    /// Writes the user's snapshot, overwriting any previous session entry
    /// for the same id. Returns the snapshot that was stored.
    pub async fn put(&self, user: &User) -> Result<SessionUser, AppError> {
        let snapshot = SessionUser::from(user);
        self.put_snapshot(&snapshot).await?;
        Ok(snapshot)
    }

    pub async fn put_snapshot(&self, snapshot: &SessionUser) -> Result<(), AppError> {
        let payload = serde_json::to_string(snapshot)
            .map_err(|e| AppError::Internal(format!("session serialization: {}", e)))?;

        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(snapshot.id.to_string(), payload, self.ttl_seconds)
            .await?;
        Ok(())
    }

    pub async fn get(&self, user_id: Uuid) -> Result<Option<SessionUser>, AppError> {
        let mut conn = self.conn.clone();
        let payload: Option<String> = conn.get(user_id.to_string()).await?;

        match payload {
            None => Ok(None),
            Some(json) => {
                let snapshot = serde_json::from_str(&json)
                    .map_err(|e| AppError::Internal(format!("session deserialization: {}", e)))?;
                Ok(Some(snapshot))
            }
        }
    }

    pub async fn delete(&self, user_id: Uuid) -> Result<(), AppError> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(user_id.to_string()).await?;
        Ok(())
    }

    /// Re-arms the entry's TTL without rewriting the snapshot. Used by the
    /// refresh flow, where the snapshot itself is unchanged.
    pub async fn touch(&self, user_id: Uuid) -> Result<(), AppError> {
        let mut conn = self.conn.clone();
        let _: () = conn
            .expire(user_id.to_string(), self.ttl_seconds as i64)
            .await?;
        Ok(())
    }
}
