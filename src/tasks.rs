/// Background maintenance, detached from the request-serving path.

use chrono::{Duration, Utc};
use sqlx::PgPool;

const PURGE_INTERVAL_SECS: u64 = 24 * 60 * 60;
const READ_RETENTION_DAYS: i64 = 30;

/// Spawns the daily purge of read notifications older than the retention
/// window. Runs until the process exits; failures are logged and the next
/// tick retries.
pub fn spawn_notification_purge(pool: PgPool) {
    tokio::spawn(async move {
        let mut ticker =
            tokio::time::interval(std::time::Duration::from_secs(PURGE_INTERVAL_SECS));
        loop {
            ticker.tick().await;
            if let Err(e) = purge_read_notifications(&pool).await {
                tracing::error!(error = %e, "notification purge failed");
            }
        }
    });
}

async fn purge_read_notifications(pool: &PgPool) -> Result<(), sqlx::Error> {
    let cutoff = Utc::now() - Duration::days(READ_RETENTION_DAYS);

    let result = sqlx::query(
        "DELETE FROM notifications WHERE status = 'read' AND created_at < $1",
    )
    .bind(cutoff)
    .execute(pool)
    .await?;

    if result.rows_affected() > 0 {
        tracing::info!(purged = result.rows_affected(), "stale notifications removed");
    }
    Ok(())
}
