//! Append-only admin logs: the activity trail and the notification feed.

use serde_json::Value;
use uuid::Uuid;

use crate::{db::DbPool, error::AppResult};

pub async fn log_activity(
    pool: &DbPool,
    actor: Option<Uuid>,
    action: &str,
    resource: Option<&str>,
    metadata: Option<Value>,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO admin_activity (id, actor_id, action, resource, metadata)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(actor)
    .bind(action)
    .bind(resource)
    .bind(metadata)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn notify_admins(
    pool: &DbPool,
    kind: &str,
    message: &str,
    metadata: Option<Value>,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO admin_notifications (id, kind, message, metadata)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(kind)
    .bind(message)
    .bind(metadata)
    .execute(pool)
    .await?;

    Ok(())
}

/// Record an activity row after the main write has committed. Failures are logged only.
pub async fn record(
    pool: &DbPool,
    actor: Option<Uuid>,
    action: &str,
    resource: &str,
    metadata: Value,
) {
    if let Err(err) = log_activity(pool, actor, action, Some(resource), Some(metadata)).await {
        tracing::warn!(error = %err, action, "activity log failed");
    }
}

/// Push an admin notification after commit. Failures are logged only.
pub async fn announce(pool: &DbPool, kind: &str, message: &str, metadata: Value) {
    if let Err(err) = notify_admins(pool, kind, message, Some(metadata)).await {
        tracing::warn!(error = %err, kind, "admin notification failed");
    }
}
