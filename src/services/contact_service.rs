use crate::{
    db::{DbPool, with_retry},
    dto::contact::ContactRequest,
    error::AppResult,
    response::{ApiResponse, Meta},
};

pub async fn submit_message(
    pool: &DbPool,
    payload: ContactRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    payload.validate()?;

    sqlx::query(
        r#"
        INSERT INTO contact_messages (first_name, last_name, email, phone, subject, message)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(payload.first_name.trim())
    .bind(payload.last_name.trim())
    .bind(payload.email.trim())
    .bind(payload.phone.as_deref().unwrap_or(""))
    .bind(payload.subject.as_deref().unwrap_or(""))
    .bind(payload.message.trim())
    .execute(pool)
    .await
    .inspect_err(|err| tracing::error!(error = %err, "contact message insert failed"))?;

    Ok(ApiResponse::success(
        "Message received",
        serde_json::json!({ "success": true }),
        Some(Meta::empty()),
    ))
}

pub async fn database_health(pool: &DbPool) -> AppResult<ApiResponse<serde_json::Value>> {
    let ok: i32 = with_retry(|| sqlx::query_scalar("SELECT 1").fetch_one(pool)).await?;
    Ok(ApiResponse::success(
        "Database reachable",
        serde_json::json!({ "success": ok == 1 }),
        Some(Meta::empty()),
    ))
}
