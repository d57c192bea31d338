use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use crate::{
    dto::contact::ContactRequest, error::AppResult, response::ApiResponse,
    services::contact_service, state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(submit))
        .route("/health", get(database_health))
}

#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = ContactRequest,
    responses(
        (status = 201, description = "Message stored"),
        (status = 400, description = "Missing required fields or invalid email")
    ),
    tag = "Contact"
)]
pub async fn submit(
    State(state): State<AppState>,
    Json(payload): Json<ContactRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<serde_json::Value>>)> {
    let resp = contact_service::submit_message(&state.pool, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/contact/health",
    responses(
        (status = 200, description = "Database reachable"),
        (status = 500, description = "Database error")
    ),
    tag = "Contact"
)]
pub async fn database_health(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = contact_service::database_health(&state.pool).await?;
    Ok(Json(resp))
}
