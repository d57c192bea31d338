use axum::{Json, Router, extract::State, routing::get};

use crate::{
    error::AppResult, middleware::auth::AuthUser, models::Customer, response::ApiResponse,
    services::customer_service, state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/me", get(my_profile))
}

#[utoipa::path(
    get,
    path = "/api/customer/me",
    responses(
        (status = 200, description = "Customer profile with order history and loyalty state", body = ApiResponse<Customer>),
        (status = 404, description = "No profile yet")
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn my_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Customer>>> {
    let resp = customer_service::my_profile(&state, &user).await?;
    Ok(Json(resp))
}
