use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::{
        orders::CheckoutRequest,
        payment::{PaymentOrderResponse, VerifyPaymentRequest, VerifyPaymentResponse},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    services::payment_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create-order", post(create_order))
        .route("/verify", post(verify))
}

#[utoipa::path(
    post,
    path = "/api/payment/create-order",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Gateway order opened and local order pending", body = PaymentOrderResponse),
        (status = 400, description = "Invalid checkout or cash on delivery method"),
        (status = 409, description = "Insufficient stock"),
        (status = 502, description = "Payment gateway error")
    ),
    security(("bearer_auth" = [])),
    tag = "Payment"
)]
pub async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<Json<PaymentOrderResponse>> {
    let resp = payment_service::create_payment_order(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/payment/verify",
    request_body = VerifyPaymentRequest,
    responses(
        (status = 200, description = "Payment verified and order confirmed", body = VerifyPaymentResponse),
        (status = 400, description = "Missing payment fields or invalid signature"),
        (status = 404, description = "Unknown gateway order")
    ),
    tag = "Payment"
)]
pub async fn verify(
    State(state): State<AppState>,
    Json(payload): Json<VerifyPaymentRequest>,
) -> AppResult<Json<VerifyPaymentResponse>> {
    let resp = payment_service::verify_payment(&state, payload).await?;
    Ok(Json(resp))
}
