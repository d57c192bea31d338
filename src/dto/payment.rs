use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentOrderResponse {
    pub success: bool,
    /// Local order id (`ORD-…`).
    pub order_id: String,
    pub gateway_order_id: String,
    /// Public key for the checkout widget.
    pub key: String,
    pub amount: i64,
    pub currency: String,
}

/// Callback fields posted by the checkout widget after a successful payment.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct VerifyPaymentRequest {
    pub razorpay_order_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    pub razorpay_signature: Option<String>,
}

fn pick(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl VerifyPaymentRequest {
    /// The three callback fields, or `None` if any is missing or blank.
    pub fn fields(&self) -> Option<(&str, &str, &str)> {
        Some((
            pick(&self.razorpay_order_id)?,
            pick(&self.razorpay_payment_id)?,
            pick(&self.razorpay_signature)?,
        ))
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyPaymentResponse {
    pub success: bool,
    pub order_id: String,
}
