//! Payment gateway integration.
//!
//! The gateway issues an order id for an amount; the browser widget collects
//! the payment and hands back `(order_id, payment_id, signature)`, which the
//! backend checks with [`signature::verify_signature`] before trusting it.

pub mod razorpay;
pub mod signature;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use razorpay::RazorpayClient;
pub use signature::{sign, verify_signature};

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("gateway returned {status}: {body}")]
    Api { status: u16, body: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct GatewayOrderRequest {
    /// Amount in the currency's minor unit.
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(&self, request: GatewayOrderRequest) -> Result<GatewayOrder, PaymentError>;

    /// Public key id handed to the client-side checkout widget.
    fn key_id(&self) -> &str;

    /// Shared secret used to sign payment callbacks.
    fn key_secret(&self) -> &str;
}
