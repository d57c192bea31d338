use async_trait::async_trait;

use super::{GatewayOrder, GatewayOrderRequest, PaymentError, PaymentGateway};
use crate::config::RazorpayConfig;

/// Razorpay Orders API client.
#[derive(Clone)]
pub struct RazorpayClient {
    client: reqwest::Client,
    api_base: String,
    key_id: String,
    key_secret: String,
}

impl RazorpayClient {
    pub fn new(config: &RazorpayConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
        }
    }

    fn orders_url(&self) -> String {
        format!("{}/v1/orders", self.api_base)
    }
}

#[async_trait]
impl PaymentGateway for RazorpayClient {
    async fn create_order(&self, request: GatewayOrderRequest) -> Result<GatewayOrder, PaymentError> {
        tracing::debug!(amount = request.amount, receipt = %request.receipt, "creating gateway order");
        let response = self
            .client
            .post(self.orders_url())
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let order = response.json::<GatewayOrder>().await?;
        tracing::info!(gateway_order_id = %order.id, "gateway order created");
        Ok(order)
    }

    fn key_id(&self) -> &str {
        &self.key_id
    }

    fn key_secret(&self) -> &str {
        &self.key_secret
    }
}
