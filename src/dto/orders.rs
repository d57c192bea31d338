use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    checkout::merge_quantities,
    error::{AppError, AppResult},
    models::Order,
};

pub const ORDER_STATUSES: [&str; 6] = [
    "Pending",
    "Confirmed",
    "Processing",
    "Shipped",
    "Delivered",
    "Cancelled",
];

pub const PAYMENT_COD: &str = "cod";
pub const PAYMENT_PENDING: &str = "pending";
pub const PAYMENT_DONE: &str = "done";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub enum PaymentMethod {
    #[serde(rename = "cod")]
    CashOnDelivery,
    #[serde(rename = "card")]
    Card,
    #[serde(rename = "upi")]
    Upi,
    #[serde(rename = "net")]
    NetBanking,
}

impl PaymentMethod {
    pub fn is_online(self) -> bool {
        !matches!(self, PaymentMethod::CashOnDelivery)
    }

    pub fn label(self) -> &'static str {
        if self.is_online() {
            "Online Payment"
        } else {
            "Cash on Delivery"
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ShippingAddress {
    pub house: String,
    pub area: String,
    pub city: String,
    pub state: String,
    #[serde(default = "default_country")]
    pub country: String,
}

fn default_country() -> String {
    "India".to_string()
}

impl ShippingAddress {
    pub fn formatted(&self) -> String {
        [&self.house, &self.area, &self.city, &self.state, &self.country]
            .iter()
            .map(|part| part.trim())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn is_complete(&self) -> bool {
        [&self.house, &self.area, &self.city, &self.state, &self.country]
            .iter()
            .all(|part| !part.trim().is_empty())
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CheckoutItem {
    pub product_id: String,
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub customer_name: String,
    pub phone: String,
    pub address: ShippingAddress,
    pub pincode: String,
    pub items: Vec<CheckoutItem>,
    pub payment_method: PaymentMethod,
    #[serde(default = "default_clear_cart")]
    pub clear_cart: bool,
}

fn default_clear_cart() -> bool {
    true
}

impl CheckoutRequest {
    pub fn validate(&self) -> AppResult<()> {
        let required = [&self.customer_name, &self.phone, &self.pincode];
        if required.iter().any(|v| v.trim().is_empty()) || !self.address.is_complete() {
            return Err(AppError::BadRequest("Missing shipping details".into()));
        }
        if self.items.is_empty() {
            return Err(AppError::BadRequest("Order has no items".into()));
        }
        if self.items.iter().any(|item| item.quantity <= 0) {
            return Err(AppError::BadRequest("quantity must be greater than 0".into()));
        }
        Ok(())
    }

    pub fn requested(&self) -> Vec<(String, i32)> {
        merge_quantities(
            self.items
                .iter()
                .map(|item| (item.product_id.as_str(), item.quantity)),
        )
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

pub fn validate_order_status(status: &str) -> AppResult<()> {
    if ORDER_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("Invalid order status {status}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: serde_json::Value) -> CheckoutRequest {
        serde_json::from_value(json).expect("valid checkout json")
    }

    fn sample() -> serde_json::Value {
        serde_json::json!({
            "customer_name": "Asha Rao",
            "phone": "+91 98765 43210",
            "address": { "house": "12B", "area": "MG Road", "city": "Pune", "state": "MH" },
            "pincode": "411001",
            "items": [
                { "product_id": "spirulina", "quantity": 1 },
                { "product_id": "spirulina", "quantity": 2 }
            ],
            "payment_method": "cod"
        })
    }

    #[test]
    fn parses_and_formats_address() {
        let req = request(sample());
        assert!(req.clear_cart);
        assert_eq!(req.payment_method, PaymentMethod::CashOnDelivery);
        assert_eq!(req.address.formatted(), "12B, MG Road, Pune, MH, India");
        assert!(req.validate().is_ok());
        assert_eq!(req.requested(), vec![("spirulina".to_string(), 3)]);
    }

    #[test]
    fn rejects_missing_shipping_fields() {
        let mut json = sample();
        json["address"]["city"] = serde_json::json!("  ");
        assert!(request(json).validate().is_err());
    }

    #[test]
    fn rejects_empty_or_non_positive_items() {
        let mut json = sample();
        json["items"] = serde_json::json!([]);
        assert!(request(json).validate().is_err());

        let mut json = sample();
        json["items"] = serde_json::json!([{ "product_id": "spirulina", "quantity": -1 }]);
        assert!(request(json).validate().is_err());
    }

    #[test]
    fn payment_method_labels() {
        assert_eq!(PaymentMethod::CashOnDelivery.label(), "Cash on Delivery");
        assert_eq!(PaymentMethod::Upi.label(), "Online Payment");
        assert!(PaymentMethod::NetBanking.is_online());
        let net: PaymentMethod = serde_json::from_str("\"net\"").unwrap();
        assert_eq!(net, PaymentMethod::NetBanking);
    }

    #[test]
    fn order_status_whitelist() {
        assert!(validate_order_status("Shipped").is_ok());
        assert!(validate_order_status("shipped").is_err());
        assert!(validate_order_status("Lost").is_err());
    }
}
