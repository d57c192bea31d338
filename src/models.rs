use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{customers, orders, products};

/// Public view of a user account; the password hash never leaves the service layer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: String,
    /// Unit price in paise.
    pub price: i64,
    pub stock: i32,
    pub expiry_date: Option<NaiveDate>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub rating: f64,
    pub added_by: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}

impl From<products::Model> for Product {
    fn from(model: products::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            category: model.category,
            price: model.price,
            stock: model.stock,
            expiry_date: model.expiry_date,
            image: model.image,
            description: model.description,
            rating: model.rating,
            added_by: model.added_by,
            status: model.status,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

/// One line of an order, frozen at the price charged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderLine {
    pub product_id: String,
    pub name: String,
    pub quantity: i32,
    pub price: i64,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: String,
    pub user_id: Option<Uuid>,
    pub customer_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub pincode: String,
    pub items: Vec<OrderLine>,
    pub subtotal: i64,
    pub discount: i64,
    pub total: i64,
    pub payment_method: String,
    pub status: String,
    pub payment_status: String,
    pub gateway_order_id: Option<String>,
    pub gateway_payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<orders::Model> for Order {
    type Error = serde_json::Error;

    fn try_from(model: orders::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            items: serde_json::from_value(model.items)?,
            id: model.id,
            user_id: model.user_id,
            customer_name: model.customer_name,
            email: model.email,
            phone: model.phone,
            address: model.address,
            pincode: model.pincode,
            subtotal: model.subtotal,
            discount: model.discount,
            total: model.total,
            payment_method: model.payment_method,
            status: model.status,
            payment_status: model.payment_status,
            gateway_order_id: model.gateway_order_id,
            gateway_payment_id: model.gateway_payment_id,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        })
    }
}

/// Entry in a customer's order history, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderSummary {
    pub id: String,
    pub date: DateTime<Utc>,
    pub total: i64,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Customer {
    pub email: String,
    pub name: String,
    pub phone: String,
    pub joined_at: DateTime<Utc>,
    pub last_order: Option<DateTime<Utc>>,
    pub total_orders: i32,
    pub order_history: Vec<OrderSummary>,
    pub loyalty_coupon: Option<String>,
    pub loyalty_milestone: i32,
}

impl TryFrom<customers::Model> for Customer {
    type Error = serde_json::Error;

    fn try_from(model: customers::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            order_history: serde_json::from_value(model.order_history)?,
            email: model.email,
            name: model.name,
            phone: model.phone,
            joined_at: model.joined_at.with_timezone(&Utc),
            last_order: model.last_order.map(|dt| dt.with_timezone(&Utc)),
            total_orders: model.total_orders,
            loyalty_coupon: model.loyalty_coupon,
            loyalty_milestone: model.loyalty_milestone,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Review {
    pub id: Uuid,
    pub product_id: String,
    pub user_id: Uuid,
    pub user_name: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct ActivityEntry {
    pub id: Uuid,
    pub actor_id: Option<Uuid>,
    pub action: String,
    pub resource: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub kind: String,
    pub message: String,
    pub metadata: Option<serde_json::Value>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
