use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Customer, OrderSummary};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CustomerList {
    pub items: Vec<Customer>,
}

/// One row of an admin bulk import; existing profiles are overwritten field by field.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CustomerUpsert {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub phone: String,
    pub joined_at: Option<DateTime<Utc>>,
    pub last_order: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_orders: i32,
    #[serde(default)]
    pub order_history: Vec<OrderSummary>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpsertCount {
    pub upserted: usize,
}
