use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::Product,
};

pub const CATEGORIES: [&str; 3] = ["human-nutrition", "animal-nutrition", "consumer-products"];
pub const STATUSES: [&str; 2] = ["active", "inactive"];

/// Body of `POST /api/admin/add-product`; creates or replaces by id.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpsertProductRequest {
    pub id: Option<String>,
    pub name: String,
    pub category: String,
    pub price: i64,
    pub stock: Option<i32>,
    pub expiry_date: Option<NaiveDate>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub rating: Option<f64>,
    pub status: Option<String>,
}

impl UpsertProductRequest {
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::BadRequest("name is required".into()));
        }
        validate_category(&self.category)?;
        if self.price < 0 {
            return Err(AppError::BadRequest("price must not be negative".into()));
        }
        if self.stock.is_some_and(|s| s < 0) {
            return Err(AppError::BadRequest("stock must not be negative".into()));
        }
        if let Some(status) = &self.status {
            validate_status(status)?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<i64>,
    pub stock: Option<i32>,
    pub expiry_date: Option<NaiveDate>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

impl UpdateProductRequest {
    pub fn validate(&self) -> AppResult<()> {
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(AppError::BadRequest("name is required".into()));
        }
        if let Some(category) = &self.category {
            validate_category(category)?;
        }
        if self.price.is_some_and(|p| p < 0) {
            return Err(AppError::BadRequest("price must not be negative".into()));
        }
        if self.stock.is_some_and(|s| s < 0) {
            return Err(AppError::BadRequest("stock must not be negative".into()));
        }
        if let Some(status) = &self.status {
            validate_status(status)?;
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}

pub fn validate_category(category: &str) -> AppResult<()> {
    if CATEGORIES.contains(&category) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("unknown category {category}")))
    }
}

fn validate_status(status: &str) -> AppResult<()> {
    if STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("unknown status {status}")))
    }
}

/// Lower-case, dash-separated slug of a product name.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}
