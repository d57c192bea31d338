use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::cart::{AddToCartRequest, CartItemDto, CartList},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Product,
    response::{ApiResponse, Meta},
};

#[derive(FromRow)]
struct CartWithProductRow {
    cart_id: Uuid,
    quantity: i32,
    product_id: String,
    name: String,
    category: String,
    price: i64,
    stock: i32,
    expiry_date: Option<NaiveDate>,
    image: Option<String>,
    description: Option<String>,
    rating: f64,
    added_by: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CartWithProductRow> for CartItemDto {
    fn from(row: CartWithProductRow) -> Self {
        CartItemDto {
            id: row.cart_id,
            quantity: row.quantity,
            product: Product {
                id: row.product_id,
                name: row.name,
                category: row.category,
                price: row.price,
                stock: row.stock,
                expiry_date: row.expiry_date,
                image: row.image,
                description: row.description,
                rating: row.rating,
                added_by: row.added_by,
                status: row.status,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

pub async fn list_cart(pool: &DbPool, user: &AuthUser) -> AppResult<ApiResponse<CartList>> {
    let rows = sqlx::query_as::<_, CartWithProductRow>(
        r#"
        SELECT ci.id AS cart_id, ci.quantity,
               p.id AS product_id, p.name, p.category, p.price, p.stock, p.expiry_date,
               p.image, p.description, p.rating, p.added_by, p.status, p.created_at, p.updated_at
        FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        WHERE ci.user_id = $1
        ORDER BY ci.created_at DESC
        "#,
    )
    .bind(user.user_id)
    .fetch_all(pool)
    .await?;

    let items: Vec<CartItemDto> = rows.into_iter().map(CartItemDto::from).collect();
    let subtotal = items
        .iter()
        .map(|item| item.product.price * i64::from(item.quantity))
        .sum();
    let total = items.len() as i64;

    Ok(ApiResponse::page(
        "OK",
        CartList { items, subtotal },
        1,
        total,
        total,
    ))
}

/// Set the quantity of a product in the caller's cart.
pub async fn add_to_cart(
    pool: &DbPool,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let product_exist: Option<(String,)> = sqlx::query_as("SELECT id FROM products WHERE id = $1")
        .bind(&payload.product_id)
        .fetch_optional(pool)
        .await?;
    if product_exist.is_none() {
        return Err(AppError::BadRequest("product not found".to_string()));
    }

    let (id, quantity): (Uuid, i32) = sqlx::query_as(
        r#"
        INSERT INTO cart_items (id, user_id, product_id, quantity)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (user_id, product_id) DO UPDATE SET quantity = EXCLUDED.quantity
        RETURNING id, quantity
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.user_id)
    .bind(&payload.product_id)
    .bind(payload.quantity)
    .fetch_one(pool)
    .await?;

    tracing::debug!(user_id = %user.user_id, product_id = %payload.product_id, quantity, "cart updated");
    Ok(ApiResponse::success(
        "OK",
        serde_json::json!({ "id": id, "product_id": payload.product_id, "quantity": quantity }),
        None,
    ))
}

pub async fn remove_from_cart(
    pool: &DbPool,
    user: &AuthUser,
    product_id: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM cart_items WHERE product_id = $1 AND user_id = $2")
        .bind(product_id)
        .bind(user.user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success(
        "Removed from cart",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn clear_cart(pool: &DbPool, user_id: Uuid) -> AppResult<u64> {
    let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
