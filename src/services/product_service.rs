use chrono::Utc;
use rand::{Rng, distributions::Alphanumeric};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use sqlx::{Postgres, QueryBuilder};

use crate::{
    activity,
    db::with_retry,
    dto::products::{ProductList, UpdateProductRequest, UpsertProductRequest, slugify, validate_category},
    entity::products::{ActiveModel, Entity as Products},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    state::AppState,
};

const PRODUCT_COLUMNS: &str = "id, name, category, price, stock, expiry_date, image, description, \
     rating, added_by, status, created_at, updated_at";

fn filtered<'a>(head: &str, query: &ProductQuery) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::new(head);
    qb.push(" WHERE TRUE");
    if let Some(search) = query.q.as_ref().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        let pattern = format!("%{search}%");
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(category) = query.category.as_ref().filter(|s| !s.is_empty()) {
        qb.push(" AND category = ").push_bind(category.clone());
    }
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        qb.push(" AND status = ").push_bind(status.clone());
    }
    qb
}

fn order_clause(query: &ProductQuery) -> String {
    let column = match query.sort_by.unwrap_or(ProductSortBy::Name) {
        ProductSortBy::CreatedAt => "created_at",
        ProductSortBy::Price => "price",
        ProductSortBy::Name => "name",
        ProductSortBy::Rating => "rating",
    };
    let direction = match query.sort_order.unwrap_or(SortOrder::Asc) {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };
    format!(" ORDER BY {column} {direction}, id ASC")
}

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    if let Some(category) = query.category.as_deref().filter(|c| !c.is_empty()) {
        validate_category(category)?;
    }
    let (page, limit, offset) = query.pagination.normalize();
    let pool = &state.pool;
    let query = &query;

    let items = with_retry(|| async move {
        let mut qb = filtered(&format!("SELECT {PRODUCT_COLUMNS} FROM products"), query);
        qb.push(order_clause(query));
        qb.push(" LIMIT ").push_bind(limit);
        qb.push(" OFFSET ").push_bind(offset);
        qb.build_query_as::<Product>().fetch_all(pool).await
    })
    .await?;

    let total = with_retry(|| async move {
        let mut qb = filtered("SELECT COUNT(*) FROM products", query);
        qb.build_query_scalar::<i64>().fetch_one(pool).await
    })
    .await?;

    Ok(ApiResponse::page(
        "Products",
        ProductList { items },
        page,
        limit,
        total,
    ))
}

pub async fn get_product(state: &AppState, id: &str) -> AppResult<ApiResponse<Product>> {
    let product = Products::find_by_id(id.to_string())
        .one(&state.orm)
        .await?
        .map(Product::from)
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Product", product, None))
}

fn generated_id(name: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(4)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    match slugify(name) {
        slug if slug.is_empty() => format!("product-{suffix}"),
        slug => format!("{slug}-{suffix}"),
    }
}

/// Create a product or overwrite the one with the same id.
pub async fn upsert_product(
    state: &AppState,
    user: &AuthUser,
    payload: UpsertProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    payload.validate()?;

    let id = payload
        .id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| generated_id(&payload.name));

    let product: Product = sqlx::query_as(&format!(
        r#"
        INSERT INTO products
            (id, name, category, price, stock, expiry_date, image, description, rating, added_by, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (id) DO UPDATE SET
            name = EXCLUDED.name,
            category = EXCLUDED.category,
            price = EXCLUDED.price,
            stock = EXCLUDED.stock,
            expiry_date = EXCLUDED.expiry_date,
            image = EXCLUDED.image,
            description = EXCLUDED.description,
            status = EXCLUDED.status,
            updated_at = now()
        RETURNING {PRODUCT_COLUMNS}
        "#
    ))
    .bind(&id)
    .bind(payload.name.trim())
    .bind(&payload.category)
    .bind(payload.price)
    .bind(payload.stock.unwrap_or(0))
    .bind(payload.expiry_date)
    .bind(payload.image.as_deref())
    .bind(payload.description.as_deref())
    .bind(payload.rating.unwrap_or(5.0))
    .bind(user.email.as_str())
    .bind(payload.status.as_deref().unwrap_or("active"))
    .fetch_one(&state.pool)
    .await?;

    tracing::info!(product_id = %product.id, "product upserted");
    activity::record(
        &state.pool,
        Some(user.user_id),
        "product_upsert",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;
    activity::announce(
        &state.pool,
        "product_added",
        &format!("{} saved by {}", product.name, user.email),
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product saved",
        product,
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: &str,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    payload.validate()?;

    let existing = Products::find_by_id(id.to_string())
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(category) = payload.category {
        active.category = Set(category);
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(stock) = payload.stock {
        active.stock = Set(stock);
    }
    if let Some(expiry_date) = payload.expiry_date {
        active.expiry_date = Set(Some(expiry_date));
    }
    if let Some(image) = payload.image {
        active.image = Set(Some(image));
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(status) = payload.status {
        active.status = Set(status);
    }
    active.updated_at = Set(Utc::now().into());

    let product = active.update(&state.orm).await?;

    activity::record(
        &state.pool,
        Some(user.user_id),
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        Product::from(product),
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Products::delete_by_id(id.to_string())
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    activity::record(
        &state.pool,
        Some(user.user_id),
        "product_delete",
        "products",
        serde_json::json!({ "product_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
