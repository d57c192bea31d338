use uuid::Uuid;

use crate::{
    dto::{
        auth::local_part,
        reviews::{CreateReviewRequest, ReviewList},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Review,
    response::ApiResponse,
    routes::params::ReviewQuery,
    state::AppState,
};

pub async fn list_reviews(
    state: &AppState,
    query: ReviewQuery,
) -> AppResult<ApiResponse<ReviewList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let product_id = query.product_id.filter(|id| !id.is_empty());

    let items: Vec<Review> = sqlx::query_as(
        r#"
        SELECT id, product_id, user_id, user_name, rating, comment, created_at
        FROM reviews
        WHERE ($1::TEXT IS NULL OR product_id = $1)
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(product_id.as_deref())
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    let total: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM reviews WHERE ($1::TEXT IS NULL OR product_id = $1)")
            .bind(product_id.as_deref())
            .fetch_one(&state.pool)
            .await?;

    Ok(ApiResponse::page(
        "Reviews",
        ReviewList { items },
        page,
        limit,
        total.0,
    ))
}

pub async fn create_review(
    state: &AppState,
    user: &AuthUser,
    payload: CreateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    payload.validate()?;

    let product_exist: Option<(String,)> = sqlx::query_as("SELECT id FROM products WHERE id = $1")
        .bind(&payload.product_id)
        .fetch_optional(&state.pool)
        .await?;
    if product_exist.is_none() {
        return Err(AppError::BadRequest("product not found".to_string()));
    }

    let customer_name: Option<(String,)> =
        sqlx::query_as("SELECT name FROM customers WHERE email = $1")
            .bind(user.email.as_str())
            .fetch_optional(&state.pool)
            .await?;
    let user_name = customer_name
        .map(|(name,)| name)
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| local_part(&user.email).to_string());

    let review: Review = sqlx::query_as(
        r#"
        INSERT INTO reviews (id, product_id, user_id, user_name, rating, comment)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, product_id, user_id, user_name, rating, comment, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&payload.product_id)
    .bind(user.user_id)
    .bind(user_name)
    .bind(payload.rating)
    .bind(payload.comment.trim())
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::success("Review added", review, None))
}
