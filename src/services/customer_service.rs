use sea_orm::{EntityTrait, PaginatorTrait, QueryOrder, QuerySelect};

use crate::{
    activity,
    dto::{
        auth::normalize_email,
        customers::{CustomerList, CustomerUpsert, UpsertCount},
    },
    entity::customers::{Column as CustomerCol, Entity as Customers, Model as CustomerModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Customer,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

pub(crate) fn customer_from_entity(model: CustomerModel) -> AppResult<Customer> {
    Customer::try_from(model).map_err(|e| AppError::Internal(e.into()))
}

pub async fn my_profile(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Customer>> {
    let model = Customers::find_by_id(user.email.clone())
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success(
        "OK",
        customer_from_entity(model)?,
        None,
    ))
}

pub async fn list_customers(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<CustomerList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = pagination.normalize();

    let finder = Customers::find().order_by_desc(CustomerCol::JoinedAt);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(customer_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(ApiResponse::page(
        "Customers",
        CustomerList { items },
        page,
        limit,
        total,
    ))
}

/// Bulk import: insert new profiles and overwrite existing ones, keyed by email.
pub async fn upsert_customers(
    state: &AppState,
    user: &AuthUser,
    payload: Vec<CustomerUpsert>,
) -> AppResult<ApiResponse<UpsertCount>> {
    ensure_admin(user)?;

    let mut tx = state.pool.begin().await?;
    for customer in &payload {
        let email = normalize_email(&customer.email);
        if email.is_empty() {
            return Err(AppError::BadRequest("customer email is required".into()));
        }
        let history = serde_json::to_value(&customer.order_history)
            .map_err(|e| AppError::Internal(e.into()))?;
        sqlx::query(
            r#"
            INSERT INTO customers (email, name, phone, joined_at, last_order, total_orders, order_history)
            VALUES ($1, $2, $3, COALESCE($4, now()), $5, $6, $7)
            ON CONFLICT (email) DO UPDATE SET
                name = EXCLUDED.name,
                phone = EXCLUDED.phone,
                last_order = EXCLUDED.last_order,
                total_orders = EXCLUDED.total_orders,
                order_history = EXCLUDED.order_history
            "#,
        )
        .bind(email)
        .bind(customer.name.trim())
        .bind(customer.phone.trim())
        .bind(customer.joined_at)
        .bind(customer.last_order)
        .bind(customer.total_orders)
        .bind(history)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    activity::record(
        &state.pool,
        Some(user.user_id),
        "customers_upsert",
        "customers",
        serde_json::json!({ "count": payload.len() }),
    )
    .await;

    Ok(ApiResponse::success(
        "Customers saved",
        UpsertCount {
            upserted: payload.len(),
        },
        Some(Meta::empty()),
    ))
}
