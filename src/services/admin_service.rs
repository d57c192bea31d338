use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    activity,
    dto::{
        admin::{ActivityList, NotificationList, NotificationQuery},
        orders::{OrderList, PAYMENT_PENDING, UpdateOrderStatusRequest, validate_order_status},
    },
    entity::{
        admin_notifications::{ActiveModel as NotificationActive, Entity as Notifications},
        customers::{ActiveModel as CustomerActive, Entity as Customers},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
    },
    error::{AppError, AppResult},
    loyalty::COUPON_CODE,
    middleware::auth::{AuthUser, ensure_admin},
    models::{ActivityEntry, Notification, Order, OrderSummary},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, Pagination, SortOrder},
    services::order_service::{STATUS_CANCELLED, order_from_entity},
    state::AppState,
};

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(OrderCol::Status.eq(status.clone()));
    }

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(ApiResponse::page(
        "Orders",
        OrderList { items: orders },
        page,
        limit,
        total,
    ))
}

/// Move an order to a new status and mirror it into the customer's history.
pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: &str,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;
    validate_order_status(&payload.status)?;

    let txn = state.orm.begin().await?;

    let existing = Orders::find_by_id(id.to_string())
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    let previous = existing.status.clone();

    let mut active: OrderActive = existing.into();
    active.status = Set(payload.status.clone());
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;

    if let Some(customer) = Customers::find_by_id(order.email.clone())
        .lock(LockType::Update)
        .one(&txn)
        .await?
    {
        let mut history: Vec<OrderSummary> =
            serde_json::from_value(customer.order_history.clone())
                .map_err(|e| AppError::Internal(e.into()))?;
        let mut touched = false;
        for entry in history.iter_mut().filter(|entry| entry.id == order.id) {
            entry.status = order.status.clone();
            touched = true;
        }
        // An unpaid online order that is called off hands its coupon back.
        let refund_coupon = order.status == STATUS_CANCELLED
            && previous != STATUS_CANCELLED
            && order.payment_status == PAYMENT_PENDING
            && order.discount > 0
            && customer.loyalty_coupon.is_none();
        if touched || refund_coupon {
            let mut active: CustomerActive = customer.into();
            active.order_history =
                Set(serde_json::to_value(&history).map_err(|e| AppError::Internal(e.into()))?);
            if refund_coupon {
                active.loyalty_coupon = Set(Some(COUPON_CODE.to_string()));
                tracing::info!(order_id = %order.id, "loyalty coupon returned");
            }
            active.update(&txn).await?;
        }
    }

    txn.commit().await?;
    tracing::info!(order_id = %order.id, from = %previous, to = %order.status, "order status changed");

    activity::record(
        &state.pool,
        Some(user.user_id),
        "order_status_update",
        "orders",
        serde_json::json!({ "order_id": order.id, "from": previous, "to": order.status }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order updated",
        order_from_entity(order)?,
        Some(Meta::empty()),
    ))
}

pub async fn list_activity(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<ActivityList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = pagination.normalize();

    let items = sqlx::query_as::<_, ActivityEntry>(
        r#"
        SELECT id, actor_id, action, resource, metadata, created_at
        FROM admin_activity
        ORDER BY created_at DESC, id
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admin_activity")
        .fetch_one(&state.pool)
        .await?;

    Ok(ApiResponse::page(
        "Activity",
        ActivityList { items },
        page,
        limit,
        total,
    ))
}

pub async fn list_notifications(
    state: &AppState,
    user: &AuthUser,
    query: NotificationQuery,
) -> AppResult<ApiResponse<NotificationList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination.normalize();

    let items = sqlx::query_as::<_, Notification>(
        r#"
        SELECT id, kind, message, metadata, is_read, created_at
        FROM admin_notifications
        WHERE ($1 = FALSE OR is_read = FALSE)
        ORDER BY created_at DESC, id
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(query.unread_only)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    let (total, unread): (i64, i64) = sqlx::query_as(
        r#"
        SELECT
            COUNT(*) FILTER (WHERE $1 = FALSE OR is_read = FALSE),
            COUNT(*) FILTER (WHERE is_read = FALSE)
        FROM admin_notifications
        "#,
    )
    .bind(query.unread_only)
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::page(
        "Notifications",
        NotificationList { items, unread },
        page,
        limit,
        total,
    ))
}

pub async fn mark_notification_read(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let existing = Notifications::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    if !existing.is_read {
        let mut active: NotificationActive = existing.into();
        active.is_read = Set(true);
        active.update(&state.orm).await?;
    }

    Ok(ApiResponse::success(
        "Marked as read",
        serde_json::json!({ "id": id }),
        Some(Meta::empty()),
    ))
}
