use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::{LockType, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    activity,
    checkout::{PricedOrder, ensure_in_stock, format_rupees, new_order_id, price_order},
    dto::orders::{CheckoutRequest, OrderList, PAYMENT_COD, PAYMENT_PENDING},
    entity::{
        customers::{
            ActiveModel as CustomerActive, Column as CustomerCol, Entity as Customers,
            Model as CustomerModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::{ActiveModel as ProductActive, Column as ProdCol, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    loyalty::{self, LoyaltyState},
    middleware::auth::AuthUser,
    models::{Order, OrderLine, OrderSummary, Product},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::cart_service,
    state::AppState,
    timefmt::format_ist,
};

const MAX_ID_ATTEMPTS: usize = 5;
pub const STATUS_PENDING: &str = "Pending";
pub const STATUS_CONFIRMED: &str = "Confirmed";
pub const STATUS_CANCELLED: &str = "Cancelled";

/// What to do when an order line asks for more than is on hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StockPolicy {
    /// Fail the transaction.
    Strict,
    /// Floor stock at zero and report the shortfall; used once payment is captured.
    Clamp,
}

pub(crate) struct NewOrder<'a> {
    pub user_id: Option<Uuid>,
    pub email: &'a str,
    pub request: &'a CheckoutRequest,
    pub priced: &'a PricedOrder,
    pub status: &'a str,
    pub payment_status: &'a str,
    pub gateway_order_id: Option<String>,
}

pub(crate) fn order_from_entity(model: OrderModel) -> AppResult<Order> {
    Order::try_from(model).map_err(|e| AppError::Internal(e.into()))
}

pub(crate) fn catalog_of(products: &HashMap<String, ProductModel>) -> HashMap<String, Product> {
    products
        .iter()
        .map(|(id, model)| (id.clone(), Product::from(model.clone())))
        .collect()
}

/// Load and row-lock the products referenced by an order.
pub(crate) async fn lock_products(
    txn: &DatabaseTransaction,
    ids: impl IntoIterator<Item = String>,
) -> AppResult<HashMap<String, ProductModel>> {
    let rows = Products::find()
        .filter(ProdCol::Id.is_in(ids))
        .lock(LockType::Update)
        .all(txn)
        .await?;
    Ok(rows.into_iter().map(|p| (p.id.clone(), p)).collect())
}

/// Lock the customer profile for `email`, creating an empty one on first order.
/// Concurrent first orders race on the insert; the loser waits on the lock.
pub(crate) async fn lock_customer(
    txn: &DatabaseTransaction,
    email: &str,
    name: &str,
    phone: &str,
) -> AppResult<CustomerModel> {
    let blank = CustomerActive {
        email: Set(email.to_string()),
        name: Set(name.trim().to_string()),
        phone: Set(phone.trim().to_string()),
        joined_at: Set(Utc::now().into()),
        last_order: Set(None),
        total_orders: Set(0),
        order_history: Set(serde_json::json!([])),
        loyalty_coupon: Set(None),
        loyalty_milestone: Set(0),
    };
    Customers::insert(blank)
        .on_conflict(OnConflict::column(CustomerCol::Email).do_nothing().to_owned())
        .exec_without_returning(txn)
        .await?;

    Customers::find_by_id(email.to_string())
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("customer {email} vanished after upsert")))
}

/// Spend the customer's coupon on the order being priced.
pub(crate) async fn redeem_coupon(
    txn: &DatabaseTransaction,
    customer: CustomerModel,
) -> AppResult<CustomerModel> {
    let redeemed = loyalty::redeem(&LoyaltyState {
        coupon: customer.loyalty_coupon.clone(),
        milestone: customer.loyalty_milestone,
    });
    let mut active: CustomerActive = customer.into();
    active.loyalty_coupon = Set(redeemed.coupon);
    Ok(active.update(txn).await?)
}

pub(crate) async fn unused_order_id<C: ConnectionTrait>(conn: &C) -> AppResult<String> {
    for _ in 0..MAX_ID_ATTEMPTS {
        let id = new_order_id();
        if Orders::find_by_id(id.clone()).one(conn).await?.is_none() {
            return Ok(id);
        }
    }
    Err(AppError::Internal(anyhow::anyhow!(
        "could not allocate a free order id"
    )))
}

pub(crate) async fn insert_order<C: ConnectionTrait>(
    conn: &C,
    new: NewOrder<'_>,
) -> AppResult<OrderModel> {
    let id = unused_order_id(conn).await?;
    let items =
        serde_json::to_value(&new.priced.lines).map_err(|e| AppError::Internal(e.into()))?;
    let now = Utc::now();

    let order = OrderActive {
        id: Set(id),
        user_id: Set(new.user_id),
        customer_name: Set(new.request.customer_name.trim().to_string()),
        email: Set(new.email.to_string()),
        phone: Set(new.request.phone.trim().to_string()),
        address: Set(new.request.address.formatted()),
        pincode: Set(new.request.pincode.trim().to_string()),
        items: Set(items),
        subtotal: Set(new.priced.subtotal),
        discount: Set(new.priced.discount),
        total: Set(new.priced.total),
        payment_method: Set(new.request.payment_method.label().to_string()),
        status: Set(new.status.to_string()),
        payment_status: Set(new.payment_status.to_string()),
        gateway_order_id: Set(new.gateway_order_id),
        gateway_payment_id: Set(None),
        gateway_signature: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(conn)
    .await?;
    Ok(order)
}

/// Take each line's quantity off the shelf. Returns `(product_id, missing)`
/// for every line that could not be fully covered under [`StockPolicy::Clamp`].
pub(crate) async fn apply_stock(
    txn: &DatabaseTransaction,
    products: &HashMap<String, ProductModel>,
    lines: &[OrderLine],
    policy: StockPolicy,
) -> AppResult<Vec<(String, i32)>> {
    let mut shortfalls = Vec::new();
    for line in lines {
        let Some(product) = products.get(&line.product_id) else {
            match policy {
                StockPolicy::Strict => {
                    return Err(AppError::InsufficientStock(line.product_id.clone()));
                }
                StockPolicy::Clamp => {
                    shortfalls.push((line.product_id.clone(), line.quantity));
                    continue;
                }
            }
        };

        let remaining = product.stock - line.quantity;
        let new_stock = match (remaining < 0, policy) {
            (false, _) => remaining,
            (true, StockPolicy::Strict) => {
                return Err(AppError::InsufficientStock(line.product_id.clone()));
            }
            (true, StockPolicy::Clamp) => {
                shortfalls.push((line.product_id.clone(), -remaining));
                0
            }
        };

        let mut active: ProductActive = product.clone().into();
        active.stock = Set(new_stock);
        active.updated_at = Set(Utc::now().into());
        active.update(txn).await?;
    }
    Ok(shortfalls)
}

/// Prepend the order to the customer's history and grant any milestone coupon.
pub(crate) async fn record_customer_order(
    txn: &DatabaseTransaction,
    customer: CustomerModel,
    order: &OrderModel,
) -> AppResult<CustomerModel> {
    let mut history: Vec<OrderSummary> = serde_json::from_value(customer.order_history.clone())
        .map_err(|e| AppError::Internal(e.into()))?;
    history.retain(|entry| entry.id != order.id);
    history.insert(
        0,
        OrderSummary {
            id: order.id.clone(),
            date: order.created_at.with_timezone(&Utc),
            total: order.total,
            status: order.status.clone(),
        },
    );

    // Unpaid online orders do not count towards loyalty.
    let counted = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::Email.eq(customer.email.clone()))
                .add(OrderCol::Status.ne(STATUS_CANCELLED))
                .add(OrderCol::PaymentStatus.ne(PAYMENT_PENDING)),
        )
        .count(txn)
        .await?;

    let loyalty = loyalty::after_order(
        &LoyaltyState {
            coupon: customer.loyalty_coupon.clone(),
            milestone: customer.loyalty_milestone,
        },
        order.discount > 0,
        counted as i64,
    );
    if loyalty.coupon.is_some() && customer.loyalty_coupon.is_none() {
        tracing::info!(email = %customer.email, milestone = loyalty.milestone, "loyalty coupon granted");
    }

    let total_orders = customer.total_orders + 1;
    let mut active: CustomerActive = customer.into();
    active.last_order = Set(Some(order.created_at));
    active.total_orders = Set(total_orders);
    active.order_history =
        Set(serde_json::to_value(&history).map_err(|e| AppError::Internal(e.into()))?);
    active.loyalty_coupon = Set(loyalty.coupon);
    active.loyalty_milestone = Set(loyalty.milestone);
    Ok(active.update(txn).await?)
}

/// Notifications, activity and cart cleanup once the order is durable.
pub(crate) async fn after_commit(
    state: &AppState,
    order: &OrderModel,
    notification: &str,
    action: &str,
    clear_cart: bool,
) {
    let placed_at = format_ist(order.created_at.with_timezone(&Utc));
    activity::announce(
        &state.pool,
        notification,
        &format!(
            "Order {} by {} for {} on {}",
            order.id,
            order.customer_name,
            format_rupees(order.total),
            placed_at
        ),
        serde_json::json!({ "order_id": order.id, "email": order.email }),
    )
    .await;
    activity::record(
        &state.pool,
        order.user_id,
        action,
        "orders",
        serde_json::json!({ "order_id": order.id, "total": order.total }),
    )
    .await;

    if clear_cart {
        if let Some(user_id) = order.user_id {
            if let Err(err) = cart_service::clear_cart(&state.pool, user_id).await {
                tracing::warn!(error = %err, order_id = %order.id, "cart cleanup failed");
            }
        }
    }
}

/// Cash-on-delivery checkout.
pub async fn place_order(
    state: &AppState,
    user: &AuthUser,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<Order>> {
    payload.validate()?;
    if payload.payment_method.is_online() {
        return Err(AppError::BadRequest(
            "Online payments start at /api/payment/create-order".into(),
        ));
    }
    let requested = payload.requested();

    let txn = state.orm.begin().await?;

    let products = lock_products(&txn, requested.iter().map(|(id, _)| id.clone())).await?;
    let catalog = catalog_of(&products);
    let mut customer =
        lock_customer(&txn, &user.email, &payload.customer_name, &payload.phone).await?;

    let priced = price_order(&requested, &catalog, customer.loyalty_coupon.is_some())?;
    ensure_in_stock(&priced.lines, &catalog)?;
    if priced.discount > 0 {
        customer = redeem_coupon(&txn, customer).await?;
    }

    let order = insert_order(
        &txn,
        NewOrder {
            user_id: Some(user.user_id),
            email: &user.email,
            request: &payload,
            priced: &priced,
            status: STATUS_PENDING,
            payment_status: PAYMENT_COD,
            gateway_order_id: None,
        },
    )
    .await?;
    apply_stock(&txn, &products, &priced.lines, StockPolicy::Strict).await?;
    record_customer_order(&txn, customer, &order).await?;

    txn.commit().await?;
    tracing::info!(order_id = %order.id, total = order.total, "order placed");

    after_commit(state, &order, "new_order", "order_placed", payload.clear_cart).await;

    Ok(ApiResponse::success(
        "Order placed",
        order_from_entity(order)?,
        Some(Meta::empty()),
    ))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
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
        "Ok",
        OrderList { items: orders },
        page,
        limit,
        total,
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: &str,
) -> AppResult<ApiResponse<Order>> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success(
        "OK",
        order_from_entity(order)?,
        Some(Meta::empty()),
    ))
}
