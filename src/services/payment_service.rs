use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};

use crate::{
    activity,
    checkout::{ensure_in_stock, price_order, receipt_for},
    dto::{
        orders::{CheckoutRequest, PAYMENT_DONE, PAYMENT_PENDING},
        payment::{PaymentOrderResponse, VerifyPaymentRequest, VerifyPaymentResponse},
    },
    entity::{
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{OrderLine, Product},
    payment::{GatewayOrderRequest, verify_signature},
    services::order_service::{
        NewOrder, STATUS_CONFIRMED, STATUS_PENDING, StockPolicy, after_commit, apply_stock,
        insert_order, lock_customer, lock_products, record_customer_order, redeem_coupon,
    },
    state::AppState,
};

/// Price the checkout, open a gateway order for the total and park a
/// pending local order against it. A coupon used in the price is taken off
/// the profile here; stock is untouched until verification.
pub async fn create_payment_order(
    state: &AppState,
    user: &AuthUser,
    payload: CheckoutRequest,
) -> AppResult<PaymentOrderResponse> {
    payload.validate()?;
    if !payload.payment_method.is_online() {
        return Err(AppError::BadRequest(
            "Cash on delivery orders are placed at /api/orders".into(),
        ));
    }
    let requested = payload.requested();

    let txn = state.orm.begin().await?;

    let catalog: HashMap<String, Product> = Products::find()
        .filter(ProdCol::Id.is_in(requested.iter().map(|(id, _)| id.clone())))
        .all(&txn)
        .await?
        .into_iter()
        .map(|model| (model.id.clone(), Product::from(model)))
        .collect();
    // The profile stays locked until the pending order is in, so a coupon
    // priced into this order cannot be priced into another one meanwhile.
    let customer =
        lock_customer(&txn, &user.email, &payload.customer_name, &payload.phone).await?;

    let priced = price_order(&requested, &catalog, customer.loyalty_coupon.is_some())?;
    ensure_in_stock(&priced.lines, &catalog)?;
    if priced.discount > 0 {
        redeem_coupon(&txn, customer).await?;
    }

    let currency = state.config.razorpay.currency.clone();
    let gateway_order = state
        .gateway
        .create_order(GatewayOrderRequest {
            amount: priced.total,
            currency: currency.clone(),
            receipt: receipt_for(Utc::now().timestamp_millis()),
        })
        .await?;

    let order = insert_order(
        &txn,
        NewOrder {
            user_id: Some(user.user_id),
            email: &user.email,
            request: &payload,
            priced: &priced,
            status: STATUS_PENDING,
            payment_status: PAYMENT_PENDING,
            gateway_order_id: Some(gateway_order.id.clone()),
        },
    )
    .await?;

    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        gateway_order_id = %gateway_order.id,
        amount = priced.total,
        "payment order created"
    );
    activity::record(
        &state.pool,
        Some(user.user_id),
        "payment_order_created",
        "orders",
        serde_json::json!({ "order_id": order.id, "gateway_order_id": gateway_order.id }),
    )
    .await;

    Ok(PaymentOrderResponse {
        success: true,
        order_id: order.id,
        gateway_order_id: gateway_order.id,
        key: state.gateway.key_id().to_string(),
        amount: priced.total,
        currency,
    })
}

/// Check the widget's callback signature and settle the matching order.
/// Settling twice is a no-op.
pub async fn verify_payment(
    state: &AppState,
    payload: VerifyPaymentRequest,
) -> AppResult<VerifyPaymentResponse> {
    let (gateway_order_id, payment_id, signature) = payload
        .fields()
        .ok_or_else(|| AppError::BadRequest("Missing payment fields".into()))?;

    if !verify_signature(
        state.gateway.key_secret(),
        gateway_order_id,
        payment_id,
        signature,
    ) {
        tracing::warn!(gateway_order_id, payment_id, "payment signature mismatch");
        return Err(AppError::InvalidSignature);
    }

    let txn = state.orm.begin().await?;

    let order = Orders::find()
        .filter(OrderCol::GatewayOrderId.eq(gateway_order_id))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    if order.payment_status == PAYMENT_DONE {
        return Ok(VerifyPaymentResponse {
            success: true,
            order_id: order.id,
        });
    }

    let lines: Vec<OrderLine> =
        serde_json::from_value(order.items.clone()).map_err(|e| AppError::Internal(e.into()))?;
    let products = lock_products(&txn, lines.iter().map(|l| l.product_id.clone())).await?;
    let customer = lock_customer(&txn, &order.email, &order.customer_name, &order.phone).await?;

    let mut active: OrderActive = order.into();
    active.status = Set(STATUS_CONFIRMED.to_string());
    active.payment_status = Set(PAYMENT_DONE.to_string());
    active.gateway_payment_id = Set(Some(payment_id.to_string()));
    active.gateway_signature = Set(Some(signature.to_string()));
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;

    let shortfalls = apply_stock(&txn, &products, &lines, StockPolicy::Clamp).await?;
    record_customer_order(&txn, customer, &order).await?;

    txn.commit().await?;
    tracing::info!(order_id = %order.id, payment_id, "payment verified");

    if !shortfalls.is_empty() {
        tracing::warn!(order_id = %order.id, ?shortfalls, "paid order exceeds stock");
        activity::announce(
            &state.pool,
            "stock_shortfall",
            &format!("Order {} was paid for more stock than was on hand", order.id),
            serde_json::json!({
                "order_id": order.id,
                "shortfalls": shortfalls
                    .iter()
                    .map(|(id, missing)| serde_json::json!({ "product_id": id, "missing": missing }))
                    .collect::<Vec<_>>(),
            }),
        )
        .await;
    }
    after_commit(state, &order, "payment_received", "payment_verified", true).await;

    Ok(VerifyPaymentResponse {
        success: true,
        order_id: order.id,
    })
}
