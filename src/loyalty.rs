//! Loyalty coupon rules. Every second non-cancelled order earns a one-shot
//! coupon worth a percentage of the next order's subtotal.

pub const COUPON_CODE: &str = "LOYALTY15";
pub const DISCOUNT_PERCENT: i64 = 15;
pub const ORDERS_PER_MILESTONE: i32 = 2;

/// Discount in paise for `subtotal`, floored. Zero when no coupon is active.
pub fn discount_for(subtotal: i64, coupon_active: bool) -> i64 {
    if !coupon_active || subtotal <= 0 {
        return 0;
    }
    subtotal * DISCOUNT_PERCENT / 100
}

/// Milestone reached by `order_count`, if it has not been rewarded yet.
pub fn milestone_reached(order_count: i64, last_milestone: i32) -> Option<i32> {
    let count = i32::try_from(order_count).ok()?;
    (count > 0 && count % ORDERS_PER_MILESTONE == 0 && count > last_milestone).then_some(count)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoyaltyState {
    pub coupon: Option<String>,
    pub milestone: i32,
}

/// Take the coupon off the profile. Called in the same transaction that
/// prices an order with it, so a pending online order holds it exclusively.
pub fn redeem(current: &LoyaltyState) -> LoyaltyState {
    LoyaltyState {
        coupon: None,
        milestone: current.milestone,
    }
}

/// Coupon state once an order settles. A discounted order already redeemed
/// its coupon at pricing time and earns nothing; otherwise the customer's
/// non-cancelled `order_count` (including this order) may earn a new one.
pub fn after_order(current: &LoyaltyState, discount_applied: bool, order_count: i64) -> LoyaltyState {
    if discount_applied {
        return current.clone();
    }
    match milestone_reached(order_count, current.milestone) {
        Some(milestone) => LoyaltyState {
            coupon: Some(COUPON_CODE.to_string()),
            milestone,
        },
        None => current.clone(),
    }
}
