//! Server-side pricing for checkout. Client-supplied prices and totals are
//! never trusted; everything here works from catalogue rows.

use std::collections::HashMap;

use rand::{Rng, distributions::Alphanumeric};

use crate::{
    error::{AppError, AppResult},
    loyalty,
    models::{OrderLine, Product},
};

pub const ORDER_ID_PREFIX: &str = "ORD-";
const ORDER_ID_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq)]
pub struct PricedOrder {
    pub lines: Vec<OrderLine>,
    pub subtotal: i64,
    pub discount: i64,
    pub total: i64,
}

impl PricedOrder {
    pub fn discount_applied(&self) -> bool {
        self.discount > 0
    }
}

/// `ORD-` followed by six uppercase alphanumerics.
pub fn new_order_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ORDER_ID_LEN)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect();
    format!("{ORDER_ID_PREFIX}{suffix}")
}

pub fn receipt_for(now_millis: i64) -> String {
    format!("receipt_{now_millis}")
}

/// Render paise as rupees, e.g. `₹1234.50`.
pub fn format_rupees(paise: i64) -> String {
    let sign = if paise < 0 { "-" } else { "" };
    let abs = paise.unsigned_abs();
    format!("{sign}₹{}.{:02}", abs / 100, abs % 100)
}

/// Collapse repeated product ids, preserving first-seen order.
pub fn merge_quantities<'a, I>(items: I) -> Vec<(String, i32)>
where
    I: IntoIterator<Item = (&'a str, i32)>,
{
    let mut merged: Vec<(String, i32)> = Vec::new();
    for (product_id, quantity) in items {
        match merged.iter_mut().find(|(id, _)| id == product_id) {
            Some((_, total)) => *total = total.saturating_add(quantity),
            None => merged.push((product_id.to_string(), quantity)),
        }
    }
    merged
}

/// Price the requested quantities against the catalogue.
pub fn price_order(
    requested: &[(String, i32)],
    catalog: &HashMap<String, Product>,
    coupon_active: bool,
) -> AppResult<PricedOrder> {
    if requested.is_empty() {
        return Err(AppError::BadRequest("Order has no items".into()));
    }

    let mut lines = Vec::with_capacity(requested.len());
    let mut subtotal: i64 = 0;
    for (product_id, quantity) in requested {
        if *quantity <= 0 {
            return Err(AppError::BadRequest(format!(
                "Invalid quantity for product {product_id}"
            )));
        }
        let product = catalog
            .get(product_id)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown product {product_id}")))?;
        if !product.is_active() {
            return Err(AppError::BadRequest(format!(
                "Product {product_id} is not available"
            )));
        }
        subtotal += product.price * i64::from(*quantity);
        lines.push(OrderLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            quantity: *quantity,
            price: product.price,
            image: product.image.clone(),
        });
    }

    let discount = loyalty::discount_for(subtotal, coupon_active);
    Ok(PricedOrder {
        lines,
        subtotal,
        discount,
        total: subtotal - discount,
    })
}

/// Reject the order if any line asks for more than is on hand.
pub fn ensure_in_stock(lines: &[OrderLine], catalog: &HashMap<String, Product>) -> AppResult<()> {
    for line in lines {
        let on_hand = catalog.get(&line.product_id).map(|p| p.stock).unwrap_or(0);
        if on_hand < line.quantity {
            return Err(AppError::InsufficientStock(line.product_id.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(id: &str, price: i64, stock: i32, status: &str) -> Product {
        Product {
            id: id.into(),
            name: format!("{id} name"),
            category: "human-nutrition".into(),
            price,
            stock,
            expiry_date: None,
            image: None,
            description: None,
            rating: 5.0,
            added_by: "admin".into(),
            status: status.into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn catalog() -> HashMap<String, Product> {
        [
            product("spirulina", 49_900, 10, "active"),
            product("moringa", 19_900, 1, "active"),
            product("retired", 1_000, 5, "inactive"),
        ]
        .into_iter()
        .map(|p| (p.id.clone(), p))
        .collect()
    }

    #[test]
    fn order_id_has_expected_shape() {
        let id = new_order_id();
        assert!(id.starts_with(ORDER_ID_PREFIX));
        let suffix = &id[ORDER_ID_PREFIX.len()..];
        assert_eq!(suffix.len(), 6);
        assert!(suffix.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn merges_duplicate_lines() {
        let merged = merge_quantities([("a", 1), ("b", 2), ("a", 3)]);
        assert_eq!(merged, vec![("a".to_string(), 4), ("b".to_string(), 2)]);
    }

    #[test]
    fn prices_from_catalog() {
        let priced = price_order(
            &[("spirulina".into(), 2), ("moringa".into(), 1)],
            &catalog(),
            false,
        )
        .unwrap();
        assert_eq!(priced.subtotal, 2 * 49_900 + 19_900);
        assert_eq!(priced.discount, 0);
        assert_eq!(priced.total, priced.subtotal);
        assert_eq!(priced.lines[0].name, "spirulina name");
    }

    #[test]
    fn applies_loyalty_discount() {
        let priced = price_order(&[("spirulina".into(), 2)], &catalog(), true).unwrap();
        assert_eq!(priced.subtotal, 99_800);
        assert_eq!(priced.discount, 14_970);
        assert_eq!(priced.total, 84_830);
        assert!(priced.discount_applied());
    }

    #[test]
    fn rejects_unknown_inactive_and_empty() {
        let catalog = catalog();
        assert!(matches!(
            price_order(&[("ghost".into(), 1)], &catalog, false),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            price_order(&[("retired".into(), 1)], &catalog, false),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            price_order(&[("spirulina".into(), 0)], &catalog, false),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(price_order(&[], &catalog, false), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn detects_insufficient_stock() {
        let catalog = catalog();
        let priced = price_order(&[("moringa".into(), 2)], &catalog, false).unwrap();
        match ensure_in_stock(&priced.lines, &catalog) {
            Err(AppError::InsufficientStock(id)) => assert_eq!(id, "moringa"),
            other => panic!("expected insufficient stock, got {other:?}"),
        }
        let priced = price_order(&[("moringa".into(), 1)], &catalog, false).unwrap();
        assert!(ensure_in_stock(&priced.lines, &catalog).is_ok());
    }

    #[test]
    fn formats_rupees() {
        assert_eq!(format_rupees(84_830), "₹848.30");
        assert_eq!(format_rupees(5), "₹0.05");
        assert_eq!(format_rupees(-1_000), "-₹10.00");
    }

    #[test]
    fn receipt_uses_millis() {
        assert_eq!(receipt_for(1_700_000_000_123), "receipt_1700000000123");
    }
}
