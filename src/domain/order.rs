use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// Lifecycle of an order.
///
/// ```text
/// pending -> confirmed -> shipped -> delivered
///    \           \
///     `-----------`--> cancelled
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "shipped")]
    Shipped,
    #[sea_orm(string_value = "delivered")]
    Delivered,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Confirmed, Shipped)
                | (Shipped, Delivered)
                | (Pending, Cancelled)
                | (Confirmed, Cancelled)
        )
    }

    pub fn ensure_transition(&self, next: OrderStatus) -> AppResult<()> {
        if self.can_transition_to(next) {
            return Ok(());
        }
        Err(AppError::BadRequest(format!(
            "cannot move order from {} to {}",
            self.as_str(),
            next.as_str()
        )))
    }

    /// Buyers may withdraw an order until it leaves the warehouse.
    pub fn is_cancellable(&self) -> bool {
        self.can_transition_to(OrderStatus::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A requested line after duplicate products have been folded together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLine {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// Folds repeated products into one line, keeping the order in which each
/// product first appeared.
pub fn merge_lines<I>(lines: I) -> AppResult<Vec<OrderLine>>
where
    I: IntoIterator<Item = (Uuid, i32)>,
{
    let mut merged: Vec<OrderLine> = Vec::new();
    for (product_id, quantity) in lines {
        if quantity <= 0 {
            return Err(AppError::BadRequest(format!(
                "quantity for product {product_id} must be at least 1"
            )));
        }
        match merged.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => {
                line.quantity = line.quantity.checked_add(quantity).ok_or_else(|| {
                    AppError::BadRequest(format!("quantity for product {product_id} is too large"))
                })?;
            }
            None => merged.push(OrderLine {
                product_id,
                quantity,
            }),
        }
    }
    if merged.is_empty() {
        return Err(AppError::BadRequest("order has no items".into()));
    }
    Ok(merged)
}

pub fn build_order_number(order_id: Uuid, now: DateTime<Utc>) -> String {
    let date = now.format("%Y%m%d");
    let suffix = format!("{}", order_id.simple()).to_uppercase();
    format!("BZR-{}-{}", date, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn forward_path_is_linear() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Confirmed));
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::Shipped));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Delivered));

        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Shipped));
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Confirmed));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn cancel_only_before_shipping() {
        assert!(OrderStatus::Pending.is_cancellable());
        assert!(OrderStatus::Confirmed.is_cancellable());
        assert!(!OrderStatus::Shipped.is_cancellable());
        assert!(!OrderStatus::Cancelled.is_cancellable());
    }

    #[test]
    fn terminal_states_go_nowhere() {
        for next in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert!(!OrderStatus::Delivered.can_transition_to(next));
            assert!(!OrderStatus::Cancelled.can_transition_to(next));
        }
        assert!(OrderStatus::Delivered.is_terminal());
    }

    #[test]
    fn ensure_transition_names_both_states() {
        let err = OrderStatus::Delivered
            .ensure_transition(OrderStatus::Pending)
            .unwrap_err();
        assert!(err.to_string().contains("delivered"));
        assert!(err.to_string().contains("pending"));
    }

    #[test]
    fn merge_folds_duplicates_in_first_seen_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let merged = merge_lines([(a, 1), (b, 2), (a, 3)]).unwrap();
        assert_eq!(
            merged,
            vec![
                OrderLine { product_id: a, quantity: 4 },
                OrderLine { product_id: b, quantity: 2 },
            ]
        );
    }

    #[test]
    fn merge_rejects_empty_and_non_positive() {
        assert!(merge_lines(Vec::<(Uuid, i32)>::new()).is_err());
        assert!(merge_lines([(Uuid::new_v4(), 0)]).is_err());
        assert!(merge_lines([(Uuid::new_v4(), -2)]).is_err());
    }

    #[test]
    fn merge_rejects_overflow() {
        let a = Uuid::new_v4();
        assert!(merge_lines([(a, i32::MAX), (a, 1)]).is_err());
    }

    #[test]
    fn order_number_carries_date_and_full_id() {
        let id = Uuid::parse_str("a1b2c3d4-0000-4000-8000-000000000000").unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
        assert_eq!(
            build_order_number(id, now),
            "BZR-20240309-A1B2C3D4000040008000000000000000"
        );

        let sibling = Uuid::parse_str("a1b2c3d4-0000-4000-8000-000000000001").unwrap();
        assert_ne!(build_order_number(id, now), build_order_number(sibling, now));
    }
}
