use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::OrderStatus,
    models::{Order, OrderItem},
};

#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
pub struct OrderLineRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1, max = 1000, message = "quantity must be 1 to 1000"))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, max = 50, message = "an order has 1 to 50 lines"), nested)]
    pub items: Vec<OrderLineRequest>,
    #[validate(length(min = 5, max = 500, message = "shipping address must be 5 to 500 characters"))]
    pub shipping_address: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(items: Vec<OrderLineRequest>) -> CreateOrderRequest {
        CreateOrderRequest {
            items,
            shipping_address: "12 Market Street".into(),
        }
    }

    #[test]
    fn empty_order_is_rejected() {
        let err = request(vec![]).validate().unwrap_err();
        assert!(err.field_errors().contains_key("items"));
    }

    #[test]
    fn nested_line_quantity_is_checked() {
        let bad = request(vec![OrderLineRequest {
            product_id: Uuid::new_v4(),
            quantity: 0,
        }]);
        assert!(bad.validate().is_err());

        let good = request(vec![OrderLineRequest {
            product_id: Uuid::new_v4(),
            quantity: 3,
        }]);
        assert!(good.validate().is_ok());
    }
}
