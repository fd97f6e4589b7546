use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{domain::ProductStatus, models::Product};

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 2, max = 200, message = "title must be 2 to 200 characters"))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(range(min = 0, max = 100_000_000_000i64, message = "price must be 0 to 100000000000"))]
    pub price: i64,
    pub category_id: Option<Uuid>,
    #[validate(length(max = 10, message = "at most 10 images"))]
    #[serde(default)]
    pub images: Vec<String>,
    #[validate(range(min = 0, message = "stock must not be negative"))]
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub unlimited_stock: bool,
    pub status: Option<ProductStatus>,
    #[validate(length(max = 20, message = "at most 20 tags"))]
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 2, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(range(min = 0, max = 100_000_000_000i64))]
    pub price: Option<i64>,
    pub category_id: Option<Uuid>,
    #[validate(length(max = 10))]
    pub images: Option<Vec<String>>,
    #[validate(range(min = 0))]
    pub stock: Option<i32>,
    pub unlimited_stock: Option<bool>,
    #[validate(length(max = 20))]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetProductStatusRequest {
    pub status: ProductStatus,
}

#[derive(Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<Product>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    /// Referenced by orders; kept and switched to inactive.
    Deactivated,
    Deleted,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteProductResponse {
    pub id: Uuid,
    pub outcome: DeleteOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(price: i64) -> CreateProductRequest {
        CreateProductRequest {
            title: "Walnut bowl".into(),
            description: None,
            price,
            category_id: None,
            images: vec![],
            stock: 1,
            unlimited_stock: false,
            status: None,
            tags: vec![],
        }
    }

    #[test]
    fn price_is_bounded() {
        assert!(create(2500).validate().is_ok());
        assert!(create(-1).validate().is_err());
        let err = create(9_000_000_000_000_000_000).validate().unwrap_err();
        assert!(err.field_errors().contains_key("price"));
    }

    #[test]
    fn update_price_is_bounded() {
        let update = UpdateProductRequest {
            title: None,
            description: None,
            price: Some(i64::MAX),
            category_id: None,
            images: None,
            stock: None,
            unlimited_stock: None,
            tags: None,
        };
        assert!(update.validate().is_err());
    }
}
