use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{OrderStatus, ProductStatus};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1).saturating_mul(per_page);
        (page, per_page, offset)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductSortBy {
    CreatedAt,
    Price,
    Title,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ProductQuery {
    pub q: Option<String>,
    pub category_id: Option<Uuid>,
    pub vendor_id: Option<Uuid>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub official: Option<bool>,
    pub status: Option<ProductStatus>,
    pub sort_by: Option<ProductSortBy>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct OwnProductQuery {
    pub status: Option<ProductStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page_of_twenty() {
        assert_eq!(Pagination::default().normalize(), (1, 20, 0));
    }

    #[test]
    fn clamps_out_of_range_values() {
        let p = Pagination {
            page: Some(-3),
            per_page: Some(1000),
        };
        assert_eq!(p.normalize(), (1, 100, 0));

        let p = Pagination {
            page: Some(3),
            per_page: Some(0),
        };
        assert_eq!(p.normalize(), (3, 1, 2));
    }

    #[test]
    fn offset_follows_page() {
        let p = Pagination {
            page: Some(4),
            per_page: Some(25),
        };
        assert_eq!(p.normalize(), (4, 25, 75));
    }
}
