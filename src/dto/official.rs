use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::domain::{BulkAction, ProductStatus};

#[derive(Debug, Deserialize, ToSchema)]
pub struct OfficialProductQuery {
    pub status: Option<ProductStatus>,
    pub q: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct BulkActionRequest {
    #[validate(length(min = 1, max = 100, message = "select 1 to 100 products"))]
    pub product_ids: Vec<Uuid>,
    pub action: BulkAction,
}

#[derive(Debug, Default, Serialize, ToSchema)]
pub struct BulkActionResult {
    pub action: Option<BulkAction>,
    pub updated: u64,
    pub deleted: u64,
    pub deactivated: u64,
    pub skipped: Vec<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OfficialStats {
    pub products_by_status: BTreeMap<String, i64>,
    pub total_stock: i64,
    pub unlimited_products: i64,
    pub units_sold: i64,
    pub revenue: i64,
}
