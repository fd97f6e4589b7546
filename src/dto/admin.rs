use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::Earnings,
    models::AuditLog,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct LowStockQuery {
    pub threshold: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct InventoryAdjustRequest {
    #[validate(range(min = -1_000_000, max = 1_000_000))]
    pub delta: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminDashboard {
    pub users_by_role: BTreeMap<String, i64>,
    pub pending_vendors: i64,
    pub products_by_status: BTreeMap<String, i64>,
    pub orders_by_status: BTreeMap<String, i64>,
    pub revenue: Earnings,
    pub commission_rate_bps: i64,
    pub official_products: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AuditLogQuery {
    pub action: Option<String>,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuditLogList {
    pub items: Vec<AuditLog>,
}
