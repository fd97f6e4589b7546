use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    domain::{Earnings, OrderStatus},
    models::User,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct VendorListQuery {
    pub q: Option<String>,
    pub specialty: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VendorList {
    pub items: Vec<User>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VendorDetail {
    pub vendor: User,
    pub active_products: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VendorOrderQuery {
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VendorDashboard {
    pub products_by_status: BTreeMap<String, i64>,
    pub orders: i64,
    pub units_sold: i64,
    pub earnings: Earnings,
    pub commission_rate_bps: i64,
}
