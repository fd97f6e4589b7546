use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::{
        orders::OrderList,
        products::ProductList,
        vendors::{VendorDashboard, VendorOrderQuery},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::{OwnProductQuery, Pagination},
    services::{product_service, vendor_service},
    state::AppState,
};

/// Endpoints scoped to the calling vendor.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/orders", get(list_orders))
        .route("/products", get(list_products))
}

#[utoipa::path(
    get,
    path = "/api/vendor/dashboard",
    responses(
        (status = 200, description = "Vendor sales summary", body = ApiResponse<VendorDashboard>),
        (status = 403, description = "Not a vendor")
    ),
    security(("bearer_auth" = [])),
    tag = "Vendor"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<VendorDashboard>>> {
    Ok(Json(vendor_service::dashboard(&state, &user).await?))
}

#[utoipa::path(
    get,
    path = "/api/vendor/orders",
    params(
        ("status" = Option<String>, Query, description = "Order status"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Orders containing the vendor's items", body = ApiResponse<OrderList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Vendor"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<VendorOrderQuery>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    Ok(Json(
        vendor_service::list_vendor_orders(&state, &user, query, pagination).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/vendor/products",
    params(
        ("status" = Option<String>, Query, description = "Product status"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "The vendor's own products", body = ApiResponse<ProductList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Vendor"
)]
pub async fn list_products(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OwnProductQuery>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    Ok(Json(
        product_service::list_my_products(&state, &user, query, pagination).await?,
    ))
}
