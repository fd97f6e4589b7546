use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::{
        admin::{AdminDashboard, AuditLogList, AuditLogQuery, InventoryAdjustRequest, LowStockQuery},
        categories::CreateCategoryRequest,
        orders::{OrderList, OrderWithItems, UpdateOrderStatusRequest},
        products::ProductList,
        users::{SetActiveRequest, UserList, UserListQuery},
        vendors::VendorList,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Category, Order, Product, User},
    response::ApiResponse,
    routes::params::{OrderListQuery, Pagination},
    services::{admin_service, category_service, order_service, user_service, vendor_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/users", get(list_users))
        .route("/users/{id}/active", patch(set_user_active))
        .route("/vendors/pending", get(list_pending_vendors))
        .route("/vendors/{id}/approve", post(approve_vendor))
        .route("/vendors/{id}/revoke", post(revoke_vendor))
        .route("/categories", post(create_category))
        .route("/orders", get(list_all_orders))
        .route("/orders/{id}", get(get_order_admin))
        .route("/orders/{id}/status", patch(update_order_status))
        .route("/inventory/low-stock", get(list_low_stock))
        .route("/inventory/{id}", patch(adjust_inventory))
        .route("/audit-logs", get(list_audit_logs))
}

#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    responses(
        (status = 200, description = "Marketplace totals", body = ApiResponse<AdminDashboard>),
        (status = 403, description = "Admins only")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<AdminDashboard>>> {
    Ok(Json(admin_service::dashboard(&state, &user).await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(
        ("role" = Option<String>, Query, description = "admin | vendor | buyer"),
        ("q" = Option<String>, Query, description = "Search name or email"),
        ("active" = Option<bool>, Query, description = "Active flag"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Users", body = ApiResponse<UserList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<UserListQuery>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<UserList>>> {
    Ok(Json(
        user_service::list_users(&state, &user, query, pagination).await?,
    ))
}

#[utoipa::path(
    patch,
    path = "/api/admin/users/{id}/active",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = SetActiveRequest,
    responses(
        (status = 200, description = "Account (de)activated", body = ApiResponse<User>),
        (status = 400, description = "Admins cannot deactivate themselves")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn set_user_active(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetActiveRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    Ok(Json(
        user_service::set_user_active(&state, &user, id, payload).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/admin/vendors/pending",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Vendors awaiting approval", body = ApiResponse<VendorList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_pending_vendors(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<VendorList>>> {
    Ok(Json(
        vendor_service::list_pending_vendors(&state, &user, pagination).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/admin/vendors/{id}/approve",
    params(("id" = Uuid, Path, description = "Vendor ID")),
    responses(
        (status = 200, description = "Vendor approved", body = ApiResponse<User>),
        (status = 400, description = "User is not a vendor"),
        (status = 409, description = "Vendor already approved")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn approve_vendor(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<User>>> {
    Ok(Json(vendor_service::approve_vendor(&state, &user, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/vendors/{id}/revoke",
    params(("id" = Uuid, Path, description = "Vendor ID")),
    responses(
        (status = 200, description = "Approval revoked, products deactivated", body = ApiResponse<User>)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn revoke_vendor(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<User>>> {
    Ok(Json(vendor_service::revoke_vendor(&state, &user, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<Category>),
        (status = 409, description = "Slug already taken")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_category(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Category>>)> {
    let resp = category_service::create_category(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc")
    ),
    responses(
        (status = 200, description = "All orders", body = ApiResponse<OrderList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_all_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    Ok(Json(
        admin_service::list_all_orders(&state, &user, query, pagination).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order with every line", body = ApiResponse<OrderWithItems>),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_order_admin(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    Ok(Json(admin_service::get_order_admin(&state, &user, id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/admin/orders/{id}/status",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<Order>),
        (status = 400, description = "Transition not allowed")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    Ok(Json(
        order_service::update_order_status(&state, &user, id, payload).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/admin/inventory/low-stock",
    params(
        ("threshold" = Option<i32>, Query, description = "Stock at or below this value; defaults to LOW_STOCK_THRESHOLD"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Low stock products", body = ApiResponse<ProductList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_low_stock(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<LowStockQuery>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    Ok(Json(
        admin_service::list_low_stock(&state, &user, query, pagination).await?,
    ))
}

#[utoipa::path(
    patch,
    path = "/api/admin/inventory/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = InventoryAdjustRequest,
    responses(
        (status = 200, description = "Stock adjusted", body = ApiResponse<Product>),
        (status = 400, description = "Zero delta, negative result or unlimited stock")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn adjust_inventory(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<InventoryAdjustRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    Ok(Json(
        admin_service::adjust_inventory(&state, &user, id, payload).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/admin/audit-logs",
    params(
        ("action" = Option<String>, Query, description = "Action name"),
        ("user_id" = Option<Uuid>, Query, description = "Acting user"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Audit trail, newest first", body = ApiResponse<AuditLogList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_audit_logs(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<AuditLogQuery>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<AuditLogList>>> {
    Ok(Json(
        admin_service::list_audit_logs(&state, &user, query, pagination).await?,
    ))
}
