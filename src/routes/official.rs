use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
};

use crate::{
    dto::{
        official::{BulkActionRequest, BulkActionResult, OfficialProductQuery, OfficialStats},
        products::{CreateProductRequest, ProductList},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Product,
    response::ApiResponse,
    routes::params::Pagination,
    services::official_service,
    state::AppState,
};

/// Mounted under `/admin/official`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/stats", get(stats))
        .route("/bulk", post(bulk_action))
}

#[utoipa::path(
    get,
    path = "/api/admin/official/products",
    params(
        ("status" = Option<String>, Query, description = "Product status"),
        ("q" = Option<String>, Query, description = "Search title and description"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Official products", body = ApiResponse<ProductList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Official"
)]
pub async fn list_products(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OfficialProductQuery>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    Ok(Json(
        official_service::list_official_products(&state, &user, query, pagination).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/admin/official/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Official product created", body = ApiResponse<Product>)
    ),
    security(("bearer_auth" = [])),
    tag = "Official"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Product>>)> {
    let resp = official_service::create_official_product(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/admin/official/stats",
    responses(
        (status = 200, description = "Official line statistics", body = ApiResponse<OfficialStats>)
    ),
    security(("bearer_auth" = [])),
    tag = "Official"
)]
pub async fn stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<OfficialStats>>> {
    Ok(Json(official_service::official_stats(&state, &user).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/official/bulk",
    request_body = BulkActionRequest,
    responses(
        (status = 200, description = "Batch applied", body = ApiResponse<BulkActionResult>),
        (status = 422, description = "Empty or oversized batch")
    ),
    security(("bearer_auth" = [])),
    tag = "Official"
)]
pub async fn bulk_action(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<BulkActionRequest>,
) -> AppResult<Json<ApiResponse<BulkActionResult>>> {
    Ok(Json(official_service::bulk_action(&state, &user, payload).await?))
}
