use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
};
use uuid::Uuid;

use crate::{
    dto::products::{
        CreateProductRequest, DeleteProductResponse, ProductList, SetProductStatusRequest,
        UpdateProductRequest,
    },
    error::AppResult,
    middleware::auth::{AuthUser, MaybeAuthUser},
    models::Product,
    response::ApiResponse,
    routes::params::{Pagination, ProductQuery},
    services::product_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/{id}/status", patch(set_product_status))
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(
        ("q" = Option<String>, Query, description = "Search title and description"),
        ("category_id" = Option<Uuid>, Query, description = "Category filter"),
        ("vendor_id" = Option<Uuid>, Query, description = "Vendor filter"),
        ("min_price" = Option<i64>, Query, description = "Minimum price, minor units"),
        ("max_price" = Option<i64>, Query, description = "Maximum price, minor units"),
        ("official" = Option<bool>, Query, description = "Only (or never) official products"),
        ("status" = Option<String>, Query, description = "Status; honoured for admins and owners only"),
        ("sort_by" = Option<String>, Query, description = "created_at | price | title"),
        ("sort_order" = Option<String>, Query, description = "asc | desc"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "List products", body = ApiResponse<ProductList>)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Query(query): Query<ProductQuery>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::list_products(&state, viewer.as_ref(), query, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Get product", body = ApiResponse<Product>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Product>>> {
    Ok(Json(product_service::get_product(&state, viewer.as_ref(), id).await?))
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Create product", body = ApiResponse<Product>),
        (status = 403, description = "Not an approved vendor or admin")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Product>>)> {
    let resp = product_service::create_product(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Updated product", body = ApiResponse<Product>)
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    Ok(Json(product_service::update_product(&state, &user, id, payload).await?))
}

#[utoipa::path(
    patch,
    path = "/api/products/{id}/status",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = SetProductStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<Product>)
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn set_product_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetProductStatusRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    Ok(Json(
        product_service::set_product_status(&state, &user, id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Deleted, or deactivated when orders reference it", body = ApiResponse<DeleteProductResponse>),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<DeleteProductResponse>>> {
    Ok(Json(product_service::delete_product(&state, &user, id).await?))
}
