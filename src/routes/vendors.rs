use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::vendors::{VendorDetail, VendorList, VendorListQuery},
    error::AppResult,
    response::ApiResponse,
    routes::params::Pagination,
    services::vendor_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vendors))
        .route("/{id}", get(get_vendor))
}

#[utoipa::path(
    get,
    path = "/api/vendors",
    params(
        ("q" = Option<String>, Query, description = "Search business or display name"),
        ("specialty" = Option<String>, Query, description = "Vendor specialty"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Approved vendors", body = ApiResponse<VendorList>)
    ),
    tag = "Vendors"
)]
pub async fn list_vendors(
    State(state): State<AppState>,
    Query(query): Query<VendorListQuery>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<VendorList>>> {
    Ok(Json(vendor_service::list_vendors(&state, query, pagination).await?))
}

#[utoipa::path(
    get,
    path = "/api/vendors/{id}",
    params(("id" = Uuid, Path, description = "Vendor ID")),
    responses(
        (status = 200, description = "Vendor profile", body = ApiResponse<VendorDetail>),
        (status = 404, description = "Vendor not found")
    ),
    tag = "Vendors"
)]
pub async fn get_vendor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<VendorDetail>>> {
    Ok(Json(vendor_service::get_vendor(&state, id).await?))
}
