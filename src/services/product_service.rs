use std::collections::HashSet;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Expr, SimpleExpr};
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit,
    domain::{
        OFFICIAL_TAG, ProductStatus, Role,
        catalog::{is_official, normalize_tags, with_official},
    },
    dto::products::{
        CreateProductRequest, DeleteOutcome, DeleteProductResponse, ProductList,
        SetProductStatusRequest, UpdateProductRequest,
    },
    entity::{
        categories::Entity as Categories,
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_role},
    models::{Product, string_list, string_list_json},
    response::{ApiResponse, Meta},
    routes::params::{OwnProductQuery, Pagination, ProductQuery, ProductSortBy, SortOrder},
    services::{contains_pattern, user_service::find_user},
    state::AppState,
};

/// Matches products carrying the official storefront tag.
pub(crate) fn official_expr() -> SimpleExpr {
    Expr::cust_with_values("tags @> jsonb_build_array(CAST(? AS TEXT))", [OFFICIAL_TAG])
}

pub(crate) fn official_condition(official: bool) -> Condition {
    let condition = Condition::all().add(official_expr());
    if official { condition } else { condition.not() }
}

/// Product ids among `ids` that appear on at least one order.
pub(crate) async fn referenced_product_ids<C>(db: &C, ids: &[Uuid]) -> AppResult<HashSet<Uuid>>
where
    C: ConnectionTrait,
{
    if ids.is_empty() {
        return Ok(HashSet::new());
    }
    let rows: Vec<Uuid> = OrderItems::find()
        .select_only()
        .column(OrderItemCol::ProductId)
        .distinct()
        .filter(OrderItemCol::ProductId.is_in(ids.to_vec()))
        .into_tuple()
        .all(db)
        .await?;
    Ok(rows.into_iter().collect())
}

/// Admins and approved vendors may list products.
async fn ensure_can_sell(state: &AppState, user: &AuthUser) -> AppResult<()> {
    match user.role {
        Role::Admin => Ok(()),
        Role::Vendor => {
            let vendor = find_user(state, user.user_id).await?;
            if vendor.is_approved_vendor() {
                Ok(())
            } else {
                Err(AppError::Forbidden)
            }
        }
        Role::Buyer => Err(AppError::Forbidden),
    }
}

/// Loads a product the caller may modify: admins any, vendors their own.
async fn load_for_write(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<ProductModel> {
    ensure_can_sell(state, user).await?;
    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    if user.is_admin() || product.vendor_id == user.user_id {
        Ok(product)
    } else {
        Err(AppError::Forbidden)
    }
}

pub(crate) async fn ensure_category(state: &AppState, category_id: Option<Uuid>) -> AppResult<()> {
    if let Some(id) = category_id {
        if Categories::find_by_id(id).one(&state.orm).await?.is_none() {
            return Err(AppError::BadRequest(format!("category {id} does not exist")));
        }
    }
    Ok(())
}

/// Vendors cannot move products in or out of the official line; only admins
/// control that tag.
fn resolve_tags(user: &AuthUser, requested: Vec<String>, currently_official: bool) -> Vec<String> {
    let tags = normalize_tags(requested);
    if user.is_admin() {
        tags
    } else {
        with_official(&tags, currently_official)
    }
}

fn can_see_unpublished(viewer: Option<&AuthUser>, product: &ProductModel) -> bool {
    viewer.is_some_and(|v| v.is_admin() || v.user_id == product.vendor_id)
}

pub async fn list_products(
    state: &AppState,
    viewer: Option<&AuthUser>,
    query: ProductQuery,
    pagination: Pagination,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = pagination.normalize();
    let mut condition = Condition::all();

    let sees_everything = viewer.is_some_and(|v| {
        v.is_admin() || (v.role == Role::Vendor && query.vendor_id == Some(v.user_id))
    });
    let status = if sees_everything {
        query.status
    } else {
        Some(ProductStatus::Active)
    };
    if let Some(status) = status {
        condition = condition.add(Column::Status.eq(status));
    }

    if let Some(search) = query.q.as_ref().filter(|s| !s.trim().is_empty()) {
        let pattern = contains_pattern(search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Title).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern)),
        );
    }
    if let Some(category_id) = query.category_id {
        condition = condition.add(Column::CategoryId.eq(category_id));
    }
    if let Some(vendor_id) = query.vendor_id {
        condition = condition.add(Column::VendorId.eq(vendor_id));
    }
    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }
    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }
    if let Some(official) = query.official {
        condition = condition.add(official_condition(official));
    }

    let sort_col = match query.sort_by.unwrap_or(ProductSortBy::CreatedAt) {
        ProductSortBy::CreatedAt => Column::CreatedAt,
        ProductSortBy::Price => Column::Price,
        ProductSortBy::Title => Column::Title,
    };
    let mut finder = Products::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

pub async fn get_product(
    state: &AppState,
    viewer: Option<&AuthUser>,
    id: Uuid,
) -> AppResult<ApiResponse<Product>> {
    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    if product.status != ProductStatus::Active && !can_see_unpublished(viewer, &product) {
        return Err(AppError::NotFound);
    }
    Ok(ApiResponse::success("Product", Product::from(product), None))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    payload.validate()?;
    ensure_can_sell(state, user).await?;
    ensure_category(state, payload.category_id).await?;

    let tags = resolve_tags(user, payload.tags.clone(), false);
    let product = insert_product(state, user, payload, tags).await?;

    Ok(ApiResponse::success(
        "Product created",
        Product::from(product),
        Some(Meta::empty()),
    ))
}

/// Inserts a product owned by `owner` with already-resolved tags.
pub(crate) async fn insert_product(
    state: &AppState,
    owner: &AuthUser,
    payload: CreateProductRequest,
    tags: Vec<String>,
) -> AppResult<ProductModel> {
    let unlimited_stock = payload.unlimited_stock;
    let product = ActiveModel {
        id: Set(Uuid::new_v4()),
        vendor_id: Set(owner.user_id),
        category_id: Set(payload.category_id),
        title: Set(payload.title.trim().to_string()),
        description: Set(payload.description),
        price: Set(payload.price),
        images: Set(string_list_json(&payload.images)),
        stock: Set(if unlimited_stock { 0 } else { payload.stock }),
        unlimited_stock: Set(unlimited_stock),
        status: Set(payload.status.unwrap_or(ProductStatus::Active)),
        tags: Set(string_list_json(&tags)),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(product_id = %product.id, official = is_official(&tags), "product created");
    audit::record(
        &state.pool,
        owner.user_id,
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;
    Ok(product)
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    payload.validate()?;
    let existing = load_for_write(state, user, id).await?;
    ensure_category(state, payload.category_id).await?;
    let currently_official = is_official(&string_list(existing.tags.clone()));

    let mut active: ActiveModel = existing.into();
    if let Some(title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(category_id) = payload.category_id {
        active.category_id = Set(Some(category_id));
    }
    if let Some(images) = payload.images {
        active.images = Set(string_list_json(&images));
    }
    if let Some(stock) = payload.stock {
        active.stock = Set(stock);
    }
    if let Some(unlimited) = payload.unlimited_stock {
        active.unlimited_stock = Set(unlimited);
    }
    if let Some(tags) = payload.tags {
        active.tags = Set(string_list_json(&resolve_tags(user, tags, currently_official)));
    }
    active.updated_at = Set(Utc::now().into());

    let product = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        Product::from(product),
        Some(Meta::empty()),
    ))
}

pub async fn set_product_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: SetProductStatusRequest,
) -> AppResult<ApiResponse<Product>> {
    let existing = load_for_write(state, user, id).await?;
    if existing.status == payload.status {
        return Ok(ApiResponse::success(
            "Unchanged",
            Product::from(existing),
            Some(Meta::empty()),
        ));
    }

    let mut active: ActiveModel = existing.into();
    active.status = Set(payload.status);
    active.updated_at = Set(Utc::now().into());
    let product = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "product_status",
        "products",
        serde_json::json!({ "product_id": product.id, "status": product.status }),
    )
    .await;

    Ok(ApiResponse::success(
        "Status updated",
        Product::from(product),
        Some(Meta::empty()),
    ))
}

/// Products that appear on orders are kept for history and only deactivated.
pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<DeleteProductResponse>> {
    let existing = load_for_write(state, user, id).await?;
    let referenced = referenced_product_ids(&state.orm, &[id]).await?;

    let outcome = if referenced.contains(&id) {
        let mut active: ActiveModel = existing.into();
        active.status = Set(ProductStatus::Inactive);
        active.updated_at = Set(Utc::now().into());
        active.update(&state.orm).await?;
        DeleteOutcome::Deactivated
    } else {
        let result = Products::delete_by_id(id).exec(&state.orm).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        DeleteOutcome::Deleted
    };

    audit::record(
        &state.pool,
        user.user_id,
        "product_delete",
        "products",
        serde_json::json!({ "product_id": id, "outcome": outcome }),
    )
    .await;

    let message = match outcome {
        DeleteOutcome::Deactivated => "Product has orders; deactivated instead",
        DeleteOutcome::Deleted => "Deleted",
    };
    Ok(ApiResponse::success(
        message,
        DeleteProductResponse { id, outcome },
        Some(Meta::empty()),
    ))
}

pub async fn list_my_products(
    state: &AppState,
    user: &AuthUser,
    query: OwnProductQuery,
    pagination: Pagination,
) -> AppResult<ApiResponse<ProductList>> {
    ensure_role(user, Role::Vendor)?;
    let (page, limit, offset) = pagination.normalize();

    let mut finder = Products::find().filter(Column::VendorId.eq(user.user_id));
    if let Some(status) = query.status {
        finder = finder.filter(Column::Status.eq(status));
    }
    let finder = finder.order_by_desc(Column::UpdatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    Ok(ApiResponse::success(
        "My products",
        ProductList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            role,
        }
    }

    #[test]
    fn vendors_cannot_add_official_tag() {
        let vendor = user(Role::Vendor);
        let tags = resolve_tags(&vendor, vec!["Handmade".into(), OFFICIAL_TAG.into()], false);
        assert_eq!(tags, vec!["handmade".to_string()]);
    }

    #[test]
    fn vendors_keep_existing_official_tag() {
        let vendor = user(Role::Vendor);
        let tags = resolve_tags(&vendor, vec!["rugs".into()], true);
        assert_eq!(tags, vec!["rugs".to_string(), OFFICIAL_TAG.to_string()]);
    }

    #[test]
    fn admins_control_official_tag() {
        let admin = user(Role::Admin);
        let tags = resolve_tags(&admin, vec![OFFICIAL_TAG.to_uppercase()], false);
        assert_eq!(tags, vec![OFFICIAL_TAG.to_string()]);
    }
}
