use std::collections::HashSet;

use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit,
    domain::{
        BulkAction, OFFICIAL_TAG, OrderStatus, ProductStatus,
        catalog::{normalize_tags, with_official},
    },
    dto::{
        official::{BulkActionRequest, BulkActionResult, OfficialProductQuery, OfficialStats},
        products::{CreateProductRequest, ProductList},
    },
    entity::products::{ActiveModel, Column, Entity as Products},
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    models::{Product, string_list, string_list_json},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::{
        contains_pattern, count_map,
        product_service::{ensure_category, insert_product, official_condition, referenced_product_ids},
    },
    state::AppState,
};

pub async fn list_official_products(
    state: &AppState,
    user: &AuthUser,
    query: OfficialProductQuery,
    pagination: Pagination,
) -> AppResult<ApiResponse<ProductList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = pagination.normalize();

    let mut condition = official_condition(true);
    if let Some(status) = query.status {
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

    let finder = Products::find()
        .filter(condition)
        .order_by_desc(Column::CreatedAt);

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
    Ok(ApiResponse::success("Official products", ProductList { items }, Some(meta)))
}

/// Creates a product owned by the calling admin and tagged into the official line.
pub async fn create_official_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    payload.validate()?;
    ensure_category(state, payload.category_id).await?;

    let tags = with_official(&normalize_tags(&payload.tags), true);
    let product = insert_product(state, user, payload, tags).await?;

    Ok(ApiResponse::success(
        "Official product created",
        Product::from(product),
        Some(Meta::empty()),
    ))
}

pub async fn official_stats(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<OfficialStats>> {
    ensure_admin(user)?;

    let by_status: Vec<(String, i64)> = sqlx::query_as(
        r#"
        SELECT status, COUNT(*)
        FROM products
        WHERE tags @> jsonb_build_array($1::text)
        GROUP BY status
        "#,
    )
    .bind(OFFICIAL_TAG)
    .fetch_all(&state.pool)
    .await?;

    let (total_stock, unlimited_products): (i64, i64) = sqlx::query_as(
        r#"
        SELECT
            COALESCE(SUM(stock) FILTER (WHERE NOT unlimited_stock), 0)::BIGINT,
            COUNT(*) FILTER (WHERE unlimited_stock)
        FROM products
        WHERE tags @> jsonb_build_array($1::text)
        "#,
    )
    .bind(OFFICIAL_TAG)
    .fetch_one(&state.pool)
    .await?;

    let (units_sold, revenue): (i64, i64) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(oi.quantity), 0)::BIGINT, COALESCE(SUM(oi.line_total), 0)::BIGINT
        FROM order_items oi
        JOIN orders o ON o.id = oi.order_id
        JOIN products p ON p.id = oi.product_id
        WHERE o.status <> $1 AND p.tags @> jsonb_build_array($2::text)
        "#,
    )
    .bind(OrderStatus::Cancelled.as_str())
    .bind(OFFICIAL_TAG)
    .fetch_one(&state.pool)
    .await?;

    let data = OfficialStats {
        products_by_status: count_map(by_status),
        total_stock,
        unlimited_products,
        units_sold,
        revenue,
    };
    Ok(ApiResponse::success("Official stats", data, Some(Meta::empty())))
}

/// Applies one action to a batch of products inside a single transaction.
/// Unknown ids and products the action does not apply to end up in `skipped`.
pub async fn bulk_action(
    state: &AppState,
    user: &AuthUser,
    payload: BulkActionRequest,
) -> AppResult<ApiResponse<BulkActionResult>> {
    ensure_admin(user)?;
    payload.validate()?;

    let mut seen = HashSet::new();
    let ids: Vec<Uuid> = payload
        .product_ids
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect();
    let action = payload.action;

    let txn = state.orm.begin().await?;
    let products = Products::find()
        .filter(Column::Id.is_in(ids.clone()))
        .order_by_asc(Column::Id)
        .lock(LockType::Update)
        .all(&txn)
        .await?;

    let mut result = BulkActionResult {
        action: Some(action),
        ..Default::default()
    };
    let mut eligible = Vec::with_capacity(products.len());
    for product in products {
        if action.applies_to(&string_list(product.tags.clone())) {
            eligible.push(product);
        } else {
            result.skipped.push(product.id);
        }
    }
    let found: HashSet<Uuid> = eligible
        .iter()
        .map(|p| p.id)
        .chain(result.skipped.iter().copied())
        .collect();
    result
        .skipped
        .extend(ids.iter().copied().filter(|id| !found.contains(id)));

    let eligible_ids: Vec<Uuid> = eligible.iter().map(|p| p.id).collect();
    let now: DateTimeWithTimeZone = Utc::now().into();

    match action {
        BulkAction::Activate | BulkAction::Deactivate => {
            let status = if action == BulkAction::Activate {
                ProductStatus::Active
            } else {
                ProductStatus::Inactive
            };
            if !eligible_ids.is_empty() {
                let res = Products::update_many()
                    .col_expr(Column::Status, Expr::value(status))
                    .col_expr(Column::UpdatedAt, Expr::value(now))
                    .filter(Column::Id.is_in(eligible_ids.clone()))
                    .exec(&txn)
                    .await?;
                result.updated = res.rows_affected;
            }
        }
        BulkAction::MarkOfficial | BulkAction::UnmarkOfficial => {
            let official = action == BulkAction::MarkOfficial;
            for product in eligible {
                let tags = with_official(&string_list(product.tags.clone()), official);
                let mut active: ActiveModel = product.into();
                active.tags = Set(string_list_json(&tags));
                active.updated_at = Set(now);
                active.update(&txn).await?;
                result.updated += 1;
            }
        }
        BulkAction::Delete => {
            let referenced = referenced_product_ids(&txn, &eligible_ids).await?;
            let (keep, drop): (Vec<Uuid>, Vec<Uuid>) = eligible_ids
                .iter()
                .copied()
                .partition(|id| referenced.contains(id));
            if !keep.is_empty() {
                let res = Products::update_many()
                    .col_expr(Column::Status, Expr::value(ProductStatus::Inactive))
                    .col_expr(Column::UpdatedAt, Expr::value(now))
                    .filter(Column::Id.is_in(keep))
                    .exec(&txn)
                    .await?;
                result.deactivated = res.rows_affected;
            }
            if !drop.is_empty() {
                let res = Products::delete_many()
                    .filter(Column::Id.is_in(drop))
                    .exec(&txn)
                    .await?;
                result.deleted = res.rows_affected;
            }
        }
    }

    txn.commit().await?;

    tracing::info!(
        ?action,
        updated = result.updated,
        deleted = result.deleted,
        deactivated = result.deactivated,
        skipped = result.skipped.len(),
        "official bulk action applied"
    );
    audit::record(
        &state.pool,
        user.user_id,
        "official_bulk",
        "products",
        serde_json::json!({
            "action": action,
            "product_ids": eligible_ids,
            "skipped": result.skipped,
        }),
    )
    .await;

    Ok(ApiResponse::success("Bulk action applied", result, Some(Meta::empty())))
}
