use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit,
    domain::{Earnings, OFFICIAL_TAG, OrderStatus, Role},
    dto::{
        admin::{AdminDashboard, AuditLogList, AuditLogQuery, InventoryAdjustRequest, LowStockQuery},
        orders::{OrderList, OrderWithItems},
        products::ProductList,
    },
    entity::{
        audit_logs::{Column as AuditCol, Entity as AuditLogs},
        orders::{Column as OrderCol, Entity as Orders},
        products::{ActiveModel as ProductActive, Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{AuditLog, Order, Product},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, Pagination, SortOrder},
    services::{count_map, order_service::load_items},
    state::AppState,
};

pub async fn dashboard(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<AdminDashboard>> {
    ensure_admin(user)?;

    let users_by_role: Vec<(String, i64)> =
        sqlx::query_as("SELECT role, COUNT(*) FROM users GROUP BY role")
            .fetch_all(&state.pool)
            .await?;

    let (pending_vendors,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM users WHERE role = $1 AND NOT vendor_approved AND is_active",
    )
    .bind(Role::Vendor.as_str())
    .fetch_one(&state.pool)
    .await?;

    let products_by_status: Vec<(String, i64)> =
        sqlx::query_as("SELECT status, COUNT(*) FROM products GROUP BY status")
            .fetch_all(&state.pool)
            .await?;

    let orders_by_status: Vec<(String, i64)> =
        sqlx::query_as("SELECT status, COUNT(*) FROM orders GROUP BY status")
            .fetch_all(&state.pool)
            .await?;

    let (gross,): (i64,) = sqlx::query_as(
        "SELECT COALESCE(SUM(total), 0)::BIGINT FROM orders WHERE status <> $1",
    )
    .bind(OrderStatus::Cancelled.as_str())
    .fetch_one(&state.pool)
    .await?;

    let (official_products,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM products WHERE tags @> jsonb_build_array($1::text)",
    )
    .bind(OFFICIAL_TAG)
    .fetch_one(&state.pool)
    .await?;

    let rate = state.config.commission_rate_bps;
    let data = AdminDashboard {
        users_by_role: count_map(users_by_role),
        pending_vendors,
        products_by_status: count_map(products_by_status),
        orders_by_status: count_map(orders_by_status),
        revenue: Earnings::from_gross(gross, rate),
        commission_rate_bps: rate,
        official_products,
    };
    Ok(ApiResponse::success("Dashboard", data, Some(Meta::empty())))
}

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
    pagination: Pagination,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = pagination.normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status));
    }

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;
    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Orders", OrderList { items: orders }, Some(meta)))
}

pub async fn get_order_admin(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_admin(user)?;
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let items = load_items(&state.orm, order.id, None).await?;
    let data = OrderWithItems {
        order: Order::from(order),
        items,
    };
    Ok(ApiResponse::success("Order found", data, Some(Meta::empty())))
}

pub async fn list_low_stock(
    state: &AppState,
    user: &AuthUser,
    query: LowStockQuery,
    pagination: Pagination,
) -> AppResult<ApiResponse<ProductList>> {
    ensure_admin(user)?;
    let threshold = query
        .threshold
        .unwrap_or(state.config.low_stock_threshold)
        .max(0);
    let (page, limit, offset) = pagination.normalize();

    let finder = Products::find()
        .filter(ProdCol::UnlimitedStock.eq(false))
        .filter(ProdCol::Stock.lte(threshold))
        .order_by_asc(ProdCol::Stock)
        .order_by_desc(ProdCol::CreatedAt);

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
    Ok(ApiResponse::success("Low stock", ProductList { items }, Some(meta)))
}

pub async fn adjust_inventory(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: InventoryAdjustRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    payload.validate()?;
    if payload.delta == 0 {
        return Err(AppError::BadRequest("delta must not be 0".into()));
    }

    let txn = state.orm.begin().await?;
    let product = Products::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    if product.unlimited_stock {
        return Err(AppError::BadRequest(
            "product has unlimited stock".into(),
        ));
    }
    let new_stock = product
        .stock
        .checked_add(payload.delta)
        .filter(|s| *s >= 0)
        .ok_or_else(|| AppError::BadRequest("stock cannot be negative".into()))?;

    let mut active: ProductActive = product.into();
    active.stock = Set(new_stock);
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&txn).await?;

    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "inventory_adjust",
        "products",
        serde_json::json!({ "product_id": updated.id, "delta": payload.delta }),
    )
    .await;

    Ok(ApiResponse::success(
        "Inventory updated",
        Product::from(updated),
        Some(Meta::empty()),
    ))
}

pub async fn list_audit_logs(
    state: &AppState,
    user: &AuthUser,
    query: AuditLogQuery,
    pagination: Pagination,
) -> AppResult<ApiResponse<AuditLogList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = pagination.normalize();

    let mut finder = AuditLogs::find();
    if let Some(action) = query.action.filter(|a| !a.is_empty()) {
        finder = finder.filter(AuditCol::Action.eq(action));
    }
    if let Some(user_id) = query.user_id {
        finder = finder.filter(AuditCol::UserId.eq(user_id));
    }
    let finder = finder.order_by_desc(AuditCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(AuditLog::from)
        .collect();

    Ok(ApiResponse::success(
        "Audit logs",
        AuditLogList { items },
        Some(Meta::new(page, limit, total)),
    ))
}
