use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Expr, Query};
use uuid::Uuid;

use crate::{
    audit,
    domain::{Earnings, OrderStatus, ProductStatus, Role},
    dto::{
        orders::OrderList,
        vendors::{VendorDashboard, VendorDetail, VendorList, VendorListQuery, VendorOrderQuery},
    },
    entity::{
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        orders::{Column as OrderCol, Entity as Orders},
        products::{Column as ProdCol, Entity as Products},
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin, ensure_role},
    models::{Order, User},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::{contains_pattern, count_map, user_service::find_user},
    state::AppState,
};

pub async fn list_vendors(
    state: &AppState,
    query: VendorListQuery,
    pagination: Pagination,
) -> AppResult<ApiResponse<VendorList>> {
    let (page, limit, offset) = pagination.normalize();
    let mut condition = Condition::all()
        .add(UserCol::Role.eq(Role::Vendor))
        .add(UserCol::VendorApproved.eq(true))
        .add(UserCol::IsActive.eq(true));

    if let Some(search) = query.q.as_ref().filter(|s| !s.trim().is_empty()) {
        let pattern = contains_pattern(search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(UserCol::BusinessName).ilike(pattern.clone()))
                .add(Expr::col(UserCol::BusinessDescription).ilike(pattern)),
        );
    }
    if let Some(specialty) = query.specialty.as_ref().filter(|s| !s.trim().is_empty()) {
        condition = condition.add(Expr::cust_with_values(
            "vendor_specialties @> jsonb_build_array(CAST(? AS TEXT))",
            [specialty.trim().to_lowercase()],
        ));
    }

    let finder = Users::find()
        .filter(condition)
        .order_by_asc(UserCol::BusinessName);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(User::from)
        .collect();

    Ok(ApiResponse::success(
        "Vendors",
        VendorList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_vendor(state: &AppState, id: Uuid) -> AppResult<ApiResponse<VendorDetail>> {
    let vendor = find_user(state, id).await?;
    if !vendor.is_approved_vendor() {
        return Err(AppError::NotFound);
    }

    let active_products = Products::find()
        .filter(ProdCol::VendorId.eq(id))
        .filter(ProdCol::Status.eq(ProductStatus::Active))
        .count(&state.orm)
        .await? as i64;

    Ok(ApiResponse::success(
        "Vendor",
        VendorDetail {
            vendor: User::from(vendor),
            active_products,
        },
        None,
    ))
}

pub async fn list_pending_vendors(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<VendorList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = pagination.normalize();

    let finder = Users::find()
        .filter(UserCol::Role.eq(Role::Vendor))
        .filter(UserCol::VendorApproved.eq(false))
        .filter(UserCol::IsActive.eq(true))
        .order_by_asc(UserCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(User::from)
        .collect();

    Ok(ApiResponse::success(
        "Pending vendors",
        VendorList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn approve_vendor(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;
    let vendor = find_user(state, id).await?;
    if vendor.role != Role::Vendor {
        return Err(AppError::BadRequest("user is not a vendor".into()));
    }
    if vendor.vendor_approved {
        return Err(AppError::Conflict("vendor is already approved".into()));
    }

    let now = Utc::now();
    let mut active: UserActive = vendor.into();
    active.vendor_approved = Set(true);
    active.approved_at = Set(Some(now.into()));
    active.updated_at = Set(now.into());
    let updated = active.update(&state.orm).await?;

    tracing::info!(vendor_id = %updated.id, "vendor approved");
    audit::record(
        &state.pool,
        user.user_id,
        "vendor_approve",
        "users",
        serde_json::json!({ "vendor_id": updated.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Vendor approved",
        User::from(updated),
        Some(Meta::empty()),
    ))
}

pub async fn revoke_vendor(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;
    let vendor = find_user(state, id).await?;
    if vendor.role != Role::Vendor {
        return Err(AppError::BadRequest("user is not a vendor".into()));
    }
    if !vendor.vendor_approved {
        return Err(AppError::Conflict("vendor is not approved".into()));
    }

    let txn = state.orm.begin().await?;
    let now = Utc::now();
    let mut active: UserActive = vendor.into();
    active.vendor_approved = Set(false);
    active.approved_at = Set(None);
    active.updated_at = Set(now.into());
    let updated = active.update(&txn).await?;

    let hidden = Products::update_many()
        .col_expr(ProdCol::Status, Expr::value(ProductStatus::Inactive))
        .col_expr(ProdCol::UpdatedAt, Expr::value(now))
        .filter(ProdCol::VendorId.eq(id))
        .filter(ProdCol::Status.eq(ProductStatus::Active))
        .exec(&txn)
        .await?
        .rows_affected;
    txn.commit().await?;

    tracing::info!(vendor_id = %updated.id, hidden, "vendor approval revoked");
    audit::record(
        &state.pool,
        user.user_id,
        "vendor_revoke",
        "users",
        serde_json::json!({ "vendor_id": updated.id, "products_deactivated": hidden }),
    )
    .await;

    Ok(ApiResponse::success(
        "Vendor approval revoked",
        User::from(updated),
        Some(Meta::empty()),
    ))
}

pub async fn dashboard(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<VendorDashboard>> {
    ensure_role(user, Role::Vendor)?;

    let by_status: Vec<(String, i64)> = sqlx::query_as(
        "SELECT status, COUNT(*) FROM products WHERE vendor_id = $1 GROUP BY status",
    )
    .bind(user.user_id)
    .fetch_all(&state.pool)
    .await?;

    let (orders, units_sold, gross): (i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT COUNT(DISTINCT oi.order_id),
               COALESCE(SUM(oi.quantity), 0)::BIGINT,
               COALESCE(SUM(oi.line_total), 0)::BIGINT
        FROM order_items oi
        JOIN orders o ON o.id = oi.order_id
        WHERE oi.vendor_id = $1 AND o.status <> $2
        "#,
    )
    .bind(user.user_id)
    .bind(OrderStatus::Cancelled.as_str())
    .fetch_one(&state.pool)
    .await?;

    let rate = state.config.commission_rate_bps;
    let data = VendorDashboard {
        products_by_status: count_map(by_status),
        orders,
        units_sold,
        earnings: Earnings::from_gross(gross, rate),
        commission_rate_bps: rate,
    };
    Ok(ApiResponse::success("Vendor dashboard", data, Some(Meta::empty())))
}

pub async fn list_vendor_orders(
    state: &AppState,
    user: &AuthUser,
    query: VendorOrderQuery,
    pagination: Pagination,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_role(user, Role::Vendor)?;
    let (page, limit, offset) = pagination.normalize();

    let vendor_orders = Query::select()
        .column(OrderItemCol::OrderId)
        .from(OrderItems)
        .and_where(OrderItemCol::VendorId.eq(user.user_id))
        .to_owned();

    let mut finder = Orders::find().filter(OrderCol::Id.in_subquery(vendor_orders));
    if let Some(status) = query.status {
        finder = finder.filter(OrderCol::Status.eq(status));
    }
    let finder = finder.order_by_desc(OrderCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    Ok(ApiResponse::success(
        "Vendor orders",
        OrderList { items },
        Some(Meta::new(page, limit, total)),
    ))
}
