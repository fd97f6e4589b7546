use std::collections::HashMap;

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit,
    domain::{
        OrderStatus, ProductStatus, Role,
        catalog::has_stock_for,
        order::{build_order_number, merge_lines},
        pricing::line_total,
    },
    dto::orders::{CreateOrderRequest, OrderList, OrderWithItems, UpdateOrderStatusRequest},
    entity::{
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::{Column as ProdCol, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_any_role, ensure_role},
    models::{Order, OrderItem},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, Pagination, SortOrder},
    state::AppState,
};

pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_role(user, Role::Buyer)?;
    payload.validate()?;
    let lines = merge_lines(payload.items.iter().map(|l| (l.product_id, l.quantity)))?;
    let ids: Vec<Uuid> = lines.iter().map(|l| l.product_id).collect();

    let txn = state.orm.begin().await?;

    // Rows are locked in id order so concurrent checkouts cannot deadlock.
    let products: HashMap<Uuid, ProductModel> = Products::find()
        .filter(ProdCol::Id.is_in(ids))
        .order_by_asc(ProdCol::Id)
        .lock(LockType::Update)
        .all(&txn)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let mut priced: Vec<(&ProductModel, i32, i64)> = Vec::with_capacity(lines.len());
    let mut subtotal: i64 = 0;
    for line in &lines {
        let product = products.get(&line.product_id).ok_or_else(|| {
            AppError::BadRequest(format!("Product {} not found", line.product_id))
        })?;
        if product.status != ProductStatus::Active {
            return Err(AppError::BadRequest(format!(
                "Product {} is not available",
                product.title
            )));
        }
        if !has_stock_for(product.stock, product.unlimited_stock, line.quantity) {
            return Err(AppError::BadRequest(format!(
                "Insufficient stock for product {}",
                product.title
            )));
        }
        let total = line_total(product.price, line.quantity)?;
        subtotal = subtotal
            .checked_add(total)
            .ok_or_else(|| AppError::BadRequest("order total overflows".into()))?;
        priced.push((product, line.quantity, total));
    }

    let totals = state.config.pricing().totals(subtotal)?;
    let order_id = Uuid::new_v4();
    let now = Utc::now();

    let order = OrderActive {
        id: Set(order_id),
        buyer_id: Set(user.user_id),
        order_number: Set(build_order_number(order_id, now)),
        subtotal: Set(totals.subtotal),
        shipping: Set(totals.shipping),
        tax: Set(totals.tax),
        total: Set(totals.total),
        status: Set(OrderStatus::Pending),
        shipping_address: Set(payload.shipping_address.trim().to_string()),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut items: Vec<OrderItem> = Vec::with_capacity(priced.len());
    for (product, quantity, total) in priced {
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(product.id),
            vendor_id: Set(product.vendor_id),
            title: Set(product.title.clone()),
            quantity: Set(quantity),
            unit_price: Set(product.price),
            line_total: Set(total),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        items.push(OrderItem::from(item));

        if !product.unlimited_stock {
            Products::update_many()
                .col_expr(ProdCol::Stock, Expr::col(ProdCol::Stock).sub(quantity))
                .col_expr(ProdCol::UpdatedAt, Expr::value(now))
                .filter(ProdCol::Id.eq(product.id))
                .exec(&txn)
                .await?;
        }
    }

    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        buyer_id = %user.user_id,
        total = order.total,
        lines = items.len(),
        "order created"
    );
    audit::record(
        &state.pool,
        user.user_id,
        "order_create",
        "orders",
        serde_json::json!({ "order_id": order.id, "total": order.total }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order placed",
        OrderWithItems {
            order: Order::from(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_my_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
    pagination: Pagination,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = pagination.normalize();
    let mut condition = Condition::all().add(OrderCol::BuyerId.eq(user.user_id));
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
    Ok(ApiResponse::success("Ok", OrderList { items: orders }, Some(meta)))
}

/// Items of an order, restricted to one vendor's lines when `vendor` is set.
pub(crate) async fn load_items<C>(
    db: &C,
    order_id: Uuid,
    vendor: Option<Uuid>,
) -> AppResult<Vec<OrderItem>>
where
    C: ConnectionTrait,
{
    let mut finder = OrderItems::find().filter(OrderItemCol::OrderId.eq(order_id));
    if let Some(vendor_id) = vendor {
        finder = finder.filter(OrderItemCol::VendorId.eq(vendor_id));
    }
    Ok(finder
        .order_by_asc(OrderItemCol::CreatedAt)
        .all(db)
        .await?
        .into_iter()
        .map(OrderItem::from)
        .collect())
}

async fn vendor_has_items<C>(db: &C, order_id: Uuid, vendor_id: Uuid) -> AppResult<bool>
where
    C: ConnectionTrait,
{
    let count = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order_id))
        .filter(OrderItemCol::VendorId.eq(vendor_id))
        .count(db)
        .await?;
    Ok(count > 0)
}

/// The buyer, the admins and every vendor with lines in the order may see it.
/// Vendors only see their own lines.
pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let vendor_scope = match user.role {
        Role::Admin => None,
        Role::Buyer if order.buyer_id == user.user_id => None,
        Role::Vendor => {
            if !vendor_has_items(&state.orm, id, user.user_id).await? {
                return Err(AppError::NotFound);
            }
            Some(user.user_id)
        }
        Role::Buyer => return Err(AppError::NotFound),
    };

    let items = load_items(&state.orm, order.id, vendor_scope).await?;
    Ok(ApiResponse::success(
        "OK",
        OrderWithItems {
            order: Order::from(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

/// Puts stock back for every limited-stock line of the order.
async fn restock(txn: &DatabaseTransaction, order_id: Uuid) -> AppResult<()> {
    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order_id))
        .all(txn)
        .await?;
    let now = Utc::now();
    for item in items {
        Products::update_many()
            .col_expr(ProdCol::Stock, Expr::col(ProdCol::Stock).add(item.quantity))
            .col_expr(ProdCol::UpdatedAt, Expr::value(now))
            .filter(ProdCol::Id.eq(item.product_id))
            .filter(ProdCol::UnlimitedStock.eq(false))
            .exec(txn)
            .await?;
    }
    Ok(())
}

async fn transition(
    txn: &DatabaseTransaction,
    order: OrderModel,
    next: OrderStatus,
) -> AppResult<OrderModel> {
    order.status.ensure_transition(next)?;
    if next == OrderStatus::Cancelled {
        restock(txn, order.id).await?;
    }

    let mut active: OrderActive = order.into();
    active.status = Set(next);
    active.updated_at = Set(Utc::now().into());
    Ok(active.update(txn).await?)
}

async fn lock_order(txn: &DatabaseTransaction, id: Uuid) -> AppResult<OrderModel> {
    Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or(AppError::NotFound)
}

/// Vendors move orders they have lines in; admins move any order.
pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_any_role(user, &[Role::Admin, Role::Vendor])?;

    let txn = state.orm.begin().await?;
    let order = lock_order(&txn, id).await?;
    if user.role == Role::Vendor && !vendor_has_items(&txn, id, user.user_id).await? {
        return Err(AppError::NotFound);
    }
    let previous = order.status;
    let order = transition(&txn, order, payload.status).await?;
    txn.commit().await?;

    tracing::info!(order_id = %order.id, from = %previous, to = %order.status, "order status changed");
    audit::record(
        &state.pool,
        user.user_id,
        "order_status_update",
        "orders",
        serde_json::json!({ "order_id": order.id, "from": previous, "to": order.status }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order updated",
        Order::from(order),
        Some(Meta::empty()),
    ))
}

pub async fn cancel_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Order>> {
    let txn = state.orm.begin().await?;
    let order = lock_order(&txn, id).await?;
    if order.buyer_id != user.user_id {
        return Err(AppError::NotFound);
    }
    if !order.status.is_cancellable() {
        return Err(AppError::BadRequest(format!(
            "order is already {} and can no longer be cancelled",
            order.status
        )));
    }
    let order = transition(&txn, order, OrderStatus::Cancelled).await?;
    txn.commit().await?;

    tracing::info!(order_id = %order.id, "order cancelled by buyer");
    audit::record(
        &state.pool,
        user.user_id,
        "order_cancel",
        "orders",
        serde_json::json!({ "order_id": order.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order cancelled",
        Order::from(order),
        Some(Meta::empty()),
    ))
}
