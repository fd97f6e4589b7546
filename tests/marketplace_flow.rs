mod common;

use bazario_api::{
    domain::{BulkAction, OrderStatus, ProductStatus, Role},
    dto::{
        messages::SendMessageRequest,
        official::BulkActionRequest,
        orders::{CreateOrderRequest, UpdateOrderStatusRequest},
        products::DeleteOutcome,
    },
    error::AppError,
    routes::params::Pagination,
    services::{
        admin_service, message_service, official_service, order_service, product_service,
        vendor_service,
    },
};
use common::{create_user, line, product, setup_state, stock_of};
use uuid::Uuid;

// Integration flow: a vendor lists a product, a buyer orders and cancels, the
// admin manages the official line and reads the dashboards.
#[tokio::test]
async fn order_lifecycle_official_line_and_dashboards() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let Some(database_url) = common::database_url() else {
        return Ok(());
    };

    let state = setup_state(&database_url).await?;

    let admin = create_user(&state, Role::Admin, "admin@example.com", false).await?;
    let vendor = create_user(&state, Role::Vendor, "vendor@example.com", true).await?;
    let pending_vendor = create_user(&state, Role::Vendor, "pending@example.com", false).await?;
    let buyer = create_user(&state, Role::Buyer, "buyer@example.com", false).await?;
    let other_buyer = create_user(&state, Role::Buyer, "other@example.com", false).await?;

    // Unapproved vendors cannot sell
    let refused = product_service::create_product(&state, &pending_vendor, product("Nope", 100, 1)).await;
    assert!(matches!(refused, Err(AppError::Forbidden)));

    // Vendors cannot slip into the official line
    let mut request = product("Clay Mug", 2000, 10);
    request.tags = vec!["Handmade".into(), "bazario-official".into()];
    let mug = product_service::create_product(&state, &vendor, request)
        .await?
        .data
        .expect("product");
    assert_eq!(mug.status, ProductStatus::Active);
    assert!(!mug.is_official);
    assert_eq!(mug.tags, vec!["handmade".to_string()]);

    // Duplicate lines are merged; 6000 clears the free-shipping threshold
    let placed = order_service::create_order(
        &state,
        &buyer,
        CreateOrderRequest {
            items: vec![line(mug.id, 2), line(mug.id, 1)],
            shipping_address: "12 Market Street".into(),
        },
    )
    .await?
    .data
    .expect("order");
    assert_eq!(placed.items.len(), 1);
    assert_eq!(placed.items[0].quantity, 3);
    assert_eq!(placed.order.subtotal, 6000);
    assert_eq!(placed.order.shipping, 0);
    assert_eq!(placed.order.tax, 480);
    assert_eq!(placed.order.total, 6480);
    assert_eq!(placed.order.status, OrderStatus::Pending);
    assert_eq!(stock_of(&state, &vendor, mug.id).await?, 7);

    // Overselling is refused and leaves stock untouched
    let oversell = order_service::create_order(
        &state,
        &buyer,
        CreateOrderRequest {
            items: vec![line(mug.id, 8)],
            shipping_address: "12 Market Street".into(),
        },
    )
    .await;
    assert!(matches!(oversell, Err(AppError::BadRequest(_))));
    assert_eq!(stock_of(&state, &vendor, mug.id).await?, 7);

    // Vendor confirms, buyer cancels, stock comes back
    let confirmed = order_service::update_order_status(
        &state,
        &vendor,
        placed.order.id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Confirmed,
        },
    )
    .await?;
    assert_eq!(confirmed.data.expect("order").status, OrderStatus::Confirmed);

    let cancelled = order_service::cancel_order(&state, &buyer, placed.order.id).await?;
    assert_eq!(cancelled.data.expect("order").status, OrderStatus::Cancelled);
    assert_eq!(stock_of(&state, &vendor, mug.id).await?, 10);
    assert!(order_service::cancel_order(&state, &buyer, placed.order.id).await.is_err());

    // Other buyers cannot see the order
    let hidden = order_service::get_order(&state, &other_buyer, placed.order.id).await;
    assert!(matches!(hidden, Err(AppError::NotFound)));

    // A small order pays shipping
    let small = order_service::create_order(
        &state,
        &buyer,
        CreateOrderRequest {
            items: vec![line(mug.id, 1)],
            shipping_address: "12 Market Street".into(),
        },
    )
    .await?
    .data
    .expect("order");
    assert_eq!(small.order.shipping, 500);
    assert_eq!(small.order.tax, 160);
    assert_eq!(small.order.total, 2660);

    let vendor_dash = vendor_service::dashboard(&state, &vendor).await?.data.expect("dashboard");
    assert_eq!(vendor_dash.orders, 1);
    assert_eq!(vendor_dash.units_sold, 1);
    assert_eq!(vendor_dash.earnings.gross, 2000);
    assert_eq!(vendor_dash.earnings.commission, 200);
    assert_eq!(vendor_dash.earnings.net, 1800);

    // Messaging: buyer to vendor is fine, buyer to buyer is not
    message_service::send_message(
        &state,
        &buyer,
        SendMessageRequest {
            recipient_id: vendor.user_id,
            body: "Is the glaze food safe?".into(),
            product_id: Some(mug.id),
            order_id: Some(small.order.id),
        },
    )
    .await?;
    let blocked = message_service::send_message(
        &state,
        &buyer,
        SendMessageRequest {
            recipient_id: other_buyer.user_id,
            body: "hi".into(),
            product_id: None,
            order_id: None,
        },
    )
    .await;
    assert!(matches!(blocked, Err(AppError::Forbidden)));

    let inbox = message_service::list_conversations(&state, &vendor)
        .await?
        .data
        .expect("inbox");
    assert_eq!(inbox.items.len(), 1);
    assert_eq!(inbox.items[0].unread, 1);
    let marked = message_service::mark_thread_read(&state, &vendor, buyer.user_id)
        .await?
        .data
        .expect("marked");
    assert_eq!(marked.marked, 1);

    // Official line: admin-owned product, bulk deactivate then delete
    let tote = official_service::create_official_product(&state, &admin, product("Tote", 1500, 0))
        .await?
        .data
        .expect("official product");
    assert!(tote.is_official);
    assert_eq!(tote.vendor_id, admin.user_id);

    let missing = Uuid::new_v4();
    let result = official_service::bulk_action(
        &state,
        &admin,
        BulkActionRequest {
            product_ids: vec![tote.id, mug.id, missing],
            action: BulkAction::Deactivate,
        },
    )
    .await?
    .data
    .expect("bulk result");
    assert_eq!(result.updated, 1);
    assert_eq!(result.skipped.len(), 2);
    assert!(result.skipped.contains(&mug.id));
    assert!(result.skipped.contains(&missing));

    let stats = official_service::official_stats(&state, &admin).await?.data.expect("stats");
    assert_eq!(stats.products_by_status.get("inactive"), Some(&1));

    let deleted = official_service::bulk_action(
        &state,
        &admin,
        BulkActionRequest {
            product_ids: vec![tote.id],
            action: BulkAction::Delete,
        },
    )
    .await?
    .data
    .expect("bulk result");
    assert_eq!(deleted.deleted, 1);

    // Products on orders are only deactivated
    let removal = product_service::delete_product(&state, &vendor, mug.id)
        .await?
        .data
        .expect("delete response");
    assert_eq!(removal.outcome, DeleteOutcome::Deactivated);

    let admin_dash = admin_service::dashboard(&state, &admin).await?.data.expect("dashboard");
    assert_eq!(admin_dash.revenue.gross, 2660);
    assert_eq!(admin_dash.revenue.commission, 266);
    assert_eq!(admin_dash.official_products, 0);
    assert_eq!(admin_dash.orders_by_status.get("cancelled"), Some(&1));
    assert_eq!(admin_dash.pending_vendors, 1);

    let logs = admin_service::list_audit_logs(
        &state,
        &admin,
        bazario_api::dto::admin::AuditLogQuery {
            action: Some("official_bulk".into()),
            user_id: None,
        },
        Pagination::default(),
    )
    .await?
    .data
    .expect("logs");
    assert_eq!(logs.items.len(), 2);

    Ok(())
}
