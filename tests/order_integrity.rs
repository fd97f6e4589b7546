mod common;

use bazario_api::{
    domain::{BulkAction, OrderStatus, ProductStatus, Role},
    dto::{
        official::BulkActionRequest,
        orders::UpdateOrderStatusRequest,
        products::{CreateProductRequest, SetProductStatusRequest},
    },
    error::AppError,
    services::{official_service, order_service, product_service},
};
use common::{count_rows, create_user, line, order, product, setup_state, stock_of};

// Checkout under contention, all-or-nothing orders, the status machine,
// unpublished product visibility and official bulk actions.
#[tokio::test]
async fn orders_are_atomic_and_catalog_rules_hold() -> anyhow::Result<()> {
    let Some(database_url) = common::database_url() else {
        return Ok(());
    };

    let state = setup_state(&database_url).await?;

    let admin = create_user(&state, Role::Admin, "admin@example.com", false).await?;
    let vendor = create_user(&state, Role::Vendor, "vendor@example.com", true).await?;
    let first_buyer = create_user(&state, Role::Buyer, "first@example.com", false).await?;
    let second_buyer = create_user(&state, Role::Buyer, "second@example.com", false).await?;

    // Two buyers race for the last two units
    let lamp = product_service::create_product(&state, &vendor, product("Brass Lamp", 4000, 2))
        .await?
        .data
        .expect("product");
    let (first, second) = tokio::join!(
        order_service::create_order(&state, &first_buyer, order(vec![line(lamp.id, 2)])),
        order_service::create_order(&state, &second_buyer, order(vec![line(lamp.id, 2)])),
    );
    let placed = [first.is_ok(), second.is_ok()];
    assert_eq!(placed.iter().filter(|ok| **ok).count(), 1);
    let loser = if first.is_ok() { second } else { first };
    assert!(matches!(loser, Err(AppError::BadRequest(_))));
    assert_eq!(stock_of(&state, &vendor, lamp.id).await?, 0);
    assert_eq!(count_rows(&state, "orders").await?, 1);

    // A failing line leaves no order behind and earlier lines keep their stock
    let vase = product_service::create_product(&state, &vendor, product("Glass Vase", 1500, 5))
        .await?
        .data
        .expect("product");
    let rug = product_service::create_product(&state, &vendor, product("Wool Rug", 9000, 3))
        .await?
        .data
        .expect("product");
    product_service::set_product_status(
        &state,
        &vendor,
        rug.id,
        SetProductStatusRequest {
            status: ProductStatus::Inactive,
        },
    )
    .await?;

    let failed = order_service::create_order(
        &state,
        &first_buyer,
        order(vec![line(vase.id, 2), line(rug.id, 1)]),
    )
    .await;
    assert!(matches!(failed, Err(AppError::BadRequest(_))));
    assert_eq!(count_rows(&state, "orders").await?, 1);
    assert_eq!(count_rows(&state, "order_items").await?, 1);
    assert_eq!(stock_of(&state, &vendor, vase.id).await?, 5);

    // Skipping ahead in the status machine is refused
    let pending = order_service::create_order(&state, &first_buyer, order(vec![line(vase.id, 1)]))
        .await?
        .data
        .expect("order");
    let skipped = order_service::update_order_status(
        &state,
        &vendor,
        pending.order.id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Delivered,
        },
    )
    .await;
    assert!(matches!(skipped, Err(AppError::BadRequest(_))));
    let unchanged = order_service::get_order(&state, &first_buyer, pending.order.id)
        .await?
        .data
        .expect("order");
    assert_eq!(unchanged.order.status, OrderStatus::Pending);

    // Drafts and inactive products are hidden from anonymous visitors
    let draft = product_service::create_product(
        &state,
        &vendor,
        CreateProductRequest {
            status: Some(ProductStatus::Draft),
            ..product("Sketch Pad", 800, 4)
        },
    )
    .await?
    .data
    .expect("product");
    let anonymous = product_service::get_product(&state, None, draft.id).await;
    assert!(matches!(anonymous, Err(AppError::NotFound)));
    let anonymous = product_service::get_product(&state, None, rug.id).await;
    assert!(matches!(anonymous, Err(AppError::NotFound)));
    assert!(product_service::get_product(&state, Some(&vendor), draft.id).await.is_ok());
    assert!(product_service::get_product(&state, Some(&admin), rug.id).await.is_ok());
    assert!(product_service::get_product(&state, None, vase.id).await.is_ok());

    // Admins move vendor products into the official line and back out
    let marked = official_service::bulk_action(
        &state,
        &admin,
        BulkActionRequest {
            product_ids: vec![vase.id, vase.id],
            action: BulkAction::MarkOfficial,
        },
    )
    .await?
    .data
    .expect("bulk result");
    assert_eq!(marked.updated, 1);
    assert!(marked.skipped.is_empty());
    let official_vase = product_service::get_product(&state, None, vase.id)
        .await?
        .data
        .expect("product");
    assert!(official_vase.is_official);

    let unmarked = official_service::bulk_action(
        &state,
        &admin,
        BulkActionRequest {
            product_ids: vec![vase.id, lamp.id],
            action: BulkAction::UnmarkOfficial,
        },
    )
    .await?
    .data
    .expect("bulk result");
    assert_eq!(unmarked.updated, 1);
    assert_eq!(unmarked.skipped, vec![lamp.id]);
    let plain_vase = product_service::get_product(&state, None, vase.id)
        .await?
        .data
        .expect("product");
    assert!(!plain_vase.is_official);

    // Deleting a batch keeps ordered products and removes the rest
    let scarf = official_service::create_official_product(&state, &admin, product("Scarf", 2500, 6))
        .await?
        .data
        .expect("official product");
    let cap = official_service::create_official_product(&state, &admin, product("Cap", 1800, 6))
        .await?
        .data
        .expect("official product");
    order_service::create_order(&state, &second_buyer, order(vec![line(scarf.id, 1)])).await?;

    let removed = official_service::bulk_action(
        &state,
        &admin,
        BulkActionRequest {
            product_ids: vec![scarf.id, cap.id],
            action: BulkAction::Delete,
        },
    )
    .await?
    .data
    .expect("bulk result");
    assert_eq!(removed.deactivated, 1);
    assert_eq!(removed.deleted, 1);
    assert!(removed.skipped.is_empty());

    let kept = product_service::get_product(&state, Some(&admin), scarf.id)
        .await?
        .data
        .expect("product");
    assert_eq!(kept.status, ProductStatus::Inactive);
    let gone = product_service::get_product(&state, Some(&admin), cap.id).await;
    assert!(matches!(gone, Err(AppError::NotFound)));

    Ok(())
}
