mod common;

use axum::{
    extract::FromRequestParts,
    http::{Request, header},
};
use bazario_api::{
    domain::{ProductStatus, Role},
    dto::{
        admin::{AuditLogQuery, InventoryAdjustRequest, LowStockQuery},
        auth::RegisterRequest,
        categories::CreateCategoryRequest,
        messages::SendMessageRequest,
        users::{SetActiveRequest, UpdateProfileRequest},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, issue_token},
    models::Product,
    response::ApiResponse,
    routes::params::Pagination,
    services::{
        admin_service, auth_service, category_service, message_service, product_service,
        user_service, vendor_service,
    },
    state::AppState,
};
use common::{JWT_SECRET, create_user, product, setup_state, stock_of};
use uuid::Uuid;

// Account registration, vendor approval, inventory tools, account
// deactivation and the audit trail of admin and vendor actions.
#[tokio::test]
async fn accounts_vendors_inventory_and_audit_trail() -> anyhow::Result<()> {
    let Some(database_url) = common::database_url() else {
        return Ok(());
    };

    let state = setup_state(&database_url).await?;

    let admin = create_user(&state, Role::Admin, "admin@example.com", false).await?;
    let vendor = create_user(&state, Role::Vendor, "vendor@example.com", true).await?;
    let pending = create_user(&state, Role::Vendor, "pending@example.com", false).await?;
    let buyer = create_user(&state, Role::Buyer, "buyer@example.com", false).await?;

    // Self-service registration covers buyers and vendors only
    let as_admin = auth_service::register_user(&state, register("root@example.com", Role::Admin, None)).await;
    assert!(matches!(as_admin, Err(AppError::BadRequest(_))));
    let nameless = auth_service::register_user(&state, register("shop@example.com", Role::Vendor, None)).await;
    assert!(matches!(nameless, Err(AppError::BadRequest(_))));

    let shopper = auth_service::register_user(&state, register("Shopper@Example.com", Role::Buyer, None))
        .await?
        .data
        .expect("user");
    assert_eq!(shopper.email, "shopper@example.com");
    let again = auth_service::register_user(&state, register("shopper@example.com", Role::Buyer, None)).await;
    assert!(matches!(again, Err(AppError::BadRequest(_))));

    // Simultaneous sign-ups with one email: one account, one 400
    let (first, second) = tokio::join!(
        auth_service::register_user(&state, register("twin@example.com", Role::Buyer, None)),
        auth_service::register_user(&state, register("twin@example.com", Role::Buyer, None)),
    );
    assert_eq!([first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count(), 1);
    let loser = if first.is_ok() { second } else { first };
    assert!(matches!(loser, Err(AppError::BadRequest(_))));

    // Simultaneous category creation: one category, one 409
    let (first, second) = tokio::join!(
        category_service::create_category(&state, &admin, category("Home Decor")),
        category_service::create_category(&state, &admin, category("Home Decor")),
    );
    assert_eq!([first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count(), 1);
    let loser = if first.is_ok() { second } else { first };
    assert!(matches!(loser, Err(AppError::Conflict(_))));

    // Approval only applies to vendors awaiting it
    let twice = vendor_service::approve_vendor(&state, &admin, vendor.user_id).await;
    assert!(matches!(twice, Err(AppError::Conflict(_))));
    let not_vendor = vendor_service::approve_vendor(&state, &admin, buyer.user_id).await;
    assert!(matches!(not_vendor, Err(AppError::BadRequest(_))));
    let approved = vendor_service::approve_vendor(&state, &admin, pending.user_id)
        .await?
        .data
        .expect("vendor");
    assert!(approved.vendor.expect("vendor profile").approved);

    // Low stock respects the threshold and ignores unlimited products
    let candle = product_service::create_product(&state, &vendor, product("Candle", 900, 3))
        .await?
        .data
        .expect("product");
    let soap = product_service::create_product(&state, &vendor, product("Soap", 600, 20))
        .await?
        .data
        .expect("product");
    let pattern = product_service::create_product(&state, &vendor, product("Knit Pattern", 400, 0))
        .await?
        .data
        .expect("product");

    let low = low_stock(&state, &admin, Some(5)).await?;
    assert_eq!(low, vec![candle.id]);
    assert!(low_stock(&state, &admin, Some(2)).await?.is_empty());
    let wide = low_stock(&state, &admin, Some(50)).await?;
    assert!(wide.contains(&soap.id));
    assert!(!wide.contains(&pattern.id));

    // Inventory adjustments
    let zero = adjust(&state, &admin, candle.id, 0).await;
    assert!(matches!(zero, Err(AppError::BadRequest(_))));
    let negative = adjust(&state, &admin, candle.id, -4).await;
    assert!(matches!(negative, Err(AppError::BadRequest(_))));
    let unlimited = adjust(&state, &admin, pattern.id, 5).await;
    assert!(matches!(unlimited, Err(AppError::BadRequest(_))));
    assert_eq!(stock_of(&state, &admin, candle.id).await?, 3);

    let restocked = adjust(&state, &admin, candle.id, 7).await?.data.expect("product");
    assert_eq!(restocked.stock, 10);
    assert!(low_stock(&state, &admin, Some(5)).await?.is_empty());
    let drained = adjust(&state, &admin, candle.id, -10).await?.data.expect("product");
    assert_eq!(drained.stock, 0);

    // Vendor profile edits and staff messages are audited; buyer activity is not
    user_service::update_me(
        &state,
        &vendor,
        UpdateProfileRequest {
            name: None,
            business_name: Some("Candle Studio".into()),
            business_description: None,
            specialties: None,
        },
    )
    .await?;
    user_service::update_me(
        &state,
        &buyer,
        UpdateProfileRequest {
            name: Some("Bea".into()),
            business_name: None,
            business_description: None,
            specialties: None,
        },
    )
    .await?;
    message_service::send_message(&state, &admin, message(vendor.user_id, "Please restock candles")).await?;
    message_service::send_message(&state, &buyer, message(vendor.user_id, "Any scented candles?")).await?;

    assert_eq!(audit_count(&state, &admin, "profile_update").await?, 1);
    assert_eq!(audit_count(&state, &admin, "message_send").await?, 1);

    // Revoking approval takes the vendor's listings down
    vendor_service::revoke_vendor(&state, &admin, vendor.user_id).await?;
    for id in [candle.id, soap.id, pattern.id] {
        let listing = product_service::get_product(&state, Some(&admin), id)
            .await?
            .data
            .expect("product");
        assert_eq!(listing.status, ProductStatus::Inactive);
    }
    let hidden = product_service::get_product(&state, None, soap.id).await;
    assert!(matches!(hidden, Err(AppError::NotFound)));

    // Admins cannot lock themselves out; deactivated accounts lose their tokens
    let self_lockout = user_service::set_user_active(
        &state,
        &admin,
        admin.user_id,
        SetActiveRequest { active: false },
    )
    .await;
    assert!(matches!(self_lockout, Err(AppError::BadRequest(_))));

    let token = issue_token(buyer.user_id, buyer.role, JWT_SECRET)?;
    let before = authenticate(&state, &token).await?;
    assert_eq!(before.user_id, buyer.user_id);

    user_service::set_user_active(
        &state,
        &admin,
        buyer.user_id,
        SetActiveRequest { active: false },
    )
    .await?;
    let after = authenticate(&state, &token).await;
    assert!(matches!(after, Err(AppError::Unauthorized)));

    Ok(())
}

fn register(email: &str, role: Role, business_name: Option<&str>) -> RegisterRequest {
    RegisterRequest {
        email: email.to_string(),
        password: "correct-horse".into(),
        name: "Test Person".into(),
        role,
        business_name: business_name.map(str::to_string),
        business_description: None,
        specialties: None,
    }
}

fn category(name: &str) -> CreateCategoryRequest {
    CreateCategoryRequest {
        name: name.to_string(),
        description: None,
    }
}

fn message(recipient_id: Uuid, body: &str) -> SendMessageRequest {
    SendMessageRequest {
        recipient_id,
        body: body.to_string(),
        product_id: None,
        order_id: None,
    }
}

async fn low_stock(
    state: &AppState,
    admin: &AuthUser,
    threshold: Option<i32>,
) -> anyhow::Result<Vec<Uuid>> {
    let list = admin_service::list_low_stock(
        state,
        admin,
        LowStockQuery { threshold },
        Pagination::default(),
    )
    .await?
    .data
    .expect("low stock");
    Ok(list.items.into_iter().map(|p| p.id).collect())
}

async fn adjust(
    state: &AppState,
    admin: &AuthUser,
    id: Uuid,
    delta: i32,
) -> AppResult<ApiResponse<Product>> {
    admin_service::adjust_inventory(state, admin, id, InventoryAdjustRequest { delta }).await
}

async fn audit_count(state: &AppState, admin: &AuthUser, action: &str) -> anyhow::Result<usize> {
    let logs = admin_service::list_audit_logs(
        state,
        admin,
        AuditLogQuery {
            action: Some(action.to_string()),
            user_id: None,
        },
        Pagination::default(),
    )
    .await?
    .data
    .expect("logs");
    Ok(logs.items.len())
}

async fn authenticate(state: &AppState, token: &str) -> AppResult<AuthUser> {
    let (mut parts, ()) = Request::builder()
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(())
        .expect("request")
        .into_parts();
    AuthUser::from_request_parts(&mut parts, state).await
}
