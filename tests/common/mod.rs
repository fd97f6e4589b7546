#![allow(dead_code)]

use bazario_api::{
    config::AppConfig,
    db::connect_state,
    domain::Role,
    dto::{
        orders::{CreateOrderRequest, OrderLineRequest},
        products::CreateProductRequest,
    },
    entity::users::ActiveModel as UserActive,
    middleware::auth::AuthUser,
    services::product_service,
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

pub const JWT_SECRET: &str = "integration-secret";

/// Connection string for DB-backed tests, or `None` to skip.
pub fn database_url() -> Option<String> {
    match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
        Ok(url) => Some(url),
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            None
        }
    }
}

pub async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let url = database_url.to_string();
    let config = AppConfig::from_lookup(|key| match key {
        "DATABASE_URL" => Some(url.clone()),
        "JWT_SECRET" => Some(JWT_SECRET.into()),
        _ => None,
    })?;
    let state = connect_state(config).await?;

    // Clean tables between runs
    sqlx::query(
        "TRUNCATE TABLE messages, order_items, orders, audit_logs, products, categories, users RESTART IDENTITY CASCADE",
    )
    .execute(&state.pool)
    .await?;

    Ok(state)
}

pub async fn create_user(
    state: &AppState,
    role: Role,
    email: &str,
    approved: bool,
) -> anyhow::Result<AuthUser> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set("dummy".into()),
        name: Set(email.split('@').next().unwrap_or(email).to_string()),
        role: Set(role),
        is_active: Set(true),
        business_name: Set((role == Role::Vendor).then(|| "Studio".to_string())),
        business_description: Set(None),
        vendor_approved: Set(approved),
        vendor_specialties: Set(serde_json::json!([])),
        vendor_rating: Set(None),
        approved_at: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        role,
    })
}

/// Product request; a `stock` of 0 means unlimited stock.
pub fn product(title: &str, price: i64, stock: i32) -> CreateProductRequest {
    CreateProductRequest {
        title: title.to_string(),
        description: None,
        price,
        category_id: None,
        images: Vec::new(),
        stock,
        unlimited_stock: stock == 0,
        status: None,
        tags: Vec::new(),
    }
}

pub fn line(product_id: Uuid, quantity: i32) -> OrderLineRequest {
    OrderLineRequest {
        product_id,
        quantity,
    }
}

pub fn order(items: Vec<OrderLineRequest>) -> CreateOrderRequest {
    CreateOrderRequest {
        items,
        shipping_address: "12 Market Street".into(),
    }
}

pub async fn stock_of(state: &AppState, viewer: &AuthUser, id: Uuid) -> anyhow::Result<i32> {
    let product = product_service::get_product(state, Some(viewer), id)
        .await?
        .data
        .expect("product");
    Ok(product.stock)
}

pub async fn count_rows(state: &AppState, table: &str) -> anyhow::Result<i64> {
    let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(&state.pool)
        .await?;
    Ok(count)
}
