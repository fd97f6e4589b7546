use bazario_api::{
    config::AppConfig,
    db::{DbPool, create_pool, run_migrations},
    domain::{OFFICIAL_TAG, ProductStatus, Role, catalog::slugify},
    services::auth_service::hash_password,
};
use uuid::Uuid;

struct SeedUser<'a> {
    email: &'a str,
    password: &'a str,
    name: &'a str,
    role: Role,
    business_name: Option<&'a str>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;

    let admin_id = ensure_user(
        &pool,
        SeedUser {
            email: "admin@bazario.test",
            password: "admin123",
            name: "Bazario Admin",
            role: Role::Admin,
            business_name: None,
        },
    )
    .await?;
    let vendor_id = ensure_user(
        &pool,
        SeedUser {
            email: "vendor@bazario.test",
            password: "vendor123",
            name: "Amina Clay",
            role: Role::Vendor,
            business_name: Some("Amina's Pottery"),
        },
    )
    .await?;
    let buyer_id = ensure_user(
        &pool,
        SeedUser {
            email: "buyer@bazario.test",
            password: "buyer123",
            name: "Sam Buyer",
            role: Role::Buyer,
            business_name: None,
        },
    )
    .await?;

    let pottery = ensure_category(&pool, "Pottery", "Hand-thrown ceramics").await?;
    let textiles = ensure_category(&pool, "Textiles", "Woven and embroidered goods").await?;

    seed_products(&pool, vendor_id, pottery, false, &[
        ("Speckled Stoneware Mug", 2400, 25, &["handmade", "mug"][..]),
        ("Terracotta Planter", 3800, 4, &["planter"][..]),
    ])
    .await?;
    seed_products(&pool, admin_id, textiles, true, &[
        ("Bazario Tote Bag", 1500, 0, &["tote"][..]),
        ("Hand-woven Table Runner", 6200, 12, &["woven"][..]),
    ])
    .await?;

    println!("Seed completed. Admin: {admin_id}, vendor: {vendor_id}, buyer: {buyer_id}");
    Ok(())
}

async fn ensure_user(pool: &DbPool, user: SeedUser<'_>) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(user.password).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let is_vendor = user.role == Role::Vendor;

    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, name, role, business_name,
                           vendor_approved, approved_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, CASE WHEN $7 THEN NOW() END)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.email)
    .bind(password_hash)
    .bind(user.name)
    .bind(user.role.as_str())
    .bind(user.business_name)
    .bind(is_vendor)
    .fetch_one(pool)
    .await?;

    println!("Ensured user {} (role={})", user.email, user.role);
    Ok(id)
}

async fn ensure_category(pool: &DbPool, name: &str, description: &str) -> anyhow::Result<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO categories (id, name, slug, description)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (slug) DO UPDATE SET description = EXCLUDED.description
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(slugify(name))
    .bind(description)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Inserts products by title for the owner; titles already present are left alone.
/// A zero stock seeds the product as unlimited.
async fn seed_products(
    pool: &DbPool,
    owner: Uuid,
    category: Uuid,
    official: bool,
    products: &[(&str, i64, i32, &[&str])],
) -> anyhow::Result<()> {
    for (title, price, stock, tags) in products {
        let mut tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
        if official {
            tags.push(OFFICIAL_TAG.to_string());
        }
        sqlx::query(
            r#"
            INSERT INTO products (id, vendor_id, category_id, title, price, stock,
                                  unlimited_stock, status, tags)
            SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9
            WHERE NOT EXISTS (SELECT 1 FROM products WHERE vendor_id = $2 AND title = $4)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner)
        .bind(category)
        .bind(*title)
        .bind(*price)
        .bind(*stock)
        .bind(*stock == 0)
        .bind(ProductStatus::Active.as_str())
        .bind(serde_json::json!(tags))
        .execute(pool)
        .await?;
    }

    println!("Seeded {} products", products.len());
    Ok(())
}
