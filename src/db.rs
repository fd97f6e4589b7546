use anyhow::Result;
use sea_orm::{DatabaseConnection, SqlxPostgresConnector};
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::{config::AppConfig, state::AppState};

pub type DbPool = PgPool;
pub type OrmConn = DatabaseConnection;

pub async fn create_pool(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Wrap the sqlx pool in a SeaORM connection so both share the same connections.
pub fn create_orm_conn(pool: &DbPool) -> OrmConn {
    SqlxPostgresConnector::from_sqlx_postgres_pool(pool.clone())
}

/// Apply the SQL files in `migrations/`, tracking applied versions.
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn connect_state(config: AppConfig) -> Result<AppState> {
    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;
    let orm = create_orm_conn(&pool);
    Ok(AppState {
        pool,
        orm,
        config: std::sync::Arc::new(config),
    })
}
