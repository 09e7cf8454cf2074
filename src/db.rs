use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

use crate::error::AppError;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Build the pool and bring the schema up to date.
pub async fn init_pool(database_url: &str) -> Result<Pool<Postgres>, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;
    MIGRATOR.run(&pool).await?;
    Ok(pool)
}
