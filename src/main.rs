use marketplace_service::{config, db, error, logging, routes, state};

#[tokio::main]
async fn main() -> Result<(), error::AppError> {
    logging::init_tracing();

    let config = config::Config::from_env()?;
    let bind_addr = config.bind_addr();

    let pool = db::init_pool(&config.database_url).await?;
    let app_state = state::AppState::new(pool, config);
    let router = routes::build_router(app_state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "starting marketplace service");
    axum::serve(listener, router).await?;
    Ok(())
}
