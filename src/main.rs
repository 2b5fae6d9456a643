use jobastra_backend::services::reminder_service::{spawn_reminder_jobs, ReminderEngine};
use jobastra_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    let engine = ReminderEngine::new(
        app_state.pool.clone(),
        app_state.email_service.clone(),
    );
    // Handle must stay alive or the cron jobs stop.
    let _scheduler = spawn_reminder_jobs(engine)
        .await
        .map_err(|e| anyhow::anyhow!("failed to start reminder jobs: {e}"))?;
    info!("Reminder jobs registered");

    let app = routes::router(config.api_rps)
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(axum::extract::DefaultBodyLimit::max(2 * 1024 * 1024));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
