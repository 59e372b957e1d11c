use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zynkart_api::{
    build_app,
    config::{Config, LogFormat},
    AppState,
};
use zynkart_payments::{PaystackWebhook, PgOrderStore};
use zynkart_shared::create_lazy_pool;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    init_tracing(config.log_format);

    tracing::info!(
        bind_address = %config.bind_address,
        main_domains = ?config.routes.main_domains,
        "Starting Zynkart API"
    );

    // Lazy pool: routing keeps serving while the database is unreachable
    let pool = create_lazy_pool(&config.database_url, config.database_max_connections)?;
    let orders = Arc::new(PgOrderStore::new(pool));
    let paystack = PaystackWebhook::new(&config.paystack_secret_key)?;

    let state = AppState::new(config.routes.clone(), orders, paystack);
    let app = build_app(state);

    let listener = TcpListener::bind(&config.bind_address).await?;
    tracing::info!(address = %config.bind_address, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "zynkart_api=info,zynkart_payments=info,tower_http=info".into());

    match format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
