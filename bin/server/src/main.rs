use authgate_dc_bridge::DcBridge;
use authgate_server::{
    app,
    auth::{AppState, ZohoOAuthClient},
    config::ServerConfig,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = ServerConfig::from_env().expect("failed to load configuration");
    tracing::info!("Loaded configuration");

    let store = authgate_store::connect(&config.store)
        .await
        .expect("failed to connect to ephemeral store");

    let bridge = DcBridge::new(&config.bridge, store).expect("failed to configure DC bridge");

    let zoho = ZohoOAuthClient::new(&config.zoho, &config.public_base_url)
        .expect("failed to configure OAuth client");

    let app_state = Arc::new(AppState::new(
        bridge,
        zoho,
        config.bridge.callback_path.clone(),
        config.secure_cookies,
    ));

    let app = app::router(app_state, &config.cors_origins());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("failed to bind to address");

    tracing::info!("listening on http://{}", config.bind_addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
