use session_gate_access::CookieCodec;
use session_gate_server::{
    app,
    auth::{AppState, FlowConfig, OidcClient, SessionManager},
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

    let codec = CookieCodec::from_base64_key(&config.session.encryption_key)
        .expect("invalid session encryption key");
    let sessions = SessionManager::new(codec, config.session.secure_cookies);

    let flow = FlowConfig {
        scope: config.oidc.scope().to_string(),
        public_url: config.public_url.clone(),
    };

    // Initialize OIDC client
    tracing::info!("Discovering OIDC provider...");
    let oidc_client = OidcClient::discover(config.oidc)
        .await
        .expect("failed to discover OIDC provider");

    // Create application state
    let app_state = Arc::new(AppState::new(Arc::new(oidc_client), sessions, flow));
    let app = app::router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .expect("failed to bind to address");

    tracing::info!("listening on http://{}", config.bind_address);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
