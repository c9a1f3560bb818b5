mod config;
mod gate;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use services::backend::HttpBackend;

#[tokio::main]
async fn main() {
    // `.env` is optional.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = config::AppConfig::from_env().expect("invalid configuration");
    let backend = HttpBackend::new(config.backend_base_url.clone(), config.timeouts).expect("backend client init failed");
    tracing::info!(
        backend = %config.backend_base_url,
        request_timeout_secs = config.timeouts.request_secs,
        cookie_secure = config.cookie_secure,
        "backend client initialized"
    );

    let state = state::AppState::new(Arc::new(backend), config.cookie_secure);
    let app = routes::app(state);

    let port = config.port;
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "content-admin listening");
    axum::serve(listener, app).await.expect("server failed");
}
