//! Itinera server binary.

use itinera_http_adapter::{app, service_from_config, ItineraConfig};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let config = ItineraConfig::from_env();
    log::info!(
        "starting itinera-server on {} (model '{}', max {} refinement rounds)",
        config.bind_addr,
        config.llm_model,
        config.max_refinements
    );

    let router = app(service_from_config(&config));
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        log::warn!("failed to install ctrl-c handler");
    }
    log::info!("shutting down");
}
