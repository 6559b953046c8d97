use std::sync::Arc;

use ndjson_mcp_server::{
    build_app,
    config::{Config, Transport},
    domain::builtin_registry,
    logging,
    mcp::dispatcher::Dispatcher,
    stdio, AppState,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging();

    let config = Config::from_env()?;
    let registry = Arc::new(builtin_registry());
    info!(tools = registry.len(), "tool registry ready");
    let dispatcher = Dispatcher::new(registry);

    if config.transport == Transport::Stdio {
        stdio::serve_stdio(dispatcher).await?;
        return Ok(());
    }

    let bind_socket = config.bind_socket()?;
    let state = AppState::new(dispatcher, config.api_token.clone());
    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(bind_socket).await?;

    info!(
        bind_addr = %config.bind_addr,
        bind_port = config.bind_port,
        auth = config.api_token.is_some(),
        "server starting"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
