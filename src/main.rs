use anyhow::Context;

use boxbet::{
    config::ServerConfig,
    routes,
    services::{turn_timer, TurnTimerPolicy},
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env();

    // RUST_LOG wins; otherwise info in production, debug in development
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter().into()),
        )
        .init();

    tracing::info!("BoxBet game server starting ({})", config.environment);

    let addr = config.bind_address();
    let policy = TurnTimerPolicy::from_config(&config);
    let state = AppState::new(config);

    let _timer = turn_timer::spawn(state.rooms.clone(), policy);

    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;

    tracing::info!("Server listening on ws://{}/ws", addr);

    axum::serve(listener, app).await.context("server error")?;

    tracing::info!("Shutting down game server");
    Ok(())
}
