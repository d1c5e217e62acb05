//! Focus Bell - A pause-aware focus timer with periodic chimes
//! 
//! This is the main entry point for the focus-bell application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use focus_bell::{
    api::create_router,
    config::Config,
    engine::MonotonicClock,
    services::build_audio_backend,
    state::AppState,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("focus_bell={},tower_http=info", config.log_level()))
        .init();

    info!("Starting focus-bell server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, interval={}min, tick={}ms, audio={:?}",
          config.host, config.port, config.interval, config.tick_ms, config.audio);

    let backend = build_audio_backend(
        config.audio,
        config.chime_command.as_deref(),
        config.volume_command.as_deref(),
    )?;

    // Spawn the session task and wrap it in shared state
    let state = Arc::new(AppState::spawn(
        config.port,
        config.host.clone(),
        &config.session_settings(),
        MonotonicClock::new(),
        backend,
    ));

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start        - Start or resume the timer");
    info!("  POST /pause        - Pause the timer");
    info!("  POST /toggle       - Start/pause toggle");
    info!("  POST /reset        - Reset the session");
    info!("  PUT  /interval     - Set bell interval (idle only)");
    info!("  POST /mute         - Mute chimes and ambience");
    info!("  POST /unmute       - Unmute");
    info!("  POST /toggle-mute  - Toggle mute");
    info!("  POST /visibility   - Report timer visibility");
    info!("  GET  /status       - Session status");
    info!("  GET  /health       - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
