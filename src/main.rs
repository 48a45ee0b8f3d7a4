//! optout - Entry point for the scan server

use optout::server::{self, AppState};
use optout::{LogBroadcaster, ServerConfig};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = ServerConfig::from_env();
    let state = AppState::new(LogBroadcaster::new());

    if let Err(e) = server::serve(config, state).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
