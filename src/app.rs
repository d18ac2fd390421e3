use tracing_subscriber::EnvFilter;

use crate::infrastructure::bootstrap::bootstrap;
use crate::infrastructure::config::Settings;
use crate::interfaces::http::start_server;

/// Loads settings, opens the database and serves the API until shutdown.
pub async fn run() -> std::io::Result<()> {
    let settings = Settings::load().map_err(|e| std::io::Error::other(e.to_string()))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_level.as_str()));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let state = bootstrap(&settings)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let (host, port) = settings.bind_address();
    tracing::info!(%host, port, "Starting HTTP server");
    state.log("INFO", "Server", &format!("Listening on {}:{}", host, port));

    start_server(state, (host, port))?.await
}
