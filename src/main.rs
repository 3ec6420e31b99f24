use std::sync::Arc;

use tracing::{error, info};

use flock::web::{AppState, WebServer};
use flock::Config;

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load_with_env("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = flock::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        flock::logging::init_console_only(&config.logging.level);
    }

    info!("flock - playlists from subreddits");
    info!("Feed API at {}", config.feed.base_url);

    let state = match AppState::from_config(&config) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            error!("Failed to set up services: {}", e);
            std::process::exit(1);
        }
    };

    let server = match WebServer::new(&config.web, state) {
        Ok(server) => server,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run().await {
        error!("Web server error: {}", e);
        std::process::exit(1);
    }
}
