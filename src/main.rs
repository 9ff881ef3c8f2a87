use std::process::ExitCode;

use tracing::{error, info};

use sharebox::{Config, WebServer};

const CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> ExitCode {
    let mut config = match Config::load(CONFIG_PATH) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {CONFIG_PATH}: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };
    config.apply_env_overrides();

    if let Err(e) = sharebox::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        sharebox::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = config.validate() {
        error!("{e}");
        return ExitCode::FAILURE;
    }

    info!("Sharebox - tenant file storage with share links");
    info!(
        root = %config.storage.root_path,
        "Server configured on {}:{}",
        config.server.host,
        config.server.port
    );

    let server = match WebServer::new(&config) {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to start: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = server.run().await {
        error!("Web server error: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
