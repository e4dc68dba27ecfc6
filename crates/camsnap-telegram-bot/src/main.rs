mod logging;

use camsnap_core::capture::{Camera, NokhwaCamera};
use camsnap_core::config::{config_path, Settings};
use camsnap_transport_telegram::runner::run_bot;
use dotenvy::dotenv;
use logging::TokenRedactor;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenv().ok();

    // Redaction must be ready before the first log line
    let redactor = Arc::new(TokenRedactor::new().map_err(|e| {
        eprintln!("Failed to compile token patterns: {e}");
        e
    })?);
    logging::init(redactor);

    info!("Starting camsnap bot...");

    let settings = init_settings();
    let camera: Arc<dyn Camera> = Arc::new(NokhwaCamera::new());

    run_bot(settings, camera).await;

    info!("Bot stopped.");
    Ok(())
}

fn init_settings() -> Arc<Settings> {
    let path = config_path();
    match Settings::load(&path) {
        Ok(settings) => {
            info!("Configuration loaded from {}.", path.display());
            Arc::new(settings)
        }
        Err(e) => {
            error!("Failed to load {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }
}
