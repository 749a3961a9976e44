use anyhow::Result;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use replybot::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    init_tracing();

    info!("Starting AI reply Telegram bot");

    let config = Config::from_env().inspect_err(|e| {
        error!(error = %e, "Failed to load configuration");
    })?;

    replybot::bot::run(config).await
}

/// `RUST_LOG` filters output (default `info`); `LOG_FORMAT=json` switches to JSON lines
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));
    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
