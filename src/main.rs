use sockudo_auth::error::Result;
use sockudo_auth::options::{ConfigState, ServerOptions};
use sockudo_auth::server::AuthServer;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, util::SubscriberInitExt};

fn init_logging(debug: bool) {
    // RUST_LOG wins over both defaults.
    let default_log_directive_str = if debug {
        std::env::var("AUTH_LOG_DEBUG").unwrap_or_else(|_| "info,sockudo_auth=debug".to_string())
    } else {
        std::env::var("AUTH_LOG_PROD").unwrap_or_else(|_| "info".to_string())
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_directive_str));

    let subscriber_builder = fmt::Subscriber::builder().with_env_filter(env_filter);

    if debug {
        subscriber_builder
            .with_file(true)
            .with_line_number(true)
            .with_target(true)
            .finish()
            .init();
    } else {
        subscriber_builder.with_target(false).finish().init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let debug_mode = ServerOptions::debug_from_env();
    init_logging(debug_mode);
    info!("Logging initialized. Debug mode: {}", debug_mode);

    let options = ServerOptions::from_env();

    // Read once; the snapshot is never reloaded.
    let config = ConfigState::from_env();
    let server = AuthServer::new(options, config);

    if let Err(e) = server.start().await {
        error!("Server runtime error: {}", e);
        return Err(e);
    }

    info!("Server shutdown complete.");
    Ok(())
}
