use crate::error::{Error, Result};
use crate::gateway::AuthHandler;
use crate::http_handler::{channel_auth, up};
use crate::middleware::origin_guard_middleware;
use crate::options::{ConfigState, CorsConfig, ServerOptions};
use crate::origin_validation::OriginPolicy;
use crate::protocol::constants::AUTH_ENDPOINT_PATH;
use axum::Router;
use axum::http::header::HeaderName;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

/// Builds the tower-http layer that answers preflights and sets CORS headers.
pub fn build_cors_layer(cors: &CorsConfig) -> CorsLayer {
    let methods = cors
        .methods
        .iter()
        .filter_map(|s| match Method::from_str(s) {
            Ok(method) => Some(method),
            Err(_) => {
                warn!("CORS config: ignoring invalid method '{}'", s);
                None
            }
        })
        .collect::<Vec<_>>();
    let headers = cors
        .allowed_headers
        .iter()
        .filter_map(|s| match HeaderName::from_str(s) {
            Ok(name) => Some(name),
            Err(_) => {
                warn!("CORS config: ignoring invalid header '{}'", s);
                None
            }
        })
        .collect::<Vec<_>>();

    let cors_builder = CorsLayer::new()
        .allow_methods(methods)
        .allow_headers(headers);

    match &cors.origin {
        OriginPolicy::AllowAll => {
            if cors.credentials {
                warn!(
                    "CORS config: 'Access-Control-Allow-Credentials' was true but 'Access-Control-Allow-Origin' is '*'. Forcing credentials to false to comply with CORS specification."
                );
            }
            cors_builder
                .allow_origin(AllowOrigin::any())
                .allow_credentials(false)
        }
        OriginPolicy::AllowList(allowed) => {
            let origins = allowed
                .iter()
                .filter_map(|s| match s.parse::<HeaderValue>() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!("CORS config: ignoring unparsable origin '{}'", s);
                        None
                    }
                })
                .collect::<Vec<_>>();
            cors_builder
                .allow_origin(AllowOrigin::list(origins))
                .allow_credentials(cors.credentials)
        }
    }
}

/// Assembles the HTTP surface: health check, auth endpoint, origin guard and CORS.
pub fn configure_http_routes(handler: Arc<AuthHandler>, cors: &CorsConfig) -> Router {
    let policy = Arc::new(cors.origin.clone());

    Router::new()
        .route("/", get(up))
        .route(AUTH_ENDPOINT_PATH, post(channel_auth))
        .layer(build_cors_layer(cors))
        // Outermost, so preflights from denied origins are refused too.
        .layer(axum::middleware::from_fn_with_state(
            policy,
            origin_guard_middleware,
        ))
        .with_state(handler)
}

pub struct AuthServer {
    options: ServerOptions,
    handler: Arc<AuthHandler>,
}

impl AuthServer {
    pub fn new(options: ServerOptions, config: ConfigState) -> Self {
        match &config {
            ConfigState::Ready(credentials) => info!(
                "Signing grants for app {} (key {}) in cluster {}",
                credentials.id, credentials.key, credentials.cluster
            ),
            ConfigState::Degraded(missing) => warn!(
                "Signing credentials incomplete, missing: {}. Auth requests will return 503 until restarted with a complete environment.",
                missing.join(", ")
            ),
        }

        let handler = Arc::new(AuthHandler::from_config(&config));
        Self { options, handler }
    }

    fn get_http_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.options.host, self.options.port)
            .parse()
            .map_err(|e| {
                Error::Configuration(format!(
                    "Invalid listen address {}:{}: {}",
                    self.options.host, self.options.port, e
                ))
            })
    }

    pub fn router(&self) -> Router {
        configure_http_routes(self.handler.clone(), &self.options.cors)
    }

    pub async fn start(&self) -> Result<()> {
        let http_addr = self.get_http_addr()?;
        let http_listener = TcpListener::bind(http_addr).await?;

        info!("Pusher Auth Server listening on {}", http_addr);
        info!("Auth endpoint: {}", AUTH_ENDPOINT_PATH);

        axum::serve(
            http_listener,
            self.router()
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        if self.options.shutdown_grace_period > 0 {
            info!(
                "Waiting for shutdown grace period: {} seconds",
                self.options.shutdown_grace_period
            );
            tokio::time::sleep(Duration::from_secs(self.options.shutdown_grace_period)).await;
        }
        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received, starting graceful shutdown");
}
