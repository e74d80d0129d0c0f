use crate::gateway::AuthHandler;
use crate::protocol::messages::ChannelAuthRequest;
use axum::{
    Json,
    body::Body,
    extract::{Request, State},
    http::{HeaderMap, Response, StatusCode, header},
    response::{IntoResponse, Response as AxumResponse},
};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, instrument, warn};

/// Upper bound on buffered auth request bodies.
pub const MAX_AUTH_BODY_BYTES: usize = 16 * 1024;

pub const HEALTH_READY_BODY: &str = "Pusher Auth Server is running!";
pub const HEALTH_DEGRADED_BODY: &str =
    "Pusher Auth Server is running, but signing credentials are not configured.";

// --- Custom Error Type ---

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Channel authorization is not configured")]
    ServiceUnavailable,
    #[error("Bad Request: socket_id and channel_name are required (missing: {})", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Request body larger than {0} bytes")]
    PayloadTooLarge(usize),
    #[error("Channel {0} cannot be authorized: only private- and presence- channels are signed")]
    ForbiddenChannel(String),
    #[error("{0}")]
    OriginNotAllowed(String),
    #[error("Internal Server Error during authentication.")]
    SigningFailed,
    #[error("HTTP Header Build Error: {0}")]
    HeaderBuildError(#[from] axum::http::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::MissingFields(_) | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::ForbiddenChannel(_) | AppError::OriginNotAllowed(_) => StatusCode::FORBIDDEN,
            AppError::SigningFailed | AppError::HeaderBuildError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> AxumResponse {
        let status = self.status_code();
        let error_message = match &self {
            // Header failures carry internal detail.
            AppError::HeaderBuildError(_) => json!({ "error": "Internal Server Error" }),
            _ => json!({ "error": self.to_string() }),
        };

        if status.is_server_error() {
            error!(error.message = %self, status_code = %status, "HTTP request failed");
        } else {
            warn!(error.message = %self, status_code = %status, "HTTP request rejected");
        }
        (status, Json(error_message)).into_response()
    }
}

// --- Helper Functions ---

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| {
            let mime = mime.trim();
            mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json")
        })
}

/// Decodes a JSON or form-encoded auth body. Anything not declared as JSON is
/// treated as `application/x-www-form-urlencoded`, which is what the client
/// libraries send by default.
pub fn parse_auth_request(headers: &HeaderMap, body: &[u8]) -> Result<ChannelAuthRequest, AppError> {
    if is_json(headers) {
        serde_json::from_slice(body)
            .map_err(|e| AppError::InvalidInput(format!("Malformed JSON body: {}", e)))
    } else {
        serde_urlencoded::from_bytes(body)
            .map_err(|e| AppError::InvalidInput(format!("Malformed form body: {}", e)))
    }
}

async fn read_body(body: Body) -> Result<Vec<u8>, AppError> {
    match Limited::new(body, MAX_AUTH_BODY_BYTES).collect().await {
        Ok(collected) => Ok(collected.to_bytes().to_vec()),
        Err(err) if err.is::<LengthLimitError>() => {
            Err(AppError::PayloadTooLarge(MAX_AUTH_BODY_BYTES))
        }
        Err(err) => {
            warn!("Failed to buffer channel auth body: {}", err);
            Err(AppError::InvalidInput(
                "Request body could not be read".to_string(),
            ))
        }
    }
}

// --- API Handlers ---

/// POST /pusher/auth
#[instrument(skip_all, fields(service = "channel_auth"))]
pub async fn channel_auth(
    State(handler): State<Arc<AuthHandler>>,
    request: Request,
) -> Result<impl IntoResponse, AppError> {
    // Unconfigured: refuse before touching the body.
    handler.signer()?;

    let (parts, body) = request.into_parts();
    let body_bytes = read_body(body).await?;
    let auth_request = parse_auth_request(&parts.headers, &body_bytes)?;

    let response = handler.authorize(&auth_request)?;
    Ok((StatusCode::OK, Json(response)))
}

/// GET /
#[instrument(skip_all, fields(service = "health_check"))]
pub async fn up(State(handler): State<Arc<AuthHandler>>) -> Result<impl IntoResponse, AppError> {
    let (status, health, body) = if handler.is_ready() {
        (StatusCode::OK, "OK", HEALTH_READY_BODY)
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "ERROR", HEALTH_DEGRADED_BODY)
    };
    // Polled by orchestrators; degraded state is warned once at start-up.
    debug!(status = %status, "Health check received");

    let response_val = Response::builder()
        .status(status)
        .header("X-Health-Check", health)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(body.to_string())?;

    Ok(response_val)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(content_type: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_str(content_type).unwrap());
        headers
    }

    #[test]
    fn test_parse_json_body() {
        let request = parse_auth_request(
            &headers("application/json; charset=utf-8"),
            br#"{"socket_id":"123.456","channel_name":"private-chat-1"}"#,
        )
        .unwrap();
        assert_eq!(request.socket_id.as_deref(), Some("123.456"));
        assert_eq!(request.channel_name.as_deref(), Some("private-chat-1"));
    }

    #[test]
    fn test_parse_form_body_without_content_type() {
        let request =
            parse_auth_request(&HeaderMap::new(), b"socket_id=1.2&channel_name=presence-x")
                .unwrap();
        assert_eq!(request.channel_name.as_deref(), Some("presence-x"));
    }

    #[test]
    fn test_malformed_json_is_bad_request() {
        let err = parse_auth_request(&headers("application/json"), b"{not json").unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = parse_auth_request(&headers("application/json"), br#"{"socket_id":12}"#)
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::ServiceUnavailable.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::MissingFields(vec!["socket_id"]).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::PayloadTooLarge(MAX_AUTH_BODY_BYTES).status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            AppError::ForbiddenChannel("public".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::SigningFailed.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_missing_fields_message_names_fields() {
        let message = AppError::MissingFields(vec!["socket_id", "channel_name"]).to_string();
        assert!(message.contains("missing: socket_id, channel_name"));
    }
}
