#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use sockudo_auth::app::auth::{ChannelSigner, PusherSigner};
use sockudo_auth::app::config::AppCredentials;
use sockudo_auth::error::{Error, Result};
use sockudo_auth::gateway::{AuthHandler, Readiness};
use sockudo_auth::options::CorsConfig;
use sockudo_auth::origin_validation::OriginPolicy;
use sockudo_auth::presence::{GuestMemberResolver, PresenceMember};
use sockudo_auth::protocol::messages::ChannelAuthResponse;
use sockudo_auth::server::configure_http_routes;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const APP_KEY: &str = "test-app-key";
pub const APP_SECRET: &str = "test-app-secret";

pub fn credentials() -> AppCredentials {
    AppCredentials::new(
        "test-app-id".to_string(),
        APP_KEY.to_string(),
        APP_SECRET.to_string(),
        "mt1".to_string(),
    )
}

/// Signer double that counts invocations and delegates to the real signer.
pub struct RecordingSigner {
    inner: PusherSigner,
    calls: AtomicUsize,
    fail: bool,
}

impl RecordingSigner {
    pub fn new() -> Self {
        Self {
            inner: PusherSigner::new(&credentials()),
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ChannelSigner for RecordingSigner {
    fn authorize_channel(
        &self,
        socket_id: &str,
        channel_name: &str,
        member: Option<&PresenceMember>,
    ) -> Result<ChannelAuthResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::Internal("secret-bearing failure detail".to_string()));
        }
        self.inner.authorize_channel(socket_id, channel_name, member)
    }
}

pub fn cors_config(origin: OriginPolicy) -> CorsConfig {
    CorsConfig {
        origin,
        ..CorsConfig::default()
    }
}

pub fn router_with_signer(signer: Arc<RecordingSigner>, origin: OriginPolicy) -> Router {
    let handler = AuthHandler::new(Readiness::Ready(signer), Arc::new(GuestMemberResolver));
    configure_http_routes(Arc::new(handler), &cors_config(origin))
}

pub fn degraded_router() -> Router {
    let handler = AuthHandler::new(
        Readiness::Degraded(vec!["PUSHER_APP_SECRET"]),
        Arc::new(GuestMemberResolver),
    );
    configure_http_routes(Arc::new(handler), &CorsConfig::default())
}

pub fn form_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/pusher/auth")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn json_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/pusher/auth")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}
