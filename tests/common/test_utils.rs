use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, Response},
};
use describe_proxy::{
    config::{Config, DEFAULT_MAX_BODY_BYTES, ProviderKind},
    server,
};
use secrecy::Secret;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

use super::mocks::MockProvider;

/// "hello" as a PNG data URI; the payload does not need to be a real image
pub const PNG_DATA_URI: &str = "data:image/png;base64,aGVsbG8=";

/// Build the router around a mock provider
pub fn create_test_app(provider: MockProvider) -> Router {
    create_test_app_with_limit(provider, DEFAULT_MAX_BODY_BYTES)
}

pub fn create_test_app_with_limit(provider: MockProvider, max_body_bytes: usize) -> Router {
    server::router(Arc::new(provider), max_body_bytes)
}

/// A syntactically valid PNG data URI whose payload is `payload_len` base64 chars
pub fn large_png_data_uri(payload_len: usize) -> String {
    format!("data:image/png;base64,{}", "A".repeat(payload_len))
}

/// REST provider configuration pointing at `base_url`
pub fn rest_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.provider.kind = ProviderKind::Rest;
    config.provider.base_url = base_url.to_string();
    config.provider.model = "@cf/llava-hf/llava-1.5-7b-hf".to_string();
    config.provider.account_id = Some("test-account".to_string());
    config.provider.api_token = Some(Secret::new("test-token".to_string()));
    config
}

/// Binding provider configuration pointing at `binding_url`
pub fn binding_config(binding_url: &str) -> Config {
    let mut config = Config::default();
    config.provider.kind = ProviderKind::Binding;
    config.provider.binding_url = Some(binding_url.to_string());
    config
}

pub async fn send(app: Router, method: Method, body: impl Into<Body>) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri("/")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();

    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, body: &Value) -> Response<Body> {
    send(app, Method::POST, body.to_string()).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub fn header<'a>(response: &'a Response<Body>, name: &str) -> Option<&'a str> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
}
