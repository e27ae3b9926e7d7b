//! Local stand-ins for printer REST APIs.

use axum::{
    Router,
    http::{HeaderMap, StatusCode},
};
use tokio::net::TcpListener;

pub const TEST_API_KEY: &str = "test-key";

/// Serves `router` on an ephemeral port and returns its base URL (without scheme).
pub async fn spawn(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("test listener should bind");
    let addr = listener.local_addr().expect("listener should have an addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr.to_string()
}

pub fn check_api_key(headers: &HeaderMap) -> Result<(), StatusCode> {
    match headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
        Some(TEST_API_KEY) => Ok(()),
        _ => Err(StatusCode::FORBIDDEN),
    }
}
