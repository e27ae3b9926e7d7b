use reqwest::{Response, StatusCode};

use crate::core::errors::PrinterError;

pub const API_KEY_HEADER: &str = "X-Api-Key";

/// Printers are usually configured as a bare host ("octopi.local"); reqwest
/// needs a scheme.
pub fn normalize_base_url(base_url: &str) -> String {
    let trimmed = base_url.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}

pub async fn ensure_success(response: Response) -> Result<Response, PrinterError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let url = response.url().path().to_string();
    let body = response.text().await.unwrap_or_default();
    Err(PrinterError::Transport(format!(
        "{url} returned status={status} body={body}"
    )))
}

/// Control endpoints answer 204 on success; anything else must still be a 2xx.
pub async fn ensure_command_accepted(response: Response) -> Result<(), PrinterError> {
    if response.status() == StatusCode::NO_CONTENT {
        return Ok(());
    }
    ensure_success(response).await.map(|_| ())
}
