use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{Map, Number, Value};

use crate::core::errors::PrinterError;

use super::{
    PrinterClient, PrinterType,
    http::{API_KEY_HEADER, ensure_command_accepted, ensure_success, normalize_base_url},
    models::{JobInfoResponse, JobProgress, TemperatureMap, TemperatureReading},
};

/// PrusaLink (v1 API). Job data is split across `/api/v1/status` (progress,
/// printer state) and `/api/v1/job` (file details), so every job lookup merges
/// the two.
#[derive(Clone)]
pub struct PrusaLinkClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl PrusaLinkClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            api_key: api_key.to_string(),
            client: Client::new(),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{path}", self.base_url))
            .header(API_KEY_HEADER, &self.api_key)
    }

    async fn get_json(&self, path: &str) -> Result<Value, PrinterError> {
        let response = self.request(reqwest::Method::GET, path).send().await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    /// `None` when no job is loaded (PrusaLink answers 204).
    async fn current_job(&self) -> Result<Option<Value>, PrinterError> {
        let response = self
            .request(reqwest::Method::GET, "/api/v1/job")
            .send()
            .await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        Ok(Some(ensure_success(response).await?.json().await?))
    }

    async fn current_job_id(&self) -> Result<u64, PrinterError> {
        let job = self
            .current_job()
            .await?
            .ok_or_else(|| PrinterError::Data("no active job".to_string()))?;
        job_body(&job)
            .get("id")
            .and_then(Value::as_u64)
            .ok_or_else(|| PrinterError::Data("job response has no id".to_string()))
    }
}

/// Older firmware wraps the job in a `job` key; current firmware returns it flat.
fn job_body(job: &Value) -> &Value {
    match job.get("job") {
        Some(inner) if inner.is_object() => inner,
        _ => job,
    }
}

fn number(value: Option<&Value>) -> Option<Number> {
    match value {
        Some(Value::Number(n)) => Some(n.clone()),
        _ => None,
    }
}

fn merge_job_info(status: &Value, job: Option<&Value>) -> Result<JobInfoResponse, PrinterError> {
    let progress = status
        .get("job")
        .filter(|job| job.is_object())
        .ok_or_else(|| PrinterError::Data("status response has no active job".to_string()))?;

    let details: Map<String, Value> = job
        .map(job_body)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    Ok(JobInfoResponse {
        job: details,
        progress: JobProgress {
            completion: progress.get("progress").and_then(Value::as_f64),
            print_time: number(progress.get("time_printing")),
            print_time_left: number(progress.get("time_remaining")),
        },
        state: status["printer"]["state"].as_str().map(str::to_string),
    })
}

#[async_trait]
impl PrinterClient for PrusaLinkClient {
    fn printer_type(&self) -> PrinterType {
        PrinterType::PrusaLink
    }

    async fn get_job_info(&self) -> Result<JobInfoResponse, PrinterError> {
        let status = self.get_json("/api/v1/status").await?;
        let job = self.current_job().await?;
        merge_job_info(&status, job.as_ref())
    }

    async fn cancel_job(&self) -> Result<(), PrinterError> {
        let id = self.current_job_id().await?;
        let response = self
            .request(reqwest::Method::DELETE, &format!("/api/v1/job/{id}"))
            .send()
            .await?;
        ensure_command_accepted(response).await
    }

    async fn pause_job(&self) -> Result<(), PrinterError> {
        let id = self.current_job_id().await?;
        let response = self
            .request(reqwest::Method::PUT, &format!("/api/v1/job/{id}/pause"))
            .send()
            .await?;
        ensure_command_accepted(response).await
    }

    async fn get_printer_temperatures(&self) -> Result<TemperatureMap, PrinterError> {
        let response = self
            .request(reqwest::Method::GET, "/api/printer")
            .send()
            .await?;
        if response.status() == StatusCode::CONFLICT {
            return Ok(TemperatureMap::new());
        }
        let body: Value = ensure_success(response).await?.json().await?;
        Ok(TemperatureReading::collect(&body["temperature"]))
    }
}
