use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::Value;

use crate::core::errors::PrinterError;

use super::{
    PrinterClient, PrinterType,
    http::{API_KEY_HEADER, ensure_command_accepted, ensure_success, normalize_base_url},
    models::{JobInfoResponse, TemperatureMap, TemperatureReading},
};

#[derive(Serialize)]
struct JobCommand<'a> {
    command: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    action: Option<&'a str>,
}

/// OctoPrint's `/api/job` already has the shared job shape, so it is only
/// decoded, never reshaped.
#[derive(Clone)]
pub struct OctoPrintClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl OctoPrintClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            api_key: api_key.to_string(),
            client: Client::new(),
        }
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(format!("{}{path}", self.base_url))
            .header(API_KEY_HEADER, &self.api_key)
    }

    async fn send_job_command(&self, command: JobCommand<'_>) -> Result<(), PrinterError> {
        let response = self
            .client
            .post(format!("{}/api/job", self.base_url))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&command)
            .send()
            .await?;
        ensure_command_accepted(response).await
    }
}

#[async_trait]
impl PrinterClient for OctoPrintClient {
    fn printer_type(&self) -> PrinterType {
        PrinterType::OctoPrint
    }

    async fn get_job_info(&self) -> Result<JobInfoResponse, PrinterError> {
        let response = ensure_success(self.get("/api/job").send().await?).await?;
        Ok(response.json().await?)
    }

    async fn cancel_job(&self) -> Result<(), PrinterError> {
        self.send_job_command(JobCommand {
            command: "cancel",
            action: None,
        })
        .await
    }

    async fn pause_job(&self) -> Result<(), PrinterError> {
        self.send_job_command(JobCommand {
            command: "pause",
            action: Some("pause"),
        })
        .await
    }

    async fn get_printer_temperatures(&self) -> Result<TemperatureMap, PrinterError> {
        let response = self.get("/api/printer").send().await?;
        if response.status() == StatusCode::CONFLICT {
            return Ok(TemperatureMap::new());
        }
        let body: Value = ensure_success(response).await?.json().await?;
        Ok(TemperatureReading::collect(&body["temperature"]))
    }
}
