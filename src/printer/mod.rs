pub mod factory;
mod http;
#[cfg(test)]
pub mod mock;
pub mod models;
pub mod octoprint;
pub mod prusalink;
#[cfg(test)]
pub mod test_server;

use std::{fmt, str::FromStr};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::errors::{ConfigError, PrinterError};

use models::{
    FileInfo, JobInfoResponse, NozzleBedTemps, PrinterState, PrinterTemperatures, TemperatureMap,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrinterType {
    OctoPrint,
    PrusaLink,
}

impl PrinterType {
    pub const ALL: [PrinterType; 2] = [PrinterType::OctoPrint, PrinterType::PrusaLink];

    pub fn tag(self) -> &'static str {
        match self {
            Self::OctoPrint => "octoprint",
            Self::PrusaLink => "prusalink",
        }
    }

    /// Resolves a stored type tag. Configs written before the tag existed
    /// carry none and were always OctoPrint.
    pub fn from_tag(tag: Option<&str>) -> Result<Self, ConfigError> {
        match tag.map(str::trim) {
            None | Some("") => Ok(Self::OctoPrint),
            Some(tag) => tag.parse(),
        }
    }

    /// Job states that mean a print is running, matched case-sensitively.
    pub fn printing_states(self) -> &'static [&'static str] {
        match self {
            Self::OctoPrint => &["Printing"],
            Self::PrusaLink => &["PRINTING"],
        }
    }

    pub fn is_printing(self, state: Option<&str>) -> bool {
        state.is_some_and(|state| self.printing_states().contains(&state))
    }
}

impl FromStr for PrinterType {
    type Err = ConfigError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|printer_type| printer_type.tag() == tag)
            .ok_or_else(|| ConfigError::UnsupportedType(tag.to_string()))
    }
}

impl fmt::Display for PrinterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Common surface over the printer REST APIs. Implementors provide the raw
/// calls; the derived views come for free.
#[async_trait]
pub trait PrinterClient: Send + Sync {
    fn printer_type(&self) -> PrinterType;

    async fn get_job_info(&self) -> Result<JobInfoResponse, PrinterError>;

    async fn cancel_job(&self) -> Result<(), PrinterError>;

    async fn pause_job(&self) -> Result<(), PrinterError>;

    /// Empty when the printer is busy and refuses to report (HTTP 409).
    async fn get_printer_temperatures(&self) -> Result<TemperatureMap, PrinterError>;

    async fn percent_complete(&self) -> Result<f64, PrinterError> {
        Ok(self.get_job_info().await?.percent_complete())
    }

    async fn current_file(&self) -> Result<FileInfo, PrinterError> {
        Ok(self.get_job_info().await?.file())
    }

    async fn nozzle_and_bed_temps(&self) -> Result<NozzleBedTemps, PrinterError> {
        let readings = self.get_printer_temperatures().await?;
        Ok(NozzleBedTemps::from_readings(&readings))
    }

    /// Temperature failures propagate; a failed job lookup only leaves
    /// `job_info_response` empty.
    async fn get_printer_state(&self) -> Result<PrinterState, PrinterError> {
        let readings = self.get_printer_temperatures().await?;
        let job_info_response = match self.get_job_info().await {
            Ok(job) => Some(job),
            Err(err) => {
                debug!("{} job info unavailable: {err}", self.printer_type());
                None
            }
        };

        Ok(PrinterState {
            job_info_response,
            temperature_reading: PrinterTemperatures::from_readings(&readings),
        })
    }
}

/// Human-readable temperatures and job progress, one line each. A printer
/// without a job still gets its temperature line.
pub async fn summary(client: &dyn PrinterClient) -> Result<String, PrinterError> {
    let temps = client.nozzle_and_bed_temps().await?;
    let mut text = format!(
        "nozzle {:.1}/{:.1} C, bed {:.1}/{:.1} C",
        temps.nozzle_actual, temps.nozzle_target, temps.bed_actual, temps.bed_target
    );
    match (client.percent_complete().await, client.current_file().await) {
        (Ok(percent), Ok(file)) => text.push_str(&format!(
            "\n{} at {percent:.1}%",
            file.name.as_deref().unwrap_or("unnamed job")
        )),
        (Err(err), _) | (_, Err(err)) => text.push_str(&format!("\nno job: {err}")),
    }
    Ok(text)
}
