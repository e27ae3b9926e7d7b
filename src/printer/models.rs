//! Printer-agnostic job and temperature model shared by every protocol client.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Component name ("tool0", "bed", ...) to its latest reading.
pub type TemperatureMap = BTreeMap<String, TemperatureReading>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobProgress {
    /// Fraction of the job done, 0.0 to 1.0.
    pub completion: Option<f64>,
    /// Seconds, kept as the printer reported them.
    #[serde(rename = "printTime")]
    pub print_time: Option<Number>,
    #[serde(rename = "printTimeLeft")]
    pub print_time_left: Option<Number>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobInfoResponse {
    #[serde(default)]
    pub job: Map<String, Value>,
    #[serde(default)]
    pub progress: JobProgress,
    pub state: Option<String>,
}

impl JobInfoResponse {
    pub fn percent_complete(&self) -> f64 {
        self.progress
            .completion
            .map(|completion| completion * 100.0)
            .unwrap_or(0.0)
    }

    pub fn file(&self) -> FileInfo {
        self.job
            .get("file")
            .and_then(|file| serde_json::from_value(file.clone()).ok())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    pub name: Option<String>,
    pub origin: Option<String>,
    pub size: Option<u64>,
    pub date: Option<i64>,
    pub display: Option<String>,
    pub path: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureReading {
    pub actual: f64,
    #[serde(default)]
    pub target: Option<f64>,
    #[serde(default)]
    pub offset: Option<f64>,
}

impl TemperatureReading {
    /// Collects every `{actual, ...}` entry of a `temperature` object. Anything
    /// else living next to the components (history, unparsable entries) is skipped.
    pub fn collect(block: &Value) -> TemperatureMap {
        let Some(entries) = block.as_object() else {
            return TemperatureMap::new();
        };

        entries
            .iter()
            .filter(|(_, value)| value.get("actual").is_some_and(Value::is_number))
            .filter_map(|(name, value)| {
                serde_json::from_value::<TemperatureReading>(value.clone())
                    .ok()
                    .map(|reading| (name.clone(), reading))
            })
            .collect()
    }
}

/// Nozzle and bed readings, absent when the printer did not report them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PrinterTemperatures {
    pub nozzle_actual: Option<f64>,
    pub nozzle_target: Option<f64>,
    pub bed_actual: Option<f64>,
    pub bed_target: Option<f64>,
}

impl PrinterTemperatures {
    pub fn from_readings(readings: &TemperatureMap) -> Self {
        let tool0 = readings.get("tool0");
        let bed = readings.get("bed");
        Self {
            nozzle_actual: tool0.map(|t| t.actual),
            nozzle_target: tool0.and_then(|t| t.target),
            bed_actual: bed.map(|b| b.actual),
            bed_target: bed.and_then(|b| b.target),
        }
    }
}

/// Zero-defaulted nozzle/bed summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NozzleBedTemps {
    pub nozzle_actual: f64,
    pub nozzle_target: f64,
    pub bed_actual: f64,
    pub bed_target: f64,
}

impl NozzleBedTemps {
    pub fn from_readings(readings: &TemperatureMap) -> Self {
        if readings.is_empty() {
            return Self::default();
        }
        let temps = PrinterTemperatures::from_readings(readings);
        Self {
            nozzle_actual: temps.nozzle_actual.unwrap_or(0.0),
            nozzle_target: temps.nozzle_target.unwrap_or(0.0),
            bed_actual: temps.bed_actual.unwrap_or(0.0),
            bed_target: temps.bed_target.unwrap_or(0.0),
        }
    }
}

/// One snapshot of a printer, as published to subscribers on every poll.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrinterState {
    #[serde(rename = "jobInfoResponse")]
    pub job_info_response: Option<JobInfoResponse>,
    #[serde(rename = "temperatureReading")]
    pub temperature_reading: PrinterTemperatures,
}
