use std::{
    collections::HashMap,
    env,
    net::SocketAddr,
    path::PathBuf,
    sync::RwLock,
    time::Duration,
};

use anyhow::Context;
use serde_json::{Map, Value};
use tracing::warn;

/// Default pause between two printer polls.
pub const PRINTER_STAT_POLLING_RATE_MS: u64 = 2000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app_name: String,
    pub bind_addr: SocketAddr,
    pub api_token: Option<String>,
    pub log_dir: PathBuf,
    pub log_debug: bool,
    pub saved_config_path: Option<PathBuf>,
    /// Seeds the in-memory saved config when no config file is used.
    pub printer_polling_rate_ms: Option<u64>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let app_name = env::var("APP_NAME").unwrap_or_else(|_| "printlink".to_owned());
        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_owned())
            .parse()
            .context("BIND_ADDR is not a socket address")?;
        let api_token = env::var("API_TOKEN")
            .ok()
            .filter(|value| !value.trim().is_empty());
        let log_dir = env::var("LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("logs"));
        let log_debug = env::var("LOG_DEBUG")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let saved_config_path = env::var("SAVED_CONFIG_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);
        let printer_polling_rate_ms = match env::var("PRINTER_STAT_POLLING_RATE_MS") {
            Ok(value) => Some(
                value
                    .trim()
                    .parse::<u64>()
                    .context("PRINTER_STAT_POLLING_RATE_MS must be a whole number of milliseconds")?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            app_name,
            bind_addr,
            api_token,
            log_dir,
            log_debug,
            saved_config_path,
            printer_polling_rate_ms,
        })
    }
}

/// Keys of the user-editable saved config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavedConfig {
    PrinterStatPollingRateMs,
}

impl SavedConfig {
    pub fn key(self) -> &'static str {
        match self {
            Self::PrinterStatPollingRateMs => "printer_stat_polling_rate_ms",
        }
    }
}

/// Source of the saved config map.
pub trait ConfigStore: Send + Sync {
    fn get_config(&self) -> Map<String, Value>;
}

/// Config held in memory, editable at runtime.
#[derive(Debug, Default)]
pub struct StaticConfigStore {
    values: RwLock<HashMap<String, Value>>,
}

impl StaticConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: SavedConfig, value: Value) {
        if let Ok(mut values) = self.values.write() {
            values.insert(key.key().to_string(), value);
        }
    }
}

impl ConfigStore for StaticConfigStore {
    fn get_config(&self) -> Map<String, Value> {
        match self.values.read() {
            Ok(values) => values
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
            Err(_) => Map::new(),
        }
    }
}

/// Config read from a JSON object file on every lookup, so edits apply to
/// the next polling task without a restart.
#[derive(Debug, Clone)]
pub struct JsonFileConfigStore {
    path: PathBuf,
}

impl JsonFileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> anyhow::Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("{} is not a JSON object", self.path.display()))
    }
}

impl ConfigStore for JsonFileConfigStore {
    fn get_config(&self) -> Map<String, Value> {
        self.load().unwrap_or_else(|err| {
            warn!("ignoring saved config: {err:#}");
            Map::new()
        })
    }
}

/// Polling interval from the saved config, accepting numbers or numeric
/// strings. Missing, non-positive or out-of-range values use the default.
pub fn printer_polling_interval(config: &Map<String, Value>) -> Duration {
    let default = Duration::from_millis(PRINTER_STAT_POLLING_RATE_MS);
    let Some(value) = config.get(SavedConfig::PrinterStatPollingRateMs.key()) else {
        return default;
    };
    let interval = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|ms| *ms > 0.0)
    .and_then(|ms| Duration::try_from_secs_f64(ms / 1000.0).ok());

    interval.unwrap_or_else(|| {
        warn!("invalid printer_stat_polling_rate_ms {value}, using {PRINTER_STAT_POLLING_RATE_MS} ms");
        default
    })
}
