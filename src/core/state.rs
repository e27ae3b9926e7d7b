use serde::{Deserialize, Serialize};

/// Connection details for the printer watched by a camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrinterConfig {
    /// Printer type tag. Configs saved before the tag existed leave it unset.
    #[serde(default)]
    pub printer_type: Option<String>,
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub name: String,
}

/// The printer-related part of a camera's persisted state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    pub printer_id: Option<String>,
    pub printer_config: Option<PrinterConfig>,
}

/// Partial update for a [`CameraState`]. `None` leaves a field untouched,
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct CameraStatePatch {
    pub printer_id: Option<Option<String>>,
    pub printer_config: Option<Option<PrinterConfig>>,
}

impl CameraState {
    pub fn apply(&mut self, patch: CameraStatePatch) {
        if let Some(printer_id) = patch.printer_id {
            self.printer_id = printer_id;
        }
        if let Some(printer_config) = patch.printer_config {
            self.printer_config = printer_config;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PollingState {
    Idle,
    Polling,
}

#[derive(Debug, Clone, Serialize)]
pub struct CameraStatus {
    pub camera_uuid: String,
    pub printer_id: Option<String>,
    pub printer_config: Option<PrinterConfig>,
    pub polling: PollingState,
}

/// What an alert asks us to do with the running print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertAction {
    CancelPrint,
    PausePrint,
    Dismiss,
}

impl AlertAction {
    /// Unknown tags resolve to [`AlertAction::Dismiss`], which leaves the print alone.
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim();
        if tag.eq_ignore_ascii_case("cancel_print") {
            Self::CancelPrint
        } else if tag.eq_ignore_ascii_case("pause_print") {
            Self::PausePrint
        } else {
            Self::Dismiss
        }
    }
}
