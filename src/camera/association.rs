//! Reading and writing the printer linked to a camera.

use crate::core::state::{CameraState, CameraStatePatch, PrinterConfig};

use super::store::CameraStateStore;

pub fn get_printer_config(store: &dyn CameraStateStore, camera_uuid: &str) -> Option<PrinterConfig> {
    store.get_camera_state(camera_uuid)?.printer_config
}

pub fn get_printer_id(store: &dyn CameraStateStore, camera_uuid: &str) -> Option<String> {
    store
        .get_camera_state(camera_uuid)?
        .printer_id
        .filter(|id| !id.is_empty())
}

pub async fn set_printer(
    store: &dyn CameraStateStore,
    camera_uuid: &str,
    printer_id: String,
    printer_config: PrinterConfig,
) -> Option<CameraState> {
    store
        .update_camera_state(
            camera_uuid,
            CameraStatePatch {
                printer_id: Some(Some(printer_id)),
                printer_config: Some(Some(printer_config)),
            },
        )
        .await
}

pub async fn remove_printer(store: &dyn CameraStateStore, camera_uuid: &str) -> Option<CameraState> {
    store
        .update_camera_state(
            camera_uuid,
            CameraStatePatch {
                printer_id: Some(None),
                printer_config: Some(None),
            },
        )
        .await
}
