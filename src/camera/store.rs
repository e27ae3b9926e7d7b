use std::{collections::HashMap, sync::RwLock};

use async_trait::async_trait;
use tracing::warn;

use crate::core::state::{CameraState, CameraStatePatch};

/// Where camera state lives. Reads are synchronous; writes may hit storage.
#[async_trait]
pub trait CameraStateStore: Send + Sync {
    fn get_camera_state(&self, camera_uuid: &str) -> Option<CameraState>;

    /// Applies `patch` and returns the updated state, or `None` if the write failed.
    async fn update_camera_state(
        &self,
        camera_uuid: &str,
        patch: CameraStatePatch,
    ) -> Option<CameraState>;
}

#[derive(Debug, Default)]
pub struct InMemoryCameraStore {
    cameras: RwLock<HashMap<String, CameraState>>,
}

impl InMemoryCameraStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn camera_uuids(&self) -> Vec<String> {
        match self.cameras.read() {
            Ok(cameras) => {
                let mut uuids: Vec<String> = cameras.keys().cloned().collect();
                uuids.sort();
                uuids
            }
            Err(_) => Vec::new(),
        }
    }
}

#[async_trait]
impl CameraStateStore for InMemoryCameraStore {
    fn get_camera_state(&self, camera_uuid: &str) -> Option<CameraState> {
        let cameras = self.cameras.read().ok()?;
        cameras.get(camera_uuid).cloned()
    }

    async fn update_camera_state(
        &self,
        camera_uuid: &str,
        patch: CameraStatePatch,
    ) -> Option<CameraState> {
        let Ok(mut cameras) = self.cameras.write() else {
            warn!("camera store lock poisoned; dropping update for {camera_uuid}");
            return None;
        };
        let state = cameras.entry(camera_uuid.to_string()).or_default();
        state.apply(patch);
        Some(state.clone())
    }
}
