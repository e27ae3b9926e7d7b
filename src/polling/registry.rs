use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use super::PollingTask;

/// Tracks the polling task of every camera. At most one task per camera.
#[async_trait]
pub trait TaskRegistry: Send + Sync {
    /// Registers `task`, stopping any task the camera already had.
    async fn add_polling_task(&self, camera_uuid: &str, task: PollingTask);

    async fn remove_polling_task(&self, camera_uuid: &str) -> Option<PollingTask>;

    async fn is_polling(&self, camera_uuid: &str) -> bool;
}

#[derive(Default)]
pub struct PollingRegistry {
    tasks: Mutex<HashMap<String, PollingTask>>,
}

impl PollingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops every task; used on shutdown.
    pub async fn stop_all(&self) {
        let tasks: Vec<(String, PollingTask)> = self.tasks.lock().await.drain().collect();
        for (camera_uuid, task) in tasks {
            task.stop().await;
            info!("stopped polling for camera {camera_uuid}");
        }
    }
}

#[async_trait]
impl TaskRegistry for PollingRegistry {
    async fn add_polling_task(&self, camera_uuid: &str, task: PollingTask) {
        let previous = self
            .tasks
            .lock()
            .await
            .insert(camera_uuid.to_string(), task);

        if let Some(previous) = previous {
            info!("replacing polling task for camera {camera_uuid}");
            previous.stop().await;
        }
    }

    async fn remove_polling_task(&self, camera_uuid: &str) -> Option<PollingTask> {
        self.tasks.lock().await.remove(camera_uuid)
    }

    async fn is_polling(&self, camera_uuid: &str) -> bool {
        self.tasks
            .lock()
            .await
            .get(camera_uuid)
            .is_some_and(|task| !task.is_finished())
    }
}
