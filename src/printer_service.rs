use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::{
    camera::{association, store::CameraStateStore},
    config::{ConfigStore, printer_polling_interval},
    core::{
        errors::{ConfigError, PrinterError},
        state::{AlertAction, CameraState, CameraStatus, PollingState, PrinterConfig},
    },
    polling::{PollingTask, registry::TaskRegistry, sink::StateSink},
    printer::{PrinterClient, factory::ClientFactory, models::PrinterState},
};

/// Ties cameras to their printers: configuration, background polling and
/// alert-driven pause/cancel.
pub struct PrinterService {
    cameras: Arc<dyn CameraStateStore>,
    config: Arc<dyn ConfigStore>,
    tasks: Arc<dyn TaskRegistry>,
    sink: Arc<dyn StateSink>,
    clients: Arc<dyn ClientFactory>,
}

impl PrinterService {
    pub fn new(
        cameras: Arc<dyn CameraStateStore>,
        config: Arc<dyn ConfigStore>,
        tasks: Arc<dyn TaskRegistry>,
        sink: Arc<dyn StateSink>,
        clients: Arc<dyn ClientFactory>,
    ) -> Self {
        Self {
            cameras,
            config,
            tasks,
            sink,
            clients,
        }
    }

    pub fn get_printer_config(&self, camera_uuid: &str) -> Option<PrinterConfig> {
        association::get_printer_config(self.cameras.as_ref(), camera_uuid)
    }

    pub fn get_printer_id(&self, camera_uuid: &str) -> Option<String> {
        association::get_printer_id(self.cameras.as_ref(), camera_uuid)
    }

    pub async fn set_printer(
        &self,
        camera_uuid: &str,
        printer_id: String,
        printer_config: PrinterConfig,
    ) -> Option<CameraState> {
        association::set_printer(self.cameras.as_ref(), camera_uuid, printer_id, printer_config)
            .await
    }

    /// Unlinks the printer and stops polling it.
    pub async fn remove_printer(&self, camera_uuid: &str) -> Option<CameraState> {
        self.stop_printer_state_polling(camera_uuid).await;
        association::remove_printer(self.cameras.as_ref(), camera_uuid).await
    }

    pub async fn camera_status(&self, camera_uuid: &str) -> CameraStatus {
        let state = self.cameras.get_camera_state(camera_uuid).unwrap_or_default();
        let polling = if self.tasks.is_polling(camera_uuid).await {
            PollingState::Polling
        } else {
            PollingState::Idle
        };
        CameraStatus {
            camera_uuid: camera_uuid.to_string(),
            printer_id: state.printer_id,
            printer_config: state.printer_config,
            polling,
        }
    }

    fn resolve_client(&self, camera_uuid: &str) -> Result<Box<dyn PrinterClient>, PrinterError> {
        let config = self
            .get_printer_config(camera_uuid)
            .ok_or_else(|| ConfigError::Missing(camera_uuid.to_string()))?;
        self.clients.create(&config)
    }

    /// Starts the background polling loop for a camera. Nothing is spawned
    /// when the camera has no usable printer config.
    pub async fn start_printer_state_polling(&self, camera_uuid: &str) -> Result<(), PrinterError> {
        let client = match self.resolve_client(camera_uuid) {
            Ok(client) => client,
            Err(err) => {
                match &err {
                    PrinterError::Config(ConfigError::Missing(_)) => {
                        warn!("no printer configuration found for camera {camera_uuid}")
                    }
                    _ => error!("cannot poll printer for camera {camera_uuid}: {err}"),
                }
                return Err(err);
            }
        };

        let interval = printer_polling_interval(&self.config.get_config());
        let printer_type = client.printer_type();
        let task = PollingTask::spawn(camera_uuid.to_string(), client, interval, self.sink.clone());
        self.tasks.add_polling_task(camera_uuid, task).await;
        info!(
            "started printer state polling for camera {camera_uuid} using {printer_type} every {}ms",
            interval.as_millis()
        );
        Ok(())
    }

    /// Returns whether a polling task was running.
    pub async fn stop_printer_state_polling(&self, camera_uuid: &str) -> bool {
        match self.tasks.remove_polling_task(camera_uuid).await {
            Some(task) => {
                task.stop().await;
                info!("stopped printer state polling for camera {camera_uuid}");
                true
            }
            None => false,
        }
    }

    pub async fn is_polling(&self, camera_uuid: &str) -> bool {
        self.tasks.is_polling(camera_uuid).await
    }

    /// One-off poll outside the background loop.
    pub async fn current_printer_state(&self, camera_uuid: &str) -> Result<PrinterState, PrinterError> {
        self.resolve_client(camera_uuid)?.get_printer_state().await
    }

    /// Pauses or cancels the running print. `true` when the action was applied
    /// or nothing was printing; every failure is logged and reported as `false`.
    pub async fn suspend_print_job(&self, camera_uuid: &str, action: AlertAction) -> bool {
        match self.try_suspend_print_job(camera_uuid, action).await {
            Ok(()) => true,
            Err(err) => {
                error!("error suspending print job for printer on camera {camera_uuid}: {err}");
                false
            }
        }
    }

    async fn try_suspend_print_job(
        &self,
        camera_uuid: &str,
        action: AlertAction,
    ) -> Result<(), PrinterError> {
        let client = self.resolve_client(camera_uuid)?;
        let job_info = client.get_job_info().await?;
        if !client.printer_type().is_printing(job_info.state.as_deref()) {
            debug!("no active print job to suspend for camera {camera_uuid}");
            return Ok(());
        }

        match action {
            AlertAction::CancelPrint => {
                client.cancel_job().await?;
                info!("print cancelled for printer on camera {camera_uuid}");
            }
            AlertAction::PausePrint => {
                client.pause_job().await?;
                info!("print paused for printer on camera {camera_uuid}");
            }
            AlertAction::Dismiss => {}
        }
        Ok(())
    }
}
