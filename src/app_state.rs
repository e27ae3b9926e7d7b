use std::sync::Arc;

use crate::{
    camera::store::InMemoryCameraStore,
    config::{AppConfig, ConfigStore, JsonFileConfigStore, SavedConfig, StaticConfigStore},
    polling::{registry::PollingRegistry, sink::BroadcastSink},
    printer::factory::RegisteredClients,
    printer_service::PrinterService,
};

const STATE_UPDATE_CAPACITY: usize = 64;

pub struct AppState {
    pub config: AppConfig,
    pub printers: PrinterService,
    pub cameras: Arc<InMemoryCameraStore>,
    pub tasks: Arc<PollingRegistry>,
    pub updates: Arc<BroadcastSink>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let saved_config: Arc<dyn ConfigStore> = match &config.saved_config_path {
            Some(path) => Arc::new(JsonFileConfigStore::new(path)),
            None => {
                let store = StaticConfigStore::new();
                if let Some(ms) = config.printer_polling_rate_ms {
                    store.set(SavedConfig::PrinterStatPollingRateMs, ms.into());
                }
                Arc::new(store)
            }
        };
        let cameras = Arc::new(InMemoryCameraStore::new());
        let tasks = Arc::new(PollingRegistry::new());
        let updates = Arc::new(BroadcastSink::new(STATE_UPDATE_CAPACITY));

        let printers = PrinterService::new(
            cameras.clone(),
            saved_config,
            tasks.clone(),
            updates.clone(),
            Arc::new(RegisteredClients),
        );

        Self {
            config,
            printers,
            cameras,
            tasks,
            updates,
        }
    }

    pub async fn shutdown(&self) {
        self.tasks.stop_all().await;
    }
}
