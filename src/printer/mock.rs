//! In-process printer double shared by the polling and service tests.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::watch;

use crate::{
    core::{errors::PrinterError, state::PrinterConfig},
    printer::{
        PrinterClient, PrinterType,
        factory::ClientFactory,
        models::{JobInfoResponse, JobProgress, TemperatureMap, TemperatureReading},
    },
};

#[derive(Default)]
struct Inner {
    job_state: Option<String>,
    completion: Option<f64>,
    temperatures: TemperatureMap,
    fail_job_info: bool,
    fail_temperatures: bool,
    fail_odd_polls: bool,
    fail_actions: bool,
    polls: usize,
    cancels: usize,
    pauses: usize,
    stop_after: Option<(usize, watch::Sender<bool>)>,
}

/// Scripted printer; clones share the same state and counters.
#[derive(Clone, Default)]
pub struct MockPrinter {
    inner: Arc<Mutex<Inner>>,
}

impl MockPrinter {
    pub fn with_state(job_state: &str) -> Self {
        let printer = Self::default();
        {
            let mut inner = printer.lock();
            inner.job_state = Some(job_state.to_string());
            inner.completion = Some(0.42);
            inner.temperatures.insert(
                "tool0".to_string(),
                TemperatureReading {
                    actual: 215.0,
                    target: Some(215.0),
                    offset: None,
                },
            );
            inner.temperatures.insert(
                "bed".to_string(),
                TemperatureReading {
                    actual: 59.5,
                    target: Some(60.0),
                    offset: None,
                },
            );
        }
        printer
    }

    pub fn printing() -> Self {
        Self::with_state("Printing")
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("mock printer lock poisoned")
    }

    pub fn fail_job_info(&self, fail: bool) {
        self.lock().fail_job_info = fail;
    }

    pub fn fail_temperatures(&self, fail: bool) {
        self.lock().fail_temperatures = fail;
    }

    /// Polls 1, 3, 5, ... fail at the temperature call.
    pub fn fail_odd_polls(&self) {
        self.lock().fail_odd_polls = true;
    }

    pub fn fail_actions(&self, fail: bool) {
        self.lock().fail_actions = fail;
    }

    pub fn set_temperatures_empty(&self) {
        self.lock().temperatures.clear();
    }

    /// Raises `stop_tx` once the printer has been polled `polls` times.
    pub fn stop_after_polls(&self, polls: usize, stop_tx: watch::Sender<bool>) {
        self.lock().stop_after = Some((polls, stop_tx));
    }

    pub fn polls(&self) -> usize {
        self.lock().polls
    }

    pub fn cancels(&self) -> usize {
        self.lock().cancels
    }

    pub fn pauses(&self) -> usize {
        self.lock().pauses
    }
}

pub struct MockClient {
    printer: MockPrinter,
    printer_type: PrinterType,
}

impl MockClient {
    pub fn new(printer: MockPrinter) -> Self {
        Self {
            printer,
            printer_type: PrinterType::OctoPrint,
        }
    }
}

#[async_trait]
impl PrinterClient for MockClient {
    fn printer_type(&self) -> PrinterType {
        self.printer_type
    }

    async fn get_job_info(&self) -> Result<JobInfoResponse, PrinterError> {
        let inner = self.printer.lock();
        if inner.fail_job_info {
            return Err(PrinterError::Data("no active job".to_string()));
        }
        Ok(JobInfoResponse {
            progress: JobProgress {
                completion: inner.completion,
                ..JobProgress::default()
            },
            state: inner.job_state.clone(),
            ..JobInfoResponse::default()
        })
    }

    async fn cancel_job(&self) -> Result<(), PrinterError> {
        let mut inner = self.printer.lock();
        if inner.fail_actions {
            return Err(PrinterError::Transport("status=500".to_string()));
        }
        inner.cancels += 1;
        Ok(())
    }

    async fn pause_job(&self) -> Result<(), PrinterError> {
        let mut inner = self.printer.lock();
        if inner.fail_actions {
            return Err(PrinterError::Transport("status=500".to_string()));
        }
        inner.pauses += 1;
        Ok(())
    }

    async fn get_printer_temperatures(&self) -> Result<TemperatureMap, PrinterError> {
        let mut inner = self.printer.lock();
        inner.polls += 1;
        let polls = inner.polls;
        if let Some((limit, stop_tx)) = &inner.stop_after {
            if polls >= *limit {
                let _ = stop_tx.send(true);
            }
        }

        if inner.fail_temperatures || (inner.fail_odd_polls && polls % 2 == 1) {
            return Err(PrinterError::Transport("connection refused".to_string()));
        }
        Ok(inner.temperatures.clone())
    }
}

/// Hands out clients bound to one shared [`MockPrinter`].
pub struct MockFactory {
    pub printer: MockPrinter,
}

impl ClientFactory for MockFactory {
    fn create(&self, config: &PrinterConfig) -> Result<Box<dyn PrinterClient>, PrinterError> {
        let printer_type = PrinterType::from_tag(config.printer_type.as_deref())?;
        Ok(Box::new(MockClient {
            printer: self.printer.clone(),
            printer_type,
        }))
    }
}
