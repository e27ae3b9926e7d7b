pub mod registry;
pub mod sink;

use std::{sync::Arc, time::Duration};

use tokio::{sync::watch, task::JoinHandle, time::sleep};
use tracing::{info, warn};

use crate::printer::PrinterClient;

use sink::StateSink;

/// A running polling loop and the flag that stops it.
pub struct PollingTask {
    handle: JoinHandle<()>,
    stop_tx: watch::Sender<bool>,
}

impl PollingTask {
    pub fn spawn(
        camera_uuid: String,
        client: Box<dyn PrinterClient>,
        interval: Duration,
        sink: Arc<dyn StateSink>,
    ) -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            poll_printer_state(&camera_uuid, client.as_ref(), interval, stop_rx, sink.as_ref())
                .await;
            info!("printer state polling stopped for camera {camera_uuid}");
        });
        Self { handle, stop_tx }
    }

    pub fn signal_stop(&self) {
        let _ = self.stop_tx.send(true);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Signals the loop and waits for it to exit. An in-flight poll and the
    /// current sleep run to completion first.
    pub async fn stop(self) {
        self.signal_stop();
        if let Err(err) = self.handle.await {
            warn!("polling task ended abnormally: {err}");
        }
    }
}

/// Polls `client` until `stop_rx` turns true. The flag is checked once per
/// cycle, before the poll. Failed polls are logged and the cycle is skipped.
pub async fn poll_printer_state(
    camera_uuid: &str,
    client: &dyn PrinterClient,
    interval: Duration,
    stop_rx: watch::Receiver<bool>,
    sink: &dyn StateSink,
) {
    loop {
        let stopped = *stop_rx.borrow();
        if stopped {
            break;
        }

        match client.get_printer_state().await {
            Ok(state) => {
                if let Err(err) = sink.publish(camera_uuid, state).await {
                    warn!("failed to publish printer state for camera {camera_uuid}: {err:#}");
                }
            }
            Err(err) => warn!("error polling printer state for camera {camera_uuid}: {err}"),
        }

        sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    use async_trait::async_trait;
    use tokio::sync::watch;

    use super::{PollingTask, poll_printer_state, sink::StateSink};
    use crate::printer::{
        mock::{MockClient, MockPrinter},
        models::PrinterState,
    };

    /// Counts publishes; optionally raises a stop flag after `stop_after` of them.
    #[derive(Default)]
    pub struct CountingSink {
        pushes: AtomicUsize,
        stop: Option<(usize, watch::Sender<bool>)>,
    }

    impl CountingSink {
        pub fn stopping_after(pushes: usize, stop_tx: watch::Sender<bool>) -> Self {
            Self {
                pushes: AtomicUsize::new(0),
                stop: Some((pushes, stop_tx)),
            }
        }

        pub fn pushes(&self) -> usize {
            self.pushes.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StateSink for CountingSink {
        async fn publish(&self, _camera_uuid: &str, _state: PrinterState) -> anyhow::Result<()> {
            let pushes = self.pushes.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some((limit, stop_tx)) = &self.stop {
                if pushes >= *limit {
                    let _ = stop_tx.send(true);
                }
            }
            Ok(())
        }
    }

    struct FailingSink;

    #[async_trait]
    impl StateSink for FailingSink {
        async fn publish(&self, _camera_uuid: &str, _state: PrinterState) -> anyhow::Result<()> {
            anyhow::bail!("subscriber gone")
        }
    }

    const INTERVAL: Duration = Duration::from_secs(2);

    #[tokio::test(start_paused = true)]
    async fn stop_before_first_cycle_pushes_nothing() {
        let printer = MockPrinter::printing();
        let client = MockClient::new(printer.clone());
        let sink = CountingSink::default();
        let (_stop_tx, stop_rx) = watch::channel(true);

        poll_printer_state("cam-1", &client, INTERVAL, stop_rx, &sink).await;

        assert_eq!(sink.pushes(), 0);
        assert_eq!(printer.polls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn n_cycles_push_n_states() {
        let printer = MockPrinter::printing();
        let client = MockClient::new(printer.clone());
        let (stop_tx, stop_rx) = watch::channel(false);
        let sink = CountingSink::stopping_after(3, stop_tx);

        poll_printer_state("cam-1", &client, INTERVAL, stop_rx, &sink).await;

        assert_eq!(sink.pushes(), 3);
        assert_eq!(printer.polls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_polls_count_as_cycles_but_not_pushes() {
        let printer = MockPrinter::printing();
        printer.fail_odd_polls();
        let (stop_tx, stop_rx) = watch::channel(false);
        printer.stop_after_polls(4, stop_tx);
        let client = MockClient::new(printer.clone());
        let sink = CountingSink::default();

        poll_printer_state("cam-1", &client, INTERVAL, stop_rx, &sink).await;

        assert_eq!(printer.polls(), 4);
        assert_eq!(sink.pushes(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn sink_failures_do_not_end_the_loop() {
        let printer = MockPrinter::printing();
        let (stop_tx, stop_rx) = watch::channel(false);
        printer.stop_after_polls(3, stop_tx);
        let client = MockClient::new(printer.clone());

        poll_printer_state("cam-1", &client, INTERVAL, stop_rx, &FailingSink).await;

        assert_eq!(printer.polls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cycles_are_spaced_by_interval() {
        let printer = MockPrinter::printing();
        let (stop_tx, stop_rx) = watch::channel(false);
        printer.stop_after_polls(3, stop_tx);
        let client = MockClient::new(printer.clone());
        let sink = CountingSink::default();

        let started = tokio::time::Instant::now();
        poll_printer_state("cam-1", &client, INTERVAL, stop_rx, &sink).await;

        // Three polls, each followed by a full sleep.
        let elapsed = started.elapsed();
        assert!(elapsed >= INTERVAL * 3, "loop ran too fast: {elapsed:?}");
        assert!(elapsed < INTERVAL * 3 + Duration::from_millis(10));
    }

    #[tokio::test(start_paused = true)]
    async fn spawned_task_stops_on_request() {
        let printer = MockPrinter::printing();
        let sink = Arc::new(CountingSink::default());
        let task = PollingTask::spawn(
            "cam-1".to_string(),
            Box::new(MockClient::new(printer.clone())),
            INTERVAL,
            sink.clone(),
        );

        tokio::time::sleep(INTERVAL * 2 + Duration::from_millis(1)).await;
        assert!(!task.is_finished());
        task.stop().await;

        let pushes = sink.pushes();
        assert!(pushes >= 2, "expected at least two pushes, got {pushes}");
        tokio::time::sleep(INTERVAL * 5).await;
        assert_eq!(sink.pushes(), pushes, "no pushes after stop");
    }
}
