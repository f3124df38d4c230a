//! Background polling — periodic refresh for the lifetime of a device.
//!
//! Connectivity failures are expected in normal operation: the loop logs
//! them and retries on the next scheduled tick. Everything else is logged
//! loudly, since it is either a configuration problem or a defect in the
//! lock discipline, but the loop keeps running so a recovered device shows
//! up again without a restart.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use chillhub_domain::error::DeviceError;

use crate::coordinator::DeviceCoordinator;
use crate::ports::DeviceTransport;

/// Handle to a running poll task.
///
/// Dropping the handle without calling [`shutdown`](Self::shutdown) leaves
/// the task running; teardown must go through `shutdown` so the task exits
/// at a clean point, never mid-conversation and never holding the IO lock.
#[derive(Debug)]
pub struct PollHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Stop the poll loop and wait for it to exit.
    pub async fn shutdown(self) {
        // Receiver side only goes away when the task exits, so the send can
        // only fail after the loop has already stopped.
        let _ = self.stop.send(true);
        let _ = self.task.await;
    }

    /// Whether the poll task is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

/// Spawn a task that refreshes `coordinator` every `interval`.
///
/// The first tick fires one full interval after start; setup has already
/// populated the cache, so an immediate refresh would be redundant.
#[must_use]
pub fn start<T>(coordinator: DeviceCoordinator<T>, interval: Duration) -> PollHandle
where
    T: DeviceTransport + 'static,
{
    let (stop, mut stopped) = watch::channel(false);
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // interval() fires immediately; consume that tick.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = stopped.changed() => break,
                _ = ticker.tick() => poll_once(&coordinator).await,
            }
        }
        tracing::debug!("poll loop stopped");
    });

    PollHandle { stop, task }
}

async fn poll_once<T: DeviceTransport>(coordinator: &DeviceCoordinator<T>) {
    match coordinator.refresh().await {
        Ok(()) => {}
        Err(err) if err.is_retryable() => {
            tracing::warn!(%err, "background refresh failed, retrying next tick");
        }
        Err(err @ DeviceError::ConcurrencyViolation) => {
            tracing::error!(%err, "lock discipline breached during background refresh");
        }
        Err(err) => {
            tracing::error!(%err, reason = err.reason(), "background refresh failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chillhub_domain::capability::CapabilitySet;
    use chillhub_domain::device::Credentials;
    use chillhub_domain::state::DeviceState;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Clone, Default)]
    struct CountingTransport {
        reads: Arc<AtomicU32>,
        failures: Arc<AtomicU32>,
    }

    impl DeviceTransport for CountingTransport {
        async fn connect(&self) -> Result<(), DeviceError> {
            Ok(())
        }

        async fn authenticate(&self, _credentials: &Credentials) -> Result<(), DeviceError> {
            Ok(())
        }

        async fn read_state(&self) -> Result<DeviceState, DeviceError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if self.failures.load(Ordering::SeqCst) > 0 {
                self.failures.fetch_sub(1, Ordering::SeqCst);
                return Err(chillhub_domain::error::ConnectivityError::Timeout.into());
            }
            Ok(DeviceState::default())
        }

        async fn write_state(&self, state: &DeviceState) -> Result<DeviceState, DeviceError> {
            Ok(state.clone())
        }

        async fn read_capabilities(&self) -> Result<CapabilitySet, DeviceError> {
            Ok(CapabilitySet::default())
        }

        fn is_online(&self) -> bool {
            true
        }

        fn is_supported(&self) -> bool {
            true
        }
    }

    fn coordinator(transport: CountingTransport) -> DeviceCoordinator<CountingTransport> {
        DeviceCoordinator::new(transport, CapabilitySet::default(), DeviceState::default())
    }

    #[tokio::test(start_paused = true)]
    async fn should_refresh_on_every_tick() {
        let transport = CountingTransport::default();
        let handle = start(coordinator(transport.clone()), Duration::from_secs(30));

        tokio::time::sleep(Duration::from_secs(95)).await;
        handle.shutdown().await;

        assert_eq!(transport.reads.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn should_not_refresh_before_first_interval() {
        let transport = CountingTransport::default();
        let handle = start(coordinator(transport.clone()), Duration::from_secs(30));

        tokio::time::sleep(Duration::from_secs(10)).await;
        handle.shutdown().await;

        assert_eq!(transport.reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn should_keep_polling_after_connectivity_failure() {
        let transport = CountingTransport::default();
        transport.failures.store(1, Ordering::SeqCst);
        let handle = start(coordinator(transport.clone()), Duration::from_secs(30));

        tokio::time::sleep(Duration::from_secs(95)).await;
        handle.shutdown().await;

        // First tick fails, the two after it still run.
        assert_eq!(transport.reads.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn should_stop_cleanly_on_shutdown() {
        let transport = CountingTransport::default();
        let coordinator = coordinator(transport.clone());
        let handle = start(coordinator.clone(), Duration::from_secs(30));

        tokio::time::sleep(Duration::from_secs(35)).await;
        assert!(handle.is_running());
        handle.shutdown().await;

        // The lock is free after teardown: an on-demand refresh goes through.
        coordinator.refresh().await.unwrap();
        assert_eq!(transport.reads.load(Ordering::SeqCst), 2);
    }
}
