//! Driver spawns and manages the cooperative dashboard tasks

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, sleep};
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::animation::{run_idle_animation, run_redline_flash, run_startup_sweep};
use crate::dashboard::{Dashboard, DashboardSnapshot, PacketOutcome, SharedDashboard};
use crate::gauge::IdleEntry;
use crate::provider::{MAX_PACKET_SIZE, PacketSource};
use crate::render::GaugeRenderer;

/// Delay between receive attempts, whether or not a packet arrived.
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Pause after a failed receive before polling again.
pub const RECEIVE_BACKOFF: Duration = Duration::from_secs(1);

/// Handle to the running dashboard tasks.
///
/// Dropping the handle cancels every task it started.
pub struct DriverHandle<R> {
    dashboard: SharedDashboard<R>,
    status: watch::Receiver<DashboardSnapshot>,
    cancel: CancellationToken,
}

impl<R: GaugeRenderer + 'static> DriverHandle<R> {
    pub fn dashboard(&self) -> &SharedDashboard<R> {
        &self.dashboard
    }

    /// Latest published status.
    pub fn snapshot(&self) -> DashboardSnapshot {
        self.status.borrow().clone()
    }

    /// Status after every packet or mode change, as a stream.
    pub fn status_updates(&self) -> impl futures::Stream<Item = DashboardSnapshot> + use<R> {
        WatchStream::new(self.status.clone())
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled()
    }
}

impl<R> Drop for DriverHandle<R> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Driver spawns the polling loop and the redline flash loop
///
/// Must be called from within a `tokio::task::LocalSet`: the tasks share the
/// dashboard through `Rc<RefCell<_>>` and run on the current thread only.
pub struct Driver;

impl Driver {
    /// Spawn driver tasks for `source` feeding `dashboard`.
    pub fn spawn<S, R>(source: S, dashboard: Dashboard<R>) -> DriverHandle<R>
    where
        S: PacketSource,
        R: GaugeRenderer + 'static,
    {
        let startup_sweep = dashboard.config().startup_sweep;
        let dashboard = Rc::new(RefCell::new(dashboard));
        let (status_tx, status_rx) = watch::channel(dashboard.borrow().snapshot());
        let cancel = CancellationToken::new();

        tokio::task::spawn_local(Self::poll_task(
            source,
            Rc::clone(&dashboard),
            status_tx,
            startup_sweep,
            cancel.clone(),
        ));
        tokio::task::spawn_local(run_redline_flash(Rc::clone(&dashboard), cancel.clone()));

        DriverHandle { dashboard, status: status_rx, cancel }
    }

    /// Polling task - receives packets, feeds the dashboard and watches for silence
    async fn poll_task<S, R>(
        mut source: S,
        dashboard: SharedDashboard<R>,
        status_tx: watch::Sender<DashboardSnapshot>,
        startup_sweep: bool,
        cancel: CancellationToken,
    ) where
        S: PacketSource,
        R: GaugeRenderer + 'static,
    {
        if startup_sweep {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = run_startup_sweep(Rc::clone(&dashboard), 1) => {}
            }
        }

        let entry = dashboard.borrow_mut().begin_idle();
        Self::start_idle_episode(&dashboard, entry, &cancel);
        publish(&status_tx, &dashboard);

        info!("Polling loop started");
        let mut buf = vec![0u8; MAX_PACKET_SIZE];
        let mut packet_count = 0u64;
        let mut error_count = 0u64;

        loop {
            if cancel.is_cancelled() {
                break;
            }

            let mut changed = false;
            let mut backoff = false;

            match source.try_recv(&mut buf) {
                Ok(Some(len)) => {
                    packet_count += 1;
                    let outcome = dashboard.borrow_mut().handle_packet(&buf[..len], Instant::now());
                    match outcome {
                        PacketOutcome::Applied(_) => changed = true,
                        PacketOutcome::Unrecognized => trace!(len, "Unrecognized packet"),
                        PacketOutcome::Skipped(_) => {}
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    error_count += 1;
                    warn!(errors = error_count, "Packet receive failed: {}", e);
                    backoff = true;
                }
            }

            let idle = dashboard.borrow_mut().tick(Instant::now());
            if let Some(entry) = idle {
                Self::start_idle_episode(&dashboard, entry, &cancel);
                changed = true;
            }

            if changed {
                publish(&status_tx, &dashboard);
            }

            let pause = if backoff { RECEIVE_BACKOFF } else { POLL_INTERVAL };
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = sleep(pause) => {}
            }
        }

        info!(packets = packet_count, errors = error_count, "Polling loop stopped");
    }

    fn start_idle_episode<R>(
        dashboard: &SharedDashboard<R>,
        entry: IdleEntry,
        cancel: &CancellationToken,
    ) where
        R: GaugeRenderer + 'static,
    {
        if !entry.animate {
            debug!(episode = entry.episode, "Idle animation disabled");
            return;
        }
        tokio::task::spawn_local(run_idle_animation(
            Rc::clone(dashboard),
            entry.episode,
            cancel.clone(),
        ));
    }
}

fn publish<R: GaugeRenderer>(
    status_tx: &watch::Sender<DashboardSnapshot>,
    dashboard: &SharedDashboard<R>,
) {
    let snapshot = dashboard.borrow().snapshot();
    status_tx.send_if_modified(|current| {
        if *current == snapshot {
            false
        } else {
            *current = snapshot;
            true
        }
    });
}
