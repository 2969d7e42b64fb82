use crate::{metrics::SnapshotAssembler, report::Reporter};
use std::{
    future::Future,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::{info, warn};

/// "Tick in progress" flag shared between the timer and the running tick
#[derive(Debug, Clone, Default)]
pub struct TickGuard {
    busy: Arc<AtomicBool>,
}

impl TickGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the slot, or `None` while another tick holds it
    pub fn try_acquire(&self) -> Option<TickPermit> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| TickPermit {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn in_progress(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the tick slot when dropped
#[derive(Debug)]
pub struct TickPermit {
    busy: Arc<AtomicBool>,
}

impl Drop for TickPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Tick totals for one scheduler run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub completed: u64,
    pub failed: u64,
    pub skipped: u64,
}

#[derive(Debug, Default)]
struct Counters {
    completed: AtomicU64,
    failed: AtomicU64,
    skipped: AtomicU64,
}

impl Counters {
    fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
        }
    }
}

/// Fires the assembler on a fixed period, at most one tick at a time.
///
/// A timer fire that finds the previous tick still running is dropped, not
/// queued. A failed tick is reported and the next fire proceeds as usual.
pub struct Scheduler {
    assembler: Arc<SnapshotAssembler>,
    reporter: Arc<dyn Reporter>,
    period: Duration,
    max_ticks: Option<u64>,
    guard: TickGuard,
}

impl Scheduler {
    pub fn new(
        assembler: Arc<SnapshotAssembler>,
        reporter: Arc<dyn Reporter>,
        period: Duration,
    ) -> Self {
        Self {
            assembler,
            reporter,
            period,
            max_ticks: None,
            guard: TickGuard::new(),
        }
    }

    /// Stop once this many ticks have started and finished
    pub fn with_max_ticks(mut self, max_ticks: Option<u64>) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    pub fn guard(&self) -> &TickGuard {
        &self.guard
    }

    /// Runs until `shutdown` resolves or the tick limit is reached, then waits
    /// for the tick in flight.
    pub async fn run<F>(&self, shutdown: F) -> SchedulerStats
    where
        F: Future<Output = ()>,
    {
        let counters = Arc::new(Counters::default());
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut started = 0u64;
        let mut in_flight: Option<JoinHandle<()>> = None;
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                _ = interval.tick() => {
                    let Some(permit) = self.guard.try_acquire() else {
                        counters.skipped.fetch_add(1, Ordering::Relaxed);
                        warn!("Previous sample still running, skipping this tick");
                        continue;
                    };

                    started += 1;
                    in_flight = Some(tokio::spawn(run_tick(
                        started,
                        permit,
                        Arc::clone(&self.assembler),
                        Arc::clone(&self.reporter),
                        Arc::clone(&counters),
                    )));

                    if self.max_ticks.is_some_and(|max| started >= max) {
                        break;
                    }
                }
            }
        }

        if let Some(handle) = in_flight {
            if let Err(e) = handle.await {
                warn!("Sampling task ended abnormally: {e}");
            }
        }

        counters.stats()
    }
}

async fn run_tick(
    tick: u64,
    _permit: TickPermit,
    assembler: Arc<SnapshotAssembler>,
    reporter: Arc<dyn Reporter>,
    counters: Arc<Counters>,
) {
    match assembler.collect().await {
        Ok(snapshot) => {
            counters.completed.fetch_add(1, Ordering::Relaxed);
            info!(tick, host = %snapshot.host_name, "Sample complete");
            if let Err(e) = reporter.report(&snapshot) {
                warn!(tick, "Failed to report sample: {e}");
            }
        }
        Err(error) => {
            counters.failed.fetch_add(1, Ordering::Relaxed);
            warn!(tick, "Sample failed: {error}");
            if let Err(e) = reporter.report_failure(&error) {
                warn!(tick, "Failed to report sample failure: {e}");
            }
        }
    }
}
