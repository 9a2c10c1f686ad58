// ── Polling scheduler ──
//
// Periodic fleet refresh with at most one fetch in flight. Scheduled ticks
// that land while a fetch is outstanding are dropped; manual refreshes join
// the outstanding fetch. Fetches started before `stop()`/`suspend()` still
// run to completion, but an epoch check throws their result away, and a
// manual refresh waits them out and then fetches again.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use strum::Display;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::config::DEFAULT_POLL_INTERVAL;
use crate::error::{ConfigError, FetchError};
use crate::gateway::TowerGateway;
use crate::model::FleetSnapshot;
use crate::reconcile::{FleetUpdate, FleetView};

const EVENT_CHANNEL_SIZE: usize = 64;

/// Lifecycle of the periodic schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum PollState {
    Idle,
    Running,
    /// Stopped because the consumer went out of view; `resume()` restarts
    /// with the remembered interval.
    Suspended,
}

/// Broadcast to subscribers after each applied poll.
#[derive(Debug, Clone)]
pub enum PollEvent {
    /// Sent only when the diff has changes.
    Updated(Arc<FleetUpdate>),
    Failed(FetchError),
}

/// What happened to a fetch that completed.
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    Applied(Arc<FleetUpdate>),
    /// The schedule was stopped or suspended while the fetch was in flight.
    Discarded,
}

impl RefreshOutcome {
    pub fn update(&self) -> Option<&Arc<FleetUpdate>> {
        match self {
            Self::Applied(update) => Some(update),
            Self::Discarded => None,
        }
    }
}

pub type RefreshResult = Result<RefreshOutcome, FetchError>;

type InFlight = watch::Receiver<Option<RefreshResult>>;

/// How `begin_fetch` satisfied a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchStart {
    Started,
    Joined,
    /// The outstanding fetch began before the last halt and will be
    /// discarded.
    Stale,
}

/// Clears the in-flight slot when the fetch task ends, panics included.
struct ClearInFlight<'a, G>(&'a PollerInner<G>);

impl<G> Drop for ClearInFlight<'_, G> {
    fn drop(&mut self) {
        *lock(&self.0.in_flight) = None;
    }
}

struct LoopHandle {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl LoopHandle {
    async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            warn!(error = %e, "poll loop ended abnormally");
        }
    }
}

struct PollerInner<G> {
    gateway: Arc<G>,
    view: FleetView,
    state: watch::Sender<PollState>,
    interval: Mutex<Duration>,
    loop_task: tokio::sync::Mutex<Option<LoopHandle>>,
    /// Outstanding fetch and the epoch it started in.
    in_flight: Mutex<Option<(u64, InFlight)>>,
    epoch: AtomicU64,
    events: broadcast::Sender<PollEvent>,
}

/// Cancellable periodic poller feeding a [`FleetView`].
///
/// Cheaply cloneable; clones share the schedule, the view and the
/// in-flight slot.
pub struct Poller<G> {
    inner: Arc<PollerInner<G>>,
}

impl<G> Clone for Poller<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<G: TowerGateway> Poller<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        let (state, _) = watch::channel(PollState::Idle);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        Self {
            inner: Arc::new(PollerInner {
                gateway,
                view: FleetView::new(),
                state,
                interval: Mutex::new(DEFAULT_POLL_INTERVAL),
                loop_task: tokio::sync::Mutex::new(None),
                in_flight: Mutex::new(None),
                epoch: AtomicU64::new(0),
                events,
            }),
        }
    }

    // ── Schedule control ────────────────────────────────────────────

    /// Begin polling every `interval`. The first fetch happens one interval
    /// from now. An already running loop is shut down first.
    pub async fn start(&self, interval: Duration) -> Result<(), ConfigError> {
        if interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        *lock(&self.inner.interval) = interval;
        self.spawn_loop(interval).await;
        Ok(())
    }

    /// Cancel the schedule. An in-flight fetch finishes but is not applied.
    pub async fn stop(&self) {
        self.halt(PollState::Idle).await;
    }

    /// Like `stop()`, but `resume()` can pick the schedule back up.
    /// No-op unless running.
    pub async fn suspend(&self) {
        if self.state() == PollState::Running {
            self.halt(PollState::Suspended).await;
        }
    }

    /// Restart a suspended schedule and refresh immediately.
    ///
    /// Returns `None` when the poller was not suspended.
    pub async fn resume(&self) -> Option<RefreshResult> {
        if self.state() != PollState::Suspended {
            return None;
        }
        let interval = *lock(&self.inner.interval);
        self.spawn_loop(interval).await;
        Some(self.refresh_now().await)
    }

    async fn spawn_loop(&self, interval: Duration) {
        let mut slot = self.inner.loop_task.lock().await;
        if let Some(old) = slot.take() {
            old.shutdown().await;
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(poll_task(self.clone(), interval, cancel.clone()));
        *slot = Some(LoopHandle { cancel, handle });
        self.inner.state.send_replace(PollState::Running);
        debug!(interval_ms = interval.as_millis(), "polling started");
    }

    async fn halt(&self, next: PollState) {
        // Bump first so a fetch completing during shutdown is discarded.
        self.inner.epoch.fetch_add(1, Ordering::SeqCst);
        if let Some(old) = self.inner.loop_task.lock().await.take() {
            old.shutdown().await;
        }
        self.inner.state.send_replace(next);
        debug!(state = %next, "polling halted");
    }

    // ── Fetching ────────────────────────────────────────────────────

    /// Fetch now, independent of the schedule. Joins an outstanding fetch
    /// instead of starting a second one. A fetch left over from before the
    /// last `stop()`/`suspend()` is waited out, then a fresh one is made.
    pub async fn refresh_now(&self) -> RefreshResult {
        loop {
            let (rx, start) = self.begin_fetch();
            let result = wait_result(rx).await;
            if start != FetchStart::Stale {
                return result;
            }
            trace!("outstanding fetch predates the last halt, fetching again");
        }
    }

    /// Start a fetch unless one is outstanding. Returns the result channel
    /// and how the request was satisfied.
    fn begin_fetch(&self) -> (InFlight, FetchStart) {
        let epoch = self.inner.epoch.load(Ordering::SeqCst);
        let mut slot = lock(&self.inner.in_flight);
        if let Some((started_in, rx)) = slot.as_ref() {
            let start = if *started_in == epoch {
                FetchStart::Joined
            } else {
                FetchStart::Stale
            };
            return (rx.clone(), start);
        }

        let (tx, rx) = watch::channel(None);
        *slot = Some((epoch, rx.clone()));
        drop(slot);

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let clear = ClearInFlight(&inner);
            let fetched = inner.gateway.fetch_fleet().await;
            let result = inner.complete(epoch, fetched);
            // The slot must be free before waiters wake, so a retry after a
            // stale result starts a new fetch.
            drop(clear);
            tx.send_replace(Some(result));
        });

        (rx, FetchStart::Started)
    }

    pub fn is_fetching(&self) -> bool {
        lock(&self.inner.in_flight).is_some()
    }

    // ── Observers ───────────────────────────────────────────────────

    pub fn subscribe(&self) -> broadcast::Receiver<PollEvent> {
        self.inner.events.subscribe()
    }

    pub fn watch_state(&self) -> watch::Receiver<PollState> {
        self.inner.state.subscribe()
    }

    pub fn state(&self) -> PollState {
        *self.inner.state.borrow()
    }

    pub fn interval(&self) -> Duration {
        *lock(&self.inner.interval)
    }

    /// Last applied snapshot; empty until the first successful poll.
    pub fn current(&self) -> Arc<FleetSnapshot> {
        self.inner.view.current()
    }

    pub fn gateway(&self) -> &Arc<G> {
        &self.inner.gateway
    }
}

impl<G> PollerInner<G> {
    fn complete(&self, epoch: u64, fetched: Result<FleetSnapshot, FetchError>) -> RefreshResult {
        if self.epoch.load(Ordering::SeqCst) != epoch {
            debug!("discarding fetch started before the schedule was halted");
            return Ok(RefreshOutcome::Discarded);
        }

        match fetched {
            Ok(snapshot) => {
                let update = Arc::new(self.view.apply(snapshot));
                if update.diff.has_changes() {
                    let _ = self.events.send(PollEvent::Updated(Arc::clone(&update)));
                }
                Ok(RefreshOutcome::Applied(update))
            }
            Err(e) => {
                warn!(error = %e, "fleet poll failed");
                let _ = self.events.send(PollEvent::Failed(e.clone()));
                Err(e)
            }
        }
    }
}

async fn wait_result(mut rx: InFlight) -> RefreshResult {
    match rx.wait_for(Option::is_some).await {
        Ok(result) => result
            .clone()
            .unwrap_or_else(|| Err(FetchError::network("refresh produced no result"))),
        Err(_) => Err(FetchError::network("refresh task ended without a result")),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn poll_task<G: TowerGateway>(poller: Poller<G>, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                let (_, start) = poller.begin_fetch();
                if start != FetchStart::Started {
                    trace!("fetch in flight, skipping tick");
                }
            }
        }
    }
}
