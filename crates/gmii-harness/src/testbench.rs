//! Async testbench: a free-running clock with cooperative waits.
//!
//! [`Testbench::start`] moves a [`World`] behind a mutex and spawns a clock
//! task that steps it once per period. Producer and consumer code talk to
//! the two ends through [`SourceHandle`] and [`SinkHandle`] and suspend with
//! `wait()` until the link reaches the state they need.
//!
//! # Wake-up
//!
//! - The clock task publishes the edge count on a `watch` channel after
//!   every step. [`SourceHandle::wait`] re-checks idleness on each edge.
//! - When the sink completes a frame, the clock task calls
//!   `Notify::notify_waiters`. [`SinkHandle::wait`] registers for that
//!   notification before it checks the queue, so a frame that lands between
//!   the check and the suspension still wakes it.
//! - Both waits report [`HarnessError::ClockStopped`] once the clock task is
//!   gone instead of hanging.
//!
//! # Time
//!
//! Wait timeouts are simulated time, counted in edges of the world's clock
//! period, so they match [`SimTime`](gmii_proto::SimTime) exactly for any
//! period. Tokio time only paces the clock task: it sleeps one period per
//! edge, and tokio rounds each sleep up to its timer resolution.
//!
//! The world lock is a `std::sync::Mutex` and is never held across an
//! `.await`.
//!
//! Under `#[tokio::test(start_paused = true)]` tokio time is virtual and the
//! clock advances only when every task is blocked, which makes runs
//! reproducible.

use std::{
    pin::pin,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use gmii_core::Occupancy;
use gmii_proto::GmiiFrame;
use tokio::{
    sync::{Notify, watch},
    task::JoinHandle,
};
use tracing::debug;

use crate::{error::HarnessError, world::World};

/// Outcome of a bounded wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The condition holds
    Ready,
    /// The timeout elapsed first
    TimedOut,
}

struct Shared {
    world: Mutex<World>,
    edges: watch::Receiver<u64>,
    rx_ready: Notify,
    period_ps: u64,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, World> {
        self.world.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resolve once `ready` holds, re-checking after every edge.
    async fn until_edge(&self, mut ready: impl FnMut(&World) -> bool) -> Result<(), HarnessError> {
        let mut edges = self.edges.clone();
        loop {
            edges.borrow_and_update();
            if ready(&self.lock()) {
                return Ok(());
            }
            edges.changed().await.map_err(|_| HarnessError::ClockStopped)?;
        }
    }

    /// Edges needed to cover `timeout` of simulated time, rounded up.
    fn edges_for(&self, timeout: Duration) -> u64 {
        let ps = timeout.as_nanos().saturating_mul(1_000);
        u64::try_from(ps.div_ceil(u128::from(self.period_ps.max(1)))).unwrap_or(u64::MAX)
    }

    /// Resolve with `TimedOut` once the clock reaches `deadline`, or with
    /// `ClockStopped` when the clock task goes away. Never resolves for a
    /// running clock without a deadline.
    async fn clock_watch(&self, deadline: Option<u64>) -> Result<WaitOutcome, HarnessError> {
        let mut edges = self.edges.clone();
        loop {
            edges.borrow_and_update();
            if deadline.is_some_and(|d| self.lock().cycle() >= d) {
                return Ok(WaitOutcome::TimedOut);
            }
            edges.changed().await.map_err(|_| HarnessError::ClockStopped)?;
        }
    }
}

/// Running simulation.
///
/// Dropping the testbench stops the clock.
pub struct Testbench {
    shared: Arc<Shared>,
    clock: JoinHandle<()>,
}

impl Testbench {
    /// Start clocking `world` on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn start(world: World) -> Self {
        let period_ps = world.config().clock_period_ps;
        let period = Duration::from_nanos(period_ps.div_ceil(1_000).max(1));
        let (edge_tx, edge_rx) = watch::channel(world.cycle());
        let shared = Arc::new(Shared {
            world: Mutex::new(world),
            edges: edge_rx,
            rx_ready: Notify::new(),
            period_ps,
        });

        let clock = tokio::spawn(run_clock(Arc::clone(&shared), edge_tx, period));
        Self { shared, clock }
    }

    /// Handle to the transmitting end.
    pub fn source(&self) -> SourceHandle {
        SourceHandle { shared: Arc::clone(&self.shared) }
    }

    /// Handle to the receiving end.
    pub fn sink(&self) -> SinkHandle {
        SinkHandle { shared: Arc::clone(&self.shared) }
    }

    /// Run `f` with exclusive access to the world, between edges.
    pub fn with_world<R>(&self, f: impl FnOnce(&mut World) -> R) -> R {
        f(&mut self.shared.lock())
    }

    /// Edges simulated so far.
    pub fn cycle(&self) -> u64 {
        self.shared.lock().cycle()
    }

    /// Drive the reset line; takes effect at the next edge.
    pub fn set_reset(&self, asserted: bool) {
        self.shared.lock().set_reset(asserted);
    }

    /// Drive the clock-enable line; `None` leaves it unwired.
    pub fn set_enable(&self, enable: Option<bool>) {
        self.shared.lock().set_enable(enable);
    }

    /// Wait for `n` more edges.
    ///
    /// # Errors
    ///
    /// `HarnessError::ClockStopped` if the clock task has gone away.
    pub async fn edges(&self, n: u64) -> Result<(), HarnessError> {
        let target = self.cycle() + n;
        self.shared.until_edge(|world| world.cycle() >= target).await
    }

    /// Standard reset sequence: low for two edges, high for two, low for
    /// two.
    ///
    /// # Errors
    ///
    /// `HarnessError::ClockStopped` if the clock task has gone away.
    pub async fn reset(&self) -> Result<(), HarnessError> {
        self.set_reset(false);
        self.edges(2).await?;
        self.set_reset(true);
        self.edges(2).await?;
        self.set_reset(false);
        self.edges(2).await
    }
}

impl Drop for Testbench {
    fn drop(&mut self) {
        self.clock.abort();
    }
}

async fn run_clock(shared: Arc<Shared>, edges: watch::Sender<u64>, period: Duration) {
    loop {
        tokio::time::sleep(period).await;
        let report = shared.lock().step();
        edges.send_replace(report.cycle);
        if let Some(event) = report.event {
            debug!(cycle = report.cycle, ?event, "waking sink waiters");
            shared.rx_ready.notify_waiters();
        }
    }
}

/// Handle to the source end of a running testbench.
#[derive(Clone)]
pub struct SourceHandle {
    shared: Arc<Shared>,
}

impl SourceHandle {
    /// Queue a frame. Never blocks.
    pub fn send(&self, frame: impl Into<GmiiFrame>) {
        self.shared.lock().source_mut().send(frame);
    }

    /// Frames waiting in the transmit queue.
    pub fn count(&self) -> usize {
        self.shared.lock().source().count()
    }

    /// True if the transmit queue is empty.
    pub fn is_empty(&self) -> bool {
        self.shared.lock().source().is_empty()
    }

    /// True if nothing is queued or being transmitted.
    pub fn is_idle(&self) -> bool {
        self.shared.lock().source().is_idle()
    }

    /// Transmit queue counters.
    pub fn queue_occupancy(&self) -> Occupancy {
        self.shared.lock().source().queue_occupancy()
    }

    /// Change the inter-frame gap.
    pub fn set_ifg(&self, ifg: u32) {
        self.shared.lock().source_mut().set_ifg(ifg);
    }

    /// Wait until the source is idle, checking at every edge.
    ///
    /// # Errors
    ///
    /// `HarnessError::ClockStopped` if the clock task has gone away.
    pub async fn wait(&self) -> Result<(), HarnessError> {
        self.shared.until_edge(|world| world.source().is_idle()).await
    }
}

/// Handle to the sink end of a running testbench.
#[derive(Clone)]
pub struct SinkHandle {
    shared: Arc<Shared>,
}

impl SinkHandle {
    /// Take the oldest received frame, if any.
    pub fn recv(&self) -> Option<GmiiFrame> {
        self.shared.lock().sink_mut().recv()
    }

    /// Frames waiting to be collected.
    pub fn count(&self) -> usize {
        self.shared.lock().sink().count()
    }

    /// True if no frame is waiting.
    pub fn is_empty(&self) -> bool {
        self.shared.lock().sink().is_empty()
    }

    /// True if no reception is in progress.
    pub fn is_idle(&self) -> bool {
        self.shared.lock().sink().is_idle()
    }

    /// Receive queue counters.
    pub fn queue_occupancy(&self) -> Occupancy {
        self.shared.lock().sink().queue_occupancy()
    }

    /// Wait until a frame is queued.
    ///
    /// `timeout` is simulated time. `None` or a zero timeout waits
    /// indefinitely. Returns immediately if a frame is already waiting. A
    /// timeout leaves the queue untouched.
    ///
    /// # Errors
    ///
    /// `HarnessError::ClockStopped` if the clock task has gone away.
    pub async fn wait(&self, timeout: Option<Duration>) -> Result<WaitOutcome, HarnessError> {
        let mut notified = pin!(self.shared.rx_ready.notified());
        notified.as_mut().enable();

        if !self.is_empty() {
            return Ok(WaitOutcome::Ready);
        }

        let deadline = timeout
            .filter(|t| !t.is_zero())
            .map(|t| self.shared.lock().cycle().saturating_add(self.shared.edges_for(t)));

        tokio::select! {
            biased;
            () = notified => Ok(WaitOutcome::Ready),
            outcome = self.shared.clock_watch(deadline) => outcome,
        }
    }

    /// Wait for a frame and take it.
    ///
    /// Returns `Ok(None)` if the timeout elapses first.
    ///
    /// # Errors
    ///
    /// `HarnessError::ClockStopped` if the clock task has gone away.
    pub async fn recv_timeout(
        &self,
        timeout: Option<Duration>,
    ) -> Result<Option<GmiiFrame>, HarnessError> {
        match self.wait(timeout).await? {
            WaitOutcome::Ready => Ok(self.recv()),
            WaitOutcome::TimedOut => Ok(None),
        }
    }
}
