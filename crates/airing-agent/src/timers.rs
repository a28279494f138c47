use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerName {
    RefreshWatchlist,
    CheckNotifications,
}

impl TimerName {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerName::RefreshWatchlist => "refresh-watchlist",
            TimerName::CheckNotifications => "check-notifications",
        }
    }
}

impl fmt::Display for TimerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type CycleFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
type CycleRunner = Arc<dyn Fn(TimerName) -> CycleFuture + Send + Sync>;

fn periodic(period: Duration) -> Interval {
    let period = period.max(Duration::from_millis(1));
    // First firing is one full period after arming
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

/// One task per timer. The next tick is awaited only after the cycle returns,
/// so cycles of the same timer never overlap.
fn spawn_driver(name: TimerName, period: Duration, run: CycleRunner) -> JoinHandle<()> {
    let mut interval = periodic(period);
    tokio::spawn(async move {
        loop {
            interval.tick().await;
            run(name).await;
        }
    })
}

/// The two named periodic triggers, each driven by its own task.
///
/// A slow refresh cycle never holds back a notification check. Dropping the
/// value (or calling [`Timers::shutdown`]) cancels both drivers.
pub struct Timers {
    run: CycleRunner,
    refresh: JoinHandle<()>,
    notify: JoinHandle<()>,
}

impl Timers {
    pub fn arm<F, Fut>(refresh_period: Duration, notify_period: Duration, run: F) -> Self
    where
        F: Fn(TimerName) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let run: CycleRunner =
            Arc::new(move |name: TimerName| -> CycleFuture { Box::pin(run(name)) });
        Self::spawn(run, refresh_period, notify_period)
    }

    fn spawn(run: CycleRunner, refresh_period: Duration, notify_period: Duration) -> Self {
        tracing::info!(
            refresh_secs = refresh_period.as_secs(),
            notify_secs = notify_period.as_secs(),
            "Timers armed"
        );
        Self {
            refresh: spawn_driver(TimerName::RefreshWatchlist, refresh_period, run.clone()),
            notify: spawn_driver(TimerName::CheckNotifications, notify_period, run.clone()),
            run,
        }
    }

    /// Drop both registrations and arm fresh ones.
    pub fn rearm(&mut self, refresh_period: Duration, notify_period: Duration) {
        let run = self.run.clone();
        *self = Self::spawn(run, refresh_period, notify_period);
    }

    /// Stop both drivers. A cycle in flight is cancelled at its next await point.
    pub fn shutdown(self) {
        tracing::info!("Timers stopped");
    }
}

impl Drop for Timers {
    fn drop(&mut self) {
        self.refresh.abort();
        self.notify.abort();
    }
}
