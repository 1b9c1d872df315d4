// Single refresh timer fanned out to per-view subscriptions
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

const TICK_BUFFER: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tick {
    pub seq: u64,
    pub at: DateTime<Utc>,
}

/// Owns the one interval timer for a refresh cycle.
///
/// Dropping the scheduler stops the timer; subscribers then see the channel
/// close and exit on their own.
pub struct RefreshScheduler {
    period: Duration,
    sender: broadcast::Sender<Tick>,
    timer: JoinHandle<()>,
}

impl RefreshScheduler {
    pub fn start(period: Duration) -> Self {
        let (sender, _) = broadcast::channel(TICK_BUFFER);
        let tx = sender.clone();

        let timer = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut seq = 0u64;
            loop {
                interval.tick().await;
                seq += 1;
                // Nobody listening is fine; views come and go.
                let _ = tx.send(Tick { seq, at: Utc::now() });
            }
        });

        tracing::info!("Refresh scheduler started with a {:?} period", period);
        Self {
            period,
            sender,
            timer,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Runs `callback` on every tick until it returns `Break`, the returned
    /// handle is cancelled or dropped, or the scheduler shuts down.
    pub fn subscribe<F, Fut>(&self, name: &str, mut callback: F) -> Subscription
    where
        F: FnMut(Tick) -> Fut + Send + 'static,
        Fut: Future<Output = ControlFlow<()>> + Send + 'static,
    {
        let mut rx = self.sender.subscribe();
        let task_name = name.to_string();

        let task = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(tick) => {
                        if callback(tick).await.is_break() {
                            tracing::debug!("Subscription {} finished", task_name);
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("Subscription {} skipped {} ticks", task_name, skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        tracing::debug!("Subscription {} mounted", name);
        Subscription {
            name: name.to_string(),
            task,
        }
    }

    pub fn shutdown(self) {
        tracing::info!("Refresh scheduler stopping");
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.timer.abort();
    }
}

/// Cancellation handle for one subscriber. Dropping it cancels the subscriber.
#[derive(Debug)]
pub struct Subscription {
    name: String,
    task: JoinHandle<()>,
}

impl Subscription {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cancel(self) {}

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if !self.task.is_finished() {
            tracing::debug!("Subscription {} cancelled", self.name);
        }
        self.task.abort();
    }
}

/// The subscriptions one view owns. Tearing the view down cancels all of
/// them before any replacement is mounted.
#[derive(Debug, Default)]
pub struct ViewScope {
    name: String,
    subscriptions: Vec<Subscription>,
}

impl ViewScope {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            subscriptions: Vec::new(),
        }
    }

    pub fn mount(&mut self, subscription: Subscription) {
        self.subscriptions.retain(|s| !s.is_finished());
        self.subscriptions.push(subscription);
    }

    pub fn active(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn teardown(&mut self) -> usize {
        let cancelled = self.subscriptions.len();
        for subscription in self.subscriptions.drain(..) {
            subscription.cancel();
        }
        if cancelled > 0 {
            tracing::debug!("View {} tore down {} subscriptions", self.name, cancelled);
        }
        cancelled
    }

    /// Tears down, then mounts whatever `build` creates.
    pub fn remount<F>(&mut self, build: F)
    where
        F: FnOnce() -> Vec<Subscription>,
    {
        self.teardown();
        self.subscriptions = build();
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const PERIOD: Duration = Duration::from_secs(15);

    fn counting(scheduler: &RefreshScheduler, name: &str) -> (Subscription, Arc<AtomicUsize>) {
        let counter = Arc::new(AtomicUsize::new(0));
        let seen = counter.clone();
        let subscription = scheduler.subscribe(name, move |_tick| {
            seen.fetch_add(1, Ordering::SeqCst);
            std::future::ready(ControlFlow::Continue(()))
        });
        (subscription, counter)
    }

    async fn advance(duration: Duration) {
        tokio::time::sleep(duration).await;
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_timer_fans_out_to_every_subscriber() {
        let scheduler = RefreshScheduler::start(PERIOD);
        let (_a, a_count) = counting(&scheduler, "a");
        let (_b, b_count) = counting(&scheduler, "b");
        assert_eq!(scheduler.subscriber_count(), 2);

        advance(Duration::from_secs(46)).await;
        assert_eq!(a_count.load(Ordering::SeqCst), 3);
        assert_eq!(b_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_are_sequenced() {
        let scheduler = RefreshScheduler::start(PERIOD);
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _sub = scheduler.subscribe("seq", move |tick| {
            if let Ok(mut seen) = sink.lock() {
                seen.push(tick.seq);
            }
            std::future::ready(ControlFlow::Continue(()))
        });

        advance(Duration::from_secs(31)).await;
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_subscription_stops_receiving() {
        let scheduler = RefreshScheduler::start(PERIOD);
        let (sub, count) = counting(&scheduler, "cancel-me");

        advance(Duration::from_secs(16)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        sub.cancel();
        advance(Duration::from_secs(45)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_break_ends_subscription() {
        let scheduler = RefreshScheduler::start(PERIOD);
        let counter = Arc::new(AtomicUsize::new(0));
        let seen = counter.clone();
        let sub = scheduler.subscribe("twice", move |_| {
            let n = seen.fetch_add(1, Ordering::SeqCst) + 1;
            std::future::ready(if n >= 2 { ControlFlow::Break(()) } else { ControlFlow::Continue(()) })
        });

        advance(Duration::from_secs(61)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert!(sub.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_view_scope_teardown_and_remount() {
        let scheduler = RefreshScheduler::start(PERIOD);
        let mut view = ViewScope::new("dashboard");
        let (first, first_count) = counting(&scheduler, "first");
        view.mount(first);
        assert_eq!(view.active(), 1);

        advance(Duration::from_secs(16)).await;
        assert_eq!(first_count.load(Ordering::SeqCst), 1);

        let second_count = Arc::new(AtomicUsize::new(0));
        let seen = second_count.clone();
        view.remount(|| {
            vec![scheduler.subscribe("second", move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
                std::future::ready(ControlFlow::Continue(()))
            })]
        });
        assert_eq!(view.active(), 1);

        advance(Duration::from_secs(15)).await;
        assert_eq!(first_count.load(Ordering::SeqCst), 1);
        assert_eq!(second_count.load(Ordering::SeqCst), 1);

        assert_eq!(view.teardown(), 1);
        advance(Duration::from_secs(30)).await;
        assert_eq!(second_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_closes_subscribers() {
        let scheduler = RefreshScheduler::start(PERIOD);
        let (sub, _count) = counting(&scheduler, "orphan");
        scheduler.shutdown();

        advance(Duration::from_secs(1)).await;
        assert!(sub.is_finished());
    }
}
