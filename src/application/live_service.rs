// Live feed - per-client snapshots driven by the shared refresh timer
use crate::application::scheduler::{RefreshScheduler, Subscription, Tick, ViewScope};
use crate::application::state_actor::{LiveSnapshot, StateHandle};
use crate::domain::error::DashboardError;
use serde::Serialize;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

const FEED_BUFFER: usize = 8;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveMessage {
    /// Sent once when the client connects.
    Snapshot { snapshot: LiveSnapshot },
    Update { tick: Tick, snapshot: LiveSnapshot },
}

/// A connected client's message stream. Dropping it cancels the subscription.
pub struct LiveFeed {
    pub receiver: mpsc::Receiver<LiveMessage>,
    pub subscription: Subscription,
}

#[derive(Clone)]
pub struct LiveService {
    scheduler: Arc<RefreshScheduler>,
    state: StateHandle,
    next_client: Arc<AtomicU64>,
}

impl LiveService {
    pub fn new(scheduler: Arc<RefreshScheduler>, state: StateHandle) -> Self {
        Self {
            scheduler,
            state,
            next_client: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Registers the simulation step (device drift, random alerts, expiry)
    /// on the shared timer.
    pub fn mount_simulation(&self, scope: &mut ViewScope) {
        // Subscribe inside the closure so the old subscriber is gone first.
        scope.remount(|| {
            let state = self.state.clone();
            vec![self.scheduler.subscribe("simulation", move |tick| {
                let state = state.clone();
                async move {
                    match state.tick(tick).await {
                        Ok(report) => {
                            tracing::debug!(
                                "Tick {}: raised {:?}, resolved {}, evicted {}",
                                tick.seq,
                                report.raised,
                                report.resolved.len(),
                                report.evicted.len()
                            );
                            ControlFlow::Continue(())
                        }
                        Err(e) => {
                            tracing::error!("Simulation stopped: {}", e);
                            ControlFlow::Break(())
                        }
                    }
                }
            })]
        });
    }

    pub async fn open_feed(&self) -> Result<LiveFeed, DashboardError> {
        let (tx, receiver) = mpsc::channel(FEED_BUFFER);
        let client = self.next_client.fetch_add(1, Ordering::Relaxed);

        let snapshot = self.state.snapshot().await?;
        tx.send(LiveMessage::Snapshot { snapshot })
            .await
            .map_err(|_| DashboardError::Unavailable)?;

        let state = self.state.clone();
        let subscription = self.scheduler.subscribe(&format!("live-{client}"), move |tick| {
            let state = state.clone();
            let tx = tx.clone();
            async move {
                let snapshot = match state.snapshot().await {
                    Ok(snapshot) => snapshot,
                    Err(e) => {
                        tracing::warn!("Live feed {} closing: {}", client, e);
                        return ControlFlow::Break(());
                    }
                };
                match tx.send(LiveMessage::Update { tick, snapshot }).await {
                    Ok(()) => ControlFlow::Continue(()),
                    // Client disconnected
                    Err(_) => ControlFlow::Break(()),
                }
            }
        });

        tracing::debug!("Live feed {} opened", subscription.name());
        Ok(LiveFeed {
            receiver,
            subscription,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::state_actor::{DashboardState, StateActor};
    use crate::infrastructure::config::RefreshSettings;
    use chrono::Utc;
    use std::time::Duration;

    const PERIOD: Duration = Duration::from_secs(15);

    fn service(scheduler: Arc<RefreshScheduler>) -> LiveService {
        let settings = RefreshSettings {
            alert_probability: 0.0,
            ..RefreshSettings::default()
        };
        let (handle, _task) = StateActor::spawn(DashboardState::seeded(settings, 42, Utc::now()));
        LiveService::new(scheduler, handle)
    }

    async fn advance(duration: Duration) {
        tokio::time::sleep(duration).await;
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_feed_starts_with_snapshot_then_updates_per_tick() {
        let scheduler = Arc::new(RefreshScheduler::start(PERIOD));
        let live = service(scheduler.clone());
        let mut feed = live.open_feed().await.unwrap();

        assert!(matches!(feed.receiver.recv().await, Some(LiveMessage::Snapshot { .. })));

        advance(Duration::from_secs(16)).await;
        match feed.receiver.recv().await {
            Some(LiveMessage::Update { tick, snapshot }) => {
                assert_eq!(tick.seq, 1);
                assert_eq!(snapshot.alerts.total, 4);
            }
            other => panic!("expected an update, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_client_releases_its_subscription() {
        let scheduler = Arc::new(RefreshScheduler::start(PERIOD));
        let live = service(scheduler.clone());
        let feed = live.open_feed().await.unwrap();
        assert_eq!(scheduler.subscriber_count(), 1);

        drop(feed);
        advance(Duration::from_secs(1)).await;
        assert_eq!(scheduler.subscriber_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulation_records_last_tick() {
        let scheduler = Arc::new(RefreshScheduler::start(PERIOD));
        let live = service(scheduler.clone());
        let mut scope = ViewScope::new("test");
        live.mount_simulation(&mut scope);
        assert_eq!(scope.active(), 1);

        advance(Duration::from_secs(31)).await;
        let snapshot = live.state.snapshot().await.unwrap();
        assert_eq!(snapshot.last_tick.map(|t| t.seq), Some(2));

        scope.teardown();
        advance(Duration::from_secs(1)).await;
        assert_eq!(scheduler.subscriber_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remounted_simulation_steps_once_per_tick() {
        let scheduler = Arc::new(RefreshScheduler::start(PERIOD));
        let settings = RefreshSettings {
            alert_probability: 1.0,
            ..RefreshSettings::default()
        };
        let (handle, _task) = StateActor::spawn(DashboardState::seeded(settings, 42, Utc::now()));
        let live = LiveService::new(scheduler.clone(), handle);

        let mut scope = ViewScope::new("test");
        live.mount_simulation(&mut scope);
        live.mount_simulation(&mut scope);
        advance(Duration::from_secs(1)).await;
        assert_eq!(scope.active(), 1);
        assert_eq!(scheduler.subscriber_count(), 1);

        // Every step raises one alert, so a doubled step would show two.
        advance(Duration::from_secs(15)).await;
        let snapshot = live.state.snapshot().await.unwrap();
        assert_eq!(snapshot.last_tick.map(|t| t.seq), Some(1));
        assert_eq!(snapshot.alerts.total, 5);

        advance(Duration::from_secs(15)).await;
        let snapshot = live.state.snapshot().await.unwrap();
        assert_eq!(snapshot.alerts.total, 6);
    }
}
