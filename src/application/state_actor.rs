// Single-writer owner of alerts, recommendations and the device fleet
use crate::application::fleet::{DeviceFleet, FleetSnapshot};
use crate::application::registry::{
    AlertCounts, AlertQuery, AlertRegistry, AlertView, RecommendationQuery, RecommendationRegistry,
    RecommendationSummary,
};
use crate::application::scheduler::Tick;
use crate::domain::alert::{Alert, AlertTemplate};
use crate::domain::device::Device;
use crate::domain::error::DashboardError;
use crate::domain::recommendation::Recommendation;
use crate::domain::record::RecordId;
use crate::infrastructure::catalog;
use crate::infrastructure::config::RefreshSettings;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

const COMMAND_BUFFER: usize = 64;
const LATEST_ALERTS: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct AlertFeed {
    pub alerts: Vec<Alert>,
    pub counts: AlertCounts,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationBoard {
    pub recommendations: Vec<Recommendation>,
    pub summary: RecommendationSummary,
}

/// What changed during one simulation tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub raised: Option<RecordId>,
    pub resolved: Vec<RecordId>,
    pub evicted: Vec<RecordId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LiveSnapshot {
    pub last_tick: Option<Tick>,
    pub fleet: FleetSnapshot,
    pub alerts: AlertCounts,
    pub latest_alerts: Vec<Alert>,
    pub recommendations: RecommendationSummary,
}

/// Mutable dashboard state. Only the actor task touches it.
pub struct DashboardState {
    alerts: AlertRegistry,
    recommendations: RecommendationRegistry,
    fleet: DeviceFleet,
    templates: Vec<AlertTemplate>,
    settings: RefreshSettings,
    rng: StdRng,
    last_tick: Option<Tick>,
}

impl DashboardState {
    pub fn new(settings: RefreshSettings, seed: u64, fleet: DeviceFleet, templates: Vec<AlertTemplate>) -> Self {
        Self {
            alerts: AlertRegistry::new(),
            recommendations: RecommendationRegistry::new(),
            fleet,
            templates,
            settings,
            rng: StdRng::seed_from_u64(seed),
            last_tick: None,
        }
    }

    /// State populated from the built-in catalog.
    pub fn seeded(settings: RefreshSettings, seed: u64, now: DateTime<Utc>) -> Self {
        let mut state = Self::new(
            settings,
            seed,
            DeviceFleet::new(catalog::devices()),
            catalog::alert_templates(),
        );
        for draft in catalog::seed_alerts(now) {
            state.alerts.add(draft);
        }
        for draft in catalog::seed_recommendations(now) {
            state.recommendations.add(draft);
        }
        tracing::info!(
            "Seeded {} alerts, {} recommendations and {} devices",
            state.alerts.len(),
            state.recommendations.len(),
            state.fleet.snapshot().devices.len()
        );
        state
    }

    pub fn alert_feed(&self, query: &AlertQuery) -> AlertFeed {
        AlertFeed {
            alerts: self.alerts.query(query).into_iter().cloned().collect(),
            counts: self.alerts.counts(),
        }
    }

    pub fn recommendation_board(&self, query: &RecommendationQuery) -> RecommendationBoard {
        RecommendationBoard {
            recommendations: self.recommendations.query(query).into_iter().cloned().collect(),
            summary: self.recommendations.summary(),
        }
    }

    pub fn generate_recommendation(&mut self, now: DateTime<Utc>) -> Recommendation {
        let recommendation = self.recommendations.add(catalog::generated_recommendation(now));
        tracing::info!("Generated recommendation {}", recommendation.id);
        recommendation.clone()
    }

    pub fn on_tick(&mut self, tick: Tick) -> TickReport {
        self.fleet.drift(&mut self.rng);

        let probability = self.settings.alert_probability.clamp(0.0, 1.0);
        let raised = if !self.templates.is_empty() && self.rng.gen_bool(probability) {
            let index = self.rng.gen_range(0..self.templates.len());
            let alert = self.alerts.add(self.templates[index].instantiate(tick.at));
            tracing::info!("Simulated alert {} raised: {}", alert.id, alert.title);
            Some(alert.id)
        } else {
            None
        };

        let ttl = Duration::seconds(self.settings.auto_resolve_secs);
        let resolved = self.alerts.sweep_resolved(tick.at, ttl);
        let evicted = self.alerts.trim_simulated(self.settings.alert_feed_capacity);
        self.last_tick = Some(tick);

        TickReport {
            raised,
            resolved,
            evicted,
        }
    }

    pub fn snapshot(&self) -> LiveSnapshot {
        LiveSnapshot {
            last_tick: self.last_tick,
            fleet: self.fleet.snapshot(),
            alerts: self.alerts.counts(),
            latest_alerts: self
                .alerts
                .query(&AlertQuery::view(AlertView::All))
                .into_iter()
                .take(LATEST_ALERTS)
                .cloned()
                .collect(),
            recommendations: self.recommendations.summary(),
        }
    }

    fn handle(&mut self, command: Command) {
        // A dropped reply receiver means the caller went away; nothing to do.
        match command {
            Command::Alerts { query, reply } => {
                let _ = reply.send(self.alert_feed(&query));
            }
            Command::GetAlert { id, reply } => {
                let _ = reply.send(self.alerts.get(id).cloned());
            }
            Command::MarkRead { id, reply } => {
                let _ = reply.send(self.alerts.mark_read(id).cloned());
            }
            Command::Archive { id, reply } => {
                let _ = reply.send(self.alerts.archive(id).cloned());
            }
            Command::Dismiss { id, reply } => {
                let _ = reply.send(self.alerts.remove(id));
            }
            Command::Recommendations { query, reply } => {
                let _ = reply.send(self.recommendation_board(&query));
            }
            Command::Generate { now, reply } => {
                let _ = reply.send(self.generate_recommendation(now));
            }
            Command::Advance { id, reply } => {
                let _ = reply.send(self.recommendations.advance_status(id).cloned());
            }
            Command::Devices { reply } => {
                let _ = reply.send(self.fleet.snapshot());
            }
            Command::Toggle { id, reply } => {
                let _ = reply.send(self.fleet.toggle(&id).cloned());
            }
            Command::Tick { tick, reply } => {
                let _ = reply.send(self.on_tick(tick));
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
        }
    }
}

enum Command {
    Alerts {
        query: AlertQuery,
        reply: oneshot::Sender<AlertFeed>,
    },
    GetAlert {
        id: RecordId,
        reply: oneshot::Sender<Result<Alert, DashboardError>>,
    },
    MarkRead {
        id: RecordId,
        reply: oneshot::Sender<Result<Alert, DashboardError>>,
    },
    Archive {
        id: RecordId,
        reply: oneshot::Sender<Result<Alert, DashboardError>>,
    },
    Dismiss {
        id: RecordId,
        reply: oneshot::Sender<Result<Alert, DashboardError>>,
    },
    Recommendations {
        query: RecommendationQuery,
        reply: oneshot::Sender<RecommendationBoard>,
    },
    Generate {
        now: DateTime<Utc>,
        reply: oneshot::Sender<Recommendation>,
    },
    Advance {
        id: RecordId,
        reply: oneshot::Sender<Result<Recommendation, DashboardError>>,
    },
    Devices {
        reply: oneshot::Sender<FleetSnapshot>,
    },
    Toggle {
        id: String,
        reply: oneshot::Sender<Result<Device, DashboardError>>,
    },
    Tick {
        tick: Tick,
        reply: oneshot::Sender<TickReport>,
    },
    Snapshot {
        reply: oneshot::Sender<LiveSnapshot>,
    },
}

pub struct StateActor;

impl StateActor {
    /// Moves `state` into its own task and returns the handle used to reach it.
    pub fn spawn(mut state: DashboardState) -> (StateHandle, JoinHandle<()>) {
        let (sender, mut receiver) = mpsc::channel(COMMAND_BUFFER);
        let task = tokio::spawn(async move {
            while let Some(command) = receiver.recv().await {
                state.handle(command);
            }
            tracing::debug!("State actor stopped");
        });
        (StateHandle { sender }, task)
    }
}

/// Cloneable entry point to the state actor. Every call fails with
/// `Unavailable` once the actor is gone.
#[derive(Clone)]
pub struct StateHandle {
    sender: mpsc::Sender<Command>,
}

impl StateHandle {
    async fn request<R>(&self, build: impl FnOnce(oneshot::Sender<R>) -> Command) -> Result<R, DashboardError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(build(reply))
            .await
            .map_err(|_| DashboardError::Unavailable)?;
        response.await.map_err(|_| DashboardError::Unavailable)
    }

    pub async fn alerts(&self, query: AlertQuery) -> Result<AlertFeed, DashboardError> {
        self.request(|reply| Command::Alerts { query, reply }).await
    }

    pub async fn alert(&self, id: RecordId) -> Result<Alert, DashboardError> {
        self.request(|reply| Command::GetAlert { id, reply }).await?
    }

    pub async fn mark_read(&self, id: RecordId) -> Result<Alert, DashboardError> {
        self.request(|reply| Command::MarkRead { id, reply }).await?
    }

    pub async fn archive(&self, id: RecordId) -> Result<Alert, DashboardError> {
        self.request(|reply| Command::Archive { id, reply }).await?
    }

    pub async fn dismiss(&self, id: RecordId) -> Result<Alert, DashboardError> {
        self.request(|reply| Command::Dismiss { id, reply }).await?
    }

    pub async fn recommendations(&self, query: RecommendationQuery) -> Result<RecommendationBoard, DashboardError> {
        self.request(|reply| Command::Recommendations { query, reply }).await
    }

    pub async fn generate_recommendation(&self) -> Result<Recommendation, DashboardError> {
        let now = Utc::now();
        self.request(|reply| Command::Generate { now, reply }).await
    }

    pub async fn advance_recommendation(&self, id: RecordId) -> Result<Recommendation, DashboardError> {
        self.request(|reply| Command::Advance { id, reply }).await?
    }

    pub async fn devices(&self) -> Result<FleetSnapshot, DashboardError> {
        self.request(|reply| Command::Devices { reply }).await
    }

    pub async fn toggle_device(&self, id: &str) -> Result<Device, DashboardError> {
        let id = id.to_string();
        self.request(|reply| Command::Toggle { id, reply }).await?
    }

    pub async fn tick(&self, tick: Tick) -> Result<TickReport, DashboardError> {
        self.request(|reply| Command::Tick { tick, reply }).await
    }

    pub async fn snapshot(&self) -> Result<LiveSnapshot, DashboardError> {
        self.request(|reply| Command::Snapshot { reply }).await
    }
}
