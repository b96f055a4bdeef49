use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use model::config::{
    AUTO_REROUTE_SCORE_THRESHOLD, DEFAULT_POLL_INTERVAL, DETECTION_RADIUS_KM,
    NOTIFICATION_THROTTLE, REROUTE_IMPROVEMENT_FACTOR, ROUTE_BUFFER_KM,
};
use model::{Incident, LocalMoment, RouteAnalysis, RouteRequest};
use scoring::{score_route, select_best, IncidentStore, RoutePlanner};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, timeout, Duration, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::dispatcher::{AlertKind, NotificationDispatcher, TrafficAlert};

#[derive(Copy, Clone, Debug)]
pub struct MonitorConfig {
    pub poll_interval: Duration,
    pub notification_throttle: Duration,
    pub auto_reroute: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            notification_throttle: NOTIFICATION_THROTTLE,
            auto_reroute: false,
        }
    }
}

struct SessionState {
    known_incident_ids: HashSet<String>,
    last_notification_at: Option<Instant>,
}

struct SessionContext {
    request: RouteRequest,
    route: Mutex<RouteAnalysis>,
    state: Mutex<SessionState>,
    planner: Arc<RoutePlanner>,
    store: Arc<dyn IncidentStore>,
    dispatcher: Arc<NotificationDispatcher>,
    config: MonitorConfig,
}

/// Background watcher for one actively followed route.
///
/// One tokio task per session polls the incident store around the current
/// route geometry, raises throttled alerts for incidents it has not seen
/// before, and optionally swaps the route for a clearly better
/// alternative. `stop` is explicit; no tick fires after it returns.
pub struct MonitoringSession {
    ctx: Arc<SessionContext>,
    shutdown_tx: watch::Sender<bool>,
    poll_task: Option<JoinHandle<()>>,
}

impl MonitoringSession {
    /// Transitions Idle -> Active: captures the route, starts with an
    /// empty known-incident set and spawns the poll task.
    #[must_use]
    pub fn start(
        request: RouteRequest,
        route: RouteAnalysis,
        planner: Arc<RoutePlanner>,
        store: Arc<dyn IncidentStore>,
        dispatcher: Arc<NotificationDispatcher>,
        config: MonitorConfig,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let ctx = Arc::new(SessionContext {
            request,
            route: Mutex::new(route),
            state: Mutex::new(SessionState {
                known_incident_ids: HashSet::new(),
                last_notification_at: None,
            }),
            planner,
            store,
            dispatcher,
            config,
        });

        let poll_task = tokio::spawn(run_poll_loop(Arc::clone(&ctx), shutdown_rx));
        Self { ctx, shutdown_tx, poll_task: Some(poll_task) }
    }

    /// The route currently being followed; replaced when an auto-reroute
    /// is accepted.
    pub async fn current_route(&self) -> RouteAnalysis {
        self.ctx.route.lock().await.clone()
    }

    /// Runs one poll pass on demand. A user-triggered check (e.g. the user
    /// just filed the report affecting their own route) passes
    /// `bypass_throttle` to get the alert out immediately.
    pub async fn check_now(&self, bypass_throttle: bool) {
        run_tick(&self.ctx, bypass_throttle).await;
    }

    /// Transitions Active -> Idle. Idempotent; a tick already in progress
    /// completes, no new tick is scheduled once this returns.
    pub async fn stop(&mut self) {
        let _ = self.shutdown_tx.send(true);

        if let Some(task) = self.poll_task.take() {
            match timeout(Duration::from_secs(5), task).await {
                Ok(Ok(())) => debug!("poll task completed cleanly"),
                Ok(Err(e)) => warn!("poll task panicked: {e:?}"),
                Err(_) => warn!("poll task did not stop in time"),
            }
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.poll_task.is_some()
    }
}

impl Drop for MonitoringSession {
    fn drop(&mut self) {
        if self.poll_task.is_some() {
            warn!("MonitoringSession dropped while active, call stop() first");
            let _ = self.shutdown_tx.send(true);
        }
    }
}

/// Owner handle enforcing at most one active session per client: following
/// a new route stops the previous session first.
pub struct RouteMonitor {
    planner: Arc<RoutePlanner>,
    store: Arc<dyn IncidentStore>,
    dispatcher: Arc<NotificationDispatcher>,
    active: Option<MonitoringSession>,
}

impl RouteMonitor {
    #[must_use]
    pub fn new(
        planner: Arc<RoutePlanner>,
        store: Arc<dyn IncidentStore>,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Self {
        Self { planner, store, dispatcher, active: None }
    }

    pub async fn follow(&mut self, request: RouteRequest, route: RouteAnalysis, config: MonitorConfig) {
        self.clear().await;
        self.active = Some(MonitoringSession::start(
            request,
            route,
            Arc::clone(&self.planner),
            Arc::clone(&self.store),
            Arc::clone(&self.dispatcher),
            config,
        ));
    }

    pub async fn clear(&mut self) {
        if let Some(mut session) = self.active.take() {
            session.stop().await;
        }
    }

    #[must_use]
    pub fn session(&self) -> Option<&MonitoringSession> {
        self.active.as_ref()
    }
}

async fn run_poll_loop(ctx: Arc<SessionContext>, mut shutdown_rx: watch::Receiver<bool>) {
    let mut ticker = interval(ctx.config.poll_interval);
    // A tick that lands while the previous one is still running is
    // coalesced, never queued.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!("monitoring session started");
    loop {
        tokio::select! {
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {
                run_tick(&ctx, false).await;
            }
        }
    }
    info!("monitoring session stopped");
}

async fn run_tick(ctx: &SessionContext, bypass_throttle: bool) {
    let current = ctx.route.lock().await.clone();

    let Some(corridor) = geometry::route_corridor(&current.route.geometry, ROUTE_BUFFER_KM) else {
        debug!("followed route has degenerate geometry, skipping poll");
        return;
    };

    let found = match ctx.store.incidents_in_area(&corridor.bounds).await {
        Ok(incidents) => incidents,
        Err(e) => {
            warn!("incident fetch failed, treating as empty: {e}");
            Vec::new()
        }
    };

    let relevant: Vec<Incident> = found
        .into_iter()
        .filter(|incident| incident.active)
        .filter(|incident| match incident.position() {
            Some(position) => {
                corridor.contains(&position)
                    && geometry::distance_to_route_km(&position, &current.route.geometry)
                        .map_or(false, |d| d < DETECTION_RADIUS_KM)
            }
            None => false,
        })
        .collect();

    // Replace, don't merge: an incident that leaves the set and comes back
    // counts as new again.
    let new_incidents: Vec<Incident> = {
        let mut state = ctx.state.lock().await;
        let fresh = relevant
            .iter()
            .filter(|incident| !state.known_incident_ids.contains(&incident.id))
            .cloned()
            .collect::<Vec<_>>();
        state.known_incident_ids = relevant.iter().map(|i| i.id.clone()).collect();
        fresh
    };

    if new_incidents.is_empty() {
        return;
    }
    debug!(count = new_incidents.len(), "new incidents near the active route");

    let moment = LocalMoment::now();
    let fresh_analysis = score_route(
        &current.route,
        &relevant,
        ctx.planner.hotspots(),
        current.route.duration_seconds,
        &moment,
    );

    let degraded = fresh_analysis.incident_impact_score < AUTO_REROUTE_SCORE_THRESHOLD;
    let mut alternative = None;
    if degraded && ctx.config.auto_reroute {
        alternative = attempt_reroute(ctx, fresh_analysis.score, &relevant, &moment).await;
    }

    // The throttle gates dispatching only; the de-duplication state above
    // is updated either way.
    {
        let mut state = ctx.state.lock().await;
        if !bypass_throttle {
            if let Some(last) = state.last_notification_at {
                if last.elapsed() < ctx.config.notification_throttle {
                    debug!("notification suppressed by throttle");
                    return;
                }
            }
        }
        state.last_notification_at = Some(Instant::now());
    }

    let alert = TrafficAlert {
        kind: if degraded { AlertKind::RouteDegraded } else { AlertKind::NewIncidents },
        message: alert_message(&new_incidents),
        new_incidents,
        alternative,
        issued_at: Utc::now(),
    };
    ctx.dispatcher.notify(&alert);
}

/// Silent recompute around the incidents currently affecting the route.
/// The replacement must beat the freshly computed score of the current
/// route by the improvement factor, otherwise it is discarded.
async fn attempt_reroute(
    ctx: &SessionContext,
    current_score: f64,
    to_avoid: &[Incident],
    moment: &LocalMoment,
) -> Option<RouteAnalysis> {
    let ranked = match ctx
        .planner
        .recalculate_with_avoidance(&ctx.request, to_avoid, moment)
        .await
    {
        Ok(ranked) => ranked,
        Err(e) => {
            warn!("silent reroute failed: {e}");
            return None;
        }
    };

    let best = select_best(&ranked)?.clone();
    if best.score >= current_score * REROUTE_IMPROVEMENT_FACTOR {
        info!(old_score = current_score, new_score = best.score, "auto-reroute accepted");
        *ctx.route.lock().await = best.clone();
        Some(best)
    } else {
        debug!("reroute alternative discarded, improvement below threshold");
        None
    }
}

fn alert_message(new_incidents: &[Incident]) -> String {
    match new_incidents {
        [single] => format!("New {} reported near your route", single.kind),
        many => format!("{} new incidents reported near your route", many.len()),
    }
}
