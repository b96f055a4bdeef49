use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use model::{Incident, RouteAnalysis};
use tracing::error;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AlertKind {
    /// New incidents appeared near the followed route.
    NewIncidents,
    /// The incident impact score of the followed route dropped below the
    /// auto-reroute threshold.
    RouteDegraded,
}

/// Event raised by a monitoring session.
#[derive(Clone, Debug)]
pub struct TrafficAlert {
    pub kind: AlertKind,
    pub message: String,
    pub new_incidents: Vec<Incident>,
    /// A better route found by the silent reroute, when one cleared the
    /// improvement threshold.
    pub alternative: Option<RouteAnalysis>,
    pub issued_at: DateTime<Utc>,
}

/// Handle returned by `add_listener`; ids are monotonic, so duplicate
/// registrations of the same closure stay distinguishable.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn Fn(&TrafficAlert) + Send + Sync>;

/// Fan-out of monitoring events to registered listeners.
#[derive(Default)]
pub struct NotificationDispatcher {
    listeners: Mutex<Vec<(ListenerId, Listener)>>,
    next_id: AtomicU64,
}

impl NotificationDispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&TrafficAlert) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.registry().push((id, Box::new(listener)));
        id
    }

    /// Returns whether the id was registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.registry();
        let before = listeners.len();
        listeners.retain(|(registered, _)| *registered != id);
        listeners.len() != before
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.registry().len()
    }

    /// Invokes every listener synchronously in registration order. A
    /// panicking listener is logged and skipped; the rest still run and
    /// the calling session is unaffected.
    pub fn notify(&self, alert: &TrafficAlert) {
        let listeners = self.registry();
        for (id, listener) in listeners.iter() {
            if catch_unwind(AssertUnwindSafe(|| listener(alert))).is_err() {
                error!("alert listener {id:?} panicked, continuing fan-out");
            }
        }
    }

    fn registry(&self) -> std::sync::MutexGuard<'_, Vec<(ListenerId, Listener)>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
