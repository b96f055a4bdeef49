pub mod dispatcher;
pub mod session;

pub use dispatcher::{AlertKind, ListenerId, NotificationDispatcher, TrafficAlert};
pub use session::{MonitorConfig, MonitoringSession, RouteMonitor};
