pub mod analysis;
pub mod config;
pub mod error;
pub mod hotspot;
pub mod incident;
pub mod route;
pub mod time;

pub use analysis::{AffectedSegment, RouteAnalysis, RouteLabel, SegmentSource};
pub use error::EngineError;
pub use hotspot::TrafficHotspot;
pub use incident::{Incident, IncidentKind, ImpactProfile, Votes};
pub use route::{GeoBounds, GeoPoint, Route, RouteLeg, RouteOptions, RouteRequest};
pub use time::LocalMoment;
