use std::time::Duration;

/// Incidents and hotspots farther than this from the route geometry do not
/// affect it at all.
pub const DETECTION_RADIUS_KM: f64 = 0.5;

/// Cap on the score points a single incident can remove.
pub const MAX_INCIDENT_IMPACT_POINTS: f64 = 30.0;

/// Corridor half-width used when fetching incidents around an active route.
pub const ROUTE_BUFFER_KM: f64 = 1.0;

/// Composite score weights: duration / incidents / traffic.
/// Incident avoidance is deliberately weighted above raw speed.
pub const DURATION_WEIGHT_POINTS: f64 = 30.0;
pub const INCIDENT_WEIGHT_POINTS: f64 = 40.0;
pub const TRAFFIC_WEIGHT_POINTS: f64 = 30.0;

/// Flat bonus for an alternative that already clears the incidents it was
/// asked to avoid by more than half the detection radius.
pub const AVOIDANCE_BONUS_POINTS: f64 = 15.0;

/// Label thresholds on the 0-100 component scores.
pub const LABEL_GOOD_THRESHOLD: f64 = 80.0;
pub const LABEL_BAD_THRESHOLD: f64 = 60.0;

/// A route is labeled "longer route" above this multiple of the fastest
/// candidate's duration.
pub const LONGER_ROUTE_FACTOR: f64 = 1.3;

/// Hotspot congestion scaling.
pub const WEEKEND_DAY_FACTOR: f64 = 0.7;
pub const OFF_PEAK_HOUR_FACTOR: f64 = 0.5;
pub const HOTSPOT_IMPACT_SCALE_POINTS: f64 = 30.0;
pub const HOTSPOT_DELAY_SCALE_MINUTES: f64 = 10.0;
pub const HOTSPOT_DELAY_CAP_MINUTES: f64 = 10.0;

/// Monitoring defaults. 30 s polling is also supported for callers that
/// want a tighter loop; both are configuration, not behavior changes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);
pub const FAST_POLL_INTERVAL: Duration = Duration::from_secs(30);
pub const NOTIFICATION_THROTTLE: Duration = Duration::from_secs(60);

/// Auto-reroute triggers below this incident impact score, and the
/// replacement must beat the current route's score by this factor.
pub const AUTO_REROUTE_SCORE_THRESHOLD: f64 = 70.0;
pub const REROUTE_IMPROVEMENT_FACTOR: f64 = 1.15;
