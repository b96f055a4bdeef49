use serde::{Deserialize, Serialize};

use crate::route::GeoPoint;

/// Static historical congestion reference point. Loaded once, never
/// mutated by the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrafficHotspot {
    pub coordinates: GeoPoint,
    /// 0-1; values outside the range are clamped by the analyzer.
    pub severity: f64,
    /// Local hours (0-23) during which this hotspot is at its peak.
    pub peak_hours: Vec<u32>,
}

impl TrafficHotspot {
    #[must_use]
    pub fn is_peak(&self, hour: u32) -> bool {
        self.peak_hours.contains(&hour)
    }
}
