use thiserror::Error;

/// Failure taxonomy for the engine.
///
/// Only `NoRouteFound` is surfaced to callers as a hard error; every other
/// condition is recovered locally with a safe default so a ranking pass is
/// never interrupted.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The routing provider returned no candidates for the request.
    #[error("routing provider returned no routes")]
    NoRouteFound,

    /// The incident store could not be reached or rejected the query.
    /// Callers degrade to an empty incident set.
    #[error("incident fetch failed: {0}")]
    IncidentFetchFailed(String),

    /// A single incident carried no resolvable coordinates; only that
    /// incident is skipped.
    #[error("incident {id} has no resolvable coordinates")]
    InvalidIncidentGeometry { id: String },

    /// The route has fewer than two geometry points. Scored as unaffected
    /// rather than treated as fatal.
    #[error("route has fewer than two geometry points")]
    MalformedRoute,
}
