use std::path::PathBuf;

/// Failures of a lines run, tagged with the stage that produced them.
#[derive(Debug, thiserror::Error)]
pub enum LinesError {
    #[error("Required GTFS file is missing: {path:?}")]
    MissingFile { path: PathBuf },

    #[error("Failed to build route map from {path:?}: {source}")]
    RouteMap {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to join trips from {path:?}: {source}")]
    TripJoin {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Trip references unknown route {route_id:?}")]
    UnknownRouteId { route_id: String },

    #[error("Failed to filter shapes from {path:?}: {source}")]
    ShapeFilter {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Unknown route type: {0}")]
    UnknownRouteType(i32),

    #[error("No retained shape points span a non-empty extent")]
    EmptyExtent,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LinesError>;
