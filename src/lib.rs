//! Turns a GTFS feed into frequency-annotated line segments projected onto a
//! pixel canvas around a center point.

pub mod aggregator;
pub mod bounding_box;
pub mod domain;
pub mod error;
pub mod export_bounding_box;
pub mod geodesy;
pub mod gtfs_reader;
pub mod prepare_lines;
pub mod progress;
pub mod route_type;
pub mod serializer;

pub use aggregator::{Segment, SegmentsDataset};
pub use bounding_box::{project, BoundingBox, PixelPoint};
pub use domain::{Distance, MaxDistance, Point, RenderArea};
pub use error::LinesError;
pub use prepare_lines::{place_output_dir, prepare_lines, LinesConfig, LinesSummary};
pub use progress::{NoProgress, ProgressObserver, Stage};
pub use route_type::{simplify_route_type, SimpleRouteType};
