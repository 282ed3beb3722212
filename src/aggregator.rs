use std::collections::HashMap;

use crate::bounding_box::BoundingBox;
use crate::domain::{Point, RenderArea};
use crate::error::Result;
use crate::gtfs_reader::{ShapeID, ShapeSequences, ShapeTrips};
use crate::progress::{ProgressObserver, RowCounter, Stage};
use crate::route_type::{simplify_route_type, SimpleRouteType};

/// One shape with at least one retained point, ready to be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub shape_id: ShapeID,
    pub trip_count: u32,
    pub route_type: SimpleRouteType,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentsDataset {
    pub segments: Vec<Segment>,
    pub max_trips_per_seg: i64,
    pub min_trips_per_seg: i64,
    /// Shapes with admitted points that no trip runs on.
    pub shapes_without_trips: usize,
}

impl SegmentsDataset {
    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.segments.iter().flat_map(|segment| segment.points.iter())
    }

    /// Bounding box of the retained points, see
    /// [`BoundingBox::from_observed_extent`].
    pub fn observed_bounding_box(
        &self,
        render_area: RenderArea,
        center: Option<Point>,
    ) -> Option<BoundingBox> {
        BoundingBox::from_observed_extent(self.points(), render_area, center)
    }
}

/// Joins trip counts with the admitted shape points.
///
/// Segments follow the order in which shapes were first encountered in the
/// shape pass.
pub fn compute_segments(
    shape_trips: &HashMap<ShapeID, ShapeTrips>,
    sequences: &ShapeSequences,
    progress: &dyn ProgressObserver,
) -> Result<SegmentsDataset> {
    let mut segments = vec![];
    let mut shapes_without_trips = 0;
    let mut trip_range: Option<(u32, u32)> = None;
    let mut counter = RowCounter::new(Stage::Aggregate, progress);

    for record in sequences.iter() {
        let Some(trips) = shape_trips.get(&record.shape_id) else {
            shapes_without_trips += 1;
            continue;
        };
        let route_type = simplify_route_type(trips.route_type)?;
        if record.points.is_empty() {
            continue;
        }

        trip_range = Some(match trip_range {
            None => (trips.trip_count, trips.trip_count),
            Some((max, min)) => (max.max(trips.trip_count), min.min(trips.trip_count)),
        });

        segments.push(Segment {
            shape_id: record.shape_id,
            trip_count: trips.trip_count,
            route_type,
            points: record.ordered_points(),
        });
        counter.tick();
    }
    counter.finish();

    let (max_trips, min_trips) = trip_range.unwrap_or((0, 0));
    let (max_trips_per_seg, min_trips_per_seg) =
        separate_trip_range(max_trips as i64, min_trips as i64);

    Ok(SegmentsDataset {
        segments,
        max_trips_per_seg,
        min_trips_per_seg,
        shapes_without_trips,
    })
}

/// Keeps `max > min` so that `trips / (max - min)` stays finite downstream.
pub fn separate_trip_range(max_trips: i64, min_trips: i64) -> (i64, i64) {
    if max_trips != min_trips {
        (max_trips, min_trips)
    } else if max_trips <= 0 {
        (max_trips + 1, min_trips)
    } else {
        (max_trips, min_trips - 1)
    }
}
