//! Streaming passes over `routes.txt`, `trips.txt` and `shapes.txt`.
//!
//! Each pass reads its table row by row with `csv` and keeps only the
//! aggregates needed later on: route types per route, trip counts per shape
//! and the admitted points of every shape.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use ustr::Ustr;

use crate::domain::{MaxDistance, Point};
use crate::error::{LinesError, Result};
use crate::geodesy;
use crate::progress::{ProgressObserver, RowCounter, Stage};

pub const ROUTES_FILE_NAME: &str = "routes.txt";
pub const TRIPS_FILE_NAME: &str = "trips.txt";
pub const SHAPES_FILE_NAME: &str = "shapes.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub struct RouteID(pub Ustr);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub struct ShapeID(pub Ustr);

#[derive(Deserialize)]
struct RouteRecord {
    route_id: RouteID,
    route_type: i32,
}

#[derive(Deserialize)]
struct TripRecord {
    route_id: RouteID,
    shape_id: Option<ShapeID>,
}

#[derive(Deserialize)]
struct ShapeRecordRow {
    shape_id: ShapeID,
    shape_pt_lat: f64,
    shape_pt_lon: f64,
    shape_pt_sequence: u32,
}

/// Trip count and raw route type of the trips running on one shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeTrips {
    pub trip_count: u32,
    /// Route type of the first trip seen on this shape.
    pub route_type: i32,
}

/// Points of one shape admitted by the geographic filter, keyed by
/// `shape_pt_sequence`.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeRecord {
    pub shape_id: ShapeID,
    pub points: BTreeMap<u32, Point>,
}

impl ShapeRecord {
    fn new(shape_id: ShapeID) -> Self {
        ShapeRecord {
            shape_id,
            points: BTreeMap::new(),
        }
    }

    /// Points in declared sequence order.
    pub fn ordered_points(&self) -> Vec<Point> {
        self.points.values().copied().collect()
    }
}

/// Shapes in the order their first admitted point was read.
#[derive(Debug, Clone, Default)]
pub struct ShapeSequences {
    index_by_shape_id: HashMap<ShapeID, usize>,
    records: Vec<ShapeRecord>,
}

impl ShapeSequences {
    pub fn insert(&mut self, shape_id: ShapeID, sequence: u32, point: Point) {
        let index = *self
            .index_by_shape_id
            .entry(shape_id)
            .or_insert_with(|| {
                self.records.push(ShapeRecord::new(shape_id));
                self.records.len() - 1
            });
        self.records[index].points.insert(sequence, point);
    }

    pub fn get(&self, shape_id: &ShapeID) -> Option<&ShapeRecord> {
        self.index_by_shape_id
            .get(shape_id)
            .map(|index| &self.records[*index])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ShapeRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Geographic filter applied during the shape pass.
#[derive(Debug, Clone, Copy)]
pub struct RegionFilter {
    pub center: Point,
    pub max_dist: MaxDistance,
}

impl RegionFilter {
    pub fn admits(&self, point: Point) -> bool {
        geodesy::is_within_ellipse(point, self.center, &self.max_dist)
    }
}

fn open_table(path: &Path) -> csv::Result<csv::Reader<std::fs::File>> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
}

/// A GTFS folder whose required tables have been checked to exist.
#[derive(Debug, Clone)]
pub struct GtfsDataset {
    gtfs_folder_path: PathBuf,
}

impl GtfsDataset {
    pub fn open(gtfs_folder_path: &Path) -> Result<Self> {
        for file_name in [ROUTES_FILE_NAME, TRIPS_FILE_NAME, SHAPES_FILE_NAME] {
            let path = gtfs_folder_path.join(file_name);
            if !path.is_file() {
                return Err(LinesError::MissingFile { path });
            }
        }
        Ok(GtfsDataset {
            gtfs_folder_path: gtfs_folder_path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.gtfs_folder_path
    }

    pub fn read_route_types(
        &self,
        progress: &dyn ProgressObserver,
    ) -> Result<HashMap<RouteID, i32>> {
        let path = self.gtfs_folder_path.join(ROUTES_FILE_NAME);
        let stage_error = |source| LinesError::RouteMap {
            path: path.clone(),
            source,
        };

        let mut route_types = HashMap::new();
        let mut counter = RowCounter::new(Stage::Routes, progress);
        let mut reader = open_table(&path).map_err(stage_error)?;
        for record in reader.deserialize() {
            let record: RouteRecord = record.map_err(stage_error)?;
            route_types.insert(record.route_id, record.route_type);
            counter.tick();
        }
        counter.finish();
        Ok(route_types)
    }

    /// Counts trips per shape and remembers the route type of the first trip
    /// seen on each shape. Later trips on other route types do not change it.
    pub fn read_shape_trips(
        &self,
        route_types: &HashMap<RouteID, i32>,
        progress: &dyn ProgressObserver,
    ) -> Result<HashMap<ShapeID, ShapeTrips>> {
        let path = self.gtfs_folder_path.join(TRIPS_FILE_NAME);
        let stage_error = |source| LinesError::TripJoin {
            path: path.clone(),
            source,
        };

        let mut shape_trips: HashMap<ShapeID, ShapeTrips> = HashMap::new();
        let mut counter = RowCounter::new(Stage::Trips, progress);
        let mut reader = open_table(&path).map_err(stage_error)?;
        for record in reader.deserialize() {
            let record: TripRecord = record.map_err(stage_error)?;
            counter.tick();
            let route_type = *route_types.get(&record.route_id).ok_or_else(|| {
                LinesError::UnknownRouteId {
                    route_id: record.route_id.0.to_string(),
                }
            })?;
            let Some(shape_id) = record.shape_id else {
                continue;
            };
            shape_trips
                .entry(shape_id)
                .and_modify(|trips| trips.trip_count += 1)
                .or_insert(ShapeTrips {
                    trip_count: 1,
                    route_type,
                });
        }
        counter.finish();
        Ok(shape_trips)
    }

    /// Collects the shape points admitted by `filter`, or every point when no
    /// filter is given.
    pub fn read_shape_sequences(
        &self,
        filter: Option<&RegionFilter>,
        progress: &dyn ProgressObserver,
    ) -> Result<ShapeSequences> {
        let path = self.gtfs_folder_path.join(SHAPES_FILE_NAME);
        let stage_error = |source| LinesError::ShapeFilter {
            path: path.clone(),
            source,
        };

        let mut sequences = ShapeSequences::default();
        let mut counter = RowCounter::new(Stage::Shapes, progress);
        let mut reader = open_table(&path).map_err(stage_error)?;
        for record in reader.deserialize() {
            let record: ShapeRecordRow = record.map_err(stage_error)?;
            counter.tick();
            let point = Point::new(record.shape_pt_lat, record.shape_pt_lon);
            if filter.map_or(true, |filter| filter.admits(point)) {
                sequences.insert(record.shape_id, record.shape_pt_sequence, point);
            }
        }
        counter.finish();
        Ok(sequences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Distance, RenderArea};
    use crate::progress::NoProgress;
    use std::fs;
    use ustr::ustr;

    fn write_feed(dir: &Path, routes: &str, trips: &str, shapes: &str) {
        fs::write(dir.join(ROUTES_FILE_NAME), routes).unwrap();
        fs::write(dir.join(TRIPS_FILE_NAME), trips).unwrap();
        fs::write(dir.join(SHAPES_FILE_NAME), shapes).unwrap();
    }

    fn shape(id: &str) -> ShapeID {
        ShapeID(ustr(id))
    }

    #[test]
    fn missing_shapes_is_reported_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(ROUTES_FILE_NAME), "route_id,route_type\n").unwrap();
        fs::write(dir.path().join(TRIPS_FILE_NAME), "route_id,shape_id\n").unwrap();
        let err = GtfsDataset::open(dir.path()).unwrap_err();
        match err {
            LinesError::MissingFile { path } => assert!(path.ends_with(SHAPES_FILE_NAME)),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn first_route_type_wins() {
        let dir = tempfile::tempdir().unwrap();
        write_feed(
            dir.path(),
            "route_id,route_short_name,route_type\nR1,1,3\nR2,S1,109\n",
            "route_id,service_id,trip_id,shape_id\n\
             R1,WD,T1,S1\n\
             R2,WD,T2,S1\n\
             R2,WD,T3,S2\n\
             R1,WD,T4,\n",
            "shape_id,shape_pt_lat,shape_pt_lon,shape_pt_sequence\n",
        );
        let dataset = GtfsDataset::open(dir.path()).unwrap();
        let route_types = dataset.read_route_types(&NoProgress).unwrap();
        assert_eq!(route_types.len(), 2);
        let shape_trips = dataset.read_shape_trips(&route_types, &NoProgress).unwrap();
        assert_eq!(shape_trips.len(), 2);
        assert_eq!(
            shape_trips[&shape("S1")],
            ShapeTrips {
                trip_count: 2,
                route_type: 3
            }
        );
        assert_eq!(
            shape_trips[&shape("S2")],
            ShapeTrips {
                trip_count: 1,
                route_type: 109
            }
        );
    }

    #[test]
    fn trip_on_unknown_route_fails() {
        let dir = tempfile::tempdir().unwrap();
        write_feed(
            dir.path(),
            "route_id,route_type\nR1,3\n",
            "route_id,shape_id\nR9,S1\n",
            "shape_id,shape_pt_lat,shape_pt_lon,shape_pt_sequence\n",
        );
        let dataset = GtfsDataset::open(dir.path()).unwrap();
        let route_types = dataset.read_route_types(&NoProgress).unwrap();
        let err = dataset.read_shape_trips(&route_types, &NoProgress).unwrap_err();
        assert!(matches!(err, LinesError::UnknownRouteId { route_id } if route_id == "R9"));
    }

    #[test]
    fn malformed_route_type_names_the_stage() {
        let dir = tempfile::tempdir().unwrap();
        write_feed(
            dir.path(),
            "route_id,route_type\nR1,bus\n",
            "route_id,shape_id\n",
            "shape_id,shape_pt_lat,shape_pt_lon,shape_pt_sequence\n",
        );
        let dataset = GtfsDataset::open(dir.path()).unwrap();
        let err = dataset.read_route_types(&NoProgress).unwrap_err();
        assert!(matches!(err, LinesError::RouteMap { .. }));
    }

    #[test]
    fn short_trip_row_names_the_stage() {
        let dir = tempfile::tempdir().unwrap();
        write_feed(
            dir.path(),
            "route_id,route_type\nR1,3\n",
            "route_id,service_id,shape_id\nR1,WD,S1\nR1\n",
            "shape_id,shape_pt_lat,shape_pt_lon,shape_pt_sequence\n",
        );
        let dataset = GtfsDataset::open(dir.path()).unwrap();
        let route_types = dataset.read_route_types(&NoProgress).unwrap();
        let err = dataset.read_shape_trips(&route_types, &NoProgress).unwrap_err();
        match err {
            LinesError::TripJoin { path, .. } => assert!(path.ends_with(TRIPS_FILE_NAME)),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn non_numeric_latitude_names_the_stage() {
        let dir = tempfile::tempdir().unwrap();
        write_feed(
            dir.path(),
            "route_id,route_type\n",
            "route_id,shape_id\n",
            "shape_id,shape_pt_lat,shape_pt_lon,shape_pt_sequence\n\
             S1,47.0,8.0,1\n\
             S1,north,8.1,2\n",
        );
        let dataset = GtfsDataset::open(dir.path()).unwrap();
        let err = dataset.read_shape_sequences(None, &NoProgress).unwrap_err();
        match err {
            LinesError::ShapeFilter { path, .. } => assert!(path.ends_with(SHAPES_FILE_NAME)),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn shape_points_are_ordered_by_sequence() {
        let dir = tempfile::tempdir().unwrap();
        write_feed(
            dir.path(),
            "route_id,route_type\n",
            "route_id,shape_id\n",
            "shape_id,shape_pt_lat,shape_pt_lon,shape_pt_sequence,shape_dist_traveled\n\
             B,47.30,8.50,2,\n\
             A,47.10,8.10,10,\n\
             B,47.20,8.40,1,\n\
             A,47.11,8.11,9,\n\
             B,47.40,8.60,3,\n",
        );
        let dataset = GtfsDataset::open(dir.path()).unwrap();
        let sequences = dataset.read_shape_sequences(None, &NoProgress).unwrap();
        let order: Vec<ShapeID> = sequences.iter().map(|record| record.shape_id).collect();
        assert_eq!(order, vec![shape("B"), shape("A")]);
        assert_eq!(
            sequences.get(&shape("B")).unwrap().ordered_points(),
            vec![
                Point::new(47.20, 8.40),
                Point::new(47.30, 8.50),
                Point::new(47.40, 8.60),
            ]
        );
        assert_eq!(
            sequences.get(&shape("A")).unwrap().ordered_points(),
            vec![Point::new(47.11, 8.11), Point::new(47.10, 8.10)]
        );
    }

    #[test]
    fn region_filter_drops_far_points() {
        let dir = tempfile::tempdir().unwrap();
        write_feed(
            dir.path(),
            "route_id,route_type\n",
            "route_id,shape_id\n",
            "shape_id,shape_pt_lat,shape_pt_lon,shape_pt_sequence\n\
             S1,47.3773887,8.5386569,1\n\
             S1,47.948020,7.447440,2\n\
             S2,46.948020,7.447440,1\n",
        );
        let render_area = RenderArea::square(1000);
        let filter = RegionFilter {
            center: Point::new(47.3773887, 8.5386569),
            max_dist: MaxDistance::from_distance(Distance::from_km(20.0), render_area),
        };
        let dataset = GtfsDataset::open(dir.path()).unwrap();
        let sequences = dataset
            .read_shape_sequences(Some(&filter), &NoProgress)
            .unwrap();
        assert_eq!(sequences.len(), 1);
        assert_eq!(sequences.get(&shape("S1")).unwrap().points.len(), 1);
        assert!(sequences.get(&shape("S2")).is_none());
    }
}
