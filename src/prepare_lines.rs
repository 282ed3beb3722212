use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::aggregator::{self, SegmentsDataset};
use crate::bounding_box::BoundingBox;
use crate::domain::{Distance, MaxDistance, Point, RenderArea};
use crate::error::LinesError;
use crate::gtfs_reader::{GtfsDataset, RegionFilter};
use crate::progress::ProgressObserver;
use crate::serializer;

#[derive(Debug, Clone)]
pub struct LinesConfig {
    pub gtfs_dir: PathBuf,
    pub out_dir: PathBuf,
    /// Without a center every shape point is kept.
    pub center: Option<Point>,
    pub distance: Distance,
    pub render_area: RenderArea,
    /// Regenerate even if `data.lines` already exists.
    pub force: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinesSummary {
    pub out_dir: PathBuf,
    /// False when an earlier run's output was kept.
    pub generated: bool,
    pub segments: usize,
    pub max_trips_per_seg: i64,
    pub min_trips_per_seg: i64,
    pub shapes_without_trips: usize,
}

impl LinesSummary {
    fn skipped(out_dir: &Path) -> Self {
        LinesSummary {
            out_dir: out_dir.to_path_buf(),
            generated: false,
            segments: 0,
            max_trips_per_seg: 0,
            min_trips_per_seg: 0,
            shapes_without_trips: 0,
        }
    }
}

/// Output folder for a named place, `{processed_dir}/{place_name}/{km}`,
/// with the distance truncated to whole kilometers.
pub fn place_output_dir(processed_dir: &Path, place_name: &str, distance: Distance) -> PathBuf {
    processed_dir
        .join(place_name)
        .join(distance.km().to_string())
}

pub fn bounding_box_around(center: Point, distance: Distance, render_area: RenderArea) -> BoundingBox {
    let max_dist = MaxDistance::from_distance(distance, render_area);
    BoundingBox::from_center(center, &max_dist, render_area)
}

pub async fn prepare_lines(
    config: &LinesConfig,
    progress: Arc<dyn ProgressObserver>,
) -> Result<LinesSummary> {
    let lines_path = config.out_dir.join(serializer::LINES_FILE_NAME);
    if lines_path.exists() && !config.force {
        log::info!(
            "{:?} already exists, skipping re-generation",
            lines_path
        );
        return Ok(LinesSummary::skipped(&config.out_dir));
    }

    let dataset = GtfsDataset::open(&config.gtfs_dir)?;
    std::fs::create_dir_all(&config.out_dir)?;

    let render_area = config.render_area;
    let max_dist = MaxDistance::from_distance(config.distance, render_area);
    log::debug!("GTFS provider: {:?}", dataset.path());
    log::debug!(
        "Render area: {} x {} px",
        render_area.width_px,
        render_area.height_px
    );
    match config.center {
        Some(center) => {
            log::debug!("Center coordinates: {:?}", center);
            log::debug!("Max distance on the y axis: {} m", config.distance.meters());
            log::debug!(
                "Max distance from center: {:.3}x{:.3}km",
                max_dist.x,
                max_dist.y
            );
        }
        None => log::debug!("No center given, keeping all shape points"),
    }
    let filter = config
        .center
        .map(|center| RegionFilter { center, max_dist });

    let segments = compute_segments(dataset, filter, progress).await?;

    let bbox = match config.center {
        Some(center) => BoundingBox::from_center(center, &max_dist, render_area),
        None => segments
            .observed_bounding_box(render_area, None)
            .ok_or(LinesError::EmptyExtent)?,
    };

    serializer::write_segments(&config.out_dir, &segments, &bbox)?;
    log::info!("Route frequency files written to {:?}", config.out_dir);

    Ok(LinesSummary {
        out_dir: config.out_dir.clone(),
        generated: true,
        segments: segments.segments.len(),
        max_trips_per_seg: segments.max_trips_per_seg,
        min_trips_per_seg: segments.min_trips_per_seg,
        shapes_without_trips: segments.shapes_without_trips,
    })
}

/// Runs the route/trip join and the shape pass side by side and aggregates
/// once both are done.
pub async fn compute_segments(
    dataset: GtfsDataset,
    filter: Option<RegionFilter>,
    progress: Arc<dyn ProgressObserver>,
) -> Result<SegmentsDataset> {
    log::info!("Joining routes and trips, filtering shapes...");
    let trips_task = {
        let dataset = dataset.clone();
        let progress = progress.clone();
        tokio::task::spawn_blocking(move || -> crate::error::Result<_> {
            let route_types = dataset.read_route_types(progress.as_ref())?;
            log::debug!("Total routes: {}", route_types.len());
            dataset.read_shape_trips(&route_types, progress.as_ref())
        })
    };
    let shapes_task = {
        let progress = progress.clone();
        tokio::task::spawn_blocking(move || {
            dataset.read_shape_sequences(filter.as_ref(), progress.as_ref())
        })
    };
    let (shape_trips, sequences) = tokio::try_join!(trips_task, shapes_task)?;
    let shape_trips = shape_trips?;
    let sequences = sequences?;
    log::debug!(
        "{} shapes with trips, {} shapes with admitted points",
        shape_trips.len(),
        sequences.len()
    );

    log::info!("Creating segments...");
    let segments = aggregator::compute_segments(&shape_trips, &sequences, progress.as_ref())?;
    log::debug!("max trips per segment: {}", segments.max_trips_per_seg);
    log::debug!("min trips per segment: {}", segments.min_trips_per_seg);
    Ok(segments)
}
