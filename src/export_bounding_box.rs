use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::domain::{Distance, Point, RenderArea};
use crate::prepare_lines::bounding_box_around;
use crate::serializer;

/// Writes only `bbox.json` for a center, so that water and border data can be
/// fetched for the same extent before the GTFS feed is processed.
pub fn export_bounding_box(
    center: Point,
    distance: Distance,
    render_area: RenderArea,
    out_dir: &Path,
) -> Result<PathBuf> {
    let bbox = bounding_box_around(center, distance, render_area);
    std::fs::create_dir_all(out_dir)?;
    let path = serializer::write_bounding_box(out_dir, &bbox)?;
    log::info!(
        "Bounding box lon {:.5}..{:.5}, lat {:.5}..{:.5} written to {:?}",
        bbox.left,
        bbox.right,
        bbox.bottom,
        bbox.top,
        path
    );
    Ok(path)
}
