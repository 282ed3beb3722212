use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::aggregator::{Segment, SegmentsDataset};
use crate::bounding_box::BoundingBox;

pub const LINES_FILE_NAME: &str = "data.lines";
pub const MAXMIN_FILE_NAME: &str = "maxmin.lines";
pub const BBOX_FILE_NAME: &str = "bbox.json";

/// `trip_count<TAB>route_type<TAB>x y,x y,...` without the newline.
pub fn format_segment(segment: &Segment, bbox: &BoundingBox) -> String {
    let coords = segment
        .points
        .iter()
        .map(|point| {
            let pixel = bbox.project(*point);
            format!("{} {}", pixel.x, pixel.y)
        })
        .collect::<Vec<_>>()
        .join(",");
    format!("{}\t{}\t{}", segment.trip_count, segment.route_type, coords)
}

/// Writes `contents` next to `path` and renames it into place once complete.
fn write_atomically(
    path: &Path,
    contents: impl FnOnce(&mut dyn Write) -> std::io::Result<()>,
) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(file.as_file_mut());
        contents(&mut writer)?;
        writer.flush()?;
    }
    file.as_file().sync_all()?;
    file.persist(path)?;
    Ok(())
}

pub fn write_bounding_box(out_dir: &Path, bbox: &BoundingBox) -> Result<PathBuf> {
    let path = out_dir.join(BBOX_FILE_NAME);
    let json = serde_json::to_string_pretty(bbox)?;
    write_atomically(&path, |file| file.write_all(json.as_bytes()))?;
    Ok(path)
}

/// Removes `data.lines` left by an earlier run, so a failure further on
/// never leaves it next to newer companion files.
fn remove_previous_lines(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            log::debug!("Removed previous {:?}", path);
            Ok(())
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

/// Writes `maxmin.lines`, `bbox.json` and finally `data.lines`, so an
/// existing `data.lines` always belongs to a finished run.
pub fn write_segments(out_dir: &Path, dataset: &SegmentsDataset, bbox: &BoundingBox) -> Result<()> {
    let lines_path = out_dir.join(LINES_FILE_NAME);
    remove_previous_lines(&lines_path)?;

    log::info!("Writing {}", MAXMIN_FILE_NAME);
    write_atomically(&out_dir.join(MAXMIN_FILE_NAME), |file| {
        write!(
            file,
            "{}\n{}",
            dataset.max_trips_per_seg, dataset.min_trips_per_seg
        )
    })?;

    write_bounding_box(out_dir, bbox)?;

    log::info!(
        "Writing {} segments to {}",
        dataset.segments.len(),
        LINES_FILE_NAME
    );
    write_atomically(&lines_path, |file| {
        for (i, segment) in dataset.segments.iter().enumerate() {
            writeln!(file, "{}", format_segment(segment, bbox))?;
            let left = dataset.segments.len() - i - 1;
            if left > 0 && left % 10_000 == 0 {
                log::debug!("{} segments left", left);
            }
        }
        Ok(())
    })?;

    log::info!("Write complete");
    Ok(())
}
