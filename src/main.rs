use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use cityliner::export_bounding_box::export_bounding_box;
use cityliner::{
    place_output_dir, prepare_lines, Distance, LinesConfig, Point, ProgressObserver, RenderArea,
    Stage,
};

#[derive(Parser)]
#[command(about = "Process GTFS data to output lines")]
struct Cli {
    /// Log debug messages.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write data.lines, maxmin.lines and bbox.json for a GTFS feed.
    Lines {
        /// Path to the input GTFS directory.
        #[arg(long)]
        gtfs: PathBuf,

        /// Output directory, created if it doesn't exist.
        #[arg(long, conflicts_with = "place_name")]
        out: Option<PathBuf>,

        /// Write to <PROCESSED_DIR>/<PLACE_NAME>/<km> instead of --out.
        #[arg(long)]
        place_name: Option<String>,

        /// Root folder for --place-name output.
        #[arg(long, default_value = "processed")]
        processed_dir: PathBuf,

        /// Coordinates of the center as "lat,lon". All shapes are kept without it.
        #[arg(long)]
        center: Option<Point>,

        #[command(flatten)]
        canvas: CanvasArgs,

        /// Regenerate even if data.lines already exists.
        #[arg(long)]
        force: bool,
    },
    /// Write only bbox.json for a center point.
    ExportBbox {
        /// Coordinates of the center as "lat,lon".
        #[arg(long)]
        center: Point,

        #[arg(long)]
        out: PathBuf,

        #[command(flatten)]
        canvas: CanvasArgs,
    },
}

#[derive(Args)]
struct CanvasArgs {
    /// Maximum distance from the center on the y axis (in km).
    #[arg(long, default_value_t = 20.0)]
    max_dist: f64,

    /// Size of the square output drawing (in px).
    #[arg(long, conflicts_with = "poster")]
    size: Option<u32>,

    /// Make an A0 poster (9933x14043 px).
    #[arg(long)]
    poster: bool,
}

impl CanvasArgs {
    fn render_area(&self) -> Result<RenderArea> {
        match (self.poster, self.size) {
            (true, _) => Ok(RenderArea::poster()),
            (false, Some(size)) if size > 0 => Ok(RenderArea::square(size)),
            (false, Some(_)) => anyhow::bail!("--size must be positive"),
            (false, None) => anyhow::bail!("either --size or --poster is required"),
        }
    }

    fn distance(&self) -> Result<Distance> {
        if !self.max_dist.is_finite() || self.max_dist <= 0.0 {
            anyhow::bail!("--max-dist must be a positive number of km");
        }
        Ok(Distance::from_km(self.max_dist))
    }
}

/// One spinner per pass over the feed, added when the pass reports rows.
struct SpinnerProgress {
    multi: MultiProgress,
    style: ProgressStyle,
    bars: Mutex<HashMap<Stage, ProgressBar>>,
}

impl SpinnerProgress {
    fn new(multi: MultiProgress) -> Result<Self> {
        let style = ProgressStyle::with_template(
            "[{elapsed_precise}] {spinner:.cyan} {human_pos:>11} {msg}",
        )?;
        Ok(SpinnerProgress {
            multi,
            style,
            bars: Mutex::new(HashMap::new()),
        })
    }

    fn with_bar(&self, stage: Stage, update: impl FnOnce(&ProgressBar)) {
        let Ok(mut bars) = self.bars.lock() else {
            return;
        };
        let bar = bars.entry(stage).or_insert_with(|| {
            let bar = self.multi.add(ProgressBar::new_spinner());
            bar.set_style(self.style.clone());
            bar.set_message(format!("{} read", stage.label()));
            bar.enable_steady_tick(StdDuration::from_millis(120));
            bar
        });
        update(bar);
    }
}

impl ProgressObserver for SpinnerProgress {
    fn on_rows(&self, stage: Stage, rows: u64) {
        self.with_bar(stage, |bar| bar.set_position(rows));
    }

    fn on_stage_finished(&self, stage: Stage, rows: u64) {
        self.with_bar(stage, |bar| {
            bar.set_position(rows);
            bar.finish();
        });
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    simple_logger::SimpleLogger::new().with_level(level).init()?;

    match cli.command {
        Command::Lines {
            gtfs,
            out,
            place_name,
            processed_dir,
            center,
            canvas,
            force,
        } => {
            let distance = canvas.distance()?;
            let out_dir = match (out, place_name) {
                (Some(out), _) => out,
                (None, Some(place_name)) => place_output_dir(&processed_dir, &place_name, distance),
                (None, None) => anyhow::bail!("either --out or --place-name is required"),
            };
            let config = LinesConfig {
                gtfs_dir: gtfs,
                out_dir,
                center,
                distance,
                render_area: canvas.render_area()?,
                force,
            };
            let progress = SpinnerProgress::new(MultiProgress::new())?;
            let summary = prepare_lines(&config, Arc::new(progress)).await?;
            if summary.generated {
                log::info!(
                    "{} segments, trips per segment {}..{}, {} shapes without trips",
                    summary.segments,
                    summary.min_trips_per_seg,
                    summary.max_trips_per_seg,
                    summary.shapes_without_trips
                );
            }
        }
        Command::ExportBbox {
            center,
            out,
            canvas,
        } => {
            export_bounding_box(center, canvas.distance()?, canvas.render_area()?, &out)?;
        }
    }
    Ok(())
}
