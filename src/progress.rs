/// Rows between two `on_rows` notifications.
pub const PROGRESS_INTERVAL: u64 = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Routes,
    Trips,
    Shapes,
    Aggregate,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Routes => "routes",
            Stage::Trips => "trips",
            Stage::Shapes => "shapes",
            Stage::Aggregate => "segments",
        }
    }
}

/// Receives progress counters from the passes over the feed.
pub trait ProgressObserver: Send + Sync {
    fn on_rows(&self, stage: Stage, rows: u64);

    fn on_stage_finished(&self, stage: Stage, rows: u64) {
        self.on_rows(stage, rows);
    }
}

pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_rows(&self, _stage: Stage, _rows: u64) {}
}

impl<F> ProgressObserver for F
where
    F: Fn(Stage, u64) + Send + Sync,
{
    fn on_rows(&self, stage: Stage, rows: u64) {
        self(stage, rows)
    }
}

/// Counts rows and notifies the observer every [`PROGRESS_INTERVAL`] rows.
pub(crate) struct RowCounter<'a> {
    stage: Stage,
    rows: u64,
    observer: &'a dyn ProgressObserver,
}

impl<'a> RowCounter<'a> {
    pub fn new(stage: Stage, observer: &'a dyn ProgressObserver) -> Self {
        RowCounter {
            stage,
            rows: 0,
            observer,
        }
    }

    pub fn tick(&mut self) {
        self.rows += 1;
        if self.rows % PROGRESS_INTERVAL == 0 {
            self.observer.on_rows(self.stage, self.rows);
        }
    }

    pub fn finish(self) -> u64 {
        self.observer.on_stage_finished(self.stage, self.rows);
        self.rows
    }
}
