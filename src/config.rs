use crate::controller::ControllerOptions;
use crate::grid::{DEFAULT_COLS, DEFAULT_ROWS};
use crate::snapshot::DEFAULT_MAX_AGE_DAYS;
use chrono::Duration;
use clap::Parser;
use std::path::PathBuf;

/// Classroom seating sidecar: JSON requests on stdin, one JSON response per
/// line on stdout.
#[derive(Parser, Debug, Clone)]
#[command(name = "seatingd", version)]
pub struct Settings {
    /// Workspace directory to open at startup (holds seating.sqlite3)
    #[arg(long, env = "SEATINGD_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Rows in a fresh classroom
    #[arg(long, env = "SEATINGD_ROWS", default_value_t = DEFAULT_ROWS)]
    pub rows: usize,

    /// Columns in a fresh classroom
    #[arg(long, env = "SEATINGD_COLS", default_value_t = DEFAULT_COLS)]
    pub cols: usize,

    /// Refuse to seat a student who already has a seat
    #[arg(long, env = "SEATINGD_ENFORCE_SINGLE_SEAT")]
    pub enforce_single_seat: bool,

    /// Snapshots older than this many days are discarded on load
    #[arg(
        long,
        env = "SEATINGD_SNAPSHOT_MAX_AGE_DAYS",
        default_value_t = DEFAULT_MAX_AGE_DAYS,
        value_parser = clap::value_parser!(i64).range(1..=3650)
    )]
    pub snapshot_max_age_days: i64,

    /// Log filter directive (trace, debug, info, warn, error)
    #[arg(long, env = "SEATINGD_LOG", default_value = "info")]
    pub log_level: String,
}

impl Settings {
    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            rows: self.rows,
            cols: self.cols,
            enforce_single_seat: self.enforce_single_seat,
        }
    }

    pub fn snapshot_max_age(&self) -> Duration {
        Duration::days(self.snapshot_max_age_days)
    }
}
