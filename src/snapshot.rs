use crate::controller::{ClassroomState, OnChange};
use crate::error::SeatingError;
use crate::grid::SeatingGrid;
use crate::roster::{RosterStore, Student};
use crate::store::SnapshotStore;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use thiserror::Error;

pub const SNAPSHOT_KEY: &str = "classSeatingData";
pub const DEFAULT_MAX_AGE_DAYS: i64 = 7;

/// The persisted blob: roster, seat matrix, layout and save time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub classroom: Vec<Vec<Option<Student>>>,
    #[serde(default)]
    pub rows: Option<usize>,
    #[serde(default)]
    pub cols: Option<usize>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SnapshotRejected {
    #[error("snapshot is {age_days} days old")]
    Expired { age_days: i64 },
    #[error("snapshot has no classroom dimensions")]
    MissingShape,
    #[error("snapshot dimensions {rows}x{cols} are not usable")]
    BadDimensions { rows: usize, cols: usize },
    #[error("snapshot seat matrix does not match {rows}x{cols}")]
    ShapeMismatch { rows: usize, cols: usize },
    #[error("snapshot lists {0} twice")]
    DuplicateStudent(String),
    #[error("snapshot seats unknown student {0}")]
    UnknownStudent(String),
}

impl Snapshot {
    pub fn capture(state: &ClassroomState, now: DateTime<Utc>) -> Self {
        let roster = &state.roster;
        let classroom = state
            .grid
            .seat_rows()
            .map(|seats| {
                seats
                    .iter()
                    .map(|seat| seat.as_deref().and_then(|name| roster.get(name)).cloned())
                    .collect()
            })
            .collect();
        Self {
            students: roster.students().to_vec(),
            classroom,
            rows: Some(state.grid.rows()),
            cols: Some(state.grid.cols()),
            timestamp: now,
        }
    }

    /// Validates the snapshot and rebuilds the state it describes. Any
    /// inconsistency rejects the whole snapshot.
    pub fn into_state(
        self,
        now: DateTime<Utc>,
        max_age: Duration,
    ) -> Result<ClassroomState, SnapshotRejected> {
        let age = now.signed_duration_since(self.timestamp);
        if age > max_age {
            return Err(SnapshotRejected::Expired {
                age_days: age.num_days(),
            });
        }

        let (Some(rows), Some(cols)) = (self.rows, self.cols) else {
            return Err(SnapshotRejected::MissingShape);
        };
        let mut grid = SeatingGrid::new(rows, cols)
            .map_err(|_| SnapshotRejected::BadDimensions { rows, cols })?;
        if self.classroom.len() != rows || self.classroom.iter().any(|r| r.len() != cols) {
            return Err(SnapshotRejected::ShapeMismatch { rows, cols });
        }

        let mut seen = HashSet::new();
        for s in &self.students {
            if !seen.insert(s.name.as_str()) {
                return Err(SnapshotRejected::DuplicateStudent(s.name.clone()));
            }
        }
        let roster = RosterStore::from_iter(self.students.iter().cloned());

        for (r, seats) in self.classroom.iter().enumerate() {
            for (c, seat) in seats.iter().enumerate() {
                let Some(seated) = seat else {
                    continue;
                };
                let student = roster
                    .get(&seated.name)
                    .ok_or_else(|| SnapshotRejected::UnknownStudent(seated.name.clone()))?;
                // Fresh grid without single-seat enforcement: only an
                // out-of-range seat could fail, and the shape was checked.
                grid.place(r, c, student)
                    .map_err(|_| SnapshotRejected::ShapeMismatch { rows, cols })?;
            }
        }

        Ok(ClassroomState { roster, grid })
    }
}

/// Serializes `state` and replaces the stored snapshot. On any error the
/// previous snapshot is left as it was.
pub fn save_state(
    store: &mut dyn SnapshotStore,
    state: &ClassroomState,
    now: DateTime<Utc>,
) -> Result<(), SeatingError> {
    let blob = serde_json::to_string(&Snapshot::capture(state, now))
        .map_err(|e| SeatingError::StorageFailure(e.to_string()))?;
    store
        .save(SNAPSHOT_KEY, &blob)
        .map_err(|e| SeatingError::StorageFailure(format!("{e:#}")))
}

/// Loads the stored snapshot. Unreadable, expired or inconsistent snapshots
/// are deleted and `None` is returned.
pub fn load_state(
    store: &mut dyn SnapshotStore,
    now: DateTime<Utc>,
    max_age: Duration,
) -> Option<ClassroomState> {
    let blob = match store.load(SNAPSHOT_KEY) {
        Ok(Some(blob)) => blob,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!("discarding unreadable snapshot: {e:#}");
            discard(store);
            return None;
        }
    };

    let snapshot: Snapshot = match serde_json::from_str(&blob) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!("discarding malformed snapshot: {e}");
            discard(store);
            return None;
        }
    };

    match snapshot.into_state(now, max_age) {
        Ok(state) => {
            tracing::info!(
                students = state.roster.len(),
                seated = state.grid.occupied(),
                rows = state.grid.rows(),
                cols = state.grid.cols(),
                "restored snapshot"
            );
            Some(state)
        }
        Err(e) => {
            tracing::warn!("discarding snapshot: {e}");
            discard(store);
            None
        }
    }
}

fn discard(store: &mut dyn SnapshotStore) {
    if let Err(e) = store.remove(SNAPSHOT_KEY) {
        tracing::warn!("failed to delete snapshot: {e:#}");
    }
}

/// `on_change` hook that saves every new state to `store`. Failures are
/// logged; the previous snapshot stays in place.
pub fn write_through<S: SnapshotStore + 'static>(store: Rc<RefCell<S>>) -> OnChange {
    Box::new(move |state: &ClassroomState| {
        if let Err(e) = save_state(&mut *store.borrow_mut(), state, Utc::now()) {
            tracing::warn!("snapshot write-through failed: {e}");
        }
    })
}
