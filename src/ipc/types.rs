use crate::config::Settings;
use crate::controller::Controller;
use crate::snapshot;
use crate::store::SqliteSnapshotStore;
use anyhow::Context;
use chrono::{Duration, Utc};
use serde::Deserialize;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub store: Option<Rc<RefCell<SqliteSnapshotStore>>>,
    pub controller: Controller,
    pub snapshot_max_age: Duration,
}

impl AppState {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let controller = Controller::new(settings.controller_options())?;
        Ok(Self {
            workspace: None,
            store: None,
            controller,
            snapshot_max_age: settings.snapshot_max_age(),
        })
    }

    /// Opens the workspace store and routes future changes to it. A valid
    /// stored snapshot replaces the current classroom; otherwise the current
    /// classroom is kept and written to the new store if it holds any work.
    /// Returns whether a snapshot was restored.
    pub fn open_workspace(&mut self, path: &Path) -> anyhow::Result<bool> {
        let store = Rc::new(RefCell::new(SqliteSnapshotStore::open(path)?));
        let restored = snapshot::load_state(&mut *store.borrow_mut(), Utc::now(), self.snapshot_max_age);
        let found = restored.is_some();
        match restored {
            Some(state) => self.controller.restore(state),
            None => {
                if *self.controller.state() != self.controller.initial_state()? {
                    snapshot::save_state(&mut *store.borrow_mut(), self.controller.state(), Utc::now())
                        .with_context(|| format!("failed to save classroom to {}", path.to_string_lossy()))?;
                }
            }
        }

        self.controller.clear_hooks();
        self.controller
            .on_change(snapshot::write_through(Rc::clone(&store)));
        self.store = Some(store);
        self.workspace = Some(path.to_path_buf());
        tracing::info!(workspace = %path.display(), restored = found, "workspace selected");
        Ok(found)
    }
}
