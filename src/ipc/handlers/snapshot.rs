use crate::error::SeatingError;
use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::helpers::state_view;
use crate::ipc::types::{AppState, Request};
use crate::snapshot::{self, SNAPSHOT_KEY};
use crate::store::SnapshotStore;
use chrono::Utc;
use serde_json::json;

fn no_workspace() -> HandlerErr {
    HandlerErr {
        code: "no_workspace",
        message: "select a workspace first".to_string(),
        details: None,
    }
}

fn snapshot_save(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    let store = state.store.as_ref().ok_or_else(no_workspace)?;
    let now = Utc::now();
    snapshot::save_state(&mut *store.borrow_mut(), state.controller.state(), now)?;
    Ok(json!({ "savedAt": now.to_rfc3339() }))
}

/// Drops the stored snapshot and returns to an empty classroom. Nothing
/// changes unless the stored snapshot was deleted.
fn snapshot_reset(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    let fresh = state.controller.initial_state()?;
    if let Some(store) = state.store.as_ref() {
        store
            .borrow_mut()
            .remove(SNAPSHOT_KEY)
            .map_err(|e| SeatingError::StorageFailure(format!("{e:#}")))?;
    }
    // `restore` skips the write-through hook, so the store stays empty.
    state.controller.restore(fresh);
    tracing::info!("classroom reset");
    Ok(json!({ "state": state_view(&state.controller) }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "snapshot.save" => snapshot_save(state),
        "snapshot.reset" => snapshot_reset(state),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
