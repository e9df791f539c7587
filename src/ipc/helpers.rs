use crate::controller::Controller;
use crate::ipc::error::HandlerErr;
use crate::roster::ImportMode;
use crate::table::Table;
use serde_json::json;

pub fn get_required_str<'a>(params: &'a serde_json::Value, key: &str) -> Result<&'a str, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing params.{}", key)))
}

pub fn get_required_usize(params: &serde_json::Value, key: &str) -> Result<usize, HandlerErr> {
    let v = params
        .get(key)
        .ok_or_else(|| HandlerErr::bad_params(format!("missing params.{}", key)))?;
    v.as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| HandlerErr::bad_params(format!("params.{} must be a non-negative integer", key)))
}

/// `params.mode`, defaulting to `replace` when absent.
pub fn get_import_mode(params: &serde_json::Value) -> Result<ImportMode, HandlerErr> {
    match params.get("mode") {
        None | Some(serde_json::Value::Null) => Ok(ImportMode::default()),
        Some(serde_json::Value::String(s)) => s.parse().map_err(HandlerErr::from),
        Some(_) => Err(HandlerErr::bad_params("params.mode must be a string")),
    }
}

pub fn get_table(params: &serde_json::Value) -> Result<Table, HandlerErr> {
    let raw = params
        .get("table")
        .ok_or_else(|| HandlerErr::bad_params("missing params.table"))?;
    serde_json::from_value(raw.clone())
        .map_err(|e| HandlerErr::bad_params(format!("params.table must be an array of rows: {}", e)))
}

/// Everything the presentation layer needs to redraw.
pub fn state_view(controller: &Controller) -> serde_json::Value {
    let state = controller.state();
    let seats: Vec<Vec<serde_json::Value>> = state
        .grid
        .seat_rows()
        .map(|row| {
            row.iter()
                .map(|seat| match seat.as_deref().and_then(|n| state.roster.get(n)) {
                    Some(s) => json!({ "name": s.name, "gender": s.gender }),
                    None => serde_json::Value::Null,
                })
                .collect()
        })
        .collect();
    json!({
        "rows": state.grid.rows(),
        "cols": state.grid.cols(),
        "enforceSingleSeat": state.grid.enforces_single_seat(),
        "students": state.roster.students(),
        "seats": seats,
        "stats": controller.stats(),
    })
}
