use crate::error::SeatingError;
use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::helpers::{get_import_mode, get_required_str, get_table, state_view};
use crate::ipc::types::{AppState, Request};
use crate::xlsx;
use serde_json::json;
use std::path::Path;

fn export_table(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    let table = state.controller.export_table()?;
    Ok(json!({ "table": table }))
}

fn import_table(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let mode = get_import_mode(params)?;
    let table = get_table(params)?;
    let outcome = state.controller.import_table(&table, mode)?;
    Ok(json!({
        "import": outcome,
        "state": state_view(&state.controller),
    }))
}

fn export_xlsx(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let path = Path::new(get_required_str(params, "path")?);
    let table = state.controller.export_table()?;
    xlsx::write_table(&table, path).map_err(|e| HandlerErr {
        code: "export_failed",
        message: format!("{e:#}"),
        details: Some(json!({ "path": path.to_string_lossy() })),
    })?;
    tracing::info!(path = %path.display(), "exported seating chart");
    Ok(json!({
        "path": path.to_string_lossy(),
        "rowCount": table.rows.len(),
    }))
}

fn import_xlsx(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let path = Path::new(get_required_str(params, "path")?);
    let mode = get_import_mode(params)?;
    let table = xlsx::read_table(path)
        .map_err(|e| SeatingError::ImportParseFailure(format!("{e:#}")))?;
    let outcome = state.controller.import_table(&table, mode)?;
    tracing::info!(
        path = %path.display(),
        added = outcome.added,
        seated = outcome.seated,
        "imported workbook"
    );
    Ok(json!({
        "import": outcome,
        "state": state_view(&state.controller),
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "exchange.exportTable" => export_table(state),
        "exchange.importTable" => import_table(state, &req.params),
        "exchange.exportXlsx" => export_xlsx(state, &req.params),
        "exchange.importXlsx" => import_xlsx(state, &req.params),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
