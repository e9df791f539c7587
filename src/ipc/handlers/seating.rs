use crate::grid::ClearOutcome;
use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::helpers::{get_required_str, get_required_usize, state_view};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn seat_coords(params: &serde_json::Value) -> Result<(usize, usize), HandlerErr> {
    Ok((
        get_required_usize(params, "row")?,
        get_required_usize(params, "col")?,
    ))
}

fn seating_resize(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let rows = get_required_usize(params, "rows")?;
    let cols = get_required_usize(params, "cols")?;
    state.controller.resize(rows, cols)?;
    Ok(json!({ "state": state_view(&state.controller) }))
}

fn seating_click(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let (row, col) = seat_coords(params)?;
    let click = state.controller.handle_seat_click(row, col)?;
    Ok(json!({ "row": row, "col": col, "action": click }))
}

fn seating_place(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let (row, col) = seat_coords(params)?;
    let name = get_required_str(params, "name")?;
    let student = state.controller.assign_seat(row, col, name)?;
    Ok(json!({
        "student": student,
        "message": format!("{} seated at {}-{}", student.name, row + 1, col + 1),
        "state": state_view(&state.controller),
    }))
}

fn seating_clear(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let (row, col) = seat_coords(params)?;
    let outcome = state.controller.clear_seat(row, col)?;
    let (cleared, message) = match outcome {
        ClearOutcome::Cleared => (true, format!("seat {}-{} cleared", row + 1, col + 1)),
        ClearOutcome::AlreadyEmpty => (false, format!("seat {}-{} is already empty", row + 1, col + 1)),
    };
    Ok(json!({
        "cleared": cleared,
        "message": message,
        "state": state_view(&state.controller),
    }))
}

fn seating_auto_arrange(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    let seated = state.controller.auto_arrange()?;
    Ok(json!({
        "seated": seated,
        "state": state_view(&state.controller),
    }))
}

fn seating_unseated(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    Ok(json!({ "students": state.controller.unseated_students() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "seating.get" => Ok(state_view(&state.controller)),
        "seating.resize" => seating_resize(state, &req.params),
        "seating.click" => seating_click(state, &req.params),
        "seating.place" => seating_place(state, &req.params),
        "seating.clear" => seating_clear(state, &req.params),
        "seating.autoArrange" => seating_auto_arrange(state),
        "seating.unseated" => seating_unseated(state),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
