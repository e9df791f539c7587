use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::helpers::{get_import_mode, get_required_str, state_view};
use crate::ipc::types::{AppState, Request};
use crate::roster::{Gender, Student};
use serde_json::json;

fn students_list(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    let roster = &state.controller.state().roster;
    Ok(json!({
        "students": roster.students(),
        "stats": roster.stats(),
    }))
}

fn students_create(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let name = get_required_str(params, "name")?;
    let gender: Gender = params
        .get("gender")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .parse()?;
    let student = state.controller.add_student(name, gender)?;
    Ok(json!({
        "student": student,
        "message": format!("added {}", student.name),
        "state": state_view(&state.controller),
    }))
}

fn students_delete(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let name = get_required_str(params, "name")?;
    let seats_cleared = state.controller.remove_student(name)?;
    Ok(json!({
        "seatsCleared": seats_cleared,
        "message": format!("removed {}", name),
        "state": state_view(&state.controller),
    }))
}

fn students_clear(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    state.controller.clear_students();
    Ok(json!({ "state": state_view(&state.controller) }))
}

fn parse_import_rows(params: &serde_json::Value) -> Result<(Vec<Student>, usize), HandlerErr> {
    let rows = params
        .get("rows")
        .and_then(|v| v.as_array())
        .ok_or_else(|| HandlerErr::bad_params("missing params.rows"))?;

    let mut students = Vec::with_capacity(rows.len());
    let mut invalid = 0;
    for row in rows {
        let (name, gender) = match row {
            serde_json::Value::Array(cells) => (
                cells.first().and_then(|v| v.as_str()),
                cells.get(1).and_then(|v| v.as_str()),
            ),
            serde_json::Value::Object(_) => (
                row.get("name").and_then(|v| v.as_str()),
                row.get("gender").and_then(|v| v.as_str()),
            ),
            _ => (None, None),
        };
        match (name, gender.map(str::parse::<Gender>)) {
            (Some(name), Some(Ok(gender))) if !name.trim().is_empty() => {
                students.push(Student::new(name.trim(), gender));
            }
            _ => invalid += 1,
        }
    }
    Ok((students, invalid))
}

fn students_import(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let mode = get_import_mode(params)?;
    let (students, invalid) = parse_import_rows(params)?;
    let mut outcome = state.controller.import_students(students, mode);
    outcome.skipped += invalid;
    Ok(json!({
        "import": outcome,
        "state": state_view(&state.controller),
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "students.list" => students_list(state),
        "students.create" => students_create(state, &req.params),
        "students.delete" => students_delete(state, &req.params),
        "students.clear" => students_clear(state),
        "students.import" => students_import(state, &req.params),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
