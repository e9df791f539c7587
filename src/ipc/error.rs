use crate::error::SeatingError;
use serde_json::json;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

pub struct HandlerErr {
    pub code: &'static str,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl HandlerErr {
    pub fn bad_params(message: impl Into<String>) -> Self {
        Self {
            code: "bad_params",
            message: message.into(),
            details: None,
        }
    }

    pub fn response(self, id: &str) -> serde_json::Value {
        err(id, self.code, self.message, self.details)
    }
}

impl From<SeatingError> for HandlerErr {
    fn from(e: SeatingError) -> Self {
        let details = match &e {
            SeatingError::OccupiedSeat { row, col, occupant } => Some(json!({
                "row": row,
                "col": col,
                "occupant": occupant,
            })),
            SeatingError::OutOfBounds { rows, cols, .. }
            | SeatingError::InvalidDimensions { rows, cols } => Some(json!({
                "rows": rows,
                "cols": cols,
            })),
            SeatingError::CapacityExceeded { students, seats } => Some(json!({
                "students": students,
                "seats": seats,
            })),
            _ => None,
        };
        Self {
            code: e.code(),
            message: e.to_string(),
            details,
        }
    }
}

/// Wraps a handler body: `Ok` becomes a success envelope, `Err` an error one.
pub fn respond(id: &str, result: Result<serde_json::Value, HandlerErr>) -> serde_json::Value {
    match result {
        Ok(v) => ok(id, v),
        Err(e) => e.response(id),
    }
}
