use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_seatingd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn seatingd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert_eq!(value["ok"], json!(true), "{} failed: {}", method, value);
    value["result"].clone()
}

fn error_code(value: &serde_json::Value) -> &str {
    assert_eq!(value["ok"], json!(false), "expected an error: {}", value);
    value["error"]["code"].as_str().unwrap_or("")
}

#[test]
fn roster_and_seat_operations_report_typed_errors() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let (i, r) = (&mut stdin, &mut reader);

    let state = request_ok(i, r, "1", "state.get", json!({}));
    assert_eq!(state["rows"], json!(5));
    assert_eq!(state["cols"], json!(8));
    assert_eq!(state["stats"]["seats"], json!(40));

    let click = request_ok(i, r, "2", "seating.click", json!({ "row": 0, "col": 0 }));
    assert_eq!(click["action"]["kind"], json!("noStudents"));

    request_ok(i, r, "3", "students.create", json!({ "name": "Alice", "gender": "F" }));
    request_ok(i, r, "4", "students.create", json!({ "name": "Bob", "gender": "male" }));

    let dup = request(i, r, "5", "students.create", json!({ "name": "Alice", "gender": "M" }));
    assert_eq!(error_code(&dup), "duplicate_name");
    let bad_gender = request(i, r, "6", "students.create", json!({ "name": "Cara", "gender": "X" }));
    assert_eq!(error_code(&bad_gender), "invalid_input");
    let blank = request(i, r, "7", "students.create", json!({ "name": "   ", "gender": "F" }));
    assert_eq!(error_code(&blank), "invalid_input");

    let resized = request_ok(i, r, "8", "seating.resize", json!({ "rows": 2, "cols": 2 }));
    assert_eq!(resized["state"]["stats"]["seats"], json!(4));
    let zero = request(i, r, "9", "seating.resize", json!({ "rows": 0, "cols": 3 }));
    assert_eq!(error_code(&zero), "invalid_dimensions");

    let click = request_ok(i, r, "10", "seating.click", json!({ "row": 0, "col": 0 }));
    assert_eq!(click["action"]["kind"], json!("chooseStudent"));
    assert_eq!(click["action"]["candidates"].as_array().map(|a| a.len()), Some(2));

    let placed = request_ok(
        i,
        r,
        "11",
        "seating.place",
        json!({ "row": 0, "col": 0, "name": "Alice" }),
    );
    assert_eq!(placed["state"]["seats"][0][0]["name"], json!("Alice"));
    assert_eq!(placed["state"]["seats"][0][0]["gender"], json!("F"));

    let occupied = request(
        i,
        r,
        "12",
        "seating.place",
        json!({ "row": 0, "col": 0, "name": "Bob" }),
    );
    assert_eq!(error_code(&occupied), "occupied_seat");
    assert_eq!(occupied["error"]["details"]["occupant"], json!("Alice"));

    let outside = request(
        i,
        r,
        "13",
        "seating.place",
        json!({ "row": 2, "col": 0, "name": "Bob" }),
    );
    assert_eq!(error_code(&outside), "out_of_bounds");
    let unknown = request(
        i,
        r,
        "14",
        "seating.place",
        json!({ "row": 1, "col": 1, "name": "Zed" }),
    );
    assert_eq!(error_code(&unknown), "not_found");
    let missing = request(i, r, "15", "seating.place", json!({ "row": 1, "name": "Bob" }));
    assert_eq!(error_code(&missing), "bad_params");

    let click = request_ok(i, r, "16", "seating.click", json!({ "row": 0, "col": 0 }));
    assert_eq!(click["action"]["kind"], json!("occupied"));
    assert_eq!(click["action"]["name"], json!("Alice"));

    let unseated = request_ok(i, r, "17", "seating.unseated", json!({}));
    assert_eq!(unseated["students"], json!([{ "name": "Bob", "gender": "M" }]));

    let cleared = request_ok(i, r, "18", "seating.clear", json!({ "row": 0, "col": 0 }));
    assert_eq!(cleared["cleared"], json!(true));
    let again = request_ok(i, r, "19", "seating.clear", json!({ "row": 0, "col": 0 }));
    assert_eq!(again["cleared"], json!(false));

    let arranged = request_ok(i, r, "20", "seating.autoArrange", json!({}));
    assert_eq!(arranged["seated"], json!(2));
    assert_eq!(arranged["state"]["stats"]["seated"], json!(2));
    assert_eq!(arranged["state"]["stats"]["free"], json!(2));

    let seats = arranged["state"]["seats"].as_array().expect("seats").clone();
    let (er, ec) = seats
        .iter()
        .enumerate()
        .find_map(|(ri, row)| {
            row.as_array()?
                .iter()
                .position(|s| s.is_null())
                .map(|ci| (ri, ci))
        })
        .expect("an empty seat");
    let click = request_ok(i, r, "21", "seating.click", json!({ "row": er, "col": ec }));
    assert_eq!(click["action"]["kind"], json!("allSeated"));

    let removed = request_ok(i, r, "22", "students.delete", json!({ "name": "Bob" }));
    assert_eq!(removed["seatsCleared"], json!(1));
    assert_eq!(removed["state"]["stats"]["seated"], json!(1));
    let gone = request(i, r, "23", "students.delete", json!({ "name": "Bob" }));
    assert_eq!(error_code(&gone), "not_found");

    request_ok(
        i,
        r,
        "24",
        "students.import",
        json!({
            "rows": [["Dan", "M"], ["Eve", "F"], ["Fay", "F"], ["Gus", "M"], ["Alice", "F"], ["Bad", "?"]],
            "mode": "append"
        }),
    );
    let over = request(i, r, "25", "seating.autoArrange", json!({}));
    assert_eq!(error_code(&over), "capacity_exceeded");
    assert_eq!(over["error"]["details"]["students"], json!(5));
    assert_eq!(over["error"]["details"]["seats"], json!(4));

    let cleared = request_ok(i, r, "26", "students.clear", json!({}));
    assert_eq!(cleared["state"]["students"], json!([]));
    assert_eq!(cleared["state"]["stats"]["seated"], json!(0));
    let empty = request(i, r, "27", "seating.autoArrange", json!({}));
    assert_eq!(error_code(&empty), "empty_roster");

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn students_import_counts_skipped_rows() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let (i, r) = (&mut stdin, &mut reader);

    request_ok(i, r, "1", "students.create", json!({ "name": "Old", "gender": "M" }));
    let imported = request_ok(
        i,
        r,
        "2",
        "students.import",
        json!({
            "rows": [
                ["Ann", "F"],
                { "name": "Ben", "gender": "男" },
                ["Ann", "F"],
                ["", "M"],
                ["NoGender"],
                42
            ]
        }),
    );
    assert_eq!(imported["import"]["format"], json!("rosterList"));
    assert_eq!(imported["import"]["added"], json!(2));
    assert_eq!(imported["import"]["skipped"], json!(4));

    let names: Vec<&str> = imported["state"]["students"]
        .as_array()
        .expect("students")
        .iter()
        .filter_map(|s| s["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Ann", "Ben"]);

    let bad_mode = request(i, r, "3", "students.import", json!({ "rows": [], "mode": "upsert" }));
    assert_eq!(error_code(&bad_mode), "invalid_input");

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn names_are_matched_after_trimming() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let (i, r) = (&mut stdin, &mut reader);

    let created = request_ok(i, r, "1", "students.create", json!({ "name": " Ada ", "gender": "F" }));
    assert_eq!(created["student"]["name"], json!("Ada"));

    let placed = request_ok(
        i,
        r,
        "2",
        "seating.place",
        json!({ "row": 0, "col": 0, "name": " Ada " }),
    );
    assert_eq!(placed["state"]["seats"][0][0]["name"], json!("Ada"));

    let removed = request_ok(i, r, "3", "students.delete", json!({ "name": " Ada " }));
    assert_eq!(removed["seatsCleared"], json!(1));
    assert_eq!(removed["state"]["students"], json!([]));

    drop(stdin);
    let _ = child.wait();
}
