use chrono::{Duration, Utc};
use seatingd::controller::{Controller, ControllerOptions};
use seatingd::db::DB_FILE;
use seatingd::roster::Gender;
use seatingd::snapshot::{Snapshot, SNAPSHOT_KEY};
use seatingd::store::{SnapshotStore, SqliteSnapshotStore};
use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

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

fn select(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    workspace: &Path,
) -> serde_json::Value {
    request_ok(
        stdin,
        reader,
        "select",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    )
}

fn write_snapshot_aged(workspace: &Path, age: Duration) {
    let mut controller = Controller::new(ControllerOptions::default()).expect("controller");
    controller.add_student("Stale", Gender::F).expect("add");
    controller.assign_seat(1, 1, "Stale").expect("seat");
    let snapshot = Snapshot::capture(controller.state(), Utc::now() - age);
    let blob = serde_json::to_string(&snapshot).expect("serialize snapshot");

    let mut store = SqliteSnapshotStore::open(workspace).expect("open store");
    store.save(SNAPSHOT_KEY, &blob).expect("save snapshot");
}

#[test]
fn changes_survive_a_restart_of_the_sidecar() {
    let workspace = temp_dir("seatingd-persist");

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let first = select(&mut stdin, &mut reader, &workspace);
    assert_eq!(first["restored"], json!(false));
    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "seating.resize",
        json!({ "rows": 3, "cols": 4 }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "students.create",
        json!({ "name": "Alice", "gender": "F" }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "students.create",
        json!({ "name": "Bob", "gender": "M" }),
    );
    let before = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "seating.place",
        json!({ "row": 2, "col": 3, "name": "Bob" }),
    );
    drop(stdin);
    let _ = child.wait();

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let second = select(&mut stdin, &mut reader, &workspace);
    assert_eq!(second["restored"], json!(true));
    assert_eq!(second["state"], before["state"]);
    assert_eq!(second["state"]["seats"][2][3]["name"], json!("Bob"));

    let reset = request_ok(&mut stdin, &mut reader, "5", "snapshot.reset", json!({}));
    assert_eq!(reset["state"]["students"], json!([]));
    drop(stdin);
    let _ = child.wait();

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let third = select(&mut stdin, &mut reader, &workspace);
    assert_eq!(third["restored"], json!(false));
    assert_eq!(third["state"]["rows"], json!(5));
    drop(stdin);
    let _ = child.wait();

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn snapshots_older_than_a_week_are_discarded() {
    let workspace = temp_dir("seatingd-expired");
    write_snapshot_aged(&workspace, Duration::days(10));

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let selected = select(&mut stdin, &mut reader, &workspace);
    assert_eq!(selected["restored"], json!(false));
    assert_eq!(selected["state"]["students"], json!([]));
    assert_eq!(selected["state"]["rows"], json!(5));
    assert_eq!(selected["state"]["cols"], json!(8));
    drop(stdin);
    let _ = child.wait();

    let store = SqliteSnapshotStore::open(&workspace).expect("open store");
    assert_eq!(store.load(SNAPSHOT_KEY).expect("load"), None);

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn recent_snapshot_is_restored() {
    let workspace = temp_dir("seatingd-recent");
    write_snapshot_aged(&workspace, Duration::days(2));

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let selected = select(&mut stdin, &mut reader, &workspace);
    assert_eq!(selected["restored"], json!(true));
    assert_eq!(selected["state"]["seats"][1][1]["name"], json!("Stale"));
    drop(stdin);
    let _ = child.wait();

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn tampered_snapshot_falls_back_to_an_empty_classroom() {
    let workspace = temp_dir("seatingd-tampered");
    write_snapshot_aged(&workspace, Duration::hours(1));

    let conn = rusqlite::Connection::open(workspace.join(DB_FILE)).expect("open db");
    conn.execute(
        "UPDATE snapshots SET blob = ? WHERE key = ?",
        ("{\"students\":[]", SNAPSHOT_KEY),
    )
    .expect("tamper");
    drop(conn);

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let selected = select(&mut stdin, &mut reader, &workspace);
    assert_eq!(selected["restored"], json!(false));
    assert_eq!(selected["state"]["students"], json!([]));
    drop(stdin);
    let _ = child.wait();

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn selecting_an_empty_workspace_keeps_the_unsaved_classroom() {
    let workspace = temp_dir("seatingd-late-select");

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "students.create",
        json!({ "name": "Ada", "gender": "F" }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "seating.place",
        json!({ "row": 0, "col": 2, "name": "Ada" }),
    );
    let selected = select(&mut stdin, &mut reader, &workspace);
    assert_eq!(selected["restored"], json!(false));
    assert_eq!(selected["state"]["seats"][0][2]["name"], json!("Ada"));

    let state = request_ok(&mut stdin, &mut reader, "3", "state.get", json!({}));
    assert_eq!(state["students"], json!([{ "name": "Ada", "gender": "F" }]));
    drop(stdin);
    let _ = child.wait();

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let reopened = select(&mut stdin, &mut reader, &workspace);
    assert_eq!(reopened["restored"], json!(true));
    assert_eq!(reopened["state"]["seats"][0][2]["name"], json!("Ada"));
    drop(stdin);
    let _ = child.wait();

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn failed_reset_leaves_the_classroom_alone() {
    let workspace = temp_dir("seatingd-reset-failure");

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    select(&mut stdin, &mut reader, &workspace);
    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "students.create",
        json!({ "name": "Ada", "gender": "F" }),
    );

    let conn = rusqlite::Connection::open(workspace.join(DB_FILE)).expect("open db");
    conn.execute("DROP TABLE snapshots", []).expect("drop table");
    drop(conn);

    let reset = request(&mut stdin, &mut reader, "2", "snapshot.reset", json!({}));
    assert_eq!(reset["ok"], json!(false));
    assert_eq!(reset["error"]["code"], json!("storage_failed"));

    let state = request_ok(&mut stdin, &mut reader, "3", "state.get", json!({}));
    assert_eq!(state["students"], json!([{ "name": "Ada", "gender": "F" }]));
    drop(stdin);
    let _ = child.wait();

    let _ = std::fs::remove_dir_all(workspace);
}
