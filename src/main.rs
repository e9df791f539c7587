mod bootstrap;

use clap::Parser;
use seatingd::config::Settings;
use seatingd::ipc;
use std::io::{self, BufRead, Write};

fn main() -> anyhow::Result<()> {
    let settings = Settings::parse();
    bootstrap::setup_logging(&settings.log_level)?;
    tracing::info!("seatingd v{} starting", env!("CARGO_PKG_VERSION"));

    let mut state = ipc::AppState::new(&settings)?;
    if let Some(workspace) = settings.workspace.as_deref() {
        state.open_workspace(workspace)?;
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id.
                let resp = serde_json::json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() }
                });
                let _ = writeln!(stdout, "{}", resp);
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }

    tracing::info!("stdin closed, shutting down");
    Ok(())
}
