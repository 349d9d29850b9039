use clap::ArgMatches;
use serde::Serialize;

use super::helpers::{self, terminal_adapter};
use crate::color;

#[derive(Debug, Serialize)]
struct KillOutput {
    killed: bool,
}

pub async fn run(matches: &ArgMatches, json: bool) -> i32 {
    let name = matches.get_one::<String>("name").cloned().unwrap_or_default();

    let adapter = terminal_adapter();
    let orchestrator = ntm_orchestrator::Orchestrator::new(adapter);
    let result = orchestrator.kill(&name);

    if result.is_ok() {
        if let Ok(cwd) = std::env::current_dir() {
            let project = ntm_orchestrator::resolve_project_dir(&cwd);
            let _ = ntm_orchestrator::session_state::remove(&project, &name);
        }
    }

    helpers::emit(
        json,
        "kill",
        None,
        Some(&name),
        result
            .map(|()| (KillOutput { killed: true }, Vec::new()))
            .map_err(|e| (ntm_core::NtmError::error_code(&e).to_string(), e.to_string())),
        |_, _| {
            println!("{} session {} destroyed", color::aurora("✓"), color::ice(&name));
        },
    )
}
