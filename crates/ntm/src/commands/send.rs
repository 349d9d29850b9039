use clap::ArgMatches;
use ntm_orchestrator::TargetSelector;
use serde::Serialize;

use super::helpers::{self, terminal_adapter};
use crate::color;

#[derive(Debug, Serialize)]
struct SendOutput {
    panes_targeted: usize,
}

pub async fn run(matches: &ArgMatches, json: bool) -> i32 {
    let name = matches.get_one::<String>("name").cloned().unwrap_or_default();

    let prompt = match resolve_prompt(matches) {
        Ok(p) => p,
        Err(message) => return helpers::usage_error(json, "send", &message),
    };

    let cwd = match std::env::current_dir() {
        Ok(c) => c,
        Err(e) => return helpers::usage_error(json, "send", &format!("could not determine working directory: {e}")),
    };
    let project = ntm_orchestrator::resolve_project_dir(&cwd);
    let manifest = match ntm_orchestrator::session_state::read(&project, &name) {
        Ok(Some(m)) => m,
        Ok(None) => {
            return helpers::emit::<()>(
                json,
                "send",
                None,
                Some(&name),
                Err(("SESSION_NOT_FOUND".to_string(), format!("no spawn manifest found for session '{name}' — did you run `ntm spawn {name}` from this project?"))),
                |_, _| {},
            )
        }
        Err(e) => return helpers::usage_error(json, "send", &e.to_string()),
    };

    let selector = if matches.get_flag("cc") {
        TargetSelector::AgentKinds(vec![ntm_protocol::AgentKind::Claude])
    } else if matches.get_flag("cod") {
        TargetSelector::AgentKinds(vec![ntm_protocol::AgentKind::Codex])
    } else if matches.get_flag("gmi") {
        TargetSelector::AgentKinds(vec![ntm_protocol::AgentKind::Gemini])
    } else if let Some(pane) = matches.get_one::<String>("pane") {
        let index: usize = match pane.parse() {
            Ok(i) => i,
            Err(_) => return helpers::usage_error(json, "send", &format!("invalid pane index '{pane}'")),
        };
        TargetSelector::Pane(index)
    } else {
        TargetSelector::AllAgents
    };

    let adapter = terminal_adapter();
    let orchestrator = ntm_orchestrator::Orchestrator::new(adapter);
    let result = orchestrator.send(&name, &prompt, &manifest.panes, selector);

    helpers::emit(
        json,
        "send",
        None,
        Some(&name),
        result
            .map(|n| (SendOutput { panes_targeted: n }, Vec::new()))
            .map_err(|e| (ntm_core::NtmError::error_code(&e).to_string(), e.to_string())),
        |data, _| {
            println!("{} delivered prompt to {} pane(s)", color::aurora("✓"), data.panes_targeted);
        },
    )
}

fn resolve_prompt(matches: &ArgMatches) -> Result<String, String> {
    if let Some(text) = matches.get_one::<String>("prompt") {
        let prefix = matches.get_one::<String>("prefix").cloned().unwrap_or_default();
        let suffix = matches.get_one::<String>("suffix").cloned().unwrap_or_default();
        return Ok(format!("{prefix}{text}{suffix}"));
    }
    if let Some(path) = matches.get_one::<String>("prompt-file") {
        let content = std::fs::read_to_string(path).map_err(|e| format!("could not read prompt file '{path}': {e}"))?;
        let prefix = matches.get_one::<String>("prefix").cloned().unwrap_or_default();
        let suffix = matches.get_one::<String>("suffix").cloned().unwrap_or_default();
        return Ok(format!("{prefix}{content}{suffix}"));
    }
    Err("one of a positional prompt or --prompt-file is required".to_string())
}
