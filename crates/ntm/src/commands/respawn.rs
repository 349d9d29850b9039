use clap::ArgMatches;
use ntm_assign::is_pane_idle;
use ntm_orchestrator::{PaneKind, PaneRecord};
use serde::Serialize;

use super::helpers::{load_config_with_warning, terminal_adapter, usage_error};
use crate::color;
use crate::commands::helpers;

#[derive(Debug, Serialize)]
struct RespawnOutput {
    respawned: Vec<String>,
    skipped_busy: Vec<String>,
    dry_run: bool,
}

pub async fn run(matches: &ArgMatches, json: bool) -> i32 {
    let name = matches.get_one::<String>("name").cloned().unwrap_or_default();
    let dry_run = matches.get_flag("dry-run");
    let force = matches.get_flag("force");

    let cwd = match std::env::current_dir() {
        Ok(c) => c,
        Err(e) => return usage_error(json, "respawn", &format!("could not determine working directory: {e}")),
    };
    let project = ntm_orchestrator::resolve_project_dir(&cwd);
    let manifest = match ntm_orchestrator::session_state::read(&project, &name) {
        Ok(Some(m)) => m,
        Ok(None) => {
            return helpers::emit::<()>(
                json,
                "respawn",
                None,
                Some(&name),
                Err(("SESSION_NOT_FOUND".to_string(), format!("no spawn manifest found for session '{name}'"))),
                |_, _| {},
            )
        }
        Err(e) => return usage_error(json, "respawn", &e.to_string()),
    };

    let targets: Vec<&PaneRecord> = select_targets(matches, &manifest.panes);
    if targets.is_empty() {
        return usage_error(json, "respawn", "no matching panes (use --panes, --type, or --all)");
    }

    let config = load_config_with_warning();
    let adapter = terminal_adapter();
    let idle_markers = config.readiness.idle_markers();

    let mut respawned = Vec::new();
    let mut skipped_busy = Vec::new();

    for pane in targets {
        if !force {
            let scrollback = adapter.capture_pane(&name, &pane.pane, 10).unwrap_or_default();
            if !scrollback.is_empty() && !is_pane_idle(&scrollback, &idle_markers) {
                skipped_busy.push(pane.title.clone());
                continue;
            }
        }

        if dry_run {
            respawned.push(pane.title.clone());
            continue;
        }

        let Some(spec) = &pane.spec else { continue };
        let command = match config.get_agent_command(&spec.kind.to_string()) {
            Ok(c) => c,
            Err(e) => {
                skipped_busy.push(format!("{} (no agent command: {e})", pane.title));
                continue;
            }
        };
        let env = vec![("NTM_SESSION".to_string(), name.clone())];
        match adapter.respawn_pane(&name, &pane.pane, &command, &env) {
            Ok(()) => respawned.push(pane.title.clone()),
            Err(e) => skipped_busy.push(format!("{} ({e})", pane.title)),
        }
    }

    helpers::emit(
        json,
        "respawn",
        None,
        Some(&name),
        Ok::<_, (String, String)>((
            RespawnOutput {
                respawned: respawned.clone(),
                skipped_busy: skipped_busy.clone(),
                dry_run,
            },
            Vec::new(),
        )),
        |data, _| {
            let verb = if data.dry_run { "would respawn" } else { "respawned" };
            for title in &data.respawned {
                println!("{} {verb} {title}", color::aurora("✓"));
            }
            for title in &data.skipped_busy {
                println!("{} skipped {title} (busy, pass --force to override)", color::warning("~"));
            }
        },
    )
}

fn select_targets<'a>(matches: &ArgMatches, panes: &'a [PaneRecord]) -> Vec<&'a PaneRecord> {
    let agent_panes = || panes.iter().filter(|p| p.kind == PaneKind::Agent);

    if let Some(indices) = matches.get_many::<String>("panes") {
        let wanted: Vec<usize> = indices.filter_map(|s| s.parse().ok()).collect();
        return panes
            .iter()
            .enumerate()
            .filter(|(i, _)| wanted.contains(i))
            .map(|(_, p)| p)
            .collect();
    }
    if let Some(kind) = matches.get_one::<String>("type") {
        return agent_panes()
            .filter(|p| {
                p.spec
                    .as_ref()
                    .is_some_and(|s| s.kind.to_string() == normalize_kind(kind))
            })
            .collect();
    }
    if matches.get_flag("all") {
        return agent_panes().collect();
    }
    agent_panes().collect()
}

fn normalize_kind(short: &str) -> &'static str {
    match short {
        "cc" => "claude",
        "cod" => "codex",
        "gmi" => "gemini",
        _ => "",
    }
}
