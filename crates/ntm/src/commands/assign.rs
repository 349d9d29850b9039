use clap::ArgMatches;
use ntm_core::collaborators::NullClient;
use ntm_core::NtmError;
use serde::Serialize;

use super::helpers::{self, current_tmux_session, load_config_with_warning, terminal_adapter, usage_error};
use crate::color;

#[derive(Debug, Serialize)]
struct AssignOutput {
    assigned: usize,
    warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ClearOutput {
    cleared: usize,
    failed: usize,
    reservations_released: usize,
}

pub async fn run(matches: &ArgMatches, json: bool) -> i32 {
    let session = match resolve_session(matches) {
        Ok(s) => s,
        Err(message) => return usage_error(json, "assign", &message),
    };

    let cwd = match std::env::current_dir() {
        Ok(c) => c,
        Err(e) => return usage_error(json, "assign", &format!("could not determine working directory: {e}")),
    };
    let project = ntm_orchestrator::resolve_project_dir(&cwd);

    let mut engine = match ntm_assign::AssignmentEngine::load(&project.assignments_file()) {
        Ok(e) => e,
        Err(e) => return usage_error(json, "assign", &e.to_string()),
    };

    let force = matches.get_flag("force");
    let null = NullClient;

    if let Some(ids) = matches.get_many::<String>("clear") {
        let bead_ids: Vec<String> = ids.cloned().collect();
        let (_, summary) = engine.clear(&bead_ids, force, &null).await;
        return finish_clear(json, &session, &mut engine, &project, summary);
    }
    if let Some(pane) = matches.get_one::<String>("clear-pane") {
        let index: usize = match pane.parse() {
            Ok(i) => i,
            Err(_) => return usage_error(json, "assign", &format!("invalid pane index '{pane}'")),
        };
        let (_, summary) = engine.clear_pane(index, force, &null).await;
        return finish_clear(json, &session, &mut engine, &project, summary);
    }
    if matches.get_flag("clear-failed") {
        let (_, summary) = engine.clear_failed(&null).await;
        return finish_clear(json, &session, &mut engine, &project, summary);
    }

    // Default path: bind fresh candidates to idle panes.
    let manifest = match ntm_orchestrator::session_state::read(&project, &session) {
        Ok(Some(m)) => m,
        Ok(None) => {
            return helpers::emit::<()>(
                json,
                "assign",
                None,
                Some(&session),
                Err(("SESSION_NOT_FOUND".to_string(), format!("no spawn manifest found for session '{session}'"))),
                |_, _| {},
            )
        }
        Err(e) => return usage_error(json, "assign", &e.to_string()),
    };

    let config = load_config_with_warning();
    let strategy = matches
        .get_one::<String>("strategy")
        .map(|s| parse_strategy(s))
        .unwrap_or(ntm_assign::Strategy::Balanced);
    let limit: usize = matches
        .get_one::<String>("limit")
        .map(|s| s.parse().unwrap_or(0))
        .unwrap_or(0);
    let ready_timeout = matches
        .get_one::<String>("ready-timeout")
        .and_then(|s| s.parse().ok())
        .map(std::time::Duration::from_secs)
        .unwrap_or_else(|| std::time::Duration::from_secs(config.readiness.ready_timeout_secs()));

    let adapter = terminal_adapter();
    let result = engine
        .assign(ntm_assign::AssignContext {
            session: session.clone(),
            adapter: adapter.as_ref(),
            panes: &manifest.panes,
            triage: &null,
            mail: &null,
            idle_markers: config.readiness.idle_markers(),
            poll_interval: std::time::Duration::from_secs(config.readiness.poll_interval_secs()),
            ready_timeout,
            strategy,
            limit,
            reserve_files: true,
        })
        .await;

    if result.is_ok() {
        if let Err(e) = engine.save(&project.assignments_file()) {
            eprintln!("{}", color::warning(&format!("warning: assignments could not be persisted to disk: {e}")));
        }
    }

    helpers::emit(
        json,
        "assign",
        None,
        Some(&session),
        result
            .map(|o| {
                (
                    AssignOutput {
                        assigned: o.assigned.len(),
                        warnings: o.warnings.clone(),
                    },
                    o.warnings,
                )
            })
            .map_err(|e| (e.error_code().to_string(), e.to_string())),
        |data, _| {
            println!("{} assigned {} item(s)", color::aurora("✓"), data.assigned);
        },
    )
}

fn finish_clear(
    json: bool,
    session: &str,
    engine: &mut ntm_assign::AssignmentEngine,
    project: &ntm_paths::ProjectPaths,
    summary: ntm_assign::ClearSummary,
) -> i32 {
    if let Err(e) = engine.save(&project.assignments_file()) {
        eprintln!("{}", color::warning(&format!("warning: could not persist assignments: {e}")));
    }
    helpers::emit(
        json,
        "assign",
        Some("clear"),
        Some(session),
        Ok::<_, (String, String)>((
            ClearOutput {
                cleared: summary.cleared,
                failed: summary.failed,
                reservations_released: summary.reservations_released,
            },
            Vec::new(),
        )),
        |data, _| {
            println!(
                "{} cleared {} assignment(s), {} failed, {} file reservation(s) released",
                color::aurora("✓"),
                data.cleared,
                data.failed,
                data.reservations_released
            );
        },
    )
}

fn resolve_session(matches: &ArgMatches) -> Result<String, String> {
    if let Some(s) = matches.get_one::<String>("session") {
        return Ok(s.clone());
    }
    current_tmux_session().ok_or_else(|| "no --session given and no attached tmux session detected ($TMUX unset)".to_string())
}

fn parse_strategy(raw: &str) -> ntm_assign::Strategy {
    match raw {
        "speed" => ntm_assign::Strategy::Speed,
        "quality" => ntm_assign::Strategy::Quality,
        "dependency" => ntm_assign::Strategy::Dependency,
        "round-robin" => ntm_assign::Strategy::RoundRobin,
        _ => ntm_assign::Strategy::Balanced,
    }
}
