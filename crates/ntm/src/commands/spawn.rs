use clap::ArgMatches;
use ntm_core::agents::AgentSpec;
use ntm_core::collaborators::NullClient;
use ntm_protocol::AgentKind;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use super::helpers::{
    self, current_tmux_session, load_config_with_warning, parse_count_variant, parse_optional_secs,
    terminal_adapter,
};
use crate::color;

#[derive(Debug, Serialize)]
struct SpawnOutput {
    session: String,
    agent_count: usize,
    pane_titles: Vec<String>,
    batch_id: Option<String>,
    mail_registration: String,
    memory_registration: String,
    assigned: Option<usize>,
}

pub async fn run(matches: &ArgMatches, json: bool) -> i32 {
    let name = matches.get_one::<String>("name").cloned().unwrap_or_default();

    let mut specs = Vec::new();
    for (flag, kind) in [("cc", AgentKind::Claude), ("cod", AgentKind::Codex), ("gmi", AgentKind::Gemini)] {
        let Some(raw) = matches.get_one::<String>(flag) else { continue };
        let (count, variant) = match parse_count_variant(raw, &kind.to_string()) {
            Ok(v) => v,
            Err(message) => return helpers::usage_error(json, "spawn", &message),
        };
        for ordinal in 1..=count {
            specs.push(AgentSpec::new(kind.clone(), ordinal, variant.clone()));
        }
    }

    if specs.is_empty() {
        return helpers::usage_error(json, "spawn", "at least one of --cc/--cod/--gmi must launch one agent");
    }

    let stagger = match matches.get_one::<String>("stagger") {
        Some(raw) => match parse_optional_secs(raw) {
            Ok(None) => {
                let config = load_config_with_warning();
                Some(std::time::Duration::from_secs(config.stagger.default_interval_secs()))
            }
            Ok(Some(d)) => Some(d),
            Err(message) => return helpers::usage_error(json, "spawn", &message),
        },
        None => None,
    };

    let config = load_config_with_warning();
    if matches.get_flag("auto-restart") {
        if let Ok(home) = ntm_paths::NtmHome::resolve() {
            if let Err(e) = ntm_core::daemon::ensure_supervisor_running(&config, &home) {
                eprintln!("{}", color::warning(&format!("warning: auto-restart supervisor not running: {e}")));
            }
        }
    }

    let cwd = match std::env::current_dir() {
        Ok(c) => c,
        Err(e) => return helpers::usage_error(json, "spawn", &format!("could not determine working directory: {e}")),
    };

    let adapter = terminal_adapter();
    let orchestrator = ntm_orchestrator::Orchestrator::new(adapter.clone());
    let null = NullClient;

    let request = ntm_orchestrator::SpawnRequest {
        session: name.clone(),
        cwd,
        specs,
        user_pane: !matches.get_flag("no-user"),
        prompt: matches.get_one::<String>("prompt").cloned(),
        stagger,
        safety: matches.get_flag("safety"),
        config: &config,
        mail: &null,
        memory: &null,
        cancel: CancellationToken::new(),
    };

    let result = orchestrator.spawn(request).await;

    let mut assigned_count = None;
    if matches.get_flag("assign") {
        if let Ok(spawn_result) = &result {
            match run_assign_after_spawn(matches, &name, spawn_result, adapter.as_ref(), &config).await {
                Ok(n) => assigned_count = Some(n),
                Err(message) => eprintln!("{}", color::warning(&format!("warning: --assign failed: {message}"))),
            }
        }
    }

    helpers::emit(
        json,
        "spawn",
        None,
        Some(&name),
        result
            .map(|r| {
                (
                    SpawnOutput {
                        session: r.session,
                        agent_count: r.agent_count,
                        pane_titles: r.panes.iter().map(|p| p.title.clone()).collect(),
                        batch_id: r.batch_id,
                        mail_registration: format!("{:?}", r.mail_registration),
                        memory_registration: format!("{:?}", r.memory_registration),
                        assigned: assigned_count,
                    },
                    r.warnings,
                )
            })
            .map_err(|e| (e.error_code_str().to_string(), e.to_string())),
        |data, _warnings| {
            println!(
                "{} spawned {} agent(s) in session {}",
                color::aurora("✓"),
                data.agent_count,
                color::ice(&data.session)
            );
            for title in &data.pane_titles {
                println!("  {}", color::muted(title));
            }
            if let Some(n) = data.assigned {
                println!("{} assigned {n} item(s) via --assign", color::aurora("✓"));
            }
        },
    )
}

async fn run_assign_after_spawn(
    matches: &ArgMatches,
    session: &str,
    spawn_result: &ntm_orchestrator::SpawnResult,
    adapter: &dyn ntm_orchestrator::TerminalAdapter,
    config: &ntm_config::NtmConfig,
) -> Result<usize, String> {
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

    let null = NullClient;
    let mut engine = ntm_assign::AssignmentEngine::new();
    let outcome = engine
        .assign(ntm_assign::AssignContext {
            session: session.to_string(),
            adapter,
            panes: &spawn_result.panes,
            triage: &null,
            mail: &null,
            idle_markers: config.readiness.idle_markers(),
            poll_interval: std::time::Duration::from_secs(config.readiness.poll_interval_secs()),
            ready_timeout,
            strategy,
            limit,
            reserve_files: false,
        })
        .await
        .map_err(|e| e.to_string())?;

    let project = ntm_orchestrator::resolve_project_dir(&std::env::current_dir().map_err(|e| e.to_string())?);
    engine.save(&project.assignments_file()).map_err(|e| e.to_string())?;
    let _ = current_tmux_session();
    Ok(outcome.assigned.len())
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

trait ErrorCodeStr {
    fn error_code_str(&self) -> &'static str;
}

impl ErrorCodeStr for ntm_orchestrator::OrchestratorError {
    fn error_code_str(&self) -> &'static str {
        ntm_core::NtmError::error_code(self)
    }
}
