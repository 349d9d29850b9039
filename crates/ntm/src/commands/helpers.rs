//! Shared plumbing for every subcommand handler: config loading, the
//! collaborator/adapter wiring every command needs, envelope emission, and
//! the small parsers the CLI surface's compact flag grammar requires
//! (`N[:variant]`, duration strings).

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use ntm_config::NtmConfig;
use ntm_core::output::Envelope;
use ntm_orchestrator::TerminalAdapter;
use serde::Serialize;
use tracing::warn;

use crate::color;

/// Exit codes from spec.md §6: `0` success, `1` general/resource error,
/// `2` usage error.
pub const EXIT_OK: i32 = 0;
pub const EXIT_ERROR: i32 = 1;
pub const EXIT_USAGE: i32 = 2;

/// Config loaded once per invocation, falling back to defaults on a parse
/// failure rather than aborting the whole command — mirrors the house
/// convention of warning loudly instead of hard-failing on a config typo.
pub fn load_config_with_warning() -> NtmConfig {
    match NtmConfig::load_hierarchy() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: could not load config: {e}. Using defaults.\n\
                 Tip: check ~/.ntm/config.toml and ./.ntm/config.toml for syntax errors."
            );
            warn!(event = "cli.config.load_failed", error = %e, "config load failed, using defaults");
            NtmConfig::default()
        }
    }
}

/// The real terminal adapter. A trait object so the wiring is identical in
/// shape to how tests construct a [`ntm_orchestrator::FakeAdapter`].
pub fn terminal_adapter() -> Arc<dyn TerminalAdapter> {
    Arc::new(ntm_tmux::TmuxAdapter::new())
}

/// Parse the compact `N[:variant]` grammar used by `spawn --cc/--cod/--gmi`
/// (spec.md §6). `variant` defaults to the agent kind's own name when
/// omitted (spec.md §3 "AgentSpec").
pub fn parse_count_variant(raw: &str, default_variant: &str) -> Result<(u32, String), String> {
    let (count_part, variant_part) = match raw.split_once(':') {
        Some((c, v)) => (c, Some(v)),
        None => (raw, None),
    };
    let count: u32 = count_part
        .parse()
        .map_err(|_| format!("invalid agent count '{count_part}' (expected a non-negative integer)"))?;
    let variant = variant_part.unwrap_or(default_variant).to_string();
    Ok((count, variant))
}

/// Parse a bare seconds count (used by `--stagger`, `--ready-timeout`, and
/// `safety blocked --hours`). `"-"` (clap's `default_missing_value` marker
/// for a flag passed with no value) resolves to `None`, meaning "use the
/// configured default".
pub fn parse_optional_secs(raw: &str) -> Result<Option<Duration>, String> {
    if raw == "-" {
        return Ok(None);
    }
    let secs: u64 = raw
        .parse()
        .map_err(|_| format!("invalid duration '{raw}' (expected whole seconds)"))?;
    Ok(Some(Duration::from_secs(secs)))
}

pub fn parse_secs(raw: &str) -> Result<u64, String> {
    raw.parse()
        .map_err(|_| format!("invalid duration '{raw}' (expected whole seconds)"))
}

/// The tmux session currently attached to this terminal, detected from
/// `$TMUX` plus `tmux display-message` — used as the default target for
/// commands that don't take an explicit session name (`assign`).
pub fn current_tmux_session() -> Option<String> {
    if std::env::var_os("TMUX").is_none() {
        return None;
    }
    let output = std::process::Command::new("tmux")
        .args(["display-message", "-p", "#S"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if name.is_empty() { None } else { Some(name) }
}

/// Print a command's result either as the single JSON envelope (spec.md
/// §7) or as a human-readable mirror built from the same fields, and
/// return the process exit code.
pub fn emit<T: Serialize>(
    json_mode: bool,
    command: &str,
    subcommand: Option<&str>,
    session: Option<&str>,
    result: Result<(T, Vec<String>), (String, String)>,
    human: impl FnOnce(&T, &[String]),
) -> i32 {
    match result {
        Ok((data, warnings)) => {
            let mut envelope = Envelope::success(command, data, Utc::now());
            if let Some(sub) = subcommand {
                envelope = envelope.with_subcommand(sub);
            }
            if let Some(session) = session {
                envelope = envelope.with_session(session);
            }
            envelope = envelope.with_warnings(warnings.clone());

            if json_mode {
                println!("{}", envelope.to_json());
            } else {
                human(envelope.data.as_ref().unwrap(), &warnings);
                for warning in &warnings {
                    eprintln!("{}", color::warning(&format!("warning: {warning}")));
                }
            }
            EXIT_OK
        }
        Err((code, message)) => {
            let mut envelope: Envelope<()> = Envelope::failure(command, code.clone(), message.clone(), Utc::now());
            if let Some(sub) = subcommand {
                envelope = envelope.with_subcommand(sub);
            }
            if let Some(session) = session {
                envelope = envelope.with_session(session);
            }

            if json_mode {
                println!("{}", envelope.to_json());
            } else {
                eprintln!("{}", color::error(&format!("error: {message}")));
            }
            EXIT_ERROR
        }
    }
}

/// Print a usage error (exit 2) consistently with [`emit`]'s error shape.
pub fn usage_error(json_mode: bool, command: &str, message: &str) -> i32 {
    if json_mode {
        let envelope: Envelope<()> = Envelope::failure(command, "USAGE_ERROR", message, Utc::now());
        println!("{}", envelope.to_json());
    } else {
        eprintln!("{}", color::error(&format!("usage error: {message}")));
    }
    EXIT_USAGE
}
