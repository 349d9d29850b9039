use clap::ArgMatches;
use ntm_core::NtmError;
use serde::Serialize;

use super::helpers::{self, parse_secs, usage_error, EXIT_ERROR, EXIT_OK};
use crate::color;

#[derive(Debug, Serialize)]
struct StatusOutput {
    allowed: usize,
    blocked: usize,
    approval_required: usize,
    hook_installed: bool,
    git_wrapper_installed: bool,
    rm_wrapper_installed: bool,
}

#[derive(Debug, Serialize)]
struct CheckOutput {
    command: String,
    action: String,
    reason: String,
    slb: bool,
}

#[derive(Debug, Serialize)]
struct BlockedOutput {
    entries: Vec<ntm_policy::BlockedEntry>,
}

#[derive(Debug, Serialize)]
struct InstallOutput {
    hook: String,
    git_wrapper: String,
    rm_wrapper: String,
}

pub async fn run(matches: &ArgMatches, json: bool) -> i32 {
    let home = match ntm_paths::NtmHome::resolve() {
        Ok(h) => h,
        Err(e) => return usage_error(json, "safety", &e.to_string()),
    };

    match matches.subcommand() {
        Some(("status", _)) => run_status(json, &home),
        Some(("check", sub)) => run_check(json, &home, sub),
        Some(("blocked", sub)) => run_blocked(json, &home, sub),
        Some(("install", sub)) => run_install(json, &home, sub),
        Some(("uninstall", _)) => run_uninstall(json, &home),
        _ => unreachable!("clap requires a subcommand"),
    }
}

fn run_status(json: bool, home: &ntm_paths::NtmHome) -> i32 {
    let policy = match ntm_policy::Policy::load_or_default(&home.policy_file()) {
        Ok(p) => p,
        Err(e) => return policy_error_exit(json, "safety", &e),
    };
    let stats = policy.stats();

    helpers::emit(
        json,
        "safety",
        Some("status"),
        None,
        Ok::<_, (String, String)>((
            StatusOutput {
                allowed: stats.allowed,
                blocked: stats.blocked,
                approval_required: stats.approval_required,
                hook_installed: home.claude_hook().exists(),
                git_wrapper_installed: home.git_wrapper().exists(),
                rm_wrapper_installed: home.rm_wrapper().exists(),
            },
            Vec::new(),
        )),
        |data, _| {
            println!(
                "policy: {} allowed, {} blocked, {} approval_required",
                data.allowed, data.blocked, data.approval_required
            );
            println!(
                "hook installed: {}",
                if data.hook_installed { color::aurora("yes") } else { color::copper("no") }
            );
            println!(
                "git wrapper: {}   rm wrapper: {}",
                if data.git_wrapper_installed { color::aurora("yes") } else { color::copper("no") },
                if data.rm_wrapper_installed { color::aurora("yes") } else { color::copper("no") }
            );
        },
    )
}

fn run_check(json: bool, home: &ntm_paths::NtmHome, sub: &ArgMatches) -> i32 {
    let parts: Vec<&str> = sub
        .get_many::<String>("command")
        .map(|v| v.map(String::as_str).collect())
        .unwrap_or_default();
    let command = parts.join(" ");

    let policy = match ntm_policy::Policy::load_or_default(&home.policy_file()) {
        Ok(p) => p,
        Err(e) => return policy_error_exit(json, "safety", &e),
    };
    let verdict = policy.classify(&command);
    let action = format!("{:?}", verdict.action).to_lowercase();

    if verdict.action == ntm_policy::Action::Block {
        if let Err(e) = ntm_policy::log::append_blocked(
            &home.blocked_log_file(),
            &ntm_policy::BlockedEntry {
                timestamp: chrono::Utc::now(),
                session: std::env::var("NTM_SESSION").ok(),
                agent: None,
                command: command.clone(),
                reason: verdict.reason.clone(),
                action: action.clone(),
            },
        ) {
            eprintln!("{}", color::warning(&format!("warning: could not append blocked-command log entry: {e}")));
        }
    }

    let blocked = verdict.action == ntm_policy::Action::Block;
    let exit = helpers::emit(
        json,
        "safety",
        Some("check"),
        None,
        Ok::<_, (String, String)>((
            CheckOutput {
                command: command.clone(),
                action: action.clone(),
                reason: verdict.reason.clone(),
                slb: verdict.slb,
            },
            Vec::new(),
        )),
        |data, _| {
            let label = match data.action.as_str() {
                "block" => color::error(&data.action),
                "approve" => color::warning(&data.action),
                _ => color::aurora(&data.action),
            };
            println!("{}: {} — {}", label, data.command, data.reason);
        },
    );

    // spec.md §7: `safety check` exits 1 on `block` only, regardless of
    // the success-envelope `emit` would otherwise report.
    if blocked { EXIT_ERROR } else { exit.min(EXIT_OK) }
}

fn run_blocked(json: bool, home: &ntm_paths::NtmHome, sub: &ArgMatches) -> i32 {
    let hours = match sub.get_one::<String>("hours").map(|s| parse_secs(s)) {
        Some(Ok(h)) => h,
        Some(Err(message)) => return usage_error(json, "safety", &message),
        None => 24,
    };
    let session = sub.get_one::<String>("session").map(String::as_str);

    let entries = match ntm_policy::log::recent_blocked(&home.blocked_log_file(), session, hours) {
        Ok(e) => e,
        Err(e) => return policy_error_exit(json, "safety", &e),
    };

    helpers::emit(
        json,
        "safety",
        Some("blocked"),
        None,
        Ok::<_, (String, String)>((BlockedOutput { entries: entries.clone() }, Vec::new())),
        |data, _| {
            if data.entries.is_empty() {
                println!("{}", color::muted("no blocked commands in this window"));
            }
            for entry in &data.entries {
                println!(
                    "{}  {}  {}",
                    color::muted(&entry.timestamp.to_rfc3339()),
                    color::error(&entry.command),
                    entry.reason
                );
            }
        },
    )
}

fn run_install(json: bool, home: &ntm_paths::NtmHome, sub: &ArgMatches) -> i32 {
    let force = sub.get_flag("force");

    if !force && (home.git_wrapper().exists() || home.rm_wrapper().exists() || home.claude_hook().exists()) {
        return usage_error(json, "safety", "already installed — pass --force to overwrite");
    }

    if let Err(e) = install_wrappers(home) {
        return usage_error(json, "safety", &e);
    }

    helpers::emit(
        json,
        "safety",
        Some("install"),
        None,
        Ok::<_, (String, String)>((
            InstallOutput {
                hook: home.claude_hook().display().to_string(),
                git_wrapper: home.git_wrapper().display().to_string(),
                rm_wrapper: home.rm_wrapper().display().to_string(),
            },
            Vec::new(),
        )),
        |data, _| {
            println!("{} installed {}", color::aurora("✓"), data.git_wrapper);
            println!("{} installed {}", color::aurora("✓"), data.rm_wrapper);
            println!("{} installed {}", color::aurora("✓"), data.hook);
            println!(
                "{}",
                color::hint("put ~/.ntm/bin ahead of the real git/rm on $PATH for the wrappers to take effect")
            );
        },
    )
}

fn run_uninstall(json: bool, home: &ntm_paths::NtmHome) -> i32 {
    for path in [home.git_wrapper(), home.rm_wrapper(), home.claude_hook()] {
        if path.exists() {
            if let Err(e) = std::fs::remove_file(&path) {
                return usage_error(json, "safety", &format!("could not remove '{}': {e}", path.display()));
            }
        }
    }

    helpers::emit(
        json,
        "safety",
        Some("uninstall"),
        None,
        Ok::<_, (String, String)>(((), Vec::new())),
        |_, _| println!("{} wrappers and hook removed", color::aurora("✓")),
    )
}

/// Locate the real binary behind `name` by scanning `$PATH`, skipping any
/// entry under `~/.ntm/bin` so a previous install doesn't shadow itself.
fn find_real_binary(name: &str, home: &ntm_paths::NtmHome) -> Option<std::path::PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .filter(|dir| dir != &home.bin_dir())
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

fn install_wrappers(home: &ntm_paths::NtmHome) -> Result<(), String> {
    std::fs::create_dir_all(home.bin_dir()).map_err(|e| e.to_string())?;

    for name in ["git", "rm"] {
        let real = find_real_binary(name, home)
            .ok_or_else(|| format!("could not locate a real '{name}' binary on $PATH"))?;
        let wrapper_path = if name == "git" { home.git_wrapper() } else { home.rm_wrapper() };
        let script = format!(
            "#!/bin/sh\n\
             # ntm command-safety wrapper for {name}\n\
             if ! ntm safety check \"{name} $*\" >/dev/null 2>&1; then\n\
             \techo \"ntm: blocked by command-safety policy (run 'ntm safety check {name} $*' for details)\" >&2\n\
             \texit 1\n\
             fi\n\
             exec \"{}\" \"$@\"\n",
            real.display()
        );
        write_executable(&wrapper_path, &script)?;
    }

    let hook_path = home.claude_hook();
    if let Some(parent) = hook_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }
    let hook_script = "#!/bin/sh\n\
         # Claude Code PreToolUse hook: classify the tool's command through ntm's policy engine.\n\
         cmd=$(cat | sed -n 's/.*\"command\"[[:space:]]*:[[:space:]]*\"\\([^\"]*\\)\".*/\\1/p')\n\
         if [ -n \"$cmd\" ] && ! ntm safety check \"$cmd\" >/dev/null 2>&1; then\n\
         \techo \"blocked by ntm command-safety policy\" >&2\n\
         \texit 1\n\
         fi\n\
         exit 0\n";
    write_executable(&hook_path, hook_script)?;

    Ok(())
}

#[cfg(unix)]
fn write_executable(path: &std::path::Path, content: &str) -> Result<(), String> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::write(path, content).map_err(|e| e.to_string())?;
    let mut perms = std::fs::metadata(path).map_err(|e| e.to_string())?.permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms).map_err(|e| e.to_string())
}

#[cfg(not(unix))]
fn write_executable(path: &std::path::Path, content: &str) -> Result<(), String> {
    std::fs::write(path, content).map_err(|e| e.to_string())
}

/// spec.md §7: a malformed policy file is a usage error (exit 2); every
/// other policy-engine failure is a general error (exit 1).
fn policy_error_exit(json: bool, command: &str, e: &ntm_policy::PolicyError) -> i32 {
    if matches!(e, ntm_policy::PolicyError::ParseFailed { .. } | ntm_policy::PolicyError::InvalidPattern { .. }) {
        usage_error(json, command, &e.to_string())
    } else {
        helpers::emit::<()>(json, command, None, None, Err((e.error_code().to_string(), e.to_string())), |_, _| {})
    }
}
