use clap::ArgMatches;
use ntm_policy::{ForceRelease, Policy, PolicyDocument};
use serde::Serialize;

use super::helpers::{self, usage_error};
use crate::color;

#[derive(Debug, Serialize)]
struct ShowOutput {
    document: PolicyDocument,
}

#[derive(Debug, Serialize)]
struct ValidateOutput {
    path: String,
    allowed: usize,
    blocked: usize,
    approval_required: usize,
}

#[derive(Debug, Serialize)]
struct AutomationOutput {
    auto_commit: bool,
    auto_push: bool,
    force_release: String,
}

pub async fn run(matches: &ArgMatches, json: bool) -> i32 {
    let home = match ntm_paths::NtmHome::resolve() {
        Ok(h) => h,
        Err(e) => return usage_error(json, "policy", &e.to_string()),
    };

    match matches.subcommand() {
        Some(("show", sub)) => run_show(json, &home, sub),
        Some(("validate", sub)) => run_validate(json, &home, sub),
        Some(("reset", sub)) => run_reset(json, &home, sub),
        Some(("edit", _)) => run_edit(json, &home),
        Some(("automation", sub)) => run_automation(json, &home, sub),
        _ => unreachable!("clap requires a subcommand"),
    }
}

fn run_show(json: bool, home: &ntm_paths::NtmHome, sub: &ArgMatches) -> i32 {
    let all = sub.get_flag("all");
    let document = if all {
        match Policy::load_or_default(&home.policy_file()) {
            Ok(policy) => policy.document().clone(),
            Err(e) => return policy_error_exit(json, &e),
        }
    } else {
        match read_on_disk(&home.policy_file()) {
            Ok(doc) => doc,
            Err(e) => return usage_error(json, "policy", &e),
        }
    };

    helpers::emit(
        json,
        "policy",
        Some("show"),
        None,
        Ok::<_, (String, String)>((ShowOutput { document: document.clone() }, Vec::new())),
        |data, _| match toml::to_string_pretty(&data.document) {
            Ok(text) => print!("{text}"),
            Err(e) => eprintln!("{}", color::error(&format!("could not render policy as TOML: {e}"))),
        },
    )
}

fn run_validate(json: bool, home: &ntm_paths::NtmHome, sub: &ArgMatches) -> i32 {
    let path = sub
        .get_one::<String>("file")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|| home.policy_file());

    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) => return usage_error(json, "policy", &format!("could not read '{}': {e}", path.display())),
    };
    let document: PolicyDocument = match toml::from_str(&content) {
        Ok(d) => d,
        Err(e) => return usage_error(json, "policy", &format!("'{}' is not a valid policy document: {e}", path.display())),
    };
    let policy = match Policy::compile(document) {
        Ok(p) => p,
        Err(e) => return policy_error_exit(json, &e),
    };
    let stats = policy.stats();

    helpers::emit(
        json,
        "policy",
        Some("validate"),
        None,
        Ok::<_, (String, String)>((
            ValidateOutput {
                path: path.display().to_string(),
                allowed: stats.allowed,
                blocked: stats.blocked,
                approval_required: stats.approval_required,
            },
            Vec::new(),
        )),
        |data, _| {
            println!(
                "{} '{}' is valid ({} allowed, {} blocked, {} approval_required)",
                color::aurora("✓"),
                data.path,
                data.allowed,
                data.blocked,
                data.approval_required
            );
        },
    )
}

fn run_reset(json: bool, home: &ntm_paths::NtmHome, sub: &ArgMatches) -> i32 {
    if !sub.get_flag("force") {
        return usage_error(json, "policy", "this overwrites the installed policy document — pass --force to confirm");
    }

    let document = PolicyDocument::built_in();
    if let Err(e) = write_document(&home.policy_file(), &document) {
        return usage_error(json, "policy", &e);
    }

    helpers::emit(
        json,
        "policy",
        Some("reset"),
        None,
        Ok::<_, (String, String)>(((), Vec::new())),
        |_, _| println!("{} policy reset to built-in defaults", color::aurora("✓")),
    )
}

fn run_edit(json: bool, home: &ntm_paths::NtmHome) -> i32 {
    let path = home.policy_file();
    if !path.exists() {
        if let Err(e) = write_document(&path, &PolicyDocument::built_in()) {
            return usage_error(json, "policy", &e);
        }
    }

    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
    let status = std::process::Command::new(&editor).arg(&path).status();
    match status {
        Ok(s) if s.success() => {}
        Ok(s) => return usage_error(json, "policy", &format!("'{editor}' exited with {s}")),
        Err(e) => return usage_error(json, "policy", &format!("could not launch '{editor}': {e}")),
    }

    match read_on_disk(&path) {
        Ok(_) => helpers::emit(
            json,
            "policy",
            Some("edit"),
            None,
            Ok::<_, (String, String)>(((), Vec::new())),
            |_, _| println!("{} policy updated", color::aurora("✓")),
        ),
        Err(e) => usage_error(json, "policy", &format!("edited file no longer parses: {e}")),
    }
}

fn run_automation(json: bool, home: &ntm_paths::NtmHome, sub: &ArgMatches) -> i32 {
    let mut document = read_on_disk(&home.policy_file()).unwrap_or_default();

    let changing = sub.contains_id("auto-commit") || sub.contains_id("auto-push") || sub.contains_id("force-release");
    if changing {
        if let Some(v) = sub.get_one::<bool>("auto-commit") {
            document.automation.auto_commit = *v;
        }
        if let Some(v) = sub.get_one::<bool>("auto-push") {
            document.automation.auto_push = *v;
        }
        if let Some(v) = sub.get_one::<String>("force-release") {
            document.automation.force_release = match v.as_str() {
                "approval" => ForceRelease::Approval,
                "auto" => ForceRelease::Auto,
                _ => ForceRelease::Never,
            };
        }
        if let Err(e) = write_document(&home.policy_file(), &document) {
            return usage_error(json, "policy", &e);
        }
    }

    let force_release = match document.automation.force_release {
        ForceRelease::Never => "never",
        ForceRelease::Approval => "approval",
        ForceRelease::Auto => "auto",
    };

    helpers::emit(
        json,
        "policy",
        Some("automation"),
        None,
        Ok::<_, (String, String)>((
            AutomationOutput {
                auto_commit: document.automation.auto_commit,
                auto_push: document.automation.auto_push,
                force_release: force_release.to_string(),
            },
            Vec::new(),
        )),
        |data, _| {
            println!("auto_commit:   {}", data.auto_commit);
            println!("auto_push:     {}", data.auto_push);
            println!("force_release: {}", data.force_release);
        },
    )
}

fn read_on_disk(path: &std::path::Path) -> Result<PolicyDocument, String> {
    if !path.exists() {
        return Ok(PolicyDocument::default());
    }
    let content = std::fs::read_to_string(path).map_err(|e| format!("could not read '{}': {e}", path.display()))?;
    toml::from_str(&content).map_err(|e| format!("'{}' is not a valid policy document: {e}", path.display()))
}

fn write_document(path: &std::path::Path, document: &PolicyDocument) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }
    let text = toml::to_string_pretty(document).map_err(|e| e.to_string())?;
    std::fs::write(path, text).map_err(|e| e.to_string())
}

fn policy_error_exit(json: bool, e: &ntm_policy::PolicyError) -> i32 {
    use ntm_core::NtmError;
    if matches!(e, ntm_policy::PolicyError::ParseFailed { .. } | ntm_policy::PolicyError::InvalidPattern { .. }) {
        usage_error(json, "policy", &e.to_string())
    } else {
        helpers::emit::<()>(json, "policy", None, None, Err((e.error_code().to_string(), e.to_string())), |_, _| {})
    }
}
