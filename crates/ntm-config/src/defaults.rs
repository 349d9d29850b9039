//! Default values for optional configuration fields.
//!
//! Fields that participate in hierarchy merging are stored as `Option<T>`
//! so a config layer can tell "unset" apart from "explicitly set to the
//! default" — see [`crate::loading::merge_configs`]. These functions are the
//! single source of truth for what "unset" resolves to.

pub fn stagger_interval_secs() -> u64 {
    5
}

pub fn health_interval_secs() -> u64 {
    30
}

pub fn max_restarts() -> u32 {
    5
}

pub fn initial_restart_delay_secs() -> u64 {
    1
}

pub fn restart_backoff_max_secs() -> u64 {
    60
}

pub fn readiness_poll_interval_secs() -> u64 {
    2
}

pub fn ready_timeout_secs() -> u64 {
    120
}

pub fn recovery_max_tokens() -> u64 {
    2000
}

pub fn recovery_stale_hours() -> u64 {
    24
}

/// Shell prompts and known agent ready-phrases matched at (or present in) the
/// tail of a pane's scrollback to decide it is idle.
///
/// Not exhaustive by design (spec.md's Open Question #1) — configurable via
/// `[readiness] idle_markers` so new agent CLIs can add their own phrases.
pub fn idle_markers() -> Vec<String> {
    vec![
        "$ ".to_string(),
        "% ".to_string(),
        "> ".to_string(),
        "Human:".to_string(),
        "╭─".to_string(),
    ]
}
