//! Built-in agent name/command data for config defaults.
//!
//! Covers the three known agent kinds. A `Plugin(name)` kind is open-ended —
//! it has no built-in default command, so it must be configured explicitly
//! via `[agents.<name>]` or fails at `get_agent_command()` time.
//!
//! Keep in sync with `ntm-core::agents::AgentKind`.
const AGENT_DATA: &[(&str, &str)] = &[
    ("claude", "claude"),
    ("codex", "codex"),
    ("gemini", "gemini"),
];

const DEFAULT_AGENT: &str = "claude";

pub fn is_known_agent(name: &str) -> bool {
    AGENT_DATA.iter().any(|(n, _)| name.eq_ignore_ascii_case(n))
}

pub fn default_agent_name() -> &'static str {
    DEFAULT_AGENT
}

pub fn get_default_command(name: &str) -> Option<&'static str> {
    AGENT_DATA
        .iter()
        .find(|(n, _)| name.eq_ignore_ascii_case(n))
        .map(|(_, cmd)| *cmd)
}

pub fn known_agents_string() -> String {
    let mut names: Vec<&str> = AGENT_DATA.iter().map(|(n, _)| *n).collect();
    names.sort();
    names.join(", ")
}
