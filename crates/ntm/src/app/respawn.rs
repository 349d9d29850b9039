use clap::{Arg, ArgAction, Command};

/// `respawn <name> [--panes=i,j] [--type=cc|cod|gmi] [--all] [--dry-run]
/// [--force]` (spec.md §6).
pub fn respawn_command() -> Command {
    Command::new("respawn")
        .about("Kill and relaunch the agent process in one or more panes, keeping the pane itself")
        .arg(
            Arg::new("name")
                .help("Session name")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("panes")
                .long("panes")
                .value_name("i,j,...")
                .value_delimiter(',')
                .help("0-based pane indices to respawn")
                .conflicts_with_all(["type", "all"]),
        )
        .arg(
            Arg::new("type")
                .long("type")
                .value_parser(["cc", "cod", "gmi"])
                .help("Respawn every pane of this agent kind")
                .conflicts_with_all(["panes", "all"]),
        )
        .arg(
            Arg::new("all")
                .long("all")
                .help("Respawn every agent pane")
                .action(ArgAction::SetTrue)
                .conflicts_with_all(["panes", "type"]),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Print what would be respawned without doing it")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("force")
                .long("force")
                .help("Respawn even panes that look busy")
                .action(ArgAction::SetTrue),
        )
}
