use clap::{Arg, ArgAction, Command};

/// `assign [--clear=ids | --clear-pane=P | --clear-failed] [--force]`
/// (spec.md §6). With no `--clear*` flag, runs the bind step: wait for
/// ready panes, fetch candidates, dispatch per `--strategy`.
pub fn assign_command() -> Command {
    Command::new("assign")
        .about("Bind external work items to idle agent panes, or clear existing assignments")
        .arg(
            Arg::new("session")
                .long("session")
                .value_name("NAME")
                .help("Session to operate on (defaults to the attached tmux session, from $TMUX)"),
        )
        .arg(
            Arg::new("strategy")
                .long("strategy")
                .value_name("STRATEGY")
                .value_parser(["balanced", "speed", "quality", "dependency", "round-robin"])
                .default_value("balanced")
                .help("Dispatch strategy"),
        )
        .arg(
            Arg::new("limit")
                .long("limit")
                .value_name("N")
                .help("Maximum number of items to assign (0 = unlimited)"),
        )
        .arg(
            Arg::new("ready-timeout")
                .long("ready-timeout")
                .value_name("SECONDS")
                .help("How long to wait for panes to go idle before giving up"),
        )
        .arg(
            Arg::new("clear")
                .long("clear")
                .value_name("ids")
                .value_delimiter(',')
                .help("Clear specific assignments by bead id")
                .conflicts_with_all(["clear-pane", "clear-failed"]),
        )
        .arg(
            Arg::new("clear-pane")
                .long("clear-pane")
                .value_name("PANE")
                .help("Clear whatever is assigned to this pane")
                .conflicts_with_all(["clear", "clear-failed"]),
        )
        .arg(
            Arg::new("clear-failed")
                .long("clear-failed")
                .help("Clear every assignment currently marked failed")
                .action(ArgAction::SetTrue)
                .conflicts_with_all(["clear", "clear-pane"]),
        )
        .arg(
            Arg::new("force")
                .long("force")
                .help("Also clear assignments that are still active or already completed")
                .action(ArgAction::SetTrue),
        )
}
