use clap::{Arg, ArgAction, Command};

/// `spawn <name> [--cc=N[:m] --cod=N[:m] --gmi=N[:m]] [--no-user]
/// [--prompt=T] [--stagger[=D]] [--safety] [--auto-restart]
/// [--assign [--strategy=S --limit=N --ready-timeout=D]]` (spec.md §6).
pub fn spawn_command() -> Command {
    Command::new("spawn")
        .about("Create a session and launch a fleet of agent panes")
        .arg(
            Arg::new("name")
                .help("Session name")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("cc")
                .long("cc")
                .value_name("N[:VARIANT]")
                .help("Number of Claude agents to launch, with an optional shared model/profile variant"),
        )
        .arg(
            Arg::new("cod")
                .long("cod")
                .value_name("N[:VARIANT]")
                .help("Number of Codex agents to launch, with an optional shared model/profile variant"),
        )
        .arg(
            Arg::new("gmi")
                .long("gmi")
                .value_name("N[:VARIANT]")
                .help("Number of Gemini agents to launch, with an optional shared model/profile variant"),
        )
        .arg(
            Arg::new("no-user")
                .long("no-user")
                .help("Skip reserving pane 0 for an interactive user shell")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("prompt")
                .long("prompt")
                .value_name("TEXT")
                .help("Prompt delivered to every agent pane after launch"),
        )
        .arg(
            Arg::new("stagger")
                .long("stagger")
                .value_name("SECONDS")
                .num_args(0..=1)
                .default_missing_value("-")
                .help("Stagger prompt delivery across agents; omit the value to use the configured default interval"),
        )
        .arg(
            Arg::new("safety")
                .long("safety")
                .help("Fail instead of reusing an existing session with this name")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("auto-restart")
                .long("auto-restart")
                .help("Start ntm-supervisord (if not already running) so this session's auxiliary daemons can be supervised")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("assign")
                .long("assign")
                .help("Run the Assignment Engine against the new panes immediately after spawn")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("strategy")
                .long("strategy")
                .value_name("STRATEGY")
                .value_parser(["balanced", "speed", "quality", "dependency", "round-robin"])
                .default_value("balanced")
                .requires("assign")
                .help("Dispatch strategy for --assign"),
        )
        .arg(
            Arg::new("limit")
                .long("limit")
                .value_name("N")
                .requires("assign")
                .help("Maximum number of items to assign (0 = unlimited)"),
        )
        .arg(
            Arg::new("ready-timeout")
                .long("ready-timeout")
                .value_name("SECONDS")
                .requires("assign")
                .help("How long to wait for panes to go idle before --assign gives up"),
        )
}
