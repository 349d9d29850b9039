use clap::{Arg, ArgAction, Command};

pub fn root_command() -> Command {
    Command::new("ntm")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Orchestrate a fleet of interactive AI coding agents inside a terminal multiplexer")
        .long_about("ntm spawns, supervises, and coordinates a fleet of AI coding agents across panes of a terminal multiplexer session: staggered prompt delivery, a command-safety policy engine, recovery-context injection for freshly spawned agents, and an assignment engine that binds external work items to idle panes.")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("no-color")
                .long("no-color")
                .help("Disable colored output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Emit a single JSON envelope on stdout instead of human-readable output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
}
