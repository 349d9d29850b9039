use clap::{Arg, Command};

/// `kill <name>` (spec.md §6).
pub fn kill_command() -> Command {
    Command::new("kill").about("Destroy a session").arg(
        Arg::new("name")
            .help("Session name")
            .required(true)
            .index(1),
    )
}
