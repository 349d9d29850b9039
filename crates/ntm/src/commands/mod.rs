//! Dispatch from parsed `clap::ArgMatches` to each subcommand's handler.

mod assign;
mod helpers;
mod kill;
mod policy;
mod respawn;
mod safety;
mod send;
mod spawn;

use clap::ArgMatches;

pub use helpers::{EXIT_ERROR, EXIT_OK, EXIT_USAGE};

/// Run whichever subcommand was invoked, returning the process exit code.
pub async fn run(matches: &ArgMatches) -> i32 {
    let json = matches.get_flag("json");

    match matches.subcommand() {
        Some(("spawn", sub)) => spawn::run(sub, json).await,
        Some(("send", sub)) => send::run(sub, json).await,
        Some(("kill", sub)) => kill::run(sub, json).await,
        Some(("respawn", sub)) => respawn::run(sub, json).await,
        Some(("assign", sub)) => assign::run(sub, json).await,
        Some(("safety", sub)) => safety::run(sub, json).await,
        Some(("policy", sub)) => policy::run(sub, json).await,
        _ => unreachable!("clap requires a subcommand"),
    }
}
