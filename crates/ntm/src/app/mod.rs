mod assign;
mod global;
mod kill;
mod policy;
mod respawn;
mod safety;
mod send;
mod spawn;

use clap::Command;

pub fn build_cli() -> Command {
    global::root_command()
        .subcommand(spawn::spawn_command())
        .subcommand(send::send_command())
        .subcommand(kill::kill_command())
        .subcommand(respawn::respawn_command())
        .subcommand(assign::assign_command())
        .subcommand(safety::safety_command())
        .subcommand(policy::policy_command())
}
