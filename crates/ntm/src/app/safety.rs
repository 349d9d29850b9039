use clap::{Arg, ArgAction, Command};

/// `safety {status|check <cmd>|blocked [--hours N]|install [-f]|uninstall}`
/// (spec.md §6).
pub fn safety_command() -> Command {
    Command::new("safety")
        .about("Command-Safety Policy Engine: check commands, inspect the blocked log, manage the hook")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(Command::new("status").about("Show policy rule counts and hook install state"))
        .subcommand(
            Command::new("check")
                .about("Classify a command against the policy without running it")
                .arg(
                    Arg::new("command")
                        .help("Shell command to classify")
                        .required(true)
                        .num_args(1..)
                        .trailing_var_arg(true),
                ),
        )
        .subcommand(
            Command::new("blocked")
                .about("List recently blocked commands")
                .arg(
                    Arg::new("hours")
                        .long("hours")
                        .value_name("N")
                        .default_value("24")
                        .help("Look back this many hours"),
                )
                .arg(
                    Arg::new("session")
                        .long("session")
                        .value_name("NAME")
                        .help("Filter to one session"),
                ),
        )
        .subcommand(
            Command::new("install")
                .about("Install the git/rm wrappers and the Claude Code PreToolUse hook")
                .arg(
                    Arg::new("force")
                        .short('f')
                        .long("force")
                        .help("Overwrite an existing installation")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("uninstall").about("Remove the installed wrappers and hook"))
}
