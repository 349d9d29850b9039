use clap::{Arg, ArgAction, Command};

/// `policy {show [-a]|validate [file]|reset [-f]|edit|automation [flags]}`
/// (spec.md §6).
pub fn policy_command() -> Command {
    Command::new("policy")
        .about("Inspect and edit the command-safety policy document")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("show").about("Print the effective policy document").arg(
                Arg::new("all")
                    .short('a')
                    .long("all")
                    .help("Include the built-in rules merged under the on-disk file")
                    .action(ArgAction::SetTrue),
            ),
        )
        .subcommand(
            Command::new("validate")
                .about("Validate a policy document without installing it")
                .arg(Arg::new("file").help("Path to validate (defaults to the installed policy)").index(1)),
        )
        .subcommand(
            Command::new("reset").about("Reset the installed policy to the built-in defaults").arg(
                Arg::new("force")
                    .short('f')
                    .long("force")
                    .help("Skip the confirmation prompt")
                    .action(ArgAction::SetTrue),
            ),
        )
        .subcommand(Command::new("edit").about("Open the policy document in $EDITOR"))
        .subcommand(
            Command::new("automation")
                .about("View or change the automation block (auto_commit, auto_push, force_release)")
                .arg(
                    Arg::new("auto-commit")
                        .long("auto-commit")
                        .value_parser(clap::value_parser!(bool))
                        .help("Enable/disable auto_commit"),
                )
                .arg(
                    Arg::new("auto-push")
                        .long("auto-push")
                        .value_parser(clap::value_parser!(bool))
                        .help("Enable/disable auto_push"),
                )
                .arg(
                    Arg::new("force-release")
                        .long("force-release")
                        .value_parser(["never", "approval", "auto"])
                        .help("Set force_release"),
                ),
        )
}
