use clap::{Arg, ArgAction, Command};

/// `send <name> [prompt…|--prompt-file=P] [--cc|--cod|--gmi|--all|--pane=I]
/// [--prefix=…] [--suffix=…]` (spec.md §6).
pub fn send_command() -> Command {
    Command::new("send")
        .about("Deliver a prompt to one or more panes in a session")
        .arg(
            Arg::new("name")
                .help("Session name")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("prompt")
                .help("Prompt text (omit to read from --prompt-file)")
                .index(2)
                .conflicts_with("prompt-file"),
        )
        .arg(
            Arg::new("prompt-file")
                .long("prompt-file")
                .value_name("PATH")
                .help("Read the prompt from a file instead of the command line"),
        )
        .arg(
            Arg::new("cc")
                .long("cc")
                .help("Target Claude panes")
                .action(ArgAction::SetTrue)
                .conflicts_with_all(["cod", "gmi", "all", "pane"]),
        )
        .arg(
            Arg::new("cod")
                .long("cod")
                .help("Target Codex panes")
                .action(ArgAction::SetTrue)
                .conflicts_with_all(["cc", "gmi", "all", "pane"]),
        )
        .arg(
            Arg::new("gmi")
                .long("gmi")
                .help("Target Gemini panes")
                .action(ArgAction::SetTrue)
                .conflicts_with_all(["cc", "cod", "all", "pane"]),
        )
        .arg(
            Arg::new("all")
                .long("all")
                .help("Target every agent pane (default when no target flag is given)")
                .action(ArgAction::SetTrue)
                .conflicts_with_all(["cc", "cod", "gmi", "pane"]),
        )
        .arg(
            Arg::new("pane")
                .long("pane")
                .value_name("INDEX")
                .help("Target a single pane by its 0-based index")
                .conflicts_with_all(["cc", "cod", "gmi", "all"]),
        )
        .arg(
            Arg::new("prefix")
                .long("prefix")
                .value_name("TEXT")
                .help("Text prepended to the prompt before delivery"),
        )
        .arg(
            Arg::new("suffix")
                .long("suffix")
                .value_name("TEXT")
                .help("Text appended to the prompt before delivery"),
        )
}
