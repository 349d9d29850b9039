mod app;
mod color;
mod commands;

fn main() {
    let matches = app::build_cli().get_matches();

    let verbose = matches.get_flag("verbose");
    ntm_core::init_logging(!verbose);

    if matches.get_flag("no-color") {
        color::set_no_color();
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("{}", color::error(&format!("could not start async runtime: {e}")));
            std::process::exit(commands::EXIT_ERROR);
        }
    };

    let exit_code = runtime.block_on(commands::run(&matches));
    std::process::exit(exit_code);
}
