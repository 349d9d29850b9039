use tracing::{error, info};

fn main() {
    ntm_core::init_logging(false);
    info!(event = "supervisor.start_started");

    let exit_code = match run() {
        Ok(()) => {
            info!(event = "supervisor.start_completed");
            0
        }
        Err(e) => {
            error!(event = "supervisor.start_failed", error = %e);
            eprintln!("ntm-supervisord: {}", e);
            1
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    eprintln!(
        "Starting ntm-supervisord in the foreground (PID: {})...",
        std::process::id()
    );

    // The supervisor is auto-started by the `ntm` CLI the first time a
    // session needs it, inheriting the CLI's working directory — one
    // supervisor instance serves one project.
    let project_dir = std::env::current_dir().map_err(|e| {
        error!(event = "supervisor.cwd_lookup_failed", error = %e);
        e
    })?;
    let session_id = uuid::Uuid::new_v4().to_string();

    let config = ntm_supervisor::load_daemon_config(session_id, project_dir).map_err(|e| {
        error!(event = "supervisor.config_load_failed", error = %e);
        e
    })?;

    let home = ntm_paths::NtmHome::resolve().map_err(|e| {
        error!(event = "supervisor.home_resolve_failed", error = %e);
        Box::new(e) as Box<dyn std::error::Error>
    })?;

    let rt = tokio::runtime::Runtime::new().map_err(|e| {
        error!(event = "supervisor.runtime_init_failed", error = %e);
        e
    })?;

    let supervisor = ntm_supervisor::Supervisor::new(config);

    rt.block_on(async {
        ntm_supervisor::server::run(home.daemon_socket(), home.daemon_pid_file(), supervisor)
            .await
            .map_err(|e| {
                error!(event = "supervisor.server_failed", error = %e);
                e
            })
    })?;

    Ok(())
}
