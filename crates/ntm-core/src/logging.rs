//! Structured logging entry point, shared by the `ntm` CLI and the
//! `ntm-supervisord` daemon binary.
//!
//! Events are logged as `event = "component.action"` (e.g.
//! `"orchestrator.spawn.started"`, `"supervisor.daemon.restarted"`) so a
//! JSON log consumer can group and alert on them without parsing message
//! strings.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// `quiet=true` (the CLI's default, non-`--verbose` mode) filters out
/// `INFO` and below so only warnings and errors reach stderr; `quiet=false`
/// raises the default filter to `INFO`. `NTM_LOG` (read via `EnvFilter`'s
/// standard `RUST_LOG`-style parsing) always overrides the default when
/// set, for either mode.
///
/// Output is JSON-formatted so it composes with external log shippers.
/// Safe to call more than once — subsequent calls are ignored.
pub fn init_logging(quiet: bool) {
    let default_directive = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_env("NTM_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_target(true)
        .try_init();
}
