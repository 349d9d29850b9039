//! Process-supervision primitives shared by the daemon client, the
//! Supervisor, and the Session/Pane Orchestrator.

pub mod errors;
pub mod pid_file;
pub mod types;

pub use errors::ProcessError;
pub use pid_file::{delete_pid_file, ensure_pid_dir, read_pid_file, write_pid_file, PidRecord};
pub use types::{Pid, ProcessInfo, ProcessMetadata, ProcessMetrics, ProcessStatus};

use sysinfo::System;

/// Check whether a process with the given PID is alive.
///
/// Uses `sysinfo` for a coarse liveness check. On its own this cannot
/// distinguish a live process from a PID that has been recycled by the OS
/// for an unrelated program — callers that need certainty should pair this
/// with a PIDFile's recorded `command` (see `process::pid_file`).
pub fn is_process_alive(pid: Pid) -> bool {
    let mut system = System::new();
    system.refresh_processes(
        sysinfo::ProcessesToUpdate::Some(&[pid.to_sysinfo_pid()]),
        true,
    );
    system.process(pid.to_sysinfo_pid()).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_process_is_alive() {
        let pid = Pid::from_raw(std::process::id());
        assert!(is_process_alive(pid));
    }

    #[test]
    fn test_implausible_pid_is_not_alive() {
        // PID 2^31-1 is never a real process on any platform we support.
        let pid = Pid::from_raw(2_147_483_647);
        assert!(!is_process_alive(pid));
    }
}
