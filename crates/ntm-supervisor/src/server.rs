//! The JSONL control socket `ntm` clients connect to (spec.md §6 wire
//! formats). Accepts connections on a `UnixListener`, reads one
//! `ClientMessage` per line, dispatches to the `Supervisor`, writes back one
//! `DaemonMessage` per line.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ntm_protocol::{ClientMessage, DaemonMessage, ErrorCode};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, error, info, warn};

use crate::registry::Supervisor;

/// Remove a stale socket file left behind by an unclean shutdown, then bind.
fn bind_listener(socket_path: &Path) -> std::io::Result<UnixListener> {
    if socket_path.exists() {
        std::fs::remove_file(socket_path)?;
    }
    if let Some(parent) = socket_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    UnixListener::bind(socket_path)
}

/// Accept connections until `shutdown_signal` resolves (SIGTERM/SIGINT, or
/// a client's `Shutdown` request), then drain the supervisor and remove the
/// socket file.
pub async fn run(
    socket_path: PathBuf,
    pid_file_path: PathBuf,
    supervisor: Arc<Supervisor>,
) -> std::io::Result<()> {
    let listener = bind_listener(&socket_path)?;
    info!(event = "supervisor.server.listening", socket = %socket_path.display());

    std::fs::write(&pid_file_path, std::process::id().to_string())?;

    let (shutdown_tx, mut shutdown_rx) = tokio::sync::mpsc::channel::<()>(1);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, _addr) = match accepted {
                    Ok(pair) => pair,
                    Err(e) => {
                        warn!(event = "supervisor.server.accept_failed", error = %e);
                        continue;
                    }
                };
                let supervisor = supervisor.clone();
                let shutdown_tx = shutdown_tx.clone();
                tokio::spawn(async move {
                    handle_connection(stream, supervisor, shutdown_tx).await;
                });
            }
            _ = shutdown_rx.recv() => {
                info!(event = "supervisor.server.shutdown_requested");
                break;
            }
            _ = ctrl_c_or_term() => {
                info!(event = "supervisor.server.signal_received");
                break;
            }
        }
    }

    let _ = supervisor.shutdown().await;
    let _ = std::fs::remove_file(&socket_path);
    let _ = std::fs::remove_file(&pid_file_path);
    info!(event = "supervisor.server.stopped");
    Ok(())
}

#[cfg(unix)]
async fn ctrl_c_or_term() {
    use tokio::signal::unix::{signal, SignalKind};
    let mut term = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = term.recv() => {}
    }
}

async fn handle_connection(
    stream: UnixStream,
    supervisor: Arc<Supervisor>,
    shutdown_tx: tokio::sync::mpsc::Sender<()>,
) {
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => return, // client disconnected
            Err(e) => {
                warn!(event = "supervisor.server.read_failed", error = %e);
                return;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let request: ClientMessage = match serde_json::from_str(&line) {
            Ok(msg) => msg,
            Err(e) => {
                warn!(event = "supervisor.server.bad_request", error = %e);
                let response = DaemonMessage::Error {
                    id: "unknown".to_string(),
                    code: ErrorCode::ProtocolError,
                    message: format!("malformed request: {e}"),
                };
                let _ = write_response(&mut write_half, &response).await;
                continue;
            }
        };

        let is_shutdown = matches!(request, ClientMessage::Shutdown { .. });
        let response = dispatch(&supervisor, request).await;
        let _ = write_response(&mut write_half, &response).await;

        if is_shutdown {
            let _ = shutdown_tx.send(()).await;
            return;
        }
    }
}

async fn write_response(
    write_half: &mut tokio::net::unix::OwnedWriteHalf,
    response: &DaemonMessage,
) -> std::io::Result<()> {
    let mut line = serde_json::to_string(response).unwrap_or_else(|_| {
        r#"{"type":"error","id":"unknown","code":"internal","message":"failed to serialize response"}"#
            .to_string()
    });
    line.push('\n');
    write_half.write_all(line.as_bytes()).await
}

async fn dispatch(supervisor: &Arc<Supervisor>, request: ClientMessage) -> DaemonMessage {
    let id = request.id().to_string();
    debug!(event = "supervisor.server.request_received", request_type = ?request);

    match request {
        ClientMessage::Ping { id } => DaemonMessage::Ack { id },

        ClientMessage::StartDaemon {
            id,
            name,
            command,
            args,
            env,
            default_port,
            health_url,
        } => {
            let spec = crate::types::DaemonSpec {
                name: name.to_string(),
                command,
                args,
                env,
                default_port,
                health_url,
            };
            match supervisor.start(spec).await {
                Ok(record) => DaemonMessage::DaemonStarted { id, record },
                Err(e) => to_error(id, &e),
            }
        }

        ClientMessage::StopDaemon { id, name } => match supervisor.stop(name.as_ref()).await {
            Ok(()) => DaemonMessage::Ack { id },
            Err(e) => to_error(id, &e),
        },

        ClientMessage::GetDaemon { id, name } => {
            let record = supervisor.get_daemon(name.as_ref()).await;
            DaemonMessage::DaemonStatus { id, record }
        }

        ClientMessage::Status { id } => {
            let daemons = supervisor.status().await;
            DaemonMessage::StatusSnapshot { id, daemons }
        }

        ClientMessage::Shutdown { id } => {
            match supervisor.shutdown().await {
                Ok(()) => DaemonMessage::Ack { id },
                Err(e) => to_error(id, &e),
            }
        }
    }
}

fn to_error(id: String, err: &crate::errors::SupervisorError) -> DaemonMessage {
    use ntm_core::NtmError;
    error!(event = "supervisor.server.request_failed", error = %err);
    DaemonMessage::Error {
        id,
        code: ErrorCode::from_code(err.error_code()),
        message: err.to_string(),
    }
}
