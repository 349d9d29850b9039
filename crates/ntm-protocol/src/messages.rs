use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{DaemonName, DaemonRecordWire};

/// Error codes returned by the supervisor in error responses.
///
/// Maps 1:1 with the supervisor's internal error variants. Unknown codes
/// from a newer daemon version deserialize to `Unknown` via `#[serde(other)]`.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    InUse,
    IoError,
    AlreadyRunning,
    ProtocolError,
    Internal,
    #[serde(other)]
    Unknown,
}

impl ErrorCode {
    /// Convert a string error code (from an `NtmError::error_code()`) to an `ErrorCode`.
    pub fn from_code(code: &str) -> Self {
        serde_json::from_value(serde_json::Value::String(code.to_string()))
            .unwrap_or(ErrorCode::Unknown)
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::NotFound => write!(f, "not_found"),
            ErrorCode::InUse => write!(f, "in_use"),
            ErrorCode::IoError => write!(f, "io_error"),
            ErrorCode::AlreadyRunning => write!(f, "already_running"),
            ErrorCode::ProtocolError => write!(f, "protocol_error"),
            ErrorCode::Internal => write!(f, "internal"),
            ErrorCode::Unknown => write!(f, "unknown"),
        }
    }
}

/// Client -> Daemon request messages sent over the supervisor control socket.
///
/// Each variant maps to a JSONL message with `"type"` as the tag field. All
/// requests carry an `id` field for response correlation.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Register and start a supervised process.
    #[serde(rename = "start_daemon")]
    StartDaemon {
        id: String,
        name: DaemonName,
        command: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        env: HashMap<String, String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        default_port: Option<u16>,
        #[serde(skip_serializing_if = "Option::is_none")]
        health_url: Option<String>,
    },

    #[serde(rename = "stop_daemon")]
    StopDaemon { id: String, name: DaemonName },

    /// Request the supervisor itself to shut down, stopping all supervised
    /// processes first.
    #[serde(rename = "shutdown")]
    Shutdown { id: String },

    #[serde(rename = "get_daemon")]
    GetDaemon { id: String, name: DaemonName },

    /// Request a full snapshot of every supervised process.
    #[serde(rename = "status")]
    Status { id: String },

    #[serde(rename = "ping")]
    Ping { id: String },
}

/// Daemon -> Client response messages.
///
/// Each variant maps to a JSONL message with `"type"` as the tag field and
/// echoes the request `id`.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DaemonMessage {
    #[serde(rename = "ack")]
    Ack { id: String },

    #[serde(rename = "daemon_started")]
    DaemonStarted {
        id: String,
        record: DaemonRecordWire,
    },

    #[serde(rename = "daemon_status")]
    DaemonStatus {
        id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        record: Option<DaemonRecordWire>,
    },

    #[serde(rename = "status_snapshot")]
    StatusSnapshot {
        id: String,
        daemons: Vec<DaemonRecordWire>,
    },

    #[serde(rename = "error")]
    Error {
        id: String,
        code: ErrorCode,
        message: String,
    },
}

impl ClientMessage {
    /// Extract the request ID from any client message.
    pub fn id(&self) -> &str {
        match self {
            ClientMessage::StartDaemon { id, .. }
            | ClientMessage::StopDaemon { id, .. }
            | ClientMessage::Shutdown { id, .. }
            | ClientMessage::GetDaemon { id, .. }
            | ClientMessage::Status { id, .. }
            | ClientMessage::Ping { id, .. } => id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DaemonState;

    fn sample_record() -> DaemonRecordWire {
        DaemonRecordWire {
            name: DaemonName::new("api"),
            state: DaemonState::Running,
            pid: Some(4242),
            port: Some(8080),
            started_at: "2026-07-28T10:00:00Z".to_string(),
            restart_count: 0,
            last_exit: None,
            command: "npm run dev".to_string(),
            health_url: Some("http://127.0.0.1:8080/health".to_string()),
        }
    }

    #[test]
    fn test_client_message_start_daemon_roundtrip() {
        let msg = ClientMessage::StartDaemon {
            id: "req-001".to_string(),
            name: DaemonName::new("api"),
            command: "npm".to_string(),
            args: vec!["run".to_string(), "dev".to_string()],
            env: HashMap::from([("PORT".to_string(), "8080".to_string())]),
            default_port: Some(8080),
            health_url: Some("http://127.0.0.1:8080/health".to_string()),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"start_daemon"#));
        let parsed: ClientMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id(), "req-001");
    }

    #[test]
    fn test_client_message_stop_daemon_roundtrip() {
        let msg = ClientMessage::StopDaemon {
            id: "req-002".to_string(),
            name: DaemonName::new("api"),
        };
        let json = serde_json::to_string(&msg).unwrap();
        let parsed: ClientMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id(), "req-002");
    }

    #[test]
    fn test_client_message_shutdown_roundtrip() {
        let msg = ClientMessage::Shutdown {
            id: "req-010".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"shutdown"#));
        let parsed: ClientMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id(), "req-010");
    }

    #[test]
    fn test_client_message_all_variants_roundtrip() {
        let messages: Vec<ClientMessage> = vec![
            ClientMessage::StartDaemon {
                id: "1".to_string(),
                name: DaemonName::new("api"),
                command: "npm".to_string(),
                args: vec![],
                env: HashMap::new(),
                default_port: None,
                health_url: None,
            },
            ClientMessage::StopDaemon {
                id: "2".to_string(),
                name: DaemonName::new("api"),
            },
            ClientMessage::Shutdown {
                id: "3".to_string(),
            },
            ClientMessage::GetDaemon {
                id: "4".to_string(),
                name: DaemonName::new("api"),
            },
            ClientMessage::Status {
                id: "5".to_string(),
            },
            ClientMessage::Ping {
                id: "6".to_string(),
            },
        ];

        for msg in messages {
            let json = serde_json::to_string(&msg).unwrap();
            let parsed: ClientMessage = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed.id(), msg.id());
        }
    }

    #[test]
    fn test_daemon_message_daemon_started_roundtrip() {
        let msg = DaemonMessage::DaemonStarted {
            id: "req-001".to_string(),
            record: sample_record(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"daemon_started"#));
        let parsed: DaemonMessage = serde_json::from_str(&json).unwrap();
        if let DaemonMessage::DaemonStarted { id, record } = parsed {
            assert_eq!(id, "req-001");
            assert_eq!(record.name, DaemonName::new("api"));
        } else {
            panic!("wrong variant");
        }
    }

    #[test]
    fn test_daemon_message_status_snapshot_roundtrip() {
        let msg = DaemonMessage::StatusSnapshot {
            id: "req-003".to_string(),
            daemons: vec![sample_record()],
        };
        let json = serde_json::to_string(&msg).unwrap();
        let parsed: DaemonMessage = serde_json::from_str(&json).unwrap();
        if let DaemonMessage::StatusSnapshot { daemons, .. } = parsed {
            assert_eq!(daemons.len(), 1);
        } else {
            panic!("wrong variant");
        }
    }

    #[test]
    fn test_daemon_message_error_roundtrip() {
        let msg = DaemonMessage::Error {
            id: "req-001".to_string(),
            code: ErrorCode::NotFound,
            message: "no daemon named 'api'".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""code":"not_found""#));
        let parsed: DaemonMessage = serde_json::from_str(&json).unwrap();
        if let DaemonMessage::Error { id, code, message } = parsed {
            assert_eq!(id, "req-001");
            assert_eq!(code, ErrorCode::NotFound);
            assert!(message.contains("api"));
        } else {
            panic!("wrong variant");
        }
    }

    #[test]
    fn test_error_code_from_code() {
        assert_eq!(ErrorCode::from_code("not_found"), ErrorCode::NotFound);
        assert_eq!(ErrorCode::from_code("in_use"), ErrorCode::InUse);
        assert_eq!(
            ErrorCode::from_code("something_totally_new"),
            ErrorCode::Unknown
        );
    }

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::NotFound.to_string(), "not_found");
        assert_eq!(ErrorCode::InUse.to_string(), "in_use");
        assert_eq!(ErrorCode::Unknown.to_string(), "unknown");
    }

    #[test]
    fn test_error_code_unknown_deserialization() {
        let json = r#"{"type":"error","id":"1","code":"some_future_error","message":"new"}"#;
        let parsed: DaemonMessage = serde_json::from_str(json).unwrap();
        if let DaemonMessage::Error { code, .. } = parsed {
            assert_eq!(code, ErrorCode::Unknown);
        } else {
            panic!("wrong variant");
        }
    }

    #[test]
    fn test_daemon_message_ack_roundtrip() {
        let msg = DaemonMessage::Ack {
            id: "req-005".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"ack"#));
        let parsed: DaemonMessage = serde_json::from_str(&json).unwrap();
        if let DaemonMessage::Ack { id } = parsed {
            assert_eq!(id, "req-005");
        } else {
            panic!("wrong variant");
        }
    }

    #[test]
    fn test_client_message_start_daemon_defaults() {
        let json = r#"{"id":"1","type":"start_daemon","name":"api","command":"npm"}"#;
        let parsed: ClientMessage = serde_json::from_str(json).unwrap();
        if let ClientMessage::StartDaemon { args, env, .. } = parsed {
            assert!(args.is_empty());
            assert!(env.is_empty());
        } else {
            panic!("wrong variant");
        }
    }

    #[test]
    fn test_client_message_id_extraction() {
        let msg = ClientMessage::Status {
            id: "my-id".to_string(),
        };
        assert_eq!(msg.id(), "my-id");
    }
}
