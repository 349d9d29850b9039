use serde::{Deserialize, Serialize};

/// Generate a newtype wrapper around `String` with standard trait impls.
///
/// Each generated type gets: `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`,
/// `Serialize`/`Deserialize` (transparent), `Display`, `Deref<Target=str>`,
/// `AsRef<str>`, `Borrow<str>`, `From<String>`, `From<&str>`.
macro_rules! newtype_string {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;
            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

newtype_string! {
    /// User-facing name for a pane/daemon within a supervised session
    /// (e.g. `"backend"`, `"mail-broker"`).
    SessionName
}

newtype_string! {
    /// Name of a supervised auxiliary process (e.g. `"api"`, `"worker"`).
    DaemonName
}

newtype_string! {
    /// Identifier of a recovery-context bead (completed or blocked work item).
    BeadId
}

/// Identifier for a pane within a multiplexer session, as reported by the
/// terminal adapter (e.g. tmux's `%12`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaneId(pub String);

impl std::fmt::Display for PaneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Coding-agent backend bound to a pane.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AgentKind {
    Claude,
    Codex,
    Gemini,
    Plugin { name: String },
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentKind::Claude => write!(f, "claude"),
            AgentKind::Codex => write!(f, "codex"),
            AgentKind::Gemini => write!(f, "gemini"),
            AgentKind::Plugin { name } => write!(f, "plugin:{name}"),
        }
    }
}

/// Lifecycle state of a supervised daemon, as tracked by the supervisor.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DaemonState {
    Stopped,
    Starting,
    Running,
    Crashed,
    Failed,
}

impl std::fmt::Display for DaemonState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DaemonState::Stopped => write!(f, "stopped"),
            DaemonState::Starting => write!(f, "starting"),
            DaemonState::Running => write!(f, "running"),
            DaemonState::Crashed => write!(f, "crashed"),
            DaemonState::Failed => write!(f, "failed"),
        }
    }
}

/// Wire-format snapshot of a supervised daemon record, as returned over IPC.
///
/// Mirrors the supervisor's internal `DaemonRecord` but carries only
/// plain-old-data fields safe to serialize across the control socket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonRecordWire {
    pub name: DaemonName,
    pub state: DaemonState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    pub started_at: String,
    pub restart_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_exit: Option<i32>,
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daemon_record_wire_serde() {
        let record = DaemonRecordWire {
            name: DaemonName::new("api"),
            state: DaemonState::Running,
            pid: Some(12345),
            port: Some(8080),
            started_at: "2026-07-28T10:00:00Z".to_string(),
            restart_count: 0,
            last_exit: None,
            command: "npm run dev".to_string(),
            health_url: Some("http://127.0.0.1:8080/health".to_string()),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains(r#""state":"running""#));
        let parsed: DaemonRecordWire = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.name, record.name);
        assert_eq!(parsed.pid, Some(12345));
    }

    #[test]
    fn test_daemon_record_wire_optional_fields_omitted() {
        let record = DaemonRecordWire {
            name: DaemonName::new("worker"),
            state: DaemonState::Stopped,
            pid: None,
            port: None,
            started_at: "2026-07-28T10:00:00Z".to_string(),
            restart_count: 3,
            last_exit: Some(1),
            command: "worker".to_string(),
            health_url: None,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("\"pid\""));
        assert!(!json.contains("\"port\""));
        assert!(!json.contains("\"health_url\""));
        assert!(json.contains("\"last_exit\":1"));
    }

    #[test]
    fn test_agent_kind_display() {
        assert_eq!(AgentKind::Claude.to_string(), "claude");
        assert_eq!(AgentKind::Codex.to_string(), "codex");
        assert_eq!(AgentKind::Gemini.to_string(), "gemini");
        assert_eq!(
            AgentKind::Plugin {
                name: "aider".to_string()
            }
            .to_string(),
            "plugin:aider"
        );
    }

    #[test]
    fn test_agent_kind_roundtrip() {
        let kinds = vec![
            AgentKind::Claude,
            AgentKind::Codex,
            AgentKind::Gemini,
            AgentKind::Plugin {
                name: "aider".to_string(),
            },
        ];
        for kind in kinds {
            let json = serde_json::to_string(&kind).unwrap();
            let parsed: AgentKind = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn test_daemon_state_display() {
        assert_eq!(DaemonState::Stopped.to_string(), "stopped");
        assert_eq!(DaemonState::Starting.to_string(), "starting");
        assert_eq!(DaemonState::Running.to_string(), "running");
        assert_eq!(DaemonState::Crashed.to_string(), "crashed");
        assert_eq!(DaemonState::Failed.to_string(), "failed");
    }

    #[test]
    fn test_daemon_state_wire_format() {
        assert_eq!(
            serde_json::to_string(&DaemonState::Running).unwrap(),
            r#""running""#
        );
    }

    #[test]
    fn test_pane_id_display() {
        let pane = PaneId("%12".to_string());
        assert_eq!(pane.to_string(), "%12");
    }

    // --- Newtype tests ---

    macro_rules! test_newtype {
        ($name:ident, $ty:ty) => {
            mod $name {
                use super::super::*;
                use std::collections::{HashMap, HashSet};

                #[test]
                fn serde_transparent_roundtrip() {
                    let val = <$ty>::new("test-value");
                    let json = serde_json::to_string(&val).unwrap();
                    assert_eq!(
                        json, r#""test-value""#,
                        "transparent serde should produce bare string"
                    );
                    let parsed: $ty = serde_json::from_str(&json).unwrap();
                    assert_eq!(parsed, val);
                }

                #[test]
                fn display() {
                    let val = <$ty>::new("hello");
                    assert_eq!(val.to_string(), "hello");
                }

                #[test]
                fn deref_to_str() {
                    let val = <$ty>::new("abc");
                    let s: &str = &val;
                    assert_eq!(s, "abc");
                    assert_eq!(val.len(), 3);
                }

                #[test]
                fn from_string() {
                    let val: $ty = String::from("owned").into();
                    assert_eq!(&*val, "owned");
                }

                #[test]
                fn from_str_ref() {
                    let val: $ty = "borrowed".into();
                    assert_eq!(&*val, "borrowed");
                }

                #[test]
                fn hash_set() {
                    let mut set = HashSet::new();
                    set.insert(<$ty>::new("a"));
                    set.insert(<$ty>::new("b"));
                    set.insert(<$ty>::new("a"));
                    assert_eq!(set.len(), 2);
                }

                #[test]
                fn borrow_str_hashmap_lookup() {
                    let mut map = HashMap::new();
                    map.insert(<$ty>::new("key"), 42);
                    assert_eq!(map.get("key"), Some(&42));
                }

                #[test]
                fn into_inner() {
                    let val = <$ty>::new("inner");
                    let s: String = val.into_inner();
                    assert_eq!(s, "inner");
                }

                #[test]
                fn as_ref_str() {
                    let val = <$ty>::new("ref-test");
                    let s: &str = val.as_ref();
                    assert_eq!(s, "ref-test");
                }

                #[test]
                fn empty_string() {
                    let val = <$ty>::new("");
                    assert_eq!(&*val, "");
                    assert_eq!(val.to_string(), "");
                }
            }
        };
    }

    test_newtype!(session_name, SessionName);
    test_newtype!(daemon_name, DaemonName);
    test_newtype!(bead_id, BeadId);
}
