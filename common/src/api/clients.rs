use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Liveness derived by the server from heartbeat recency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    Online,
    Offline,
}

impl std::fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ClientStatus::Online => "online",
            ClientStatus::Offline => "offline",
        };
        write!(f, "{}", s)
    }
}

/// Whether the client currently holds a task assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkStatus {
    Idle,
    Busy,
}

impl std::fmt::Display for WorkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WorkStatus::Idle => "idle",
            WorkStatus::Busy => "busy",
        };
        write!(f, "{}", s)
    }
}

/// A remote client tracked by the control server. Records are created and
/// mutated server-side only; consumers read and delete them over the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientRecord {
    pub id: i64,
    pub client_id: String,
    pub ip_address: String,
    pub last_heartbeat: DateTime<Utc>,
    pub status: ClientStatus,
    pub task_status: WorkStatus,
    pub created_at: DateTime<Utc>,
}

/// One page of client records plus pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientPage {
    pub items: Vec<ClientRecord>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoveOfflineResult {
    pub status: String,
    pub deleted_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatRequest {
    pub client_id: String,
}

/// Pagination parameters for the client listing. Forwarded verbatim as the
/// `page` and `page_size` query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListClientsParams {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for ListClientsParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

pub(crate) fn default_page() -> u32 {
    1
}

pub(crate) fn default_page_size() -> u32 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&ClientStatus::Online).unwrap(),
            r#""online""#
        );
        assert_eq!(
            serde_json::to_string(&WorkStatus::Busy).unwrap(),
            r#""busy""#
        );
    }

    #[test]
    fn test_list_params_defaults() {
        let params: ListClientsParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params, ListClientsParams { page: 1, page_size: 10 });
    }

    #[test]
    fn test_remove_offline_round_trip() {
        let raw = r#"{"status":"ok","deleted_count":3}"#;
        let parsed: RemoveOfflineResult = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.status, "ok");
        assert_eq!(parsed.deleted_count, 3);
        assert_eq!(serde_json::to_string(&parsed).unwrap(), raw);
    }
}
