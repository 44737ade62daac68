use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Operational status of a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ServerStatus {
    Up,
    Down,
    Maintenance,
    /// Anything the inventory reports that we do not recognise.
    #[default]
    #[serde(other)]
    Unknown,
}

impl ServerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Maintenance => "maintenance",
            Self::Unknown => "unknown",
        }
    }

    /// Lenient parse of a stored status string.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "up" => Self::Up,
            "down" => Self::Down,
            "maintenance" => Self::Maintenance,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A server (physical host or VM) as exposed by the inventory API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerRecord {
    pub id: String,
    /// Unique host name, e.g. `chennai-web-01`.
    pub name: String,
    pub ip_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fqdn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_version: Option<String>,
    /// production / staging / development.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_cores: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_gb: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_gb: Option<u32>,
    #[serde(default)]
    pub status: ServerStatus,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(
        default,
        deserialize_with = "deserialize_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_seen: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn default_active() -> bool {
    true
}

/// An inventory user (server owner / operator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    /// admin / user / readonly.
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

fn default_role() -> String {
    "user".into()
}

/// Which collection a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Server,
    User,
}

/// Read-only snapshot of one inventory record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InventoryRecord {
    Server(ServerRecord),
    User(UserRecord),
}

impl InventoryRecord {
    pub fn id(&self) -> &str {
        match self {
            Self::Server(s) => &s.id,
            Self::User(u) => &u.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Server(s) => &s.name,
            Self::User(u) => &u.name,
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Server(_) => RecordKind::Server,
            Self::User(_) => RecordKind::User,
        }
    }

    pub fn as_server(&self) -> Option<&ServerRecord> {
        match self {
            Self::Server(s) => Some(s),
            Self::User(_) => None,
        }
    }

    pub fn as_user(&self) -> Option<&UserRecord> {
        match self {
            Self::User(u) => Some(u),
            Self::Server(_) => None,
        }
    }
}

impl From<ServerRecord> for InventoryRecord {
    fn from(server: ServerRecord) -> Self {
        Self::Server(server)
    }
}

impl From<UserRecord> for InventoryRecord {
    fn from(user: UserRecord) -> Self {
        Self::User(user)
    }
}

/// Aggregate counts over the server collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySummary {
    pub total_servers: usize,
    pub active_servers: usize,
    pub servers_up: usize,
    pub servers_down: usize,
    pub servers_maintenance: usize,
    /// Server count per environment; servers without one count as "unknown".
    pub environments: BTreeMap<String, usize>,
}

impl InventorySummary {
    pub fn from_servers<'a>(servers: impl IntoIterator<Item = &'a ServerRecord>) -> Self {
        let mut summary = Self::default();
        for server in servers {
            summary.total_servers += 1;
            if server.is_active {
                summary.active_servers += 1;
            }
            match server.status {
                ServerStatus::Up => summary.servers_up += 1,
                ServerStatus::Down => summary.servers_down += 1,
                ServerStatus::Maintenance => summary.servers_maintenance += 1,
                ServerStatus::Unknown => {}
            }
            let env = server
                .environment
                .clone()
                .unwrap_or_else(|| "unknown".to_string());
            *summary.environments.entry(env).or_default() += 1;
        }
        summary
    }

    /// Summary over the server records in a mixed record list.
    pub fn from_records(records: &[InventoryRecord]) -> Self {
        Self::from_servers(records.iter().filter_map(InventoryRecord::as_server))
    }
}

/// Accepts RFC 3339 timestamps as well as the naive UTC timestamps the
/// inventory API emits (`2024-01-15T12:00:01.123456`).
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    parse_timestamp(&raw)
        .map(Some)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|ndt| ndt.and_utc())
}
