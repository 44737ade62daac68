use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What kind of question was asked. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    CountServers,
    ListByStatus,
    ListByEnvironment,
    ServerDetail,
    SearchByAttribute,
    ListUsers,
    Unknown,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CountServers => "count_servers",
            Self::ListByStatus => "list_by_status",
            Self::ListByEnvironment => "list_by_environment",
            Self::ServerDetail => "server_detail",
            Self::SearchByAttribute => "search_by_attribute",
            Self::ListUsers => "list_users",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Well-known parameter keys.
pub mod params {
    pub const STATUS: &str = "status";
    pub const ENVIRONMENT: &str = "environment";
    /// Exact server name (ServerDetail).
    pub const NAME: &str = "name";
    /// Substring over name, IP address and notes.
    pub const NAME_FRAGMENT: &str = "name_fragment";
    pub const OS: &str = "os";
    pub const LOCATION: &str = "location";
    pub const OWNER: &str = "owner";
    pub const ROLE: &str = "role";
    pub const DEPARTMENT: &str = "department";
    /// Presentation hint; `names` asks for a names-only listing.
    pub const VIEW: &str = "view";
    pub const VIEW_NAMES: &str = "names";

    pub const RAM_GT: &str = "ram_gt";
    pub const RAM_GTE: &str = "ram_gte";
    pub const RAM_LT: &str = "ram_lt";
    pub const RAM_LTE: &str = "ram_lte";
    pub const CPU_GT: &str = "cpu_gt";
    pub const CPU_GTE: &str = "cpu_gte";
    pub const CPU_LT: &str = "cpu_lt";
    pub const CPU_LTE: &str = "cpu_lte";
    pub const DISK_GT: &str = "disk_gt";
    pub const DISK_GTE: &str = "disk_gte";
    pub const DISK_LT: &str = "disk_lt";
    pub const DISK_LTE: &str = "disk_lte";

    /// All numeric threshold keys.
    pub const THRESHOLDS: &[&str] = &[
        RAM_GT, RAM_GTE, RAM_LT, RAM_LTE, CPU_GT, CPU_GTE, CPU_LT, CPU_LTE, DISK_GT, DISK_GTE,
        DISK_LT, DISK_LTE,
    ];
}

/// Extracted question parameters. Keys are unique; iteration order is
/// lexical so rendering and comparisons are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parameters(BTreeMap<String, String>);

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// True when the names-only listing view was requested.
    pub fn names_only(&self) -> bool {
        self.get(params::VIEW) == Some(params::VIEW_NAMES)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// One incoming free-text question. Lives for a single request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// UUIDv7, time-sortable.
    pub id: Uuid,
    pub text: String,
    pub received_at: DateTime<Utc>,
}

impl Question {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            text: text.into(),
            received_at: Utc::now(),
        }
    }
}

/// Output of the intent classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub intent: Intent,
    #[serde(default)]
    pub params: Parameters,
    /// 0.0 – 1.0; rules produce exactly 0.0 or 1.0.
    pub confidence: f64,
    /// Name of the rule that fired, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
}

impl Classification {
    pub fn unknown() -> Self {
        Self {
            intent: Intent::Unknown,
            params: Parameters::new(),
            confidence: 0.0,
            rule: None,
        }
    }

    pub fn is_confident(&self, threshold: f64) -> bool {
        self.intent != Intent::Unknown && self.confidence >= threshold
    }
}
