//! Composable record predicates.
//!
//! A `Predicate` is an AND of zero or more `Constraint`s. The empty predicate
//! matches every record. Predicates are plain data so they can be logged,
//! compared in tests and evaluated by any accessor.

use serde::Serialize;
use sia_protocol::{InventoryRecord, RecordKind, ServerRecord};

/// Numeric server resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    /// Memory in GB.
    Ram,
    /// CPU cores.
    Cpu,
    /// Disk in GB.
    Disk,
}

impl Resource {
    fn value(&self, server: &ServerRecord) -> Option<u32> {
        match self {
            Self::Ram => server.memory_gb,
            Self::Cpu => server.cpu_cores,
            Self::Disk => server.disk_gb,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ram => "ram",
            Self::Cpu => "cpu",
            Self::Disk => "disk",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Comparison {
    pub fn holds(&self, actual: u32, bound: u32) -> bool {
        match self {
            Self::Gt => actual > bound,
            Self::Gte => actual >= bound,
            Self::Lt => actual < bound,
            Self::Lte => actual <= bound,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }
}

/// Textual field a substring constraint can look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextField {
    Name,
    IpAddress,
    Notes,
    Os,
    Location,
    Owner,
    Department,
}

impl TextField {
    fn value<'a>(&self, record: &'a InventoryRecord) -> Option<&'a str> {
        match (self, record) {
            (Self::Name, r) => Some(r.name()),
            (Self::IpAddress, InventoryRecord::Server(s)) => Some(&s.ip_address),
            (Self::Notes, InventoryRecord::Server(s)) => s.notes.as_deref(),
            (Self::Os, InventoryRecord::Server(s)) => s.os.as_deref(),
            (Self::Location, InventoryRecord::Server(s)) => s.location.as_deref(),
            (Self::Owner, InventoryRecord::Server(s)) => s.owner_name.as_deref(),
            (Self::Department, InventoryRecord::User(u)) => u.department.as_deref(),
            _ => None,
        }
    }
}

/// One field constraint over an inventory record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Constraint {
    Kind { kind: RecordKind },
    /// Case-insensitive server status equality.
    Status { value: String },
    /// Case-insensitive server environment equality.
    Environment { value: String },
    /// Case-insensitive user role equality.
    Role { value: String },
    /// Case-insensitive name equality.
    NameEquals { value: String },
    /// Case-insensitive substring on any of `fields`.
    Contains {
        fields: Vec<TextField>,
        needle: String,
    },
    /// Numeric comparison on a server resource. Servers without the value never match.
    Threshold {
        resource: Resource,
        comparison: Comparison,
        value: u32,
    },
}

impl Constraint {
    pub fn matches(&self, record: &InventoryRecord) -> bool {
        match self {
            Self::Kind { kind } => record.kind() == *kind,
            Self::Status { value } => record
                .as_server()
                .is_some_and(|s| s.status.as_str().eq_ignore_ascii_case(value)),
            Self::Environment { value } => record
                .as_server()
                .and_then(|s| s.environment.as_deref())
                .is_some_and(|env| env.eq_ignore_ascii_case(value)),
            Self::Role { value } => record
                .as_user()
                .is_some_and(|u| u.role.eq_ignore_ascii_case(value)),
            Self::NameEquals { value } => record.name().eq_ignore_ascii_case(value),
            Self::Contains { fields, needle } => {
                let needle = needle.to_lowercase();
                fields.iter().any(|field| {
                    field
                        .value(record)
                        .is_some_and(|v| v.to_lowercase().contains(&needle))
                })
            }
            Self::Threshold {
                resource,
                comparison,
                value,
            } => record
                .as_server()
                .and_then(|s| resource.value(s))
                .is_some_and(|actual| comparison.holds(actual, *value)),
        }
    }
}

impl std::fmt::Display for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Kind { kind } => write!(f, "kind={kind:?}"),
            Self::Status { value } => write!(f, "status={value}"),
            Self::Environment { value } => write!(f, "environment={value}"),
            Self::Role { value } => write!(f, "role={value}"),
            Self::NameEquals { value } => write!(f, "name={value}"),
            Self::Contains { fields, needle } => write!(f, "{fields:?}~{needle}"),
            Self::Threshold {
                resource,
                comparison,
                value,
            } => write!(f, "{}{}{value}", resource.as_str(), comparison.symbol()),
        }
    }
}

/// AND-combination of constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Predicate {
    constraints: Vec<Constraint>,
}

impl Predicate {
    /// The identity predicate: matches every record.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn and(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn is_identity(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn matches(&self, record: &InventoryRecord) -> bool {
        self.constraints.iter().all(|c| c.matches(record))
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.constraints.is_empty() {
            return f.write_str("*");
        }
        for (i, c) in self.constraints.iter().enumerate() {
            if i > 0 {
                f.write_str(" AND ")?;
            }
            write!(f, "{c}")?;
        }
        Ok(())
    }
}
