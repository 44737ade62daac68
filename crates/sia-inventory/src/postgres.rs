//! Read-only PostgreSQL inventory over the `servers` and `users` tables.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sia_protocol::{InventoryRecord, ServerRecord, ServerStatus, UserRecord};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::accessor::InventoryAccessor;
use crate::error::{InventoryError, InventoryResult};

const SERVER_COLUMNS: &str = "SELECT s.id, s.name, s.ip_address, s.fqdn, s.os, s.os_version, \
     s.environment, s.location, s.cpu_cores, s.memory_gb, s.disk_gb, s.is_active, s.status, \
     s.last_seen, u.name AS owner_name, s.tags, s.notes \
     FROM servers s LEFT JOIN users u ON u.id = s.owner_user_id";

/// Server row as stored; `tags` is a JSON-encoded string array.
#[derive(Debug, Clone, sqlx::FromRow)]
struct ServerRow {
    id: String,
    name: String,
    ip_address: String,
    fqdn: Option<String>,
    os: Option<String>,
    os_version: Option<String>,
    environment: Option<String>,
    location: Option<String>,
    cpu_cores: Option<i32>,
    memory_gb: Option<i32>,
    disk_gb: Option<i32>,
    is_active: Option<bool>,
    status: Option<String>,
    last_seen: Option<NaiveDateTime>,
    owner_name: Option<String>,
    tags: Option<String>,
    notes: Option<String>,
}

impl From<ServerRow> for ServerRecord {
    fn from(row: ServerRow) -> Self {
        let size = |v: Option<i32>| v.and_then(|n| u32::try_from(n).ok());
        Self {
            id: row.id,
            name: row.name,
            ip_address: row.ip_address,
            fqdn: row.fqdn,
            os: row.os,
            os_version: row.os_version,
            environment: row.environment,
            location: row.location,
            cpu_cores: size(row.cpu_cores),
            memory_gb: size(row.memory_gb),
            disk_gb: size(row.disk_gb),
            status: row
                .status
                .as_deref()
                .map(ServerStatus::parse)
                .unwrap_or_default(),
            is_active: row.is_active.unwrap_or(true),
            last_seen: row.last_seen.map(|ts| ts.and_utc()),
            owner_name: row.owner_name,
            tags: row
                .tags
                .as_deref()
                .and_then(|raw| serde_json::from_str(raw).ok())
                .unwrap_or_default(),
            notes: row.notes,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct UserRow {
    id: String,
    name: String,
    email: String,
    role: Option<String>,
    department: Option<String>,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            role: row.role.unwrap_or_else(|| "user".into()),
            department: row.department,
        }
    }
}

/// Inventory accessor over a PostgreSQL pool. Issues SELECTs only.
pub struct PgInventory {
    pool: PgPool,
    timeout: Duration,
}

impl PgInventory {
    /// Connect lazily; connection errors surface on first query.
    pub fn connect_lazy(database_url: &str, timeout: Duration) -> InventoryResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(timeout)
            .connect_lazy(database_url)
            .map_err(|e| InventoryError::Unavailable(format!("database url: {e}")))?;
        Ok(Self { pool, timeout })
    }

    pub fn with_pool(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    fn map_err(&self, e: sqlx::Error) -> InventoryError {
        match e {
            sqlx::Error::PoolTimedOut => InventoryError::Timeout(self.timeout),
            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::Decode(_)
            | sqlx::Error::TypeNotFound { .. } => InventoryError::Decode(e.to_string()),
            other => InventoryError::Unavailable(other.to_string()),
        }
    }
}

#[async_trait]
impl InventoryAccessor for PgInventory {
    async fn find_all(&self) -> InventoryResult<Vec<InventoryRecord>> {
        let servers = sqlx::query_as::<_, ServerRow>(&format!("{SERVER_COLUMNS} ORDER BY s.name"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| self.map_err(e))?;
        let users = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, role, department FROM users ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| self.map_err(e))?;

        Ok(servers
            .into_iter()
            .map(|row| InventoryRecord::Server(row.into()))
            .chain(users.into_iter().map(|row| InventoryRecord::User(row.into())))
            .collect())
    }

    async fn find_by_exact_name(&self, name: &str) -> InventoryResult<Option<InventoryRecord>> {
        let row = sqlx::query_as::<_, ServerRow>(&format!(
            "{SERVER_COLUMNS} WHERE lower(s.name) = lower($1) LIMIT 1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| self.map_err(e))?;
        Ok(row.map(|r| InventoryRecord::Server(r.into())))
    }

    fn backend_name(&self) -> &str {
        "postgres"
    }
}
