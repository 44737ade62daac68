//! In-memory inventory: serves pre-loaded records. Used for development and tests.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use sia_protocol::{InventoryRecord, ServerRecord, ServerStatus, UserRecord};

use crate::accessor::InventoryAccessor;
use crate::error::InventoryResult;

/// An inventory backed by a fixed list of records.
#[derive(Debug, Clone, Default)]
pub struct MemoryInventory {
    records: Vec<InventoryRecord>,
}

impl MemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<InventoryRecord>) -> Self {
        Self { records }
    }

    /// Add a record.
    pub fn add(&mut self, record: impl Into<InventoryRecord>) {
        self.records.push(record.into());
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Chennai data-centre sample: one hypervisor, ten VMs and five users.
    ///
    /// Statuses and sizes are fixed: 8 servers up, 2 down
    /// (`chennai-db-02`, `chennai-backup-06`), 1 in maintenance, and three
    /// servers with more than 8 GB of RAM.
    pub fn with_sample_data() -> Self {
        let users = [
            ("usr-01", "Raja", "admin", "DevOps"),
            ("usr-02", "Rasheed", "user", "Development"),
            ("usr-03", "Arjun", "user", "QA"),
            ("usr-04", "Meera", "user", "Development"),
            ("usr-05", "Karthik", "admin", "Infrastructure"),
        ];

        let mut inventory = Self::new();
        let now = Utc::now();

        inventory.add(ServerRecord {
            id: "srv-00".into(),
            name: "chennai-main-01".into(),
            ip_address: "10.10.1.1".into(),
            fqdn: Some("chennai-main-01.company.local".into()),
            os: Some("Ubuntu Server".into()),
            os_version: Some("22.04 LTS".into()),
            environment: Some("production".into()),
            location: Some("Chennai Data Center".into()),
            cpu_cores: Some(64),
            memory_gb: Some(256),
            disk_gb: Some(2000),
            status: ServerStatus::Up,
            is_active: true,
            last_seen: Some(now),
            owner_name: Some("Raja".into()),
            tags: vec!["hypervisor".into(), "production".into(), "critical".into()],
            notes: Some("Main hypervisor server hosting all Chennai VMs".into()),
        });

        // (name, os, environment, purpose, status, cores, ram, disk, owner)
        let vms = [
            ("web", "Ubuntu", "production", "Web Server", ServerStatus::Up, 4, 8, 100, "Rasheed"),
            ("db", "PostgreSQL", "production", "Database Server", ServerStatus::Down, 8, 32, 500, "Karthik"),
            ("api", "Ubuntu", "production", "API Gateway", ServerStatus::Up, 4, 8, 100, "Rasheed"),
            ("cache", "Redis", "production", "Cache Server", ServerStatus::Maintenance, 4, 16, 50, "Meera"),
            ("monitoring", "Ubuntu", "production", "Monitoring", ServerStatus::Up, 2, 4, 200, "Karthik"),
            ("backup", "Ubuntu", "production", "Backup Server", ServerStatus::Down, 2, 8, 500, "Raja"),
            ("test-web", "Ubuntu", "staging", "Test Web Server", ServerStatus::Up, 2, 4, 50, "Arjun"),
            ("test-db", "PostgreSQL", "staging", "Test Database", ServerStatus::Up, 4, 8, 100, "Arjun"),
            ("dev-env", "Ubuntu", "development", "Development Environment", ServerStatus::Up, 8, 8, 200, "Meera"),
            ("ci-cd", "Ubuntu", "production", "CI/CD Pipeline", ServerStatus::Up, 8, 8, 200, "Raja"),
        ];

        for (i, (short, os, env, purpose, status, cores, ram, disk, owner)) in
            vms.into_iter().enumerate()
        {
            let n = i + 1;
            let name = format!("chennai-{short}-{n:02}");
            let last_seen = match status {
                ServerStatus::Up => now - Duration::minutes(5),
                ServerStatus::Down => now - Duration::hours(6),
                _ => now - Duration::minutes(45),
            };
            inventory.add(ServerRecord {
                id: format!("srv-{n:02}"),
                fqdn: Some(format!("{name}.company.local")),
                name,
                ip_address: format!("10.10.2.{}", n + 9),
                os: Some(os.into()),
                os_version: Some(if os == "Ubuntu" { "22.04 LTS" } else { "Latest" }.into()),
                environment: Some(env.into()),
                location: Some("Chennai Data Center".into()),
                cpu_cores: Some(cores),
                memory_gb: Some(ram),
                disk_gb: Some(disk),
                status,
                is_active: true,
                last_seen: Some(last_seen),
                owner_name: Some(owner.into()),
                tags: vec![
                    env.into(),
                    purpose.to_lowercase().replace(' ', "-"),
                    "vm".into(),
                ],
                notes: Some(format!("Virtual machine for {purpose}")),
            });
        }

        for (id, name, role, department) in users {
            inventory.add(UserRecord {
                id: id.into(),
                name: name.into(),
                email: format!("{}@company.com", name.to_lowercase()),
                role: role.into(),
                department: Some(department.into()),
            });
        }

        inventory
    }
}

#[async_trait]
impl InventoryAccessor for MemoryInventory {
    async fn find_all(&self) -> InventoryResult<Vec<InventoryRecord>> {
        Ok(self.records.clone())
    }

    async fn find_by_exact_name(&self, name: &str) -> InventoryResult<Option<InventoryRecord>> {
        Ok(self
            .records
            .iter()
            .filter_map(InventoryRecord::as_server)
            .find(|s| s.name.eq_ignore_ascii_case(name))
            .cloned()
            .map(InventoryRecord::Server))
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}
