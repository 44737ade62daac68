//! Deterministic answer templates.
//!
//! One template per intent, parameterized by the match count and at most
//! `max_listed` example records. Formatting is pure: it never touches the
//! inventory and never returns an empty string.

use serde::Deserialize;
use sia_protocol::{
    Intent, InventoryRecord, InventorySummary, Parameters, ServerRecord, UserRecord, params,
};

/// Fixed reply when a question cannot be answered at all.
pub const CANNED_FALLBACK: &str = "I don't understand that question yet.";

/// Reply when the inventory cannot be read.
pub const INVENTORY_UNAVAILABLE: &str =
    "Server inventory temporarily unavailable. Please try again shortly.";

#[derive(Debug, Clone, Deserialize)]
pub struct FormatterConfig {
    /// Records listed before the "... and N more" suffix.
    #[serde(default = "default_max_listed")]
    pub max_listed: usize,
}

fn default_max_listed() -> usize {
    10
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            max_listed: default_max_listed(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Formatter {
    max_listed: usize,
}

impl Formatter {
    pub fn new(config: &FormatterConfig) -> Self {
        Self {
            max_listed: config.max_listed.max(1),
        }
    }

    pub fn format(&self, intent: Intent, p: &Parameters, matches: &[InventoryRecord]) -> String {
        if intent == Intent::Unknown {
            return CANNED_FALLBACK.to_string();
        }
        if matches.is_empty() {
            return no_matches(intent, p);
        }

        match intent {
            Intent::CountServers => count(p, matches),
            Intent::ServerDetail => matches
                .iter()
                .filter_map(InventoryRecord::as_server)
                .map(server_block)
                .collect::<Vec<_>>()
                .join("\n\n"),
            Intent::ListUsers => self.users(p, matches),
            _ => self.servers(p, matches),
        }
    }

    fn servers(&self, p: &Parameters, matches: &[InventoryRecord]) -> String {
        let servers: Vec<&ServerRecord> = matches.iter().filter_map(InventoryRecord::as_server).collect();
        let mut out = format!("Found {}{}:\n", plural(servers.len(), "server"), prose(p));

        let shown = servers.iter().take(self.max_listed);
        if p.names_only() {
            for s in shown {
                out.push_str(&format!("- {}\n", s.name));
            }
        } else {
            for s in shown {
                out.push('\n');
                out.push_str(&server_block(s));
                out.push('\n');
            }
        }

        if servers.len() > self.max_listed {
            out.push_str(&format!(
                "\n... and {} more servers.",
                servers.len() - self.max_listed
            ));
        }
        out.trim_end().to_string()
    }

    fn users(&self, p: &Parameters, matches: &[InventoryRecord]) -> String {
        let users: Vec<&UserRecord> = matches.iter().filter_map(InventoryRecord::as_user).collect();
        let mut out = format!("Found {}{}:\n", plural(users.len(), "user"), user_prose(p));
        for u in users.iter().take(self.max_listed) {
            out.push_str(&format!("- {} <{}> ({}", u.name, u.email, u.role));
            if let Some(dept) = &u.department {
                out.push_str(&format!(", {dept}"));
            }
            out.push_str(")\n");
        }
        if users.len() > self.max_listed {
            out.push_str(&format!("... and {} more users.", users.len() - self.max_listed));
        }
        out.trim_end().to_string()
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(&FormatterConfig::default())
    }
}

// ── Templates ───────────────────────────────────────────────────

fn count(p: &Parameters, matches: &[InventoryRecord]) -> String {
    let filtered = p.iter().any(|(k, _)| k != params::VIEW);
    if filtered {
        let n = matches.iter().filter(|r| r.as_server().is_some()).count();
        let verb = if n == 1 { "is" } else { "are" };
        return format!("There {verb} {}{}.", plural(n, "server"), prose(p));
    }

    let summary = InventorySummary::from_records(matches);
    let mut out = format!(
        "Server summary:\n  Total servers: {}\n  Active servers: {}\n  Servers up: {}\n  \
         Servers down: {}\n  Servers in maintenance: {}",
        summary.total_servers,
        summary.active_servers,
        summary.servers_up,
        summary.servers_down,
        summary.servers_maintenance,
    );
    if !summary.environments.is_empty() {
        out.push_str("\n\nBy environment:");
        for (env, n) in &summary.environments {
            out.push_str(&format!("\n  {}: {}", capitalize(env), plural(*n, "server")));
        }
    }
    out
}

fn server_block(s: &ServerRecord) -> String {
    let na = || "N/A".to_string();
    let opt = |v: Option<u32>, unit: &str| v.map_or_else(na, |n| format!("{n}{unit}"));

    let mut out = format!("**{}**\n", s.name);
    out.push_str(&format!("  IP: {}\n", s.ip_address));
    out.push_str(&format!("  Status: {}\n", s.status));
    out.push_str(&format!(
        "  Environment: {}\n",
        s.environment.clone().unwrap_or_else(na)
    ));
    let os = match (&s.os, &s.os_version) {
        (Some(os), Some(v)) => format!("{os} {v}"),
        (Some(os), None) => os.clone(),
        _ => na(),
    };
    out.push_str(&format!("  OS: {os}\n"));
    out.push_str(&format!(
        "  Resources: {} cores, {} RAM, {} disk",
        opt(s.cpu_cores, ""),
        opt(s.memory_gb, "GB"),
        opt(s.disk_gb, "GB"),
    ));
    if let Some(owner) = &s.owner_name {
        out.push_str(&format!("\n  Owner: {owner}"));
    }
    if let Some(seen) = s.last_seen {
        out.push_str(&format!("\n  Last seen: {}", seen.format("%Y-%m-%d %H:%M UTC")));
    }
    out
}

fn no_matches(intent: Intent, p: &Parameters) -> String {
    let criteria: Vec<String> = p
        .iter()
        .filter(|(k, _)| *k != params::VIEW)
        .map(|(k, v)| format!("{k}={v}"))
        .collect();
    let criteria = if criteria.is_empty() {
        "your query".to_string()
    } else {
        criteria.join(", ")
    };
    let noun = if intent == Intent::ListUsers {
        "users"
    } else {
        "servers"
    };
    format!("No {noun} found matching {criteria}.")
}

/// Server criteria as a prose suffix, e.g. " with status down in production".
fn prose(p: &Parameters) -> String {
    let mut parts = Vec::new();
    if let Some(v) = p.get(params::NAME) {
        parts.push(format!("named {v}"));
    }
    if let Some(v) = p.get(params::STATUS) {
        parts.push(format!("with status {v}"));
    }
    if let Some(v) = p.get(params::ENVIRONMENT) {
        parts.push(format!("in {v}"));
    }
    if let Some(v) = p.get(params::NAME_FRAGMENT) {
        parts.push(format!("matching '{v}'"));
    }
    if let Some(v) = p.get(params::OS) {
        parts.push(format!("running {v}"));
    }
    if let Some(v) = p.get(params::LOCATION) {
        parts.push(format!("located in {v}"));
    }
    if let Some(v) = p.get(params::OWNER) {
        parts.push(format!("owned by {v}"));
    }
    for key in params::THRESHOLDS {
        if let Some(v) = p.get(key) {
            parts.push(threshold_prose(key, v));
        }
    }
    suffix(parts)
}

fn user_prose(p: &Parameters) -> String {
    let mut parts = Vec::new();
    if let Some(v) = p.get(params::ROLE) {
        parts.push(format!("with role {v}"));
    }
    if let Some(v) = p.get(params::DEPARTMENT) {
        parts.push(format!("in {v}"));
    }
    suffix(parts)
}

fn threshold_prose(key: &str, value: &str) -> String {
    let (resource, cmp) = key.split_once('_').unwrap_or((key, ""));
    let cmp = match cmp {
        "gt" => "more than",
        "gte" => "at least",
        "lt" => "less than",
        _ => "at most",
    };
    match resource {
        "ram" => format!("with {cmp} {value} GB RAM"),
        "disk" => format!("with {cmp} {value} GB disk"),
        _ => format!("with {cmp} {value} CPU cores"),
    }
}

fn suffix(parts: Vec<String>) -> String {
    if parts.is_empty() {
        String::new()
    } else {
        format!(" {}", parts.join(" "))
    }
}

fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("1 {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
