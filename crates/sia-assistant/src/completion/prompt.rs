//! Prompt assembly for completion calls.

use sia_protocol::{InventoryRecord, InventorySummary};

const SYSTEM_PROMPT: &str = "You are a helpful server management assistant for a data center.

You have access to live server inventory data and can answer questions about:
- Server status, specifications and details
- Server ownership and management
- Server environments (production, staging, development)
- Server locations and configurations

Guidelines:
- Only state facts that are supported by the context below
- Be concise but complete
- If information is unavailable, say so clearly";

/// Context line used when the inventory could not be read.
pub const INVENTORY_UNAVAILABLE_CONTEXT: &str = "Inventory data is currently unavailable.";

/// Servers quoted as examples in the context.
const SAMPLE_SERVERS: usize = 3;

/// Summarise the inventory for the model: counts plus a few sample servers.
pub fn inventory_context(records: &[InventoryRecord]) -> String {
    let summary = InventorySummary::from_records(records);
    let mut context = format!(
        "Total servers: {}, Active: {}, Up: {}, Down: {}, Maintenance: {}.",
        summary.total_servers,
        summary.active_servers,
        summary.servers_up,
        summary.servers_down,
        summary.servers_maintenance,
    );

    if !summary.environments.is_empty() {
        let envs: Vec<String> = summary
            .environments
            .iter()
            .map(|(env, n)| format!("{env} {n}"))
            .collect();
        context.push_str(&format!(" Environments: {}.", envs.join(", ")));
    }

    let samples: Vec<String> = records
        .iter()
        .filter_map(InventoryRecord::as_server)
        .take(SAMPLE_SERVERS)
        .map(|s| format!("{} ({})", s.name, s.status))
        .collect();
    if !samples.is_empty() {
        context.push_str(&format!(" Sample: {}.", samples.join(", ")));
    }
    context
}

/// System prompt, context and question in one completion prompt.
pub fn build(question: &str, context: &str) -> String {
    format!(
        "{SYSTEM_PROMPT}\n\nContext about the servers:\n{context}\n\nUser query: {question}\n\n\
         Please provide a helpful response based on the available server data. \
         Keep it concise and informative."
    )
}
