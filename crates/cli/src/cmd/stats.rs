//! Stats command implementation.

use palace_core::config::ResolvedConfig;
use palace_core::vaults::VaultRegistry;

use super::fail;
use super::output::print_json;
use crate::StatsArgs;

pub fn run(rc: &ResolvedConfig, args: StatsArgs) {
    let alias = rc.default_vault.as_str();
    let mut registry = VaultRegistry::from_config(rc);

    let stats = match registry.db(alias).map(|db| db.get_index_stats()) {
        Ok(Ok(stats)) => stats,
        Ok(Err(e)) => fail(format!("Error reading index: {}", e)),
        Err(e) => fail(format!("Error opening index: {}", e)),
    };

    if args.json {
        print_json(&stats);
        return;
    }

    println!("Vault:          {}", alias);
    println!("Schema version: {}", stats.schema_version);
    println!("Notes:          {}", stats.notes);
    println!("Links:          {}", stats.links);
    println!("Tags:           {}", stats.tags);

    if !stats.by_type.is_empty() {
        println!();
        println!("By type:");
        for (note_type, count) in &stats.by_type {
            println!("  {:<14}{}", note_type, count);
        }
    }
    if !stats.by_status.is_empty() {
        println!();
        println!("By status:");
        for (status, count) in &stats.by_status {
            println!("  {:<14}{}", status, count);
        }
    }
}
