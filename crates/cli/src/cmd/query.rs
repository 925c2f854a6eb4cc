//! Query command implementation.

use palace_core::config::ResolvedConfig;
use palace_core::index::{NoteQuery, NoteStatus};
use palace_core::vaults::VaultRegistry;

use super::output::{print_results_json, print_results_table};
use super::{fail, vault_filters};
use crate::QueryArgs;

pub fn run(rc: &ResolvedConfig, args: QueryArgs) {
    let status = args.status.as_deref().map(|s| match s.to_lowercase().as_str() {
        "active" | "stub" | "archived" => NoteStatus::parse(s),
        _ => fail(format!("Invalid status '{}': expected active, stub or archived", s)),
    });

    let query = NoteQuery {
        note_type: args.note_type,
        status,
        tag: args.tag,
        path_prefix: args.prefix,
        modified_after: args.since,
        limit: Some(args.limit as u32),
        ..Default::default()
    };

    let (include, exclude) = vault_filters(rc, &args.selection);
    let mut registry = VaultRegistry::from_config(rc);
    let results =
        registry.query_all_vaults(&query, include.as_deref(), exclude.as_deref(), args.limit);

    if args.json {
        print_results_json(&results);
    } else {
        print_results_table(&results);
    }
}
