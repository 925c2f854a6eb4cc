//! Search command implementation.

use palace_core::config::ResolvedConfig;
use palace_core::vaults::VaultRegistry;

use super::output::{print_results_json, print_results_table};
use super::vault_filters;
use crate::SearchArgs;

pub fn run(rc: &ResolvedConfig, args: SearchArgs) {
    if args.text.trim().is_empty() {
        super::fail("Search text must not be empty");
    }

    let (include, exclude) = vault_filters(rc, &args.selection);
    let mut registry = VaultRegistry::from_config(rc);

    let results =
        registry.search_all_vaults(&args.text, include.as_deref(), exclude.as_deref(), args.limit);

    if args.json {
        print_results_json(&results);
    } else {
        print_results_table(&results);
    }
}
