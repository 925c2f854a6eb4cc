//! Reindex command implementation.

use std::io::Write;

use palace_core::config::ResolvedConfig;
use palace_core::index::ProgressCallback;
use palace_core::vaults::VaultRegistry;

use super::fail;
use crate::ReindexArgs;

pub fn run(rc: &ResolvedConfig, args: ReindexArgs) {
    let alias = rc.default_vault.as_str();
    let mut registry = VaultRegistry::from_config(rc);

    let root = match registry.vault(alias) {
        Ok(v) => v.root.clone(),
        Err(e) => fail(format!("Error: {}", e)),
    };
    println!("Indexing vault '{}': {}", alias, root.display());

    let progress: ProgressCallback = if args.verbose {
        Box::new(|current, total, path| {
            println!("[{}/{}] {}", current, total, path);
        })
    } else {
        Box::new(|current, total, _path| {
            if current % 50 == 0 || current == total {
                print!("\rIndexing... {}/{}", current, total);
                std::io::stdout().flush().ok();
            }
        })
    };

    let report = match registry.sync_vault(alias, args.full, Some(progress)) {
        Ok(report) => report,
        Err(e) => fail(format!("\nError during indexing: {}", e)),
    };

    if !args.verbose && report.files_found > 0 {
        println!(); // Newline after progress
    }
    println!();
    println!("Indexing complete:");
    println!("  Files found:    {}", report.files_found);
    println!("  Inserted:       {}", report.inserted);
    println!("  Updated:        {}", report.updated);
    println!("  Unchanged:      {}", report.unchanged);
    println!("  Removed:        {}", report.removed);
    if report.skipped > 0 {
        println!("  Skipped:        {}", report.skipped);
    }
    println!("  Duration:       {}ms", report.duration_ms);

    if let Err(e) = registry.close_all() {
        fail(format!("Error closing index: {}", e));
    }
}
