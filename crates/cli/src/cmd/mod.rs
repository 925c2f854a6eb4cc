pub mod graph;
pub mod links;
pub mod mentions;
pub mod output;
pub mod query;
pub mod reindex;
pub mod search;
pub mod stats;

use std::fmt::Display;
use std::path::PathBuf;

use palace_core::config::ResolvedConfig;

use crate::VaultSelection;

/// Print an error and exit with status 1.
pub(crate) fn fail(msg: impl Display) -> ! {
    eprintln!("{}", msg);
    crate::logging::flush();
    std::process::exit(1);
}

/// Normalize a note path argument by removing a leading `./`.
pub(crate) fn note_path(arg: &str) -> PathBuf {
    PathBuf::from(arg.strip_prefix("./").unwrap_or(arg))
}

/// Resolve `--vaults`, `--exclude-vaults` and `--all-vaults` into include and
/// exclude lists. Without any of them only the active vault is covered.
pub(crate) fn vault_filters(
    rc: &ResolvedConfig,
    sel: &VaultSelection,
) -> (Option<Vec<String>>, Option<Vec<String>>) {
    let include = match &sel.vaults {
        Some(list) => Some(list.clone()),
        None if sel.all_vaults || sel.exclude_vaults.is_some() => None,
        None => Some(vec![rc.default_vault.clone()]),
    };

    for alias in include.iter().flatten().chain(sel.exclude_vaults.iter().flatten()) {
        if rc.vault(alias).is_none() {
            fail(format!("Unknown vault: {}", alias));
        }
    }

    (include, sel.exclude_vaults.clone())
}
