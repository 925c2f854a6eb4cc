//! Multi-vault access: the registry owning each vault's index, and helpers
//! that merge per-vault results.

pub mod aggregate;
pub mod registry;

pub use aggregate::{
    VaultResult, add_vault_attribution, aggregate_query_results, aggregate_search_results,
    deduplicate_results, filter_by_vaults,
};
pub use registry::{RegistryError, VaultRegistry};
