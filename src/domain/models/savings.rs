use serde::{Deserialize, Serialize};

/// Aggregate deduplication figures reported by the server. `Default` is the
/// zero aggregate shown when the figures cannot be fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSavings {
    pub total_savings: u64,
    pub total_deduplicated_files: u64,
}
