use std::sync::Arc;

use crate::services::directory::UserDirectory;

/// Bidirectional exclusion bookkeeping on the user directory.
///
/// `exclude` is two independent idempotent writes; a failed side is logged
/// and never blocks the state transition that triggered it. Once a pair has
/// reached a terminal resolution both sides must end up excluded, otherwise
/// the pair resurfaces in discovery.
#[derive(Clone)]
pub struct ExclusionLedger {
    directory: Arc<dyn UserDirectory>,
}

impl ExclusionLedger {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    /// Hide `a` and `b` from each other permanently. Best-effort per side.
    pub async fn exclude(&self, a: &str, b: &str) {
        if let Err(e) = self.directory.add_exclusion(a, b).await {
            tracing::warn!("Failed to add {} to exclusion set of {}: {}", b, a, e);
        }
        if let Err(e) = self.directory.add_exclusion(b, a).await {
            tracing::warn!("Failed to add {} to exclusion set of {}: {}", a, b, e);
        }
    }

    /// Pure membership check, consumed by the discovery pipeline.
    pub async fn is_excluded(&self, a: &str, b: &str) -> bool {
        match self.directory.is_excluded(a, b).await {
            Ok(excluded) => excluded,
            Err(e) => {
                tracing::warn!("Exclusion check failed for {} / {}: {}", a, b, e);
                false
            }
        }
    }
}
