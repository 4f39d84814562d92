//! Replay-resistance stores: the none, reentrant, and persistent
//! variants share one operation contract (`setup`/`teardown`/
//! `mark_code_used`) behind the [`ReplayStore`] enum.

mod persistent;
mod reentrant;

pub use persistent::PersistentReplayStore;
pub use reentrant::ReentrantReplayStore;

use std::sync::Arc;

use crate::error::ReplayError;

/// Result of inserting a replay code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    /// The code had not been seen before and is now recorded.
    Ok,
    /// The code was already present: this is a replay.
    Conflict,
}

/// One of the three interchangeable replay-resistance stores.
#[derive(Clone)]
pub enum ReplayStore {
    /// Always reports `Ok`. Acceptable only when replay risk is
    /// externally mitigated.
    None,
    /// Counts nested setup/teardown calls over a delegate store.
    Reentrant(Arc<ReentrantReplayStore>),
    /// Durable store with a background expiry reaper.
    Persistent(Arc<PersistentReplayStore>),
}

impl ReplayStore {
    /// Lifecycle setup (a no-op for [`ReplayStore::None`]).
    pub async fn setup(&self) -> Result<(), ReplayError> {
        match self {
            Self::None => Ok(()),
            Self::Reentrant(store) => store.setup().await,
            Self::Persistent(store) => store.setup().await,
        }
    }

    /// Lifecycle teardown (a no-op for [`ReplayStore::None`]).
    pub async fn teardown(&self) -> Result<(), ReplayError> {
        match self {
            Self::None => Ok(()),
            Self::Reentrant(store) => store.teardown().await,
            Self::Persistent(store) => store.teardown().await,
        }
    }

    /// Atomically records `code`, reporting whether it had been seen
    /// before.
    pub async fn mark_code_used(&self, code: &[u8; 64]) -> Result<MarkOutcome, ReplayError> {
        match self {
            Self::None => Ok(MarkOutcome::Ok),
            Self::Reentrant(store) => store.mark_code_used(code).await,
            Self::Persistent(store) => store.mark_code_used(code).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn none_store_always_ok() {
        let store = ReplayStore::None;
        assert_eq!(store.mark_code_used(&[0u8; 64]).await.unwrap(), MarkOutcome::Ok);
        assert_eq!(store.mark_code_used(&[0u8; 64]).await.unwrap(), MarkOutcome::Ok);
    }
}
