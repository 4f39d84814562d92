//! A replay store that lets nested setup/teardown calls share one
//! delegate without tearing it down early.

use tokio::sync::Mutex;

use super::{MarkOutcome, ReplayStore};
use crate::error::ReplayError;

/// Wraps a delegate [`ReplayStore`] behind a depth counter: the
/// delegate is set up on the first `setup` call and torn down on the
/// matching last `teardown` call. `mark_code_used` passes straight
/// through, uncontended by the setup/teardown lock.
pub struct ReentrantReplayStore {
    inner: ReplayStore,
    depth: Mutex<usize>,
}

impl ReentrantReplayStore {
    /// Wraps `inner`, starting at depth zero.
    pub fn new(inner: ReplayStore) -> Self {
        Self {
            inner,
            depth: Mutex::new(0),
        }
    }

    /// Sets up the delegate if no other caller currently holds it open.
    pub async fn setup(&self) -> Result<(), ReplayError> {
        let mut depth = self.depth.lock().await;
        if *depth == 0 {
            self.inner.setup().await?;
        }
        *depth += 1;
        Ok(())
    }

    /// Tears down the delegate once every caller has released it.
    pub async fn teardown(&self) -> Result<(), ReplayError> {
        let mut depth = self.depth.lock().await;
        *depth = depth.saturating_sub(1);
        if *depth == 0 {
            self.inner.teardown().await?;
        }
        Ok(())
    }

    /// Delegates directly; not serialized against setup/teardown.
    pub async fn mark_code_used(&self, code: &[u8; 64]) -> Result<MarkOutcome, ReplayError> {
        self.inner.mark_code_used(code).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn nested_setup_only_tears_down_at_depth_zero() {
        let store = ReentrantReplayStore::new(ReplayStore::None);
        store.setup().await.unwrap();
        store.setup().await.unwrap();
        assert_eq!(*store.depth.lock().await, 2);
        store.teardown().await.unwrap();
        assert_eq!(*store.depth.lock().await, 1);
        store.teardown().await.unwrap();
        assert_eq!(*store.depth.lock().await, 0);
    }

    #[tokio::test]
    async fn mark_code_used_delegates() {
        let store = ReentrantReplayStore::new(ReplayStore::None);
        assert_eq!(store.mark_code_used(&[1u8; 64]).await.unwrap(), MarkOutcome::Ok);
    }
}
