//! Change notification over a [`StateStore`].

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

use sniper_protocols::CaptureState;

use crate::error::StoreError;
use crate::store::StateStore;

/// A store that publishes every successful write to subscribers.
///
/// Subscribers observe the record but never write it.
pub struct WatchedStore {
    inner: Arc<dyn StateStore>,
    tx: watch::Sender<Option<CaptureState>>,
}

impl WatchedStore {
    /// Wrap `inner`, seeding subscribers with its current record.
    pub async fn open(inner: Arc<dyn StateStore>) -> Result<Self, StoreError> {
        let current = inner.load().await?;
        let (tx, _rx) = watch::channel(current);
        Ok(Self { inner, tx })
    }

    /// Subscribe to record changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<CaptureState>> {
        self.tx.subscribe()
    }

    /// Last record written through this store.
    pub fn current(&self) -> Option<CaptureState> {
        self.tx.borrow().clone()
    }
}

#[async_trait]
impl StateStore for WatchedStore {
    async fn load(&self) -> Result<Option<CaptureState>, StoreError> {
        self.inner.load().await
    }

    async fn save(&self, state: &CaptureState) -> Result<(), StoreError> {
        self.inner.save(state).await?;
        self.tx.send_replace(Some(state.clone()));
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.inner.clear().await?;
        self.tx.send_replace(None);
        Ok(())
    }
}
