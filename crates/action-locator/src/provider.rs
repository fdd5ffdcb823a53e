//! Snapshot provider port
//!
//! The enumeration of interactive elements is owned elsewhere; the locator
//! only asks for a fresh snapshot when a resolution comes back
//! `NeedsReanalysis` or an element detaches mid-action.

use std::sync::Arc;

use action_primitives::MemoryDocument;
use async_trait::async_trait;
use steadyhand_core_types::DocumentSnapshot;
use tracing::debug;

use crate::errors::LocatorError;

#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    /// Enumerate the document as it is right now
    async fn snapshot(&self) -> Result<DocumentSnapshot, LocatorError>;
}

#[async_trait]
impl SnapshotProvider for MemoryDocument {
    async fn snapshot(&self) -> Result<DocumentSnapshot, LocatorError> {
        let snapshot =
            MemoryDocument::snapshot(self).map_err(|e| LocatorError::Snapshot(e.to_string()))?;
        debug!(snapshot = %snapshot.id, elements = snapshot.len(), "Captured snapshot");
        Ok(snapshot)
    }
}

#[async_trait]
impl<T: SnapshotProvider + ?Sized> SnapshotProvider for Arc<T> {
    async fn snapshot(&self) -> Result<DocumentSnapshot, LocatorError> {
        (**self).snapshot().await
    }
}
