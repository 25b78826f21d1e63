//! Network status cell shared between the engine and the presentation layer.
use std::sync::{PoisonError, RwLock};

use quote_common::NetworkStatus;

/// Last-write-wins holder of the current [`NetworkStatus`].
///
/// The engine is the only writer; readers may poll from any thread.
pub trait StatusCell: Send + Sync {
    /// Current status.
    fn get(&self) -> NetworkStatus;

    /// Replace the current status.
    fn set(&self, status: NetworkStatus);
}

/// In-memory status cell.
#[derive(Debug, Default)]
pub struct MemoryStatus {
    status: RwLock<NetworkStatus>,
}

impl MemoryStatus {
    /// Create a cell holding `initial`.
    pub fn new(initial: NetworkStatus) -> Self {
        Self {
            status: RwLock::new(initial),
        }
    }
}

impl StatusCell for MemoryStatus {
    fn get(&self) -> NetworkStatus {
        *self.status.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn set(&self, status: NetworkStatus) {
        *self.status.write().unwrap_or_else(PoisonError::into_inner) = status;
    }
}
