use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

/// One async mutex per store, so mutations of the same attachment run one at
/// a time while different stores proceed in parallel.
#[derive(Default)]
pub struct StoreLocks {
    locks: Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>,
}

impl StoreLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `store_id`. Released when the guard drops.
    pub async fn lock(&self, store_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            // Entries nobody holds or waits on only cost memory.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(store_id).or_default().clone()
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
