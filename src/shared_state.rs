use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::meter_session::Reading;
use crate::polling_loop::ReadingSink;
use crate::smoother::{SmoothedState, Smoother};

/// The latest smoothed reading, shared between the polling task and any number of
/// readers.
///
/// Every publish and snapshot holds the same lock for the duration of a copy or a
/// few float operations, so a snapshot never mixes fields from two publishes.
#[derive(Debug, Default)]
pub struct SharedStateStore {
    smoother: Mutex<Smoother>,
}

impl SharedStateStore {
    pub fn new() -> Self {
        Self {
            smoother: Mutex::new(Smoother::new()),
        }
    }

    /// Applies a reading and returns the state it produced.
    pub fn publish(&self, reading: Reading) -> SmoothedState {
        self.lock().update(&reading)
    }

    /// A point-in-time copy of the published state.
    pub fn snapshot(&self) -> SmoothedState {
        self.lock().state()
    }

    fn lock(&self) -> MutexGuard<'_, Smoother> {
        // The smoother is plain data and never left half-written, so a poisoned lock
        // still holds a usable state
        self.smoother.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ReadingSink for Arc<SharedStateStore> {
    fn on_reading(&self, reading: Reading) {
        SharedStateStore::publish(self, reading);
    }
}
