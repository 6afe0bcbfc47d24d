//! Application state for the addition engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::{Arc, Mutex};

use crate::billing::InMemoryBillingStore;
use crate::config::ConfigLoader;

/// Shared application state.
///
/// Holds the loaded rule catalog/billing configuration and the billing
/// store. The store sits behind a mutex: monthly generation is a
/// non-atomic delete-then-insert, so all writers for a store must be
/// serialized, which the lock provides within this process.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ConfigLoader>,
    store: Arc<Mutex<InMemoryBillingStore>>,
}

impl AppState {
    /// Creates a new application state with the given configuration and
    /// an empty billing store.
    pub fn new(config: ConfigLoader) -> Self {
        Self {
            config: Arc::new(config),
            store: Arc::new(Mutex::new(InMemoryBillingStore::new())),
        }
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns the shared billing store.
    pub fn store(&self) -> &Arc<Mutex<InMemoryBillingStore>> {
        &self.store
    }
}
