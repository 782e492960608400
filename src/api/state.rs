//! Application state for the Roster Cost Engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::engine::CostEngine;

/// Shared application state.
///
/// Holds the engine, which in turn owns the store and the attendance cache.
#[derive(Clone)]
pub struct AppState {
    engine: Arc<CostEngine>,
}

impl AppState {
    /// Creates a new application state around an engine.
    pub fn new(engine: CostEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }

    /// Creates a state sharing an engine that is also used elsewhere.
    pub fn from_shared(engine: Arc<CostEngine>) -> Self {
        Self { engine }
    }

    /// Returns a reference to the engine.
    pub fn engine(&self) -> &CostEngine {
        &self.engine
    }

    /// Returns a clone of the shared engine handle.
    pub fn shared_engine(&self) -> Arc<CostEngine> {
        Arc::clone(&self.engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone() {
        fn assert_clone<T: Clone + Send + Sync + 'static>() {}
        assert_clone::<AppState>();
    }
}
