//! Configuration loading and management for the Roster Cost Engine.
//!
//! This module loads the engine configuration (deduction policy, sharing
//! policy, worker pool size, cache switch) from a YAML file.
//!
//! # Example
//!
//! ```no_run
//! use roster_cost_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/engine.yaml").unwrap().into_config();
//! println!("Over-allocation policy: {:?}", config.sharing.over_allocation);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AbsenceRate, CacheConfig, DeductionPolicy, EngineConfig, OverAllocationPolicy,
    PortfolioConfig, SharingConfig,
};
