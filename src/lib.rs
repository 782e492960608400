//! Roster Cost Engine for multi-project staffing
//!
//! This crate turns daily shift rosters into attendance counts, salary and
//! payroll deductions, rolls them up into per-project labor cost, and
//! redistributes that cost between projects through percentage-based sharing
//! agreements. A thin axum API exposes the operations as JSON endpoints.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod store;
