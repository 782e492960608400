//! HTTP API module for the Roster Cost Engine.
//!
//! This module provides JSON endpoints for attendance, project cost, cost
//! sharing, portfolio and overview reports, and roster entry writes.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{BatchEntryRequest, EntryRequest, PeriodQuery, ReciprocalQuery};
pub use response::{ApiError, ProjectCostResponse, ReciprocalResponse};
pub use state::AppState;
