//! Residential rate impact of large data center loads.
//!
//! Pure numeric models (capacity pricing, tariff revenue, cost allocation and
//! multi-year bill trajectories) plus a thin JSON API over them.

pub mod api;
pub mod config;
pub mod cost;
pub mod data;
pub mod domain;
pub mod market;
pub mod tariff;
pub mod telemetry;
pub mod trajectory;

pub use domain::{EngineError, EngineResult};
