//! Large-load tariff revenue

pub mod engine;

pub use engine::{demand_and_energy_revenue, RevenueBreakdown, TariffRevenue};
