//! Capacity market pricing

pub mod capacity;
pub mod supply_curve;

pub use capacity::{dynamic_capacity_price, dynamic_capacity_price_on, CapacityPriceImpact};
pub use supply_curve::{CurvePoint, SupplyCurve, TARGET_RESERVE_MARGIN};
