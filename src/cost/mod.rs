//! Cost allocation, residential bill impact and revenue adequacy

pub mod adequacy;
pub mod allocation;
pub mod impact;

pub use adequacy::{data_center_adequacy, revenue_adequacy, RevenueAdequacy};
pub use allocation::{residential_allocation, AllocationBreakdown};
pub use impact::{
    net_residential_impact, CostBreakdown, ImpactInputs, ImpactMetrics, ResidentialImpact,
};
