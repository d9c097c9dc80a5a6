//! Static reference data

pub mod utilities;

pub use utilities::{
    find_utility, market_adjusted_allocation, utilities_by_market, utilities_by_region,
    utility_by_id, utility_options, utility_profiles, UtilityProfile,
};
