use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

// ============================================================================
// Unit Constants
// ============================================================================

pub const HOURS_PER_YEAR: f64 = 8760.0;
pub const DAYS_PER_YEAR: f64 = 365.0;
pub const MONTHS_PER_YEAR: f64 = 12.0;

// ============================================================================
// Market Structure
// ============================================================================

/// Wholesale market structure a utility operates in.
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MarketType {
    #[default]
    Regulated,
    Pjm,
    Ercot,
    Miso,
    Caiso,
    Spp,
    Nyiso,
    Tva,
}

/// Default cost-allocation parameters for a market structure
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketPreset {
    pub market_type: MarketType,
    pub has_capacity_market: bool,
    pub base_residential_allocation: f64,
    pub capacity_cost_pass_through: f64,
    pub utility_owns_generation: bool,
    /// Clearing price of the 2024 capacity auction ($/MW-day)
    pub capacity_price_2024: Option<f64>,
}

impl MarketType {
    pub fn preset(self) -> MarketPreset {
        let (has_capacity_market, base, pass_through, owns_generation, price) = match self {
            Self::Regulated => (false, 0.40, 0.40, true, None),
            Self::Pjm => (true, 0.35, 0.50, false, Some(269.92)),
            Self::Ercot => (false, 0.30, 0.25, false, None),
            Self::Miso => (true, 0.38, 0.35, true, Some(30.0)),
            // Resource adequacy is procured bilaterally, no centralized auction
            Self::Caiso => (false, 0.35, 0.40, false, None),
            Self::Spp => (false, 0.40, 0.40, true, None),
            Self::Nyiso => (true, 0.35, 0.45, false, Some(120.0)),
            Self::Tva => (false, 0.40, 0.40, true, None),
        };

        MarketPreset {
            market_type: self,
            has_capacity_market,
            base_residential_allocation: base,
            capacity_cost_pass_through: pass_through,
            utility_owns_generation: owns_generation,
            capacity_price_2024: price,
        }
    }

    pub fn is_energy_only(self) -> bool {
        matches!(self, Self::Ercot)
    }
}

/// How directly a market's tariff design recovers utility costs from a large load.
///
/// Selects the revenue flow-through rates and whether the cost-causation
/// adjustment applies to residential allocation.
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RecoveryClass {
    /// Vertically integrated, cost-of-service ratemaking
    Regulated,
    /// ERCOT-style energy-only market with 4CP transmission allocation
    EnergyOnly,
    /// Organized capacity market (PJM, MISO, NYISO)
    CapacityMarket,
}

impl RecoveryClass {
    pub fn applies_cost_causation(self) -> bool {
        matches!(self, Self::Regulated | Self::EnergyOnly)
    }
}

// ============================================================================
// Scenarios
// ============================================================================

/// Operating strategy of the projected data center
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Scenario {
    /// No data center
    Baseline,
    /// Firm load at constant draw
    Unoptimized,
    /// Curtails during system peaks
    Flexible,
    /// Flexible load plus onsite generation
    Dispatchable,
}
