use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

use super::{EngineResult, MarketType, RecoveryClass};

/// How interconnection costs for a new large load are split.
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct InterconnectionCosts {
    /// Fraction of transmission interconnection cost paid upfront by the
    /// new customer (contribution in aid of construction)
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default)]
    pub ciac_recovery_fraction: f64,
    /// Socialized network upgrade cost ($/MW of peak)
    #[validate(range(min = 0.0))]
    #[serde(default = "default_network_upgrade_cost")]
    pub network_upgrade_cost_per_mw: f64,
}

fn default_network_upgrade_cost() -> f64 {
    140_000.0
}

impl Default for InterconnectionCosts {
    fn default() -> Self {
        Self {
            ciac_recovery_fraction: 0.0,
            network_upgrade_cost_per_mw: default_network_upgrade_cost(),
        }
    }
}

/// Static profile of a utility's system and customer base.
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_utility"))]
pub struct Utility {
    pub residential_customers: u64,
    #[serde(default)]
    pub commercial_customers: u64,
    #[serde(default)]
    pub industrial_customers: u64,
    /// Average residential bill ($/month)
    pub avg_monthly_bill: f64,
    pub system_peak_mw: f64,
    pub pre_dc_system_energy_gwh: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub residential_energy_share: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default = "default_residential_peak_share")]
    pub residential_peak_share: f64,
    /// Overrides the share derived from customer counts
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default)]
    pub residential_customer_share: Option<f64>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub base_residential_allocation: f64,
    #[serde(default)]
    pub market_type: MarketType,
    #[serde(default)]
    pub has_capacity_market: bool,
    /// $/MW-day
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub capacity_price_2024: Option<f64>,
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default = "default_pass_through")]
    pub capacity_cost_pass_through: f64,
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub total_generation_capacity_mw: Option<f64>,
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default)]
    pub current_reserve_margin: Option<f64>,
    #[validate(nested)]
    #[serde(default)]
    pub interconnection: InterconnectionCosts,
    /// Wholesale marginal energy cost ($/MWh)
    #[validate(range(min = 0.0))]
    #[serde(default = "default_wholesale_energy_cost")]
    pub wholesale_energy_cost_per_mwh: f64,
}

fn default_residential_peak_share() -> f64 {
    0.45
}

fn default_pass_through() -> f64 {
    0.40
}

fn default_wholesale_energy_cost() -> f64 {
    38.0
}

fn validate_utility(utility: &Utility) -> Result<(), ValidationError> {
    if utility.total_customers() == 0 {
        return Err(invalid("customer_count", "utility must have at least one customer"));
    }
    if utility.avg_monthly_bill <= 0.0 {
        return Err(invalid("avg_monthly_bill", "avg_monthly_bill must be positive"));
    }
    if utility.system_peak_mw <= 0.0 {
        return Err(invalid("system_peak_mw", "system_peak_mw must be positive"));
    }
    if utility.pre_dc_system_energy_gwh <= 0.0 {
        return Err(invalid(
            "pre_dc_system_energy_gwh",
            "pre_dc_system_energy_gwh must be positive",
        ));
    }
    Ok(())
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::from(message));
    err
}

impl Default for Utility {
    /// Mid-sized regulated utility used throughout the calculator
    fn default() -> Self {
        Self {
            residential_customers: 560_000,
            commercial_customers: 85_000,
            industrial_customers: 5_000,
            avg_monthly_bill: 130.0,
            system_peak_mw: 4_000.0,
            pre_dc_system_energy_gwh: 20_000.0,
            residential_energy_share: 0.35,
            residential_peak_share: default_residential_peak_share(),
            residential_customer_share: None,
            base_residential_allocation: 0.40,
            market_type: MarketType::Regulated,
            has_capacity_market: false,
            capacity_price_2024: None,
            capacity_cost_pass_through: default_pass_through(),
            total_generation_capacity_mw: None,
            current_reserve_margin: None,
            interconnection: InterconnectionCosts::default(),
            wholesale_energy_cost_per_mwh: default_wholesale_energy_cost(),
        }
    }
}

impl Utility {
    /// Build a utility carrying the allocation defaults of its market
    pub fn from_market(
        market_type: MarketType,
        residential_customers: u64,
        total_customers: u64,
        avg_monthly_bill: f64,
        system_peak_mw: f64,
    ) -> Self {
        let preset = market_type.preset();
        let non_residential = total_customers.saturating_sub(residential_customers);
        // Pre-DC energy scales with peak at the default utility's ~57% system load factor
        let pre_dc_system_energy_gwh = system_peak_mw * 5.0;

        Self {
            residential_customers,
            commercial_customers: non_residential * 17 / 18,
            industrial_customers: non_residential - non_residential * 17 / 18,
            avg_monthly_bill,
            system_peak_mw,
            pre_dc_system_energy_gwh,
            base_residential_allocation: preset.base_residential_allocation,
            market_type,
            has_capacity_market: preset.has_capacity_market,
            capacity_price_2024: preset.capacity_price_2024,
            capacity_cost_pass_through: preset.capacity_cost_pass_through,
            ..Self::default()
        }
    }

    pub fn total_customers(&self) -> u64 {
        self.residential_customers + self.commercial_customers + self.industrial_customers
    }

    /// Residential fraction of all customers (0 for a customerless utility)
    pub fn residential_customer_share(&self) -> f64 {
        if let Some(share) = self.residential_customer_share {
            return share;
        }
        match self.total_customers() {
            0 => 0.0,
            total => self.residential_customers as f64 / total as f64,
        }
    }

    pub fn reserve_margin_or(&self, default_margin: f64) -> f64 {
        self.current_reserve_margin.unwrap_or(default_margin)
    }

    /// Installed generation, inferred from peak and reserve margin when not reported
    pub fn total_capacity_mw(&self, default_margin: f64) -> f64 {
        self.total_generation_capacity_mw
            .unwrap_or_else(|| self.system_peak_mw * (1.0 + self.reserve_margin_or(default_margin)))
    }

    /// Clearing price when the utility buys capacity through an auction
    pub fn market_capacity_price(&self) -> Option<f64> {
        if self.has_capacity_market {
            self.capacity_price_2024
        } else {
            None
        }
    }

    pub fn recovery_class(&self) -> RecoveryClass {
        if self.market_type.is_energy_only() {
            RecoveryClass::EnergyOnly
        } else if self.has_capacity_market {
            RecoveryClass::CapacityMarket
        } else {
            RecoveryClass::Regulated
        }
    }

    /// Reject malformed profiles before they enter the engine
    pub fn check(&self) -> EngineResult<()> {
        self.validate()?;
        Ok(())
    }
}
