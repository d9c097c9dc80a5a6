use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

use super::{RecoveryClass, Scenario};
use crate::market::SupplyCurve;

/// Calibration inputs of the rate impact models.
///
/// None of these are physical constants. They encode allocation weights,
/// flow-through rates and cost assumptions, and are exposed through the
/// `[calibration]` configuration section so they can be tuned per study.
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_weights"))]
pub struct CalibrationParams {
    // Residential allocation blend
    #[validate(range(min = 0.0, max = 1.0))]
    pub volumetric_weight: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub demand_weight: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub customer_weight: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub allocation_floor: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub allocation_ceiling: f64,
    /// Years for the data center's energy and peak to fully enter the allocators
    #[validate(range(min = 0.0))]
    pub allocation_phase_in_years: f64,
    /// Years between cost incurrence and a rate case reflecting it
    #[validate(range(min = 0.0))]
    pub regulatory_lag_years: f64,

    /// Share of system peak treated as existing residential load exposed to
    /// capacity price spillover
    #[validate(range(min = 0.0, max = 1.0))]
    pub spillover_residential_peak_share: f64,
    /// Reserve margin assumed when a utility reports none
    #[validate(range(min = 0.0, max = 1.0))]
    pub default_reserve_margin: f64,
    /// Replaces the market preset curve for every capacity price lookup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supply_curve: Option<SupplyCurve>,

    // Infrastructure costs ($)
    #[validate(range(min = 0.0))]
    pub transmission_cost_per_mw: f64,
    #[validate(range(min = 0.0))]
    pub distribution_cost_per_mw: f64,
    #[validate(range(min = 0.0))]
    pub capacity_cost_per_mw_year: f64,
    #[validate(range(min = 1.0))]
    pub cost_recovery_years: f64,
    /// ERCOT 4CP transmission rate ($/kW-month)
    #[validate(range(min = 0.0))]
    pub ercot_4cp_rate_per_kw_month: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub ercot_base_transmission_share: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub ercot_capacity_cost_share: f64,
    /// Weight of embedded capacity cost vs. auction price in capacity markets
    #[validate(range(min = 0.0, max = 1.0))]
    pub capacity_market_embedded_share: f64,

    // Capacity credits for flexible operation
    #[validate(range(min = 0.0, max = 1.0))]
    pub demand_response_credit_capacity_market: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub demand_response_credit_other: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub generation_credit: f64,

    #[validate(nested)]
    pub flow_through: FlowThroughRates,

    // Cost causation
    #[validate(range(min = 0.0, max = 1.0))]
    pub cost_causation_floor: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub high_load_factor_threshold: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub high_load_factor_max_reduction: f64,
    /// Largest bill decrease passed to a customer, as a fraction of the bill
    #[validate(range(min = 0.0, max = 1.0))]
    pub max_bill_decrease_fraction: f64,

    // Revenue adequacy
    #[validate(range(min = 0.0))]
    pub customer_charge_per_month: f64,
    #[validate(range(min = 1.0))]
    pub energy_pass_through_tolerance: f64,
    #[validate(range(min = 1.0))]
    pub network_upgrade_recovery_years: f64,

    #[validate(nested)]
    pub negative_escalation: NegativeEscalation,
}

impl Default for CalibrationParams {
    fn default() -> Self {
        Self {
            volumetric_weight: 0.40,
            demand_weight: 0.40,
            customer_weight: 0.20,
            allocation_floor: 0.15,
            allocation_ceiling: 0.50,
            allocation_phase_in_years: 3.0,
            regulatory_lag_years: 5.0,
            spillover_residential_peak_share: 0.35,
            default_reserve_margin: 0.15,
            supply_curve: None,
            transmission_cost_per_mw: 350_000.0,
            distribution_cost_per_mw: 150_000.0,
            capacity_cost_per_mw_year: 150_000.0,
            cost_recovery_years: 20.0,
            ercot_4cp_rate_per_kw_month: 5.50,
            ercot_base_transmission_share: 0.30,
            ercot_capacity_cost_share: 0.50,
            capacity_market_embedded_share: 0.50,
            demand_response_credit_capacity_market: 0.90,
            demand_response_credit_other: 0.80,
            generation_credit: 0.95,
            flow_through: FlowThroughRates::default(),
            cost_causation_floor: 0.05,
            high_load_factor_threshold: 0.80,
            high_load_factor_max_reduction: 0.10,
            max_bill_decrease_fraction: 0.15,
            customer_charge_per_month: 500.0,
            energy_pass_through_tolerance: 1.5,
            network_upgrade_recovery_years: 20.0,
            negative_escalation: NegativeEscalation::default(),
        }
    }
}

fn validate_weights(params: &CalibrationParams) -> Result<(), ValidationError> {
    let sum = params.volumetric_weight + params.demand_weight + params.customer_weight;
    if (sum - 1.0).abs() > 1e-6 {
        let mut err = ValidationError::new("allocation_weights");
        err.message = Some(Cow::from(format!("allocation weights must sum to 1.0, got {sum:.4}")));
        return Err(err);
    }
    if params.allocation_floor > params.allocation_ceiling {
        let mut err = ValidationError::new("allocation_bounds");
        err.message = Some(Cow::from("allocation_floor exceeds allocation_ceiling"));
        return Err(err);
    }
    if let Some(Err(e)) = params.supply_curve.as_ref().map(SupplyCurve::check) {
        let mut err = ValidationError::new("supply_curve");
        err.message = Some(Cow::from(e.to_string()));
        return Err(err);
    }
    Ok(())
}

/// Share of data center revenue credited back against the costs it causes
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct FlowThroughRates {
    #[validate(range(min = 0.0, max = 1.0))]
    pub demand_regulated: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub demand_energy_only: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub demand_capacity_market: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub energy_regulated: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub energy_energy_only: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub energy_capacity_market: f64,
}

impl Default for FlowThroughRates {
    fn default() -> Self {
        Self {
            demand_regulated: 0.90,
            demand_energy_only: 0.70,
            demand_capacity_market: 0.60,
            energy_regulated: 0.85,
            energy_energy_only: 0.65,
            energy_capacity_market: 0.50,
        }
    }
}

impl FlowThroughRates {
    /// Returns `(demand_rate, energy_rate)` for a recovery class
    pub fn for_class(&self, class: RecoveryClass) -> (f64, f64) {
        match class {
            RecoveryClass::Regulated => (self.demand_regulated, self.energy_regulated),
            RecoveryClass::EnergyOnly => (self.demand_energy_only, self.energy_energy_only),
            RecoveryClass::CapacityMarket => {
                (self.demand_capacity_market, self.energy_capacity_market)
            }
        }
    }
}

/// Fraction of general inflation applied when compounding a bill decrease.
///
/// Cost growth outruns savings growth, so negative impacts compound slower.
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct NegativeEscalation {
    #[validate(range(min = 0.0, max = 1.0))]
    pub unoptimized: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub flexible: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub dispatchable: f64,
}

impl Default for NegativeEscalation {
    fn default() -> Self {
        Self {
            unoptimized: 0.80,
            flexible: 0.90,
            dispatchable: 0.95,
        }
    }
}

impl NegativeEscalation {
    pub fn for_scenario(&self, scenario: Scenario) -> f64 {
        match scenario {
            Scenario::Baseline => 1.0,
            Scenario::Unoptimized => self.unoptimized,
            Scenario::Flexible => self.flexible,
            Scenario::Dispatchable => self.dispatchable,
        }
    }
}
