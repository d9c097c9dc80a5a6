use serde::{Deserialize, Serialize};

use super::allocation::{residential_allocation, AllocationBreakdown};
use crate::domain::{
    effective_peak_mw, grid_peak_coincidence, CalibrationParams, MarketType, RecoveryClass,
    TariffStructure, Utility, DAYS_PER_YEAR, MONTHS_PER_YEAR,
};
use crate::market::{dynamic_capacity_price, CapacityPriceImpact};
use crate::tariff::{demand_and_energy_revenue, TariffRevenue};

/// Operating point of a data center for one projected year
#[derive(Debug, Clone, Copy)]
pub struct ImpactInputs<'a> {
    pub utility: &'a Utility,
    pub tariff: &'a TariffStructure,
    /// Online capacity
    pub capacity_mw: f64,
    pub load_factor: f64,
    /// Coincidence with the system peak before onsite generation
    pub peak_coincidence: f64,
    pub onsite_generation_mw: f64,
    pub years_online: f64,
    /// Credit curtailable load and onsite generation against capacity cost
    pub include_capacity_credit: bool,
    /// Charge residential customers for the capacity price increase
    pub include_spillover: bool,
}

impl<'a> ImpactInputs<'a> {
    pub fn new(utility: &'a Utility, tariff: &'a TariffStructure, capacity_mw: f64) -> Self {
        Self {
            utility,
            tariff,
            capacity_mw,
            load_factor: 1.0,
            peak_coincidence: 1.0,
            onsite_generation_mw: 0.0,
            years_online: 0.0,
            include_capacity_credit: false,
            include_spillover: true,
        }
    }

    pub fn operating(mut self, load_factor: f64, peak_coincidence: f64) -> Self {
        self.load_factor = load_factor;
        self.peak_coincidence = peak_coincidence;
        self
    }

    pub fn onsite_generation(mut self, mw: f64) -> Self {
        self.onsite_generation_mw = mw;
        self
    }

    pub fn years_online(mut self, years: f64) -> Self {
        self.years_online = years;
        self
    }

    pub fn capacity_credit(mut self, enabled: bool) -> Self {
        self.include_capacity_credit = enabled;
        self
    }

    pub fn spillover(mut self, enabled: bool) -> Self {
        self.include_spillover = enabled;
        self
    }

    fn effective_peak_mw(&self) -> f64 {
        effective_peak_mw(self.capacity_mw, self.peak_coincidence, self.onsite_generation_mw)
    }

    fn grid_peak_coincidence(&self) -> f64 {
        grid_peak_coincidence(self.capacity_mw, self.peak_coincidence, self.onsite_generation_mw)
    }

    fn is_flexible(&self) -> bool {
        self.peak_coincidence < 1.0
    }
}

/// Annualized system costs caused by the load ($/year)
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub transmission: f64,
    pub distribution: f64,
    /// Capacity cost per MW-year of effective peak
    pub capacity_cost_per_mw_year: f64,
    pub capacity: f64,
    pub capacity_credit: f64,
    pub gross: f64,
}

/// Diagnostics behind a residential impact figure
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactMetrics {
    pub effective_peak_mw: f64,
    pub allocation: AllocationBreakdown,
    /// Allocation after cost causation and load-factor adjustments
    pub adjusted_allocation: f64,
    /// Share of gross cost recovered through tariff revenue
    pub cost_recovery_ratio: f64,
    pub costs: CostBreakdown,
    pub tariff_revenue: TariffRevenue,
    pub energy_margin: f64,
    pub revenue_offset: f64,
    pub net_impact: f64,
    pub capacity: CapacityPriceImpact,
    /// Capacity price increase charged to residential customers ($/year)
    pub socialized_cost_annual: f64,
}

/// Effect of a data center on the average residential bill
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidentialImpact {
    /// $/customer-month, after the bill decrease floor
    pub per_customer_monthly: f64,
    /// $/customer-month before the floor, for callers that rescale it first
    pub uncapped_monthly: f64,
    pub spillover_monthly: f64,
    /// $/year across the residential class
    pub annual_residential_impact: f64,
    pub metrics: ImpactMetrics,
}

fn annualized_costs(inputs: &ImpactInputs<'_>, params: &CalibrationParams) -> CostBreakdown {
    let utility = inputs.utility;
    let effective_peak = inputs.effective_peak_mw();
    let recovery_years = params.cost_recovery_years;
    let ratepayer_share = 1.0 - utility.interconnection.ciac_recovery_fraction;
    let embedded_transmission =
        effective_peak * params.transmission_cost_per_mw * ratepayer_share / recovery_years;

    let transmission = if utility.market_type == MarketType::Ercot {
        // 4CP charges on the load's contribution to the four summer peaks
        let four_cp =
            effective_peak * 1_000.0 * params.ercot_4cp_rate_per_kw_month * MONTHS_PER_YEAR;
        four_cp + embedded_transmission * params.ercot_base_transmission_share
    } else {
        embedded_transmission
    };
    let distribution = effective_peak * params.distribution_cost_per_mw / recovery_years;

    let embedded_capacity = params.capacity_cost_per_mw_year;
    let capacity_cost_per_mw_year = match utility.recovery_class() {
        RecoveryClass::Regulated => embedded_capacity,
        RecoveryClass::EnergyOnly => embedded_capacity * params.ercot_capacity_cost_share,
        RecoveryClass::CapacityMarket => match utility.capacity_price_2024 {
            Some(price) => {
                let auction = price * DAYS_PER_YEAR * utility.capacity_cost_pass_through;
                embedded_capacity * params.capacity_market_embedded_share
                    + auction * (1.0 - params.capacity_market_embedded_share)
            }
            None => embedded_capacity,
        },
    };
    let capacity = effective_peak * capacity_cost_per_mw_year;

    let capacity_credit = if inputs.include_capacity_credit && inputs.is_flexible() {
        let curtailable_mw = inputs.capacity_mw * (1.0 - inputs.peak_coincidence);
        let response_credit = if utility.has_capacity_market {
            params.demand_response_credit_capacity_market
        } else {
            params.demand_response_credit_other
        };
        curtailable_mw * capacity_cost_per_mw_year * response_credit
            + inputs.onsite_generation_mw * capacity_cost_per_mw_year * params.generation_credit
    } else {
        0.0
    };

    CostBreakdown {
        transmission,
        distribution,
        capacity_cost_per_mw_year,
        capacity,
        capacity_credit,
        gross: transmission + distribution + capacity - capacity_credit,
    }
}

/// Shrink the allocation by the share of cost the load's own revenue covers.
fn cost_causation_allocation(
    allocation: f64,
    gross_cost: f64,
    revenue_offset: f64,
    load_factor: f64,
    params: &CalibrationParams,
) -> (f64, f64) {
    let recovery_ratio = if gross_cost <= 0.0 {
        1.0
    } else {
        (revenue_offset / gross_cost).clamp(0.0, 1.0)
    };
    let mut adjusted = allocation * (1.0 - recovery_ratio).sqrt();

    let threshold = params.high_load_factor_threshold;
    if load_factor >= threshold && threshold < 1.0 {
        let reduction = ((load_factor - threshold) / (1.0 - threshold)
            * params.high_load_factor_max_reduction)
            .min(params.high_load_factor_max_reduction);
        adjusted *= 1.0 - reduction;
    }

    (adjusted.max(params.cost_causation_floor), recovery_ratio)
}

/// Net effect of a data center on residential bills for one year of operation.
pub fn net_residential_impact(
    inputs: &ImpactInputs<'_>,
    params: &CalibrationParams,
) -> ResidentialImpact {
    let utility = inputs.utility;
    let effective_peak_mw = inputs.effective_peak_mw();

    let allocation = residential_allocation(
        utility,
        inputs.capacity_mw,
        inputs.load_factor,
        inputs.grid_peak_coincidence(),
        inputs.years_online,
        params,
    );

    let costs = annualized_costs(inputs, params);

    let tariff_revenue = demand_and_energy_revenue(
        inputs.capacity_mw,
        inputs.load_factor,
        inputs.grid_peak_coincidence(),
        inputs.tariff,
    );
    let energy_margin = tariff_revenue.breakdown.annual_mwh
        * (inputs.tariff.energy_charge - utility.wholesale_energy_cost_per_mwh).max(0.0);
    let (demand_flow, energy_flow) = params.flow_through.for_class(utility.recovery_class());
    let revenue_offset =
        tariff_revenue.demand_revenue() * demand_flow + energy_margin * energy_flow;

    let net_impact = costs.gross - revenue_offset;

    let (adjusted_allocation, cost_recovery_ratio) =
        if utility.recovery_class().applies_cost_causation() {
            cost_causation_allocation(
                allocation.allocation,
                costs.gross,
                revenue_offset,
                inputs.load_factor,
                params,
            )
        } else {
            let ratio = if costs.gross > 0.0 {
                (revenue_offset / costs.gross).clamp(0.0, 1.0)
            } else {
                1.0
            };
            (allocation.allocation, ratio)
        };

    let capacity = dynamic_capacity_price(utility, effective_peak_mw, params);
    let socialized_cost_annual = if inputs.include_spillover && utility.has_capacity_market {
        capacity.socialized_cost_impact.max(0.0)
    } else {
        0.0
    };

    let residential_customers = utility.residential_customers.max(1) as f64;
    let per_customer_month = |annual: f64| annual / residential_customers / MONTHS_PER_YEAR;

    let spillover_monthly = per_customer_month(socialized_cost_annual);
    let uncapped_monthly = per_customer_month(net_impact * adjusted_allocation) + spillover_monthly;
    let decrease_floor = -params.max_bill_decrease_fraction * utility.avg_monthly_bill;
    let per_customer_monthly = uncapped_monthly.max(decrease_floor);

    ResidentialImpact {
        per_customer_monthly,
        uncapped_monthly,
        spillover_monthly,
        annual_residential_impact: per_customer_monthly * residential_customers * MONTHS_PER_YEAR,
        metrics: ImpactMetrics {
            effective_peak_mw,
            allocation,
            adjusted_allocation,
            cost_recovery_ratio,
            costs,
            tariff_revenue,
            energy_margin,
            revenue_offset,
            net_impact,
            capacity,
            socialized_cost_annual,
        },
    }
}
