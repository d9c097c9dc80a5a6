use serde::{Deserialize, Serialize};

use crate::domain::{
    effective_peak_mw, grid_peak_coincidence, CalibrationParams, DataCenter, RecoveryClass,
    TariffStructure, Utility, DAYS_PER_YEAR, MONTHS_PER_YEAR,
};
use crate::tariff::demand_and_energy_revenue;

/// Whether a large load pays for the costs it imposes on the system
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevenueAdequacy {
    pub effective_peak_mw: f64,
    pub grid_peak_coincidence: f64,
    pub demand_revenue: f64,
    pub energy_revenue: f64,
    pub customer_charge_revenue: f64,
    pub total_revenue: f64,
    pub capacity_cost: f64,
    pub energy_cost: f64,
    /// The tariff energy charge tracks wholesale closely enough to be a pass-through
    pub energy_pass_through: bool,
    pub network_upgrade_cost: f64,
    pub total_cost: f64,
    pub revenue_adequacy_ratio: f64,
    pub surplus_or_deficit: f64,
    pub surplus_or_deficit_per_mw: f64,
    pub contributes_surplus: bool,
}

/// Compare annual tariff revenue against the capacity, energy and network
/// costs of serving a load.
///
/// `tariff` and `utility` fall back to [`TariffStructure::default`] and
/// [`Utility::default`]. Onsite generation lowers the load's grid peak.
pub fn revenue_adequacy(
    capacity_mw: f64,
    load_factor: f64,
    peak_coincidence: f64,
    tariff: Option<&TariffStructure>,
    utility: Option<&Utility>,
    onsite_gen_mw: f64,
    params: &CalibrationParams,
) -> RevenueAdequacy {
    let default_tariff;
    let tariff_supplied = tariff.is_some();
    let tariff = match tariff {
        Some(tariff) => tariff,
        None => {
            default_tariff = TariffStructure::default();
            &default_tariff
        }
    };
    let default_utility;
    let utility = match utility {
        Some(utility) => utility,
        None => {
            default_utility = Utility::default();
            &default_utility
        }
    };

    let capacity_mw = capacity_mw.max(0.0);
    let onsite_gen_mw = onsite_gen_mw.max(0.0);
    let grid_peak_coincidence = grid_peak_coincidence(capacity_mw, peak_coincidence, onsite_gen_mw);
    let effective_peak_mw = effective_peak_mw(capacity_mw, peak_coincidence, onsite_gen_mw);

    let revenue =
        demand_and_energy_revenue(capacity_mw, load_factor, grid_peak_coincidence, tariff);
    let demand_revenue = revenue.demand_revenue();
    let customer_charge_revenue = params.customer_charge_per_month * MONTHS_PER_YEAR;
    let total_revenue = demand_revenue + revenue.energy_revenue + customer_charge_revenue;

    // Demand charges only recover embedded capacity where a regulated tariff sets them
    let nets_demand_revenue =
        tariff_supplied && utility.recovery_class() == RecoveryClass::Regulated;
    let capacity_cost = match utility.market_capacity_price() {
        Some(price) => effective_peak_mw * price * DAYS_PER_YEAR,
        None if nets_demand_revenue => {
            (effective_peak_mw * params.capacity_cost_per_mw_year - demand_revenue).max(0.0)
        }
        None => effective_peak_mw * params.capacity_cost_per_mw_year,
    };

    let wholesale = utility.wholesale_energy_cost_per_mwh;
    let tolerance = params.energy_pass_through_tolerance.max(1.0);
    let energy_pass_through = tariff.energy_charge >= wholesale / tolerance
        && tariff.energy_charge <= wholesale * tolerance;
    let energy_rate = if energy_pass_through {
        tariff.energy_charge
    } else {
        wholesale
    };
    let energy_cost = revenue.breakdown.annual_mwh * energy_rate;

    let network_upgrade_cost = effective_peak_mw
        * utility.interconnection.network_upgrade_cost_per_mw
        / params.network_upgrade_recovery_years;

    let total_cost = capacity_cost + energy_cost + network_upgrade_cost;
    let revenue_adequacy_ratio = if total_cost > 0.0 {
        total_revenue / total_cost
    } else {
        1.0
    };
    let surplus_or_deficit = total_revenue - total_cost;
    let surplus_or_deficit_per_mw = if capacity_mw > 0.0 {
        surplus_or_deficit / capacity_mw
    } else {
        0.0
    };

    RevenueAdequacy {
        effective_peak_mw,
        grid_peak_coincidence,
        demand_revenue,
        energy_revenue: revenue.energy_revenue,
        customer_charge_revenue,
        total_revenue,
        capacity_cost,
        energy_cost,
        energy_pass_through,
        network_upgrade_cost,
        total_cost,
        revenue_adequacy_ratio,
        surplus_or_deficit,
        surplus_or_deficit_per_mw,
        contributes_surplus: revenue_adequacy_ratio > 1.0,
    }
}

/// Revenue adequacy of a data center operated firm or flexibly
pub fn data_center_adequacy(
    data_center: &DataCenter,
    flexible: bool,
    tariff: Option<&TariffStructure>,
    utility: Option<&Utility>,
    params: &CalibrationParams,
) -> RevenueAdequacy {
    let (load_factor, coincidence, onsite) = if flexible {
        (
            data_center.flex_load_factor,
            data_center.flex_peak_coincidence,
            data_center.onsite_generation_mw,
        )
    } else {
        (data_center.firm_load_factor, data_center.firm_peak_coincidence, 0.0)
    };
    revenue_adequacy(
        data_center.capacity_mw,
        load_factor,
        coincidence,
        tariff,
        utility,
        onsite,
        params,
    )
}
