use serde::{Deserialize, Serialize};

use super::supply_curve::SupplyCurve;
use crate::domain::{CalibrationParams, Utility, DAYS_PER_YEAR};

/// Effect of an added peak load on the capacity clearing price
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapacityPriceImpact {
    pub old_reserve_margin: f64,
    pub new_reserve_margin: f64,
    /// $/MW-day
    pub old_capacity_price: f64,
    /// $/MW-day
    pub new_capacity_price: f64,
    pub price_increase: f64,
    pub is_scarcity: bool,
    pub is_critical: bool,
    /// Annual cost ($) of the price increase spread over existing residential peak load
    pub socialized_cost_impact: f64,
}

impl CapacityPriceImpact {
    fn reserve_margin(total_capacity_mw: f64, peak_mw: f64) -> f64 {
        if peak_mw <= 0.0 {
            return 0.0;
        }
        ((total_capacity_mw - peak_mw) / peak_mw).max(0.0)
    }
}

/// Capacity price shift caused by `dc_peak_contribution_mw` of new peak load,
/// priced on the configured supply curve or else the utility's market preset.
pub fn dynamic_capacity_price(
    utility: &Utility,
    dc_peak_contribution_mw: f64,
    params: &CalibrationParams,
) -> CapacityPriceImpact {
    match &params.supply_curve {
        Some(curve) => dynamic_capacity_price_on(curve, utility, dc_peak_contribution_mw, params),
        None => dynamic_capacity_price_on(
            &SupplyCurve::for_market(utility.market_type),
            utility,
            dc_peak_contribution_mw,
            params,
        ),
    }
}

/// Same as [`dynamic_capacity_price`] with an explicit supply curve
pub fn dynamic_capacity_price_on(
    curve: &SupplyCurve,
    utility: &Utility,
    dc_peak_contribution_mw: f64,
    params: &CalibrationParams,
) -> CapacityPriceImpact {
    let peak = utility.system_peak_mw;
    let added = dc_peak_contribution_mw.max(0.0);
    let total_capacity = utility.total_capacity_mw(params.default_reserve_margin);

    let old_reserve_margin = CapacityPriceImpact::reserve_margin(total_capacity, peak);
    let new_reserve_margin = CapacityPriceImpact::reserve_margin(total_capacity, peak + added);

    let old_capacity_price = curve.price_for_margin(old_reserve_margin);
    let new_capacity_price = curve.price_for_margin(new_reserve_margin);
    let price_increase = new_capacity_price - old_capacity_price;

    let socialized_cost_impact =
        peak * params.spillover_residential_peak_share * price_increase * DAYS_PER_YEAR;

    CapacityPriceImpact {
        old_reserve_margin,
        new_reserve_margin,
        old_capacity_price,
        new_capacity_price,
        price_increase,
        is_scarcity: curve.is_scarcity(new_reserve_margin),
        is_critical: curve.is_critical(new_reserve_margin),
        socialized_cost_impact,
    }
}
