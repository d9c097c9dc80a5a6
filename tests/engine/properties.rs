use proptest::prelude::*;

use rate_impact_engine::cost::{net_residential_impact, residential_allocation, ImpactInputs};
use rate_impact_engine::domain::{CalibrationParams, TariffStructure, Utility};
use rate_impact_engine::market::SupplyCurve;
use rate_impact_engine::tariff::demand_and_energy_revenue;
use rate_impact_engine::trajectory::calculate_cumulative_dc_capacity;

fn any_curve() -> impl Strategy<Value = SupplyCurve> {
    prop_oneof![
        Just(SupplyCurve::pjm()),
        Just(SupplyCurve::miso()),
        Just(SupplyCurve::nyiso()),
        Just(SupplyCurve::generic()),
    ]
}

proptest! {
    #[test]
    fn capacity_price_never_rises_with_margin(
        curve in any_curve(),
        a in -0.2f64..0.8,
        b in -0.2f64..0.8,
    ) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(curve.price_for_margin(low) + 1e-9 >= curve.price_for_margin(high));
    }

    #[test]
    fn capacity_price_is_positive_and_finite(curve in any_curve(), margin in -1.0f64..2.0) {
        let price = curve.price_for_margin(margin);
        prop_assert!(price.is_finite());
        prop_assert!(price > 0.0);
    }

    #[test]
    fn build_out_is_bounded_and_monotone(year in 0u32..40, total in 0.0f64..10_000.0) {
        let now = calculate_cumulative_dc_capacity(year, total, 2, 10);
        let next = calculate_cumulative_dc_capacity(year + 1, total, 2, 10);
        prop_assert!((0.0..=total).contains(&now));
        prop_assert!(next >= now);
    }

    #[test]
    fn allocation_stays_within_floor_and_ceiling(
        capacity_mw in 0.0f64..20_000.0,
        load_factor in 0.1f64..1.0,
        peak_coincidence in 0.0f64..1.0,
        years_online in 0.0f64..30.0,
    ) {
        let params = CalibrationParams::default();
        let breakdown = residential_allocation(
            &Utility::default(),
            capacity_mw,
            load_factor,
            peak_coincidence,
            years_online,
            &params,
        );
        prop_assert!(breakdown.allocation >= params.allocation_floor - 1e-12);
        prop_assert!(breakdown.allocation <= params.allocation_ceiling + 1e-12);
    }

    #[test]
    fn adjusted_allocation_respects_cost_causation_floor(
        capacity_mw in 1.0f64..5_000.0,
        load_factor in 0.1f64..1.0,
        peak_coincidence in 0.0f64..1.0,
        years_online in 0.0f64..20.0,
    ) {
        let utility = Utility::default();
        let tariff = TariffStructure::default();
        let params = CalibrationParams::default();
        let inputs = ImpactInputs::new(&utility, &tariff, capacity_mw)
            .operating(load_factor, peak_coincidence)
            .years_online(years_online);
        let impact = net_residential_impact(&inputs, &params);

        prop_assert!(impact.metrics.adjusted_allocation >= params.cost_causation_floor - 1e-12);
        let floor = -params.max_bill_decrease_fraction * utility.avg_monthly_bill;
        prop_assert!(impact.per_customer_monthly >= floor - 1e-9);
    }

    #[test]
    fn four_cp_flexibility_never_costs_more_demand_revenue(
        capacity_mw in 1.0f64..5_000.0,
        load_factor in 0.1f64..1.0,
        peak_coincidence in 0.0f64..1.0,
    ) {
        let tariff = TariffStructure::ercot_4cp();
        let firm = demand_and_energy_revenue(capacity_mw, load_factor, 1.0, &tariff);
        let flexible =
            demand_and_energy_revenue(capacity_mw, load_factor, peak_coincidence, &tariff);
        prop_assert!(flexible.demand_revenue() <= firm.demand_revenue() + 1e-6);
        prop_assert!(flexible.flexibility_benefit >= 0.0);
    }
}
