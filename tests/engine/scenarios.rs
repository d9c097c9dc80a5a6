use rstest::rstest;

use rate_impact_engine::data::{find_utility, utility_profiles};
use rate_impact_engine::domain::{
    DataCenter, EscalationConfig, MarketType, Scenario, TariffStructure, Utility,
};
use rate_impact_engine::market::{SupplyCurve, TARGET_RESERVE_MARGIN};
use rate_impact_engine::trajectory::{
    calculate_baseline_trajectory, calculate_summary_stats, generate_all_trajectories,
    ProjectionSettings, TrajectoryEngine,
};

const FULLY_ONLINE: usize = 10;

#[test]
fn firm_load_raises_bills_above_baseline() {
    let all = generate_all_trajectories(&Utility::default(), &DataCenter::default(), 15, None, None)
        .unwrap();
    assert!(all.unoptimized[FULLY_ONLINE].monthly_bill > all.baseline[FULLY_ONLINE].monthly_bill);
}

#[test]
fn flexible_load_impact_is_more_favorable_than_firm() {
    let all = generate_all_trajectories(&Utility::default(), &DataCenter::default(), 15, None, None)
        .unwrap();
    let baseline = all.baseline[FULLY_ONLINE].monthly_bill;
    let firm_delta = all.unoptimized[FULLY_ONLINE].monthly_bill - baseline;
    let flex_delta = all.flexible[FULLY_ONLINE].monthly_bill - baseline;
    assert!(flex_delta < firm_delta);
}

#[test]
fn onsite_generation_never_raises_effective_peak() {
    let all = generate_all_trajectories(&Utility::default(), &DataCenter::default(), 15, None, None)
        .unwrap();
    for (flex, dispatch) in all.flexible.iter().zip(&all.dispatchable) {
        match (flex.metrics, dispatch.metrics) {
            (Some(f), Some(d)) => assert!(d.effective_peak_mw <= f.effective_peak_mw),
            (None, None) => {}
            _ => panic!("scenarios disagree on build-out in {}", flex.year),
        }
    }
}

#[test]
fn target_margin_prices_at_cost_of_new_entry() {
    let curve = SupplyCurve::pjm();
    assert_eq!(curve.price_for_margin(0.15), curve.cost_of_new_entry * 1.00);
    assert_eq!(curve.price_for_margin(TARGET_RESERVE_MARGIN), 330.0);
}

#[rstest]
#[case(Scenario::Baseline)]
#[case(Scenario::Unoptimized)]
#[case(Scenario::Flexible)]
#[case(Scenario::Dispatchable)]
fn trajectories_are_idempotent(#[case] scenario: Scenario) {
    let engine = TrajectoryEngine::new(ProjectionSettings::default());
    let utility = Utility::default();
    let dc = DataCenter::default();
    let first = engine.scenario(scenario, &utility, &dc, None, None).unwrap();
    let second = engine.scenario(scenario, &utility, &dc, None, None).unwrap();
    assert_eq!(first, second);
    assert!(first.iter().all(|p| p.scenario == scenario));
}

#[test]
fn scenarios_share_the_baseline_before_build_out() {
    let all = generate_all_trajectories(&Utility::default(), &DataCenter::default(), 15, None, None)
        .unwrap();
    for index in 0..=2 {
        let baseline = all.baseline[index].monthly_bill;
        assert_eq!(all.unoptimized[index].monthly_bill, baseline);
        assert_eq!(all.flexible[index].monthly_bill, baseline);
        assert_eq!(all.dispatchable[index].monthly_bill, baseline);
    }
}

#[test]
fn escalation_toggles_shape_the_baseline() {
    let utility = Utility::default();
    let flat_config = EscalationConfig::flat();
    let flat = calculate_baseline_trajectory(&utility, 15, Some(&flat_config)).unwrap();
    let escalated = calculate_baseline_trajectory(&utility, 15, None).unwrap();

    assert!(flat.iter().all(|p| p.monthly_bill == utility.avg_monthly_bill));
    assert!(escalated
        .windows(2)
        .all(|pair| pair[1].monthly_bill > pair[0].monthly_bill));
}

#[test]
fn capacity_market_utilities_carry_spillover() {
    let profile = find_utility("dominion-virginia").unwrap();
    let utility = profile.to_utility();
    let all = generate_all_trajectories(&utility, &profile.default_data_center(), 15, None, None)
        .unwrap();

    let point = &all.unoptimized[FULLY_ONLINE];
    assert!(point.components.capacity_spillover_impact > 0.0);
    let metrics = point.metrics.unwrap();
    assert!(metrics.new_capacity_price >= metrics.old_capacity_price);
    assert!(metrics.new_reserve_margin < metrics.old_reserve_margin);
}

#[test]
fn ercot_profile_uses_four_cp_tariff() {
    let profile = find_utility("ercot-texas").unwrap();
    let utility = profile.to_utility();
    assert_eq!(utility.market_type, MarketType::Ercot);

    let explicit = TariffStructure::ercot_4cp();
    let engine = TrajectoryEngine::new(ProjectionSettings::default());
    let dc = profile.default_data_center();
    let implicit_run = engine.flexible(&utility, &dc, None, None).unwrap();
    let explicit_run = engine.flexible(&utility, &dc, Some(&explicit), None).unwrap();
    assert_eq!(implicit_run, explicit_run);
}

#[test]
fn every_reference_profile_projects_cleanly() {
    for profile in utility_profiles() {
        let utility = profile.to_utility();
        let dc = profile.default_data_center();
        let all = generate_all_trajectories(&utility, &dc, 15, None, None)
            .unwrap_or_else(|e| panic!("{}: {e}", profile.id));
        let summary = calculate_summary_stats(&all, &utility).unwrap();

        assert_eq!(summary.final_year, 2040, "{}", profile.id);
        for point in all.unoptimized.iter().chain(&all.flexible).chain(&all.dispatchable) {
            assert!(point.monthly_bill.is_finite(), "{}", profile.id);
            assert!(
                point.components.dollar_impact >= -0.15 * point.components.baseline_bill - 1e-9,
                "{} {}",
                profile.id,
                point.year
            );
        }
    }
}

#[test]
fn longer_growth_window_slows_build_out() {
    let slow = TrajectoryEngine::new(ProjectionSettings {
        growth_end_year: 14,
        ..ProjectionSettings::default()
    });
    let fast = TrajectoryEngine::new(ProjectionSettings::default());
    let utility = Utility::default();
    let dc = DataCenter::default();

    let slow_points = slow.unoptimized(&utility, &dc, None, None).unwrap();
    let fast_points = fast.unoptimized(&utility, &dc, None, None).unwrap();
    assert!(
        slow_points[6].components.cumulative_capacity_mw
            < fast_points[6].components.cumulative_capacity_mw
    );
    assert_eq!(slow_points[14].components.cumulative_capacity_mw, 1_000.0);
}
