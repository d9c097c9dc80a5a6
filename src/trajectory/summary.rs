use crate::domain::{
    AllTrajectories, EngineError, EngineResult, ImpactValues, Scenario, ScenarioValues,
    SummaryStats, TrajectoryPoint, Utility,
};

fn final_point(
    trajectories: &AllTrajectories,
    scenario: Scenario,
) -> EngineResult<&TrajectoryPoint> {
    trajectories
        .get(scenario)
        .last()
        .ok_or_else(|| EngineError::InvalidInput(format!("{scenario} trajectory is empty")))
}

fn cumulative_annual(points: &[TrajectoryPoint]) -> f64 {
    points.iter().map(|p| p.annual_bill).sum()
}

/// Residential class savings over the horizon relative to firm operation
fn community_savings(
    unoptimized: &[TrajectoryPoint],
    scenario: &[TrajectoryPoint],
    customers: f64,
) -> f64 {
    unoptimized
        .iter()
        .zip(scenario)
        .map(|(firm, other)| (firm.annual_bill - other.annual_bill) * customers)
        .sum()
}

fn percent_change(current: f64, future: f64) -> f64 {
    if current == 0.0 {
        0.0
    } else {
        (future - current) / current * 100.0
    }
}

/// Headline comparison of the four scenarios
pub fn calculate_summary_stats(
    trajectories: &AllTrajectories,
    utility: &Utility,
) -> EngineResult<SummaryStats> {
    let baseline = final_point(trajectories, Scenario::Baseline)?;
    let unoptimized = final_point(trajectories, Scenario::Unoptimized)?;
    let flexible = final_point(trajectories, Scenario::Flexible)?;
    let dispatchable = final_point(trajectories, Scenario::Dispatchable)?;

    let current = utility.avg_monthly_bill;
    let customers = utility.residential_customers as f64;

    let final_year_bills = ScenarioValues {
        baseline: baseline.monthly_bill,
        unoptimized: unoptimized.monthly_bill,
        flexible: flexible.monthly_bill,
        dispatchable: dispatchable.monthly_bill,
    };

    Ok(SummaryStats {
        current_monthly_bill: current,
        final_year: baseline.year,
        final_year_bills,
        final_year_difference: ImpactValues {
            unoptimized: unoptimized.monthly_bill - baseline.monthly_bill,
            flexible: flexible.monthly_bill - baseline.monthly_bill,
            dispatchable: dispatchable.monthly_bill - baseline.monthly_bill,
        },
        savings_vs_unoptimized: ImpactValues {
            unoptimized: 0.0,
            flexible: unoptimized.monthly_bill - flexible.monthly_bill,
            dispatchable: unoptimized.monthly_bill - dispatchable.monthly_bill,
        },
        cumulative_costs: ScenarioValues {
            baseline: cumulative_annual(&trajectories.baseline),
            unoptimized: cumulative_annual(&trajectories.unoptimized),
            flexible: cumulative_annual(&trajectories.flexible),
            dispatchable: cumulative_annual(&trajectories.dispatchable),
        },
        cumulative_community_savings: ImpactValues {
            unoptimized: 0.0,
            flexible: community_savings(
                &trajectories.unoptimized,
                &trajectories.flexible,
                customers,
            ),
            dispatchable: community_savings(
                &trajectories.unoptimized,
                &trajectories.dispatchable,
                customers,
            ),
        },
        percent_change: ScenarioValues {
            baseline: percent_change(current, final_year_bills.baseline),
            unoptimized: percent_change(current, final_year_bills.unoptimized),
            flexible: percent_change(current, final_year_bills.flexible),
            dispatchable: percent_change(current, final_year_bills.dispatchable),
        },
    })
}
