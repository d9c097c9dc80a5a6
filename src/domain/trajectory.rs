use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Scenario, MONTHS_PER_YEAR};

/// Baseline bill growth toggles
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct EscalationConfig {
    pub include_inflation: bool,
    #[validate(range(min = 0.0, max = 0.5))]
    pub inflation_rate: f64,
    pub include_infrastructure_aging: bool,
    #[validate(range(min = 0.0, max = 0.5))]
    pub infrastructure_aging_rate: f64,
    /// Counted together with infrastructure aging
    #[validate(range(min = 0.0, max = 0.5))]
    pub grid_modernization_rate: f64,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            include_inflation: true,
            inflation_rate: 0.025,
            include_infrastructure_aging: true,
            infrastructure_aging_rate: 0.015,
            grid_modernization_rate: 0.005,
        }
    }
}

impl EscalationConfig {
    /// No baseline growth at all
    pub fn flat() -> Self {
        Self {
            include_inflation: false,
            include_infrastructure_aging: false,
            ..Self::default()
        }
    }

    /// Combined annual baseline growth rate of the enabled toggles
    pub fn baseline_rate(&self) -> f64 {
        let inflation = if self.include_inflation {
            self.inflation_rate
        } else {
            0.0
        };
        let aging = if self.include_infrastructure_aging {
            self.infrastructure_aging_rate + self.grid_modernization_rate
        } else {
            0.0
        };
        inflation + aging
    }

    /// Inflation used to escalate data center impacts
    pub fn general_inflation(&self) -> f64 {
        if self.include_inflation {
            self.inflation_rate
        } else {
            0.0
        }
    }
}

/// Decomposition of one year's bill
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryComponents {
    pub baseline_bill: f64,
    /// Total data center impact on the monthly bill ($)
    pub dollar_impact: f64,
    pub infrastructure_impact: f64,
    pub capacity_spillover_impact: f64,
    pub cumulative_capacity_mw: f64,
    pub phase_in_fraction: f64,
}

/// Diagnostics recorded for each projected year with a data center
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearMetrics {
    pub years_online: f64,
    pub allocation: f64,
    pub adjusted_allocation: f64,
    pub cost_recovery_ratio: f64,
    pub effective_peak_mw: f64,
    pub gross_cost: f64,
    pub revenue_offset: f64,
    pub net_impact: f64,
    pub capacity_credit: f64,
    pub old_capacity_price: f64,
    pub new_capacity_price: f64,
    pub old_reserve_margin: f64,
    pub new_reserve_margin: f64,
    pub is_scarcity: bool,
    pub is_critical: bool,
    pub socialized_cost_annual: f64,
    pub revenue_adequacy_ratio: f64,
}

/// One year of a scenario projection
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub year_index: u32,
    pub year: i32,
    pub scenario: Scenario,
    pub monthly_bill: f64,
    pub annual_bill: f64,
    pub components: TrajectoryComponents,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<YearMetrics>,
}

impl TrajectoryPoint {
    pub fn new(
        year_index: u32,
        year: i32,
        scenario: Scenario,
        components: TrajectoryComponents,
        metrics: Option<YearMetrics>,
    ) -> Self {
        let monthly_bill = components.baseline_bill + components.dollar_impact;
        Self {
            year_index,
            year,
            scenario,
            monthly_bill,
            annual_bill: monthly_bill * MONTHS_PER_YEAR,
            components,
            metrics,
        }
    }
}

/// The four scenario projections over the same horizon
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllTrajectories {
    pub baseline: Vec<TrajectoryPoint>,
    pub unoptimized: Vec<TrajectoryPoint>,
    pub flexible: Vec<TrajectoryPoint>,
    pub dispatchable: Vec<TrajectoryPoint>,
}

impl AllTrajectories {
    pub fn get(&self, scenario: Scenario) -> &[TrajectoryPoint] {
        match scenario {
            Scenario::Baseline => &self.baseline,
            Scenario::Unoptimized => &self.unoptimized,
            Scenario::Flexible => &self.flexible,
            Scenario::Dispatchable => &self.dispatchable,
        }
    }
}

/// One value per scenario
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScenarioValues {
    pub baseline: f64,
    pub unoptimized: f64,
    pub flexible: f64,
    pub dispatchable: f64,
}

/// One value per data center scenario
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ImpactValues {
    pub unoptimized: f64,
    pub flexible: f64,
    pub dispatchable: f64,
}

/// Headline numbers across all scenarios
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub current_monthly_bill: f64,
    pub final_year: i32,
    pub final_year_bills: ScenarioValues,
    /// Final-year monthly bill minus baseline
    pub final_year_difference: ImpactValues,
    /// Final-year monthly savings relative to firm operation
    pub savings_vs_unoptimized: ImpactValues,
    /// Sum of annual bills per customer over the horizon
    pub cumulative_costs: ScenarioValues,
    /// Savings across all residential customers over the horizon vs. firm operation
    pub cumulative_community_savings: ImpactValues,
    /// Final-year bill change relative to today's bill (%)
    pub percent_change: ScenarioValues,
}
