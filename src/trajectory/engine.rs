use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::{debug, warn};
use validator::{Validate, ValidationError};

use super::growth::{calculate_cumulative_dc_capacity, phase_in_fraction, years_online};
use crate::cost::{net_residential_impact, revenue_adequacy, ImpactInputs};
use crate::domain::{
    AllTrajectories, CalibrationParams, DataCenter, EngineResult, EscalationConfig, Scenario,
    TariffStructure, TrajectoryComponents, TrajectoryPoint, Utility, YearMetrics,
};

/// Projection horizon and build-out schedule
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_projection"))]
pub struct ProjectionSettings {
    /// Last year index projected; points run `0..=years`
    #[validate(range(min = 1, max = 100))]
    pub years: u32,
    /// Calendar year of index 0
    pub base_year: i32,
    /// Year index the first capacity comes online
    pub growth_start_year: u32,
    /// Year index the full capacity is online
    pub growth_end_year: u32,
    /// Years online before capacity auctions reflect the new load
    pub auction_lag_years: u32,
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        Self {
            years: 15,
            base_year: 2025,
            growth_start_year: 2,
            growth_end_year: 10,
            auction_lag_years: 0,
        }
    }
}

fn validate_projection(settings: &ProjectionSettings) -> Result<(), ValidationError> {
    if settings.growth_end_year <= settings.growth_start_year {
        let mut err = ValidationError::new("growth_window");
        err.message = Some(Cow::from("growth_end_year must be after growth_start_year"));
        return Err(err);
    }
    Ok(())
}

impl ProjectionSettings {
    pub fn with_years(years: u32) -> Self {
        Self {
            years,
            ..Self::default()
        }
    }

    fn calendar_year(&self, year_index: u32) -> i32 {
        self.base_year.saturating_add_unsigned(year_index)
    }
}

/// How the data center runs in a scenario
#[derive(Debug, Clone, Copy)]
struct OperatingMode {
    load_factor: f64,
    peak_coincidence: f64,
    /// Onsite generation at full build-out
    onsite_generation_mw: f64,
    capacity_credit: bool,
}

impl OperatingMode {
    fn for_scenario(scenario: Scenario, data_center: &DataCenter) -> Self {
        match scenario {
            Scenario::Baseline | Scenario::Unoptimized => Self {
                load_factor: data_center.firm_load_factor,
                peak_coincidence: data_center.firm_peak_coincidence,
                onsite_generation_mw: 0.0,
                capacity_credit: false,
            },
            Scenario::Flexible => Self {
                load_factor: data_center.flex_load_factor,
                peak_coincidence: data_center.flex_peak_coincidence,
                onsite_generation_mw: 0.0,
                capacity_credit: true,
            },
            Scenario::Dispatchable => Self {
                load_factor: data_center.flex_load_factor,
                peak_coincidence: data_center.flex_peak_coincidence,
                onsite_generation_mw: data_center.onsite_generation_mw,
                capacity_credit: true,
            },
        }
    }
}

/// Projects residential bills year by year under each scenario.
#[derive(Debug, Clone, Default)]
pub struct TrajectoryEngine {
    settings: ProjectionSettings,
    params: CalibrationParams,
}

impl TrajectoryEngine {
    pub fn new(settings: ProjectionSettings) -> Self {
        Self {
            settings,
            params: CalibrationParams::default(),
        }
    }

    pub fn with_calibration(mut self, params: CalibrationParams) -> Self {
        self.params = params;
        self
    }

    pub fn settings(&self) -> &ProjectionSettings {
        &self.settings
    }

    pub fn calibration(&self) -> &CalibrationParams {
        &self.params
    }

    /// Bills without a data center, growing only with the enabled escalation toggles
    pub fn baseline(
        &self,
        utility: &Utility,
        escalation: Option<&EscalationConfig>,
    ) -> EngineResult<Vec<TrajectoryPoint>> {
        let escalation = escalation.copied().unwrap_or_default();
        self.check_common(utility, &escalation)?;
        Ok(self.baseline_points(utility, &escalation))
    }

    pub fn unoptimized(
        &self,
        utility: &Utility,
        data_center: &DataCenter,
        tariff: Option<&TariffStructure>,
        escalation: Option<&EscalationConfig>,
    ) -> EngineResult<Vec<TrajectoryPoint>> {
        self.scenario(Scenario::Unoptimized, utility, data_center, tariff, escalation)
    }

    pub fn flexible(
        &self,
        utility: &Utility,
        data_center: &DataCenter,
        tariff: Option<&TariffStructure>,
        escalation: Option<&EscalationConfig>,
    ) -> EngineResult<Vec<TrajectoryPoint>> {
        self.scenario(Scenario::Flexible, utility, data_center, tariff, escalation)
    }

    pub fn dispatchable(
        &self,
        utility: &Utility,
        data_center: &DataCenter,
        tariff: Option<&TariffStructure>,
        escalation: Option<&EscalationConfig>,
    ) -> EngineResult<Vec<TrajectoryPoint>> {
        self.scenario(Scenario::Dispatchable, utility, data_center, tariff, escalation)
    }

    /// Project one scenario. Without a tariff the market's representative
    /// tariff is used.
    pub fn scenario(
        &self,
        scenario: Scenario,
        utility: &Utility,
        data_center: &DataCenter,
        tariff: Option<&TariffStructure>,
        escalation: Option<&EscalationConfig>,
    ) -> EngineResult<Vec<TrajectoryPoint>> {
        let escalation = escalation.copied().unwrap_or_default();
        self.check_common(utility, &escalation)?;
        if scenario == Scenario::Baseline {
            return Ok(self.baseline_points(utility, &escalation));
        }

        data_center.check()?;
        let tariff = resolve_tariff(utility, tariff)?;
        Ok(self.scenario_points(scenario, utility, data_center, &tariff, &escalation))
    }

    /// All four scenarios over the same horizon
    pub fn all(
        &self,
        utility: &Utility,
        data_center: &DataCenter,
        tariff: Option<&TariffStructure>,
        escalation: Option<&EscalationConfig>,
    ) -> EngineResult<AllTrajectories> {
        let escalation = escalation.copied().unwrap_or_default();
        self.check_common(utility, &escalation)?;
        data_center.check()?;
        let tariff = resolve_tariff(utility, tariff)?;

        let points = |scenario: Scenario| {
            self.scenario_points(scenario, utility, data_center, &tariff, &escalation)
        };
        Ok(AllTrajectories {
            baseline: self.baseline_points(utility, &escalation),
            unoptimized: points(Scenario::Unoptimized),
            flexible: points(Scenario::Flexible),
            dispatchable: points(Scenario::Dispatchable),
        })
    }

    fn check_common(&self, utility: &Utility, escalation: &EscalationConfig) -> EngineResult<()> {
        self.settings.validate()?;
        self.params.validate()?;
        escalation.validate()?;
        utility.check()
    }

    fn baseline_bill(&self, utility: &Utility, escalation: &EscalationConfig, year: u32) -> f64 {
        let exponent = i32::try_from(year).unwrap_or(i32::MAX);
        utility.avg_monthly_bill * (1.0 + escalation.baseline_rate()).powi(exponent)
    }

    fn baseline_points(
        &self,
        utility: &Utility,
        escalation: &EscalationConfig,
    ) -> Vec<TrajectoryPoint> {
        debug!(years = self.settings.years, "projecting baseline trajectory");
        (0..=self.settings.years)
            .map(|year| {
                let components = TrajectoryComponents {
                    baseline_bill: self.baseline_bill(utility, escalation, year),
                    dollar_impact: 0.0,
                    infrastructure_impact: 0.0,
                    capacity_spillover_impact: 0.0,
                    cumulative_capacity_mw: 0.0,
                    phase_in_fraction: 0.0,
                };
                let calendar_year = self.settings.calendar_year(year);
                TrajectoryPoint::new(year, calendar_year, Scenario::Baseline, components, None)
            })
            .collect()
    }

    fn scenario_points(
        &self,
        scenario: Scenario,
        utility: &Utility,
        data_center: &DataCenter,
        tariff: &TariffStructure,
        escalation: &EscalationConfig,
    ) -> Vec<TrajectoryPoint> {
        debug!(
            scenario = %scenario,
            capacity_mw = data_center.capacity_mw,
            tariff = %tariff.demand_charge_type,
            years = self.settings.years,
            "projecting data center trajectory"
        );

        let points: Vec<TrajectoryPoint> = (0..=self.settings.years)
            .map(|year| self.project_year(scenario, year, utility, data_center, tariff, escalation))
            .collect();

        if let Some(critical) = points
            .iter()
            .find(|p| p.metrics.is_some_and(|m| m.is_critical))
        {
            warn!(
                scenario = %scenario,
                year = critical.year,
                reserve_margin = critical.metrics.map(|m| m.new_reserve_margin).unwrap_or_default(),
                "data center load drives reserve margin below the critical threshold"
            );
        }

        points
    }

    fn project_year(
        &self,
        scenario: Scenario,
        year: u32,
        utility: &Utility,
        data_center: &DataCenter,
        tariff: &TariffStructure,
        escalation: &EscalationConfig,
    ) -> TrajectoryPoint {
        let settings = &self.settings;
        let params = &self.params;
        let calendar_year = settings.calendar_year(year);
        let baseline_bill = self.baseline_bill(utility, escalation, year);

        let online_mw = calculate_cumulative_dc_capacity(
            year,
            data_center.capacity_mw,
            settings.growth_start_year,
            settings.growth_end_year,
        );
        let phase = phase_in_fraction(year, settings.growth_start_year, settings.growth_end_year);

        if online_mw <= 0.0 {
            let components = TrajectoryComponents {
                baseline_bill,
                dollar_impact: 0.0,
                infrastructure_impact: 0.0,
                capacity_spillover_impact: 0.0,
                cumulative_capacity_mw: 0.0,
                phase_in_fraction: phase,
            };
            return TrajectoryPoint::new(year, calendar_year, scenario, components, None);
        }

        let mode = OperatingMode::for_scenario(scenario, data_center);
        let onsite_mw = mode.onsite_generation_mw * phase;
        let online_years = years_online(year, settings.growth_start_year);

        let inputs = ImpactInputs::new(utility, tariff, online_mw)
            .operating(mode.load_factor, mode.peak_coincidence)
            .onsite_generation(onsite_mw)
            .years_online(online_years)
            .capacity_credit(mode.capacity_credit)
            .spillover(online_years >= f64::from(settings.auction_lag_years));
        let impact = net_residential_impact(&inputs, params);

        // Cost increases compound with full inflation, savings with a fraction of it
        let inflation = escalation.general_inflation();
        let exponent =
            i32::try_from(year.saturating_sub(settings.growth_start_year)).unwrap_or(i32::MAX);
        let savings_share = params.negative_escalation.for_scenario(scenario);
        let rising = (1.0 + inflation).powi(exponent);
        let falling = (1.0 + inflation * savings_share).powi(exponent);
        let escalate = |value: f64| if value >= 0.0 { value * rising } else { value * falling };

        // The decrease floor tracks the escalated bill, so it applies after escalation only
        let capacity_spillover_impact = escalate(impact.spillover_monthly);
        let infrastructure = escalate(impact.uncapped_monthly - impact.spillover_monthly);
        let decrease_floor = -params.max_bill_decrease_fraction * baseline_bill;
        let dollar_impact = (infrastructure + capacity_spillover_impact).max(decrease_floor);

        let adequacy = revenue_adequacy(
            online_mw,
            mode.load_factor,
            mode.peak_coincidence,
            Some(tariff),
            Some(utility),
            onsite_mw,
            params,
        );

        let m = &impact.metrics;
        let metrics = YearMetrics {
            years_online: online_years,
            allocation: m.allocation.allocation,
            adjusted_allocation: m.adjusted_allocation,
            cost_recovery_ratio: m.cost_recovery_ratio,
            effective_peak_mw: m.effective_peak_mw,
            gross_cost: m.costs.gross,
            revenue_offset: m.revenue_offset,
            net_impact: m.net_impact,
            capacity_credit: m.costs.capacity_credit,
            old_capacity_price: m.capacity.old_capacity_price,
            new_capacity_price: m.capacity.new_capacity_price,
            old_reserve_margin: m.capacity.old_reserve_margin,
            new_reserve_margin: m.capacity.new_reserve_margin,
            is_scarcity: m.capacity.is_scarcity,
            is_critical: m.capacity.is_critical,
            socialized_cost_annual: m.socialized_cost_annual,
            revenue_adequacy_ratio: adequacy.revenue_adequacy_ratio,
        };

        let components = TrajectoryComponents {
            baseline_bill,
            dollar_impact,
            infrastructure_impact: dollar_impact - capacity_spillover_impact,
            capacity_spillover_impact,
            cumulative_capacity_mw: online_mw,
            phase_in_fraction: phase,
        };
        TrajectoryPoint::new(year, calendar_year, scenario, components, Some(metrics))
    }
}

fn resolve_tariff(
    utility: &Utility,
    tariff: Option<&TariffStructure>,
) -> EngineResult<TariffStructure> {
    let tariff = tariff
        .cloned()
        .unwrap_or_else(|| TariffStructure::for_market(utility.market_type));
    tariff.check()?;
    Ok(tariff)
}

// ============================================================================
// Default-settings entry points
// ============================================================================

fn engine_for(years: u32) -> TrajectoryEngine {
    TrajectoryEngine::new(ProjectionSettings::with_years(years))
}

pub fn calculate_baseline_trajectory(
    utility: &Utility,
    years: u32,
    escalation: Option<&EscalationConfig>,
) -> EngineResult<Vec<TrajectoryPoint>> {
    engine_for(years).baseline(utility, escalation)
}

pub fn calculate_unoptimized_trajectory(
    utility: &Utility,
    data_center: &DataCenter,
    years: u32,
    tariff: Option<&TariffStructure>,
    escalation: Option<&EscalationConfig>,
) -> EngineResult<Vec<TrajectoryPoint>> {
    engine_for(years).unoptimized(utility, data_center, tariff, escalation)
}

pub fn calculate_flexible_trajectory(
    utility: &Utility,
    data_center: &DataCenter,
    years: u32,
    tariff: Option<&TariffStructure>,
    escalation: Option<&EscalationConfig>,
) -> EngineResult<Vec<TrajectoryPoint>> {
    engine_for(years).flexible(utility, data_center, tariff, escalation)
}

pub fn calculate_dispatchable_trajectory(
    utility: &Utility,
    data_center: &DataCenter,
    years: u32,
    tariff: Option<&TariffStructure>,
    escalation: Option<&EscalationConfig>,
) -> EngineResult<Vec<TrajectoryPoint>> {
    engine_for(years).dispatchable(utility, data_center, tariff, escalation)
}

pub fn generate_all_trajectories(
    utility: &Utility,
    data_center: &DataCenter,
    years: u32,
    tariff: Option<&TariffStructure>,
    escalation: Option<&EscalationConfig>,
) -> EngineResult<AllTrajectories> {
    engine_for(years).all(utility, data_center, tariff, escalation)
}
