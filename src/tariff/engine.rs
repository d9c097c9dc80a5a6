use serde::{Deserialize, Serialize};

use crate::domain::{DemandChargeType, TariffStructure, HOURS_PER_YEAR, MONTHS_PER_YEAR};

/// Ratchet applied by rolling-ratchet tariffs that do not state one
const DEFAULT_ROLLING_RATCHET: f64 = 0.80;
/// Billed max demand uplift for firm loads on TOU tariffs with a ratchet
const TOU_FIRM_RATCHET_UPLIFT: f64 = 1.05;
/// Max demand on coincident-peak tariffs relative to billed coincident demand
const COINCIDENT_MAX_DEMAND_RATIO: f64 = 0.85;
/// Share of coincident demand a flexible load still shows during the 1-of-5 peaks
const CP_1_5_FLEX_FACTOR: f64 = 0.65;
/// Share of coincident demand a flexible load still shows during the 4CP intervals
const CP_4_FLEX_FACTOR: f64 = 0.50;
/// Ratchet relief for flexible loads on rolling-ratchet tariffs
const RATCHET_FLEX_FACTOR: f64 = 0.85;

/// Billing determinants behind a revenue figure
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevenueBreakdown {
    pub demand_charge_type: DemandChargeType,
    pub billed_peak_mw: f64,
    pub billed_max_mw: f64,
    pub annual_mwh: f64,
    /// Billing demand was set by the ratchet rather than metered demand
    pub ratchet_binding: bool,
    pub is_flexible: bool,
}

/// Annual tariff revenue from a large load ($/year)
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TariffRevenue {
    pub peak_demand_revenue: f64,
    pub max_demand_revenue: f64,
    pub energy_revenue: f64,
    /// Demand charges avoided relative to running the same capacity firm
    pub flexibility_benefit: f64,
    pub breakdown: RevenueBreakdown,
}

impl TariffRevenue {
    pub fn demand_revenue(&self) -> f64 {
        self.peak_demand_revenue + self.max_demand_revenue
    }

    pub fn total(&self) -> f64 {
        self.demand_revenue() + self.energy_revenue
    }
}

struct BilledDemand {
    peak_mw: f64,
    max_mw: f64,
    ratchet_binding: bool,
}

fn billed_demand(
    capacity_mw: f64,
    peak_coincidence: f64,
    tariff: &TariffStructure,
) -> BilledDemand {
    let is_flexible = peak_coincidence < 1.0;
    let coincident_mw = capacity_mw * peak_coincidence;
    let flex = |factor: f64| if is_flexible { factor } else { 1.0 };

    match tariff.demand_charge_type {
        DemandChargeType::TouPeakNcp => {
            let uplift = if tariff.has_ratchet() && !is_flexible {
                TOU_FIRM_RATCHET_UPLIFT
            } else {
                1.0
            };
            BilledDemand {
                peak_mw: coincident_mw,
                max_mw: capacity_mw * uplift,
                ratchet_binding: false,
            }
        }
        DemandChargeType::CoincidentPeak => {
            let ratchet_mw = tariff.ratchet_percent.map(|pct| capacity_mw * pct);
            let ratchet_binding = ratchet_mw.is_some_and(|mw| mw > coincident_mw);
            BilledDemand {
                peak_mw: ratchet_mw.map_or(coincident_mw, |mw| coincident_mw.max(mw)),
                max_mw: coincident_mw * COINCIDENT_MAX_DEMAND_RATIO,
                ratchet_binding,
            }
        }
        DemandChargeType::Cp1And5 => BilledDemand {
            peak_mw: coincident_mw * flex(CP_1_5_FLEX_FACTOR),
            max_mw: capacity_mw,
            ratchet_binding: false,
        },
        DemandChargeType::Cp4 => BilledDemand {
            peak_mw: coincident_mw * flex(CP_4_FLEX_FACTOR),
            max_mw: capacity_mw,
            ratchet_binding: false,
        },
        DemandChargeType::RollingRatchet => {
            let ratchet = tariff.ratchet_percent.unwrap_or(DEFAULT_ROLLING_RATCHET);
            let ratchet_mw = capacity_mw * ratchet * flex(RATCHET_FLEX_FACTOR);
            BilledDemand {
                peak_mw: coincident_mw.max(ratchet_mw),
                max_mw: capacity_mw,
                ratchet_binding: ratchet_mw > coincident_mw,
            }
        }
        DemandChargeType::Standard => BilledDemand {
            peak_mw: coincident_mw,
            max_mw: capacity_mw,
            ratchet_binding: false,
        },
    }
}

fn annual_demand_revenue(billed: &BilledDemand, tariff: &TariffStructure) -> (f64, f64) {
    (
        billed.peak_mw * tariff.peak_demand_charge * MONTHS_PER_YEAR,
        billed.max_mw * tariff.max_demand_charge * MONTHS_PER_YEAR,
    )
}

/// Annual demand and energy revenue a tariff collects from a load.
///
/// A load is treated as flexible when its peak coincidence is below 1.0.
pub fn demand_and_energy_revenue(
    capacity_mw: f64,
    load_factor: f64,
    peak_coincidence: f64,
    tariff: &TariffStructure,
) -> TariffRevenue {
    let capacity_mw = capacity_mw.max(0.0);
    let is_flexible = peak_coincidence < 1.0;

    let billed = billed_demand(capacity_mw, peak_coincidence, tariff);
    let (peak_demand_revenue, max_demand_revenue) = annual_demand_revenue(&billed, tariff);

    let annual_mwh = capacity_mw * load_factor * HOURS_PER_YEAR;
    let energy_revenue = annual_mwh * tariff.energy_charge;

    let flexibility_benefit = if is_flexible {
        let firm = billed_demand(capacity_mw, 1.0, tariff);
        let (firm_peak, firm_max) = annual_demand_revenue(&firm, tariff);
        let avoided = (firm_peak + firm_max) - (peak_demand_revenue + max_demand_revenue);
        (avoided * tariff.flexibility_benefit_multiplier).max(0.0)
    } else {
        0.0
    };

    TariffRevenue {
        peak_demand_revenue,
        max_demand_revenue,
        energy_revenue,
        flexibility_benefit,
        breakdown: RevenueBreakdown {
            demand_charge_type: tariff.demand_charge_type,
            billed_peak_mw: billed.peak_mw,
            billed_max_mw: billed.max_mw,
            annual_mwh,
            ratchet_binding: billed.ratchet_binding,
            is_flexible,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const EPS: f64 = 1e-6;

    #[test]
    fn test_tou_firm_revenue() {
        let tariff = TariffStructure::default();
        let revenue = demand_and_energy_revenue(1_000.0, 0.80, 1.0, &tariff);

        assert!((revenue.peak_demand_revenue - 1_000.0 * 5_430.0 * 12.0).abs() < EPS);
        assert!((revenue.max_demand_revenue - 1_000.0 * 3_620.0 * 12.0).abs() < EPS);
        assert!((revenue.energy_revenue - 1_000.0 * 0.80 * 8_760.0 * 45.0).abs() < EPS);
        assert_eq!(revenue.flexibility_benefit, 0.0);
        assert!(!revenue.breakdown.is_flexible);
    }

    #[test]
    fn test_tou_firm_ratchet_uplift() {
        let tariff = TariffStructure {
            ratchet_percent: Some(0.6),
            ..TariffStructure::default()
        };
        let firm = demand_and_energy_revenue(1_000.0, 0.80, 1.0, &tariff);
        assert!((firm.breakdown.billed_max_mw - 1_050.0).abs() < EPS);

        let flex = demand_and_energy_revenue(1_000.0, 0.95, 0.75, &tariff);
        assert!((flex.breakdown.billed_max_mw - 1_000.0).abs() < EPS);
    }

    #[test]
    fn test_coincident_peak_ratchet_binds() {
        let tariff = TariffStructure::coincident_peak();
        let revenue = demand_and_energy_revenue(1_000.0, 0.95, 0.50, &tariff);

        assert!((revenue.breakdown.billed_peak_mw - 600.0).abs() < EPS);
        assert!((revenue.breakdown.billed_max_mw - 425.0).abs() < EPS);
        assert!(revenue.breakdown.ratchet_binding);

        let firm = demand_and_energy_revenue(1_000.0, 0.80, 1.0, &tariff);
        assert!(!firm.breakdown.ratchet_binding);
    }

    #[test]
    fn test_rolling_ratchet_defaults_to_eighty_percent() {
        let tariff = TariffStructure {
            ratchet_percent: None,
            ..TariffStructure::rolling_ratchet()
        };
        let revenue = demand_and_energy_revenue(1_000.0, 0.95, 0.50, &tariff);
        // 1000 * 0.80 * 0.85 = 680 MW beats the 500 MW coincident draw
        assert!((revenue.breakdown.billed_peak_mw - 680.0).abs() < EPS);
        assert!(revenue.breakdown.ratchet_binding);
    }

    #[rstest]
    #[case(TariffStructure::default())]
    #[case(TariffStructure::coincident_peak())]
    #[case(TariffStructure::pjm_cp_1_5())]
    #[case(TariffStructure::ercot_4cp())]
    #[case(TariffStructure::rolling_ratchet())]
    fn test_flexible_load_pays_no_more_demand(#[case] tariff: TariffStructure) {
        let firm = demand_and_energy_revenue(1_000.0, 0.80, 1.0, &tariff);
        let flex = demand_and_energy_revenue(1_000.0, 0.80, 0.75, &tariff);
        assert!(flex.demand_revenue() <= firm.demand_revenue() + EPS);
        assert!(flex.flexibility_benefit >= 0.0);
    }

    #[test]
    fn test_cp4_flexibility_ordering() {
        let tariff = TariffStructure::ercot_4cp();
        let firm = demand_and_energy_revenue(1_000.0, 0.80, 1.0, &tariff);
        let flex = demand_and_energy_revenue(1_000.0, 0.80, 0.75, &tariff);

        assert!(flex.peak_demand_revenue < firm.peak_demand_revenue);
        // 750 MW coincident halved during the 4CP intervals
        assert!((flex.breakdown.billed_peak_mw - 375.0).abs() < EPS);
        let avoided = (1_000.0 - 375.0) * 5_500.0 * 12.0;
        assert!((flex.flexibility_benefit - avoided * 1.2).abs() < 1e-3);
    }

    fn standard() -> TariffStructure {
        TariffStructure {
            demand_charge_type: DemandChargeType::Standard,
            ..TariffStructure::default()
        }
    }

    // 1000 MW at 0.80 load factor; coincidence 1.0 is firm, 0.75 flexible
    #[rstest]
    #[case::tou_firm(TariffStructure::default(), 1.0, 1_000.0, 1_000.0, 108_600_000.0)]
    #[case::tou_flexible(TariffStructure::default(), 0.75, 750.0, 1_000.0, 92_310_000.0)]
    #[case::cp_firm(TariffStructure::coincident_peak(), 1.0, 1_000.0, 850.0, 110_880_000.0)]
    #[case::cp_flexible(TariffStructure::coincident_peak(), 0.75, 750.0, 637.5, 83_160_000.0)]
    #[case::cp_1_5_firm(TariffStructure::pjm_cp_1_5(), 1.0, 1_000.0, 1_000.0, 135_600_000.0)]
    #[case::cp_1_5_flexible(TariffStructure::pjm_cp_1_5(), 0.75, 487.5, 1_000.0, 85_170_000.0)]
    #[case::cp_4_firm(TariffStructure::ercot_4cp(), 1.0, 1_000.0, 1_000.0, 92_400_000.0)]
    #[case::cp_4_flexible(TariffStructure::ercot_4cp(), 0.75, 375.0, 1_000.0, 51_150_000.0)]
    #[case::rolling_firm(TariffStructure::rolling_ratchet(), 1.0, 1_000.0, 1_000.0, 108_000_000.0)]
    #[case::rolling_flex(TariffStructure::rolling_ratchet(), 0.75, 750.0, 1_000.0, 90_000_000.0)]
    #[case::standard_firm(standard(), 1.0, 1_000.0, 1_000.0, 108_600_000.0)]
    #[case::standard_flexible(standard(), 0.75, 750.0, 1_000.0, 92_310_000.0)]
    fn test_billed_demand_per_regime(
        #[case] tariff: TariffStructure,
        #[case] peak_coincidence: f64,
        #[case] billed_peak_mw: f64,
        #[case] billed_max_mw: f64,
        #[case] demand_revenue: f64,
    ) {
        let revenue = demand_and_energy_revenue(1_000.0, 0.80, peak_coincidence, &tariff);
        assert!((revenue.breakdown.billed_peak_mw - billed_peak_mw).abs() < EPS);
        assert!((revenue.breakdown.billed_max_mw - billed_max_mw).abs() < EPS);
        assert!((revenue.demand_revenue() - demand_revenue).abs() < 1e-3);
        assert!(!revenue.breakdown.ratchet_binding);
    }

    #[test]
    fn test_zero_capacity_earns_nothing() {
        let revenue = demand_and_energy_revenue(0.0, 0.80, 1.0, &TariffStructure::pjm_cp_1_5());
        assert_eq!(revenue.total(), 0.0);
    }
}
