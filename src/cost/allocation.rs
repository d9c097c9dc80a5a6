use serde::{Deserialize, Serialize};

use crate::domain::{CalibrationParams, Utility, HOURS_PER_YEAR};

/// How the residential class share of new costs was derived
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AllocationBreakdown {
    /// Residential share of post-data-center energy
    pub volumetric_share: f64,
    /// Residential share of post-data-center peak
    pub demand_share: f64,
    pub customer_share: f64,
    pub weighted_allocation: f64,
    /// Fraction of the data center load rate cases have caught up with
    pub phase_in_fraction: f64,
    /// Progress from the base allocation toward the weighted one
    pub regulatory_lag_fraction: f64,
    pub allocation: f64,
}

fn ramp(years_online: f64, ramp_years: f64) -> f64 {
    if ramp_years <= 0.0 {
        return 1.0;
    }
    (years_online.max(0.0) / ramp_years).min(1.0)
}

fn share(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 {
        0.0
    } else {
        part / whole
    }
}

/// Residential allocation factor after a data center has been online for
/// `years_online` years, clamped to the calibrated floor and ceiling.
pub fn residential_allocation(
    utility: &Utility,
    capacity_mw: f64,
    load_factor: f64,
    peak_coincidence: f64,
    years_online: f64,
    params: &CalibrationParams,
) -> AllocationBreakdown {
    let phase_in_fraction = ramp(years_online, params.allocation_phase_in_years);
    let capacity_mw = capacity_mw.max(0.0);

    let system_mwh = utility.pre_dc_system_energy_gwh * 1_000.0;
    let residential_mwh = system_mwh * utility.residential_energy_share;
    let dc_mwh = capacity_mw * load_factor * HOURS_PER_YEAR * phase_in_fraction;
    let volumetric_share = share(residential_mwh, system_mwh + dc_mwh);

    let residential_peak_mw = utility.system_peak_mw * utility.residential_peak_share;
    let dc_peak_mw = capacity_mw * peak_coincidence * phase_in_fraction;
    let demand_share = share(residential_peak_mw, utility.system_peak_mw + dc_peak_mw);

    let customer_share = utility.residential_customer_share();

    let weighted_allocation = params.volumetric_weight * volumetric_share
        + params.demand_weight * demand_share
        + params.customer_weight * customer_share;

    let regulatory_lag_fraction = ramp(years_online, params.regulatory_lag_years);
    let blended = utility.base_residential_allocation * (1.0 - regulatory_lag_fraction)
        + weighted_allocation * regulatory_lag_fraction;

    AllocationBreakdown {
        volumetric_share,
        demand_share,
        customer_share,
        weighted_allocation,
        phase_in_fraction,
        regulatory_lag_fraction,
        allocation: blended.clamp(params.allocation_floor, params.allocation_ceiling),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_new_load_starts_at_base_allocation() {
        let utility = Utility::default();
        let params = CalibrationParams::default();
        let breakdown = residential_allocation(&utility, 1_000.0, 0.80, 1.0, 0.0, &params);

        assert_eq!(breakdown.phase_in_fraction, 0.0);
        assert_eq!(breakdown.regulatory_lag_fraction, 0.0);
        assert!((breakdown.allocation - utility.base_residential_allocation).abs() < 1e-12);
    }

    #[test]
    fn test_fully_phased_in_default_allocation() {
        let utility = Utility::default();
        let params = CalibrationParams::default();
        let breakdown = residential_allocation(&utility, 1_000.0, 0.80, 1.0, 8.0, &params);

        let volumetric = 7_000_000.0 / (20_000_000.0 + 7_008_000.0);
        let demand = 1_800.0 / 5_000.0;
        let customer = 560_000.0 / 650_000.0;
        let expected = 0.4 * volumetric + 0.4 * demand + 0.2 * customer;

        assert!((breakdown.volumetric_share - volumetric).abs() < 1e-12);
        assert!((breakdown.demand_share - demand).abs() < 1e-12);
        assert!((breakdown.allocation - expected).abs() < 1e-12);
    }

    #[rstest]
    #[case(0.0)]
    #[case(1.5)]
    #[case(4.0)]
    #[case(30.0)]
    fn test_allocation_bounded(#[case] years_online: f64) {
        let params = CalibrationParams::default();
        let skewed = Utility {
            residential_customer_share: Some(1.0),
            residential_peak_share: 1.0,
            residential_energy_share: 1.0,
            base_residential_allocation: 0.9,
            ..Utility::default()
        };
        let breakdown = residential_allocation(&skewed, 50.0, 0.5, 0.5, years_online, &params);
        assert!(breakdown.allocation <= params.allocation_ceiling);

        let tiny = Utility {
            residential_customer_share: Some(0.0),
            residential_peak_share: 0.0,
            residential_energy_share: 0.0,
            base_residential_allocation: 0.0,
            ..Utility::default()
        };
        let breakdown = residential_allocation(&tiny, 50.0, 0.5, 0.5, years_online, &params);
        assert!(breakdown.allocation >= params.allocation_floor);
    }

    #[test]
    fn test_larger_load_dilutes_residential_share() {
        let utility = Utility::default();
        let params = CalibrationParams::default();
        let small = residential_allocation(&utility, 100.0, 0.80, 1.0, 10.0, &params);
        let large = residential_allocation(&utility, 3_000.0, 0.80, 1.0, 10.0, &params);
        assert!(large.volumetric_share < small.volumetric_share);
        assert!(large.demand_share < small.demand_share);
    }
}
