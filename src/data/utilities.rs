//! Utility profiles compiled from EIA data, rate filings and annual reports
//! (2024 figures where available).

use itertools::Itertools;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::{DataCenter, EngineError, EngineResult, MarketPreset, MarketType, Utility};

/// Capacity price treated as the historical norm ($/MW-day)
const HISTORICAL_CAPACITY_PRICE: f64 = 30.0;

/// A reference utility territory
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UtilityProfile {
    pub id: &'static str,
    pub name: &'static str,
    pub short_name: &'static str,
    pub state: &'static str,
    pub region: &'static str,
    pub residential_customers: u64,
    pub total_customers: u64,
    pub system_peak_mw: f64,
    pub avg_monthly_bill: f64,
    pub avg_monthly_usage_kwh: f64,
    pub market: MarketPreset,
    pub has_dc_activity: bool,
    pub dc_notes: &'static str,
    pub default_dc_mw: f64,
}

impl UtilityProfile {
    /// Engine input for this territory
    pub fn to_utility(&self) -> Utility {
        Utility {
            base_residential_allocation: self.market.base_residential_allocation,
            has_capacity_market: self.market.has_capacity_market,
            capacity_price_2024: self.market.capacity_price_2024,
            capacity_cost_pass_through: self.market.capacity_cost_pass_through,
            ..Utility::from_market(
                self.market.market_type,
                self.residential_customers,
                self.total_customers,
                self.avg_monthly_bill,
                self.system_peak_mw,
            )
        }
    }

    /// Data center sized for this territory with default operating parameters
    pub fn default_data_center(&self) -> DataCenter {
        DataCenter::with_capacity(self.default_dc_mw)
    }

    /// Dropdown label, e.g. "Georgia Power (Georgia)"
    pub fn label(&self) -> String {
        if self.state.is_empty() {
            self.short_name.to_string()
        } else {
            format!("{} ({})", self.short_name, self.state)
        }
    }

    pub fn market_adjusted_allocation(&self) -> f64 {
        market_adjusted_allocation(&self.market)
    }
}

/// Base residential allocation adjusted for market pressure.
///
/// High auction prices push more capacity cost onto all ratepayers, while
/// energy-only markets expose large loads to prices more directly.
pub fn market_adjusted_allocation(market: &MarketPreset) -> f64 {
    let mut allocation = market.base_residential_allocation;

    if let (true, Some(price)) = (market.has_capacity_market, market.capacity_price_2024) {
        let price_multiplier = price / HISTORICAL_CAPACITY_PRICE;
        let adjustment = ((price_multiplier - 1.0) * 0.02).min(0.10);
        allocation += adjustment * market.capacity_cost_pass_through;
    }

    if market.market_type.is_energy_only() {
        allocation *= 0.85;
    }

    allocation.clamp(0.20, 0.55)
}

static UTILITY_PROFILES: Lazy<Vec<UtilityProfile>> = Lazy::new(|| {
    let regulated = MarketType::Regulated.preset();
    let pjm = MarketType::Pjm.preset();
    let ercot = MarketType::Ercot.preset();
    let spp = MarketType::Spp.preset();

    vec![
        // Vertically integrated
        UtilityProfile {
            id: "pso-oklahoma",
            name: "Public Service Company of Oklahoma (PSO)",
            short_name: "PSO Oklahoma",
            state: "Oklahoma",
            region: "Southwest",
            residential_customers: 460_000,
            total_customers: 575_000,
            system_peak_mw: 4_400.0,
            avg_monthly_bill: 130.0,
            avg_monthly_usage_kwh: 1_100.0,
            market: spp,
            has_dc_activity: true,
            dc_notes: "31% power deficit projected by 2031 with 779 MW of new large load requests",
            default_dc_mw: 1_000.0,
        },
        UtilityProfile {
            id: "duke-carolinas",
            name: "Duke Energy Carolinas",
            short_name: "Duke Carolinas",
            state: "North Carolina / South Carolina",
            region: "Southeast",
            residential_customers: 2_507_000,
            total_customers: 2_926_000,
            system_peak_mw: 20_700.0,
            avg_monthly_bill: 135.0,
            avg_monthly_usage_kwh: 1_000.0,
            market: regulated,
            has_dc_activity: true,
            dc_notes: "Growing data center presence in the Charlotte metro area",
            default_dc_mw: 1_000.0,
        },
        UtilityProfile {
            id: "duke-progress",
            name: "Duke Energy Progress",
            short_name: "Duke Progress",
            state: "North Carolina / South Carolina",
            region: "Southeast",
            residential_customers: 1_400_000,
            total_customers: 1_700_000,
            system_peak_mw: 13_800.0,
            avg_monthly_bill: 132.0,
            avg_monthly_usage_kwh: 1_000.0,
            market: regulated,
            has_dc_activity: true,
            dc_notes: "Raleigh area with a growing tech sector",
            default_dc_mw: 800.0,
        },
        UtilityProfile {
            id: "georgia-power",
            name: "Georgia Power",
            short_name: "Georgia Power",
            state: "Georgia",
            region: "Southeast",
            residential_customers: 2_400_000,
            total_customers: 2_804_000,
            system_peak_mw: 17_100.0,
            avg_monthly_bill: 153.0,
            avg_monthly_usage_kwh: 1_150.0,
            market: regulated,
            has_dc_activity: true,
            dc_notes: "8,200 MW of load growth projected by 2030 including data centers",
            default_dc_mw: 1_200.0,
        },
        UtilityProfile {
            id: "aps-arizona",
            name: "Arizona Public Service (APS)",
            short_name: "APS Arizona",
            state: "Arizona",
            region: "Southwest",
            residential_customers: 1_200_000,
            total_customers: 1_400_000,
            system_peak_mw: 8_212.0,
            avg_monthly_bill: 140.0,
            avg_monthly_usage_kwh: 1_050.0,
            market: regulated,
            has_dc_activity: true,
            dc_notes: "Phoenix metro data center growth, 40% peak growth by 2031",
            default_dc_mw: 800.0,
        },
        UtilityProfile {
            id: "nv-energy",
            name: "NV Energy",
            short_name: "NV Energy Nevada",
            state: "Nevada",
            region: "West",
            residential_customers: 610_000,
            total_customers: 2_400_000,
            system_peak_mw: 9_000.0,
            avg_monthly_bill: 125.0,
            avg_monthly_usage_kwh: 900.0,
            market: regulated,
            has_dc_activity: true,
            dc_notes: "Data centers requesting to triple peak demand",
            default_dc_mw: 1_500.0,
        },
        UtilityProfile {
            id: "xcel-colorado",
            name: "Xcel Energy Colorado",
            short_name: "Xcel Colorado",
            state: "Colorado",
            region: "Mountain West",
            residential_customers: 1_400_000,
            total_customers: 1_600_000,
            system_peak_mw: 7_200.0,
            avg_monthly_bill: 105.0,
            avg_monthly_usage_kwh: 700.0,
            market: regulated,
            has_dc_activity: true,
            dc_notes: "Data centers to drive two thirds of new demand",
            default_dc_mw: 600.0,
        },
        // AEP operating companies
        UtilityProfile {
            id: "aep-ohio",
            name: "AEP Ohio",
            short_name: "AEP Ohio",
            state: "Ohio",
            region: "Midwest",
            residential_customers: 1_200_000,
            total_customers: 1_500_000,
            system_peak_mw: 12_000.0,
            avg_monthly_bill: 135.0,
            avg_monthly_usage_kwh: 900.0,
            market: pjm,
            has_dc_activity: true,
            dc_notes: "Significant data center growth, new large-load rate class proposed",
            default_dc_mw: 1_000.0,
        },
        UtilityProfile {
            id: "aep-indiana-michigan",
            name: "Indiana Michigan Power (I&M)",
            short_name: "AEP I&M",
            state: "Indiana / Michigan",
            region: "Midwest",
            residential_customers: 480_000,
            total_customers: 600_000,
            system_peak_mw: 5_500.0,
            avg_monthly_bill: 130.0,
            avg_monthly_usage_kwh: 950.0,
            market: MarketPreset {
                utility_owns_generation: true,
                base_residential_allocation: 0.38,
                ..pjm
            },
            has_dc_activity: true,
            dc_notes: "Northeast Indiana industrial and data center growth",
            default_dc_mw: 500.0,
        },
        UtilityProfile {
            id: "aep-appalachian",
            name: "Appalachian Power (APCo)",
            short_name: "AEP Appalachian",
            state: "Virginia / West Virginia",
            region: "Appalachian",
            residential_customers: 800_000,
            total_customers: 1_000_000,
            system_peak_mw: 7_000.0,
            avg_monthly_bill: 125.0,
            avg_monthly_usage_kwh: 1_000.0,
            market: MarketPreset {
                utility_owns_generation: true,
                base_residential_allocation: 0.40,
                ..pjm
            },
            has_dc_activity: true,
            dc_notes: "Virginia portion drawing data center interest as Northern Virginia fills up",
            default_dc_mw: 600.0,
        },
        UtilityProfile {
            id: "aep-swepco",
            name: "Southwestern Electric Power (SWEPCO)",
            short_name: "AEP SWEPCO",
            state: "Arkansas / Louisiana / Texas",
            region: "Southwest",
            residential_customers: 400_000,
            total_customers: 540_000,
            system_peak_mw: 4_800.0,
            avg_monthly_bill: 120.0,
            avg_monthly_usage_kwh: 1_100.0,
            market: spp,
            has_dc_activity: false,
            dc_notes: "Less data center activity than other AEP territories",
            default_dc_mw: 400.0,
        },
        // ISO market utilities
        UtilityProfile {
            id: "dominion-virginia",
            name: "Dominion Energy Virginia",
            short_name: "Dominion Virginia",
            state: "Virginia",
            region: "Mid-Atlantic",
            residential_customers: 2_500_000,
            total_customers: 2_800_000,
            system_peak_mw: 18_000.0,
            avg_monthly_bill: 145.0,
            avg_monthly_usage_kwh: 1_050.0,
            market: MarketPreset {
                utility_owns_generation: true,
                base_residential_allocation: 0.35,
                ..pjm
            },
            has_dc_activity: true,
            dc_notes: "Largest data center market, 9 GW of peak demand expected within 10 years",
            default_dc_mw: 1_500.0,
        },
        // Energy-only
        UtilityProfile {
            id: "ercot-texas",
            name: "ERCOT (Texas Grid)",
            short_name: "ERCOT Texas",
            state: "Texas",
            region: "Texas",
            residential_customers: 12_000_000,
            total_customers: 26_000_000,
            system_peak_mw: 85_508.0,
            avg_monthly_bill: 140.0,
            avg_monthly_usage_kwh: 1_100.0,
            market: ercot,
            has_dc_activity: true,
            dc_notes: "Data centers account for 46% of projected load growth",
            default_dc_mw: 3_000.0,
        },
        UtilityProfile {
            id: "custom",
            name: "Custom / Enter Your Own",
            short_name: "Custom",
            state: "",
            region: "",
            residential_customers: 500_000,
            total_customers: 600_000,
            system_peak_mw: 4_000.0,
            avg_monthly_bill: 144.0,
            avg_monthly_usage_kwh: 865.0,
            market: regulated,
            has_dc_activity: false,
            dc_notes: "Enter your own utility parameters",
            default_dc_mw: 1_000.0,
        },
    ]
});

pub fn utility_profiles() -> &'static [UtilityProfile] {
    &UTILITY_PROFILES
}

pub fn utility_by_id(id: &str) -> Option<&'static UtilityProfile> {
    UTILITY_PROFILES.iter().find(|p| p.id == id)
}

/// Like [`utility_by_id`], failing with [`EngineError::UnknownUtility`]
pub fn find_utility(id: &str) -> EngineResult<&'static UtilityProfile> {
    utility_by_id(id).ok_or_else(|| EngineError::UnknownUtility(id.to_string()))
}

/// `(label, id)` pairs in display order
pub fn utility_options() -> Vec<(String, &'static str)> {
    UTILITY_PROFILES.iter().map(|p| (p.label(), p.id)).collect()
}

/// Profiles grouped by region; profiles without one land under "Other"
pub fn utilities_by_region() -> BTreeMap<&'static str, Vec<&'static UtilityProfile>> {
    UTILITY_PROFILES
        .iter()
        .into_group_map_by(|p| if p.region.is_empty() { "Other" } else { p.region })
        .into_iter()
        .collect()
}

pub fn utilities_by_market(market: MarketType) -> Vec<&'static UtilityProfile> {
    UTILITY_PROFILES
        .iter()
        .filter(|p| p.market.market_type == market)
        .collect()
}
