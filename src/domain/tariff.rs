use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use validator::Validate;

use super::{EngineResult, MarketType};

/// Demand-charge regime of a large-load tariff
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum DemandChargeType {
    /// Time-of-use on-peak demand plus non-coincident monthly max demand
    #[serde(rename = "TOU_PEAK_NCP")]
    #[strum(serialize = "TOU_PEAK_NCP")]
    TouPeakNcp,
    /// Demand measured during the system peak hour
    #[serde(rename = "COINCIDENT_PEAK")]
    #[strum(serialize = "COINCIDENT_PEAK")]
    CoincidentPeak,
    /// One coincident peak for transmission, five for capacity
    #[serde(rename = "CP_1_5")]
    #[strum(serialize = "CP_1_5")]
    Cp1And5,
    /// Four summer coincident peaks (ERCOT)
    #[serde(rename = "CP_4")]
    #[strum(serialize = "CP_4")]
    Cp4,
    /// Highest month in the window sets billing demand for the year
    #[serde(rename = "ROLLING_RATCHET")]
    #[strum(serialize = "ROLLING_RATCHET")]
    RollingRatchet,
    /// Plain coincident / non-coincident split; unrecognized regimes land here
    #[serde(rename = "STANDARD", other)]
    #[strum(serialize = "STANDARD")]
    Standard,
}

/// A utility's large-load tariff
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TariffStructure {
    pub demand_charge_type: DemandChargeType,
    /// $/MW-month on peak (coincident) demand
    #[validate(range(min = 0.0))]
    pub peak_demand_charge: f64,
    /// $/MW-month on maximum (non-coincident) demand
    #[validate(range(min = 0.0))]
    pub max_demand_charge: f64,
    /// $/MWh
    #[validate(range(min = 0.0))]
    pub energy_charge: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default)]
    pub ratchet_percent: Option<f64>,
    #[validate(range(min = 1, max = 36))]
    #[serde(default)]
    pub ratchet_months: Option<u32>,
    #[validate(range(min = 0.0))]
    #[serde(default = "default_flexibility_multiplier")]
    pub flexibility_benefit_multiplier: f64,
}

fn default_flexibility_multiplier() -> f64 {
    1.0
}

impl Default for TariffStructure {
    fn default() -> Self {
        Self {
            demand_charge_type: DemandChargeType::TouPeakNcp,
            peak_demand_charge: 5_430.0,
            max_demand_charge: 3_620.0,
            energy_charge: 45.0,
            ratchet_percent: None,
            ratchet_months: None,
            flexibility_benefit_multiplier: default_flexibility_multiplier(),
        }
    }
}

impl TariffStructure {
    pub fn coincident_peak() -> Self {
        Self {
            demand_charge_type: DemandChargeType::CoincidentPeak,
            peak_demand_charge: 7_200.0,
            max_demand_charge: 2_400.0,
            energy_charge: 42.0,
            ratchet_percent: Some(0.60),
            ratchet_months: Some(12),
            ..Self::default()
        }
    }

    pub fn pjm_cp_1_5() -> Self {
        Self {
            demand_charge_type: DemandChargeType::Cp1And5,
            peak_demand_charge: 8_200.0,
            max_demand_charge: 3_100.0,
            energy_charge: 52.0,
            ..Self::default()
        }
    }

    pub fn ercot_4cp() -> Self {
        Self {
            demand_charge_type: DemandChargeType::Cp4,
            peak_demand_charge: 5_500.0,
            max_demand_charge: 2_200.0,
            energy_charge: 40.0,
            flexibility_benefit_multiplier: 1.2,
            ..Self::default()
        }
    }

    pub fn rolling_ratchet() -> Self {
        Self {
            demand_charge_type: DemandChargeType::RollingRatchet,
            peak_demand_charge: 6_000.0,
            max_demand_charge: 3_000.0,
            energy_charge: 44.0,
            ratchet_percent: Some(0.80),
            ratchet_months: Some(11),
            ..Self::default()
        }
    }

    /// Representative tariff for a market when the utility's own is unknown
    pub fn for_market(market: MarketType) -> Self {
        match market {
            MarketType::Ercot => Self::ercot_4cp(),
            MarketType::Pjm | MarketType::Nyiso => Self::pjm_cp_1_5(),
            MarketType::Miso => Self::coincident_peak(),
            MarketType::Regulated
            | MarketType::Caiso
            | MarketType::Spp
            | MarketType::Tva => Self::default(),
        }
    }

    pub fn has_ratchet(&self) -> bool {
        self.ratchet_percent.is_some() || self.ratchet_months.is_some()
    }

    pub fn check(&self) -> EngineResult<()> {
        self.validate()?;
        Ok(())
    }
}
