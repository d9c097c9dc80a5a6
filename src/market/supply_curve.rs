use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::domain::{EngineError, EngineResult, MarketType};

/// Reserve margin the supply curves anchor at cost of new entry
pub const TARGET_RESERVE_MARGIN: f64 = 0.15;

/// Weight of the quadratic scarcity adder below the lowest curve point
const SCARCITY_CURVATURE: f64 = 2.0;

fn default_max_margin() -> f64 {
    0.50
}

/// One point of a capacity demand curve
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub reserve_margin: f64,
    /// Multiple of cost of new entry paid at this margin
    pub price_multiplier: f64,
}

impl CurvePoint {
    pub const fn new(reserve_margin: f64, price_multiplier: f64) -> Self {
        Self {
            reserve_margin,
            price_multiplier,
        }
    }
}

/// Reserve-margin supply curve for capacity clearing prices.
///
/// Points are kept sorted by ascending margin with non-increasing
/// multipliers, so price never rises as the system gets longer on capacity.
/// A deserialized curve is not checked until [`SupplyCurve::check`] runs;
/// configuration and request validation both call it.
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplyCurve {
    points: Vec<CurvePoint>,
    /// Net cost of new entry ($/MW-day)
    pub cost_of_new_entry: f64,
    /// Margins above this are priced as this margin
    #[serde(default = "default_max_margin")]
    pub max_margin: f64,
    pub scarcity_margin: f64,
    pub critical_margin: f64,
}

impl SupplyCurve {
    /// Build a curve from points in any order. Points are sorted by margin,
    /// then the curve is checked like a deserialized one.
    pub fn new(
        points: Vec<CurvePoint>,
        cost_of_new_entry: f64,
        max_margin: f64,
        scarcity_margin: f64,
        critical_margin: f64,
    ) -> EngineResult<Self> {
        let points = points
            .into_iter()
            .sorted_by(|a, b| a.reserve_margin.total_cmp(&b.reserve_margin))
            .collect();
        let curve = Self {
            points,
            cost_of_new_entry,
            max_margin,
            scarcity_margin,
            critical_margin,
        };
        curve.check()?;
        Ok(curve)
    }

    /// Reject curves the pricing lookup cannot use: no points, non-finite or
    /// negative values, a non-positive CONE, margins out of order and
    /// multipliers that rise with margin.
    pub fn check(&self) -> EngineResult<()> {
        let invalid = |reason: String| Err(EngineError::InvalidSupplyCurve(reason));

        if self.points.is_empty() {
            return invalid("curve needs at least one point".to_string());
        }
        if self
            .points
            .iter()
            .any(|p| !p.reserve_margin.is_finite() || !p.price_multiplier.is_finite())
        {
            return invalid("curve points must be finite".to_string());
        }
        if self
            .points
            .iter()
            .any(|p| p.reserve_margin < 0.0 || p.price_multiplier < 0.0)
        {
            return invalid("curve points must be non-negative".to_string());
        }
        if !self.cost_of_new_entry.is_finite() || self.cost_of_new_entry <= 0.0 {
            return invalid(format!(
                "cost of new entry must be positive, got {}",
                self.cost_of_new_entry
            ));
        }
        if !self.max_margin.is_finite() || self.max_margin < 0.0 {
            return invalid(format!("max margin must be non-negative, got {}", self.max_margin));
        }
        if self.critical_margin > self.scarcity_margin {
            return invalid("critical margin must not exceed scarcity margin".to_string());
        }

        for (lo, hi) in self.points.iter().tuple_windows() {
            if hi.reserve_margin <= lo.reserve_margin {
                return invalid(format!(
                    "reserve margins must strictly increase, got {} after {}",
                    hi.reserve_margin, lo.reserve_margin
                ));
            }
            if hi.price_multiplier > lo.price_multiplier {
                return invalid(format!(
                    "price multiplier rises from {} to {} between margins {} and {}",
                    lo.price_multiplier, hi.price_multiplier, lo.reserve_margin, hi.reserve_margin
                ));
            }
        }
        Ok(())
    }

    /// PJM-style variable resource requirement curve
    pub fn pjm() -> Self {
        Self::preset(
            vec![
                CurvePoint::new(0.08, 1.75),
                CurvePoint::new(0.10, 1.50),
                CurvePoint::new(0.12, 1.25),
                CurvePoint::new(TARGET_RESERVE_MARGIN, 1.00),
                CurvePoint::new(0.18, 0.65),
                CurvePoint::new(0.20, 0.45),
                CurvePoint::new(0.25, 0.20),
                CurvePoint::new(0.30, 0.10),
            ],
            330.0,
            0.12,
            0.08,
        )
    }

    /// Steeper MISO planning resource auction curve
    pub fn miso() -> Self {
        Self::preset(
            vec![
                CurvePoint::new(0.08, 2.00),
                CurvePoint::new(0.11, 1.50),
                CurvePoint::new(TARGET_RESERVE_MARGIN, 1.00),
                CurvePoint::new(0.17, 0.50),
                CurvePoint::new(0.20, 0.20),
                CurvePoint::new(0.25, 0.05),
            ],
            250.0,
            0.11,
            0.08,
        )
    }

    /// NYISO ICAP demand curve
    pub fn nyiso() -> Self {
        Self::preset(
            vec![
                CurvePoint::new(0.10, 1.60),
                CurvePoint::new(TARGET_RESERVE_MARGIN, 1.00),
                CurvePoint::new(0.20, 0.60),
                CurvePoint::new(0.25, 0.30),
                CurvePoint::new(0.30, 0.10),
            ],
            280.0,
            0.12,
            0.09,
        )
    }

    /// Shadow curve for markets without a centralized auction
    pub fn generic() -> Self {
        Self::preset(
            vec![
                CurvePoint::new(0.08, 1.75),
                CurvePoint::new(0.10, 1.50),
                CurvePoint::new(0.12, 1.25),
                CurvePoint::new(TARGET_RESERVE_MARGIN, 1.00),
                CurvePoint::new(0.20, 0.50),
                CurvePoint::new(0.30, 0.10),
            ],
            300.0,
            0.12,
            0.08,
        )
    }

    pub fn for_market(market: MarketType) -> Self {
        match market {
            MarketType::Pjm => Self::pjm(),
            MarketType::Miso => Self::miso(),
            MarketType::Nyiso => Self::nyiso(),
            MarketType::Regulated
            | MarketType::Ercot
            | MarketType::Caiso
            | MarketType::Spp
            | MarketType::Tva => Self::generic(),
        }
    }

    // Presets are sorted, monotone and non-empty
    fn preset(
        points: Vec<CurvePoint>,
        cost_of_new_entry: f64,
        scarcity_margin: f64,
        critical_margin: f64,
    ) -> Self {
        Self {
            points,
            cost_of_new_entry,
            max_margin: default_max_margin(),
            scarcity_margin,
            critical_margin,
        }
    }

    /// Capacity clearing price ($/MW-day) at a reserve margin.
    ///
    /// Linear between points, quadratic scarcity pricing below the lowest
    /// point, flat at the highest point's price above it.
    pub fn price_for_margin(&self, margin: f64) -> f64 {
        let margin = if margin.is_nan() {
            0.0
        } else {
            margin.clamp(0.0, self.max_margin)
        };

        let (lowest, highest) = match (self.points.first(), self.points.last()) {
            (Some(lowest), Some(highest)) => (*lowest, *highest),
            _ => return self.cost_of_new_entry,
        };

        if margin < lowest.reserve_margin {
            let lowest_price = lowest.price_multiplier * self.cost_of_new_entry;
            if lowest.reserve_margin <= 0.0 {
                return lowest_price;
            }
            let shortfall = (lowest.reserve_margin - margin) / lowest.reserve_margin;
            return lowest_price * (1.0 + shortfall.powi(2) * SCARCITY_CURVATURE);
        }

        if margin >= highest.reserve_margin {
            return highest.price_multiplier * self.cost_of_new_entry;
        }

        if let Some(exact) = self.points.iter().find(|p| p.reserve_margin == margin) {
            return exact.price_multiplier * self.cost_of_new_entry;
        }

        let multiplier = self
            .points
            .iter()
            .tuple_windows()
            .find(|(lo, hi)| margin >= lo.reserve_margin && margin <= hi.reserve_margin)
            .map(|(lo, hi)| {
                let span = hi.reserve_margin - lo.reserve_margin;
                let position = (margin - lo.reserve_margin) / span;
                lo.price_multiplier + position * (hi.price_multiplier - lo.price_multiplier)
            })
            .unwrap_or(highest.price_multiplier);

        multiplier * self.cost_of_new_entry
    }

    pub fn is_scarcity(&self, margin: f64) -> bool {
        margin < self.scarcity_margin
    }

    pub fn is_critical(&self, margin: f64) -> bool {
        margin < self.critical_margin
    }
}

impl Default for SupplyCurve {
    fn default() -> Self {
        Self::generic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_target_margin_prices_at_cone() {
        for market in MarketType::iter() {
            let curve = SupplyCurve::for_market(market);
            assert_eq!(
                curve.price_for_margin(TARGET_RESERVE_MARGIN),
                curve.cost_of_new_entry * 1.00
            );
        }
    }

    #[test]
    fn test_linear_interpolation() {
        let curve = SupplyCurve::pjm();
        // Halfway between 0.15 (1.00) and 0.18 (0.65)
        let price = curve.price_for_margin(0.165);
        assert!((price - 330.0 * 0.825).abs() < 1e-9);
    }

    #[test]
    fn test_scarcity_pricing_below_curve() {
        let curve = SupplyCurve::pjm();
        let lowest_price = 330.0 * 1.75;
        // Half the lowest margin: 1 + 0.5^2 * 2 = 1.5
        assert!((curve.price_for_margin(0.04) - lowest_price * 1.5).abs() < 1e-9);
        // Zero margin: 1 + 1 * 2 = 3
        assert!((curve.price_for_margin(0.0) - lowest_price * 3.0).abs() < 1e-9);
        // Negative margins clamp to zero
        assert_eq!(curve.price_for_margin(-0.2), curve.price_for_margin(0.0));
    }

    #[test]
    fn test_floor_above_curve() {
        let curve = SupplyCurve::pjm();
        assert!((curve.price_for_margin(0.30) - 33.0).abs() < 1e-9);
        assert!((curve.price_for_margin(0.45) - 33.0).abs() < 1e-9);
        assert!((curve.price_for_margin(5.0) - 33.0).abs() < 1e-9);
    }

    #[test]
    fn test_curve_starting_at_zero_margin() {
        let curve = SupplyCurve::new(
            vec![CurvePoint::new(0.0, 3.0), CurvePoint::new(0.2, 0.5)],
            100.0,
            0.5,
            0.1,
            0.05,
        )
        .unwrap();
        assert_eq!(curve.price_for_margin(0.0), 300.0);
        assert_eq!(curve.price_for_margin(-1.0), 300.0);
        assert!(curve.price_for_margin(f64::NAN).is_finite());
    }

    #[test]
    fn test_new_sorts_points() {
        let curve = SupplyCurve::new(
            vec![
                CurvePoint::new(0.2, 0.5),
                CurvePoint::new(0.1, 1.5),
                CurvePoint::new(0.15, 1.0),
            ],
            200.0,
            0.5,
            0.12,
            0.08,
        )
        .unwrap();
        let margins: Vec<f64> = curve.points.iter().map(|p| p.reserve_margin).collect();
        assert_eq!(margins, vec![0.1, 0.15, 0.2]);
    }

    #[test]
    fn test_new_rejects_rising_prices() {
        let result = SupplyCurve::new(
            vec![CurvePoint::new(0.1, 1.0), CurvePoint::new(0.2, 1.5)],
            200.0,
            0.5,
            0.12,
            0.08,
        );
        assert!(matches!(result, Err(EngineError::InvalidSupplyCurve(_))));
    }

    #[test]
    fn test_new_rejects_empty_and_duplicates() {
        assert!(SupplyCurve::new(vec![], 200.0, 0.5, 0.12, 0.08).is_err());
        assert!(SupplyCurve::new(
            vec![CurvePoint::new(0.1, 1.0), CurvePoint::new(0.1, 0.9)],
            200.0,
            0.5,
            0.12,
            0.08,
        )
        .is_err());
    }

    #[test]
    fn test_zero_cone_rejected() {
        let result = SupplyCurve::new(vec![CurvePoint::new(0.15, 1.0)], 0.0, 0.5, 0.12, 0.08);
        assert!(matches!(result, Err(EngineError::InvalidSupplyCurve(_))));
    }

    #[test]
    fn test_deserialized_curve_prices_and_checks() {
        let json = r#"{
            "points": [
                {"reserve_margin": 0.10, "price_multiplier": 2.0},
                {"reserve_margin": 0.20, "price_multiplier": 0.5}
            ],
            "cost_of_new_entry": 200.0,
            "scarcity_margin": 0.12,
            "critical_margin": 0.08
        }"#;
        let curve: SupplyCurve = serde_json::from_str(json).unwrap();
        assert!(curve.check().is_ok());
        assert_eq!(curve.max_margin, 0.50);
        assert!((curve.price_for_margin(0.15) - 200.0 * 1.25).abs() < 1e-9);
    }

    #[test]
    fn test_deserialized_unsorted_curve_fails_check() {
        let json = r#"{
            "points": [
                {"reserve_margin": 0.20, "price_multiplier": 0.5},
                {"reserve_margin": 0.10, "price_multiplier": 2.0}
            ],
            "cost_of_new_entry": 200.0,
            "scarcity_margin": 0.12,
            "critical_margin": 0.08
        }"#;
        let curve: SupplyCurve = serde_json::from_str(json).unwrap();
        assert!(matches!(curve.check(), Err(EngineError::InvalidSupplyCurve(_))));
    }

    #[test]
    fn test_thresholds() {
        let curve = SupplyCurve::pjm();
        assert!(curve.is_scarcity(0.11));
        assert!(!curve.is_scarcity(0.15));
        assert!(curve.is_critical(0.05));
        assert!(!curve.is_critical(0.10));
    }
}
