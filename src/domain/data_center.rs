use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

use super::EngineResult;

/// A proposed data center interconnection.
///
/// Firm operation runs at a constant draw and is fully present at system
/// peak; flexible operation defers workloads out of peak hours (25%
/// curtailable is the field-validated figure) and runs at a higher average
/// load factor.
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_data_center"))]
pub struct DataCenter {
    #[validate(range(min = 0.0))]
    pub capacity_mw: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub firm_load_factor: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub firm_peak_coincidence: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub flex_load_factor: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub flex_peak_coincidence: f64,
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub onsite_generation_mw: f64,
    /// Capital cost of onsite generation ($). Borne by the developer, never
    /// charged to ratepayers.
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub generation_capital_cost: f64,
}

fn validate_data_center(dc: &DataCenter) -> Result<(), ValidationError> {
    if dc.flex_peak_coincidence > dc.firm_peak_coincidence {
        let mut err = ValidationError::new("peak_coincidence");
        err.message = Some(Cow::from(
            "flex_peak_coincidence cannot exceed firm_peak_coincidence",
        ));
        return Err(err);
    }
    Ok(())
}

impl Default for DataCenter {
    fn default() -> Self {
        Self {
            capacity_mw: 1_000.0,
            firm_load_factor: 0.80,
            firm_peak_coincidence: 1.0,
            flex_load_factor: 0.95,
            flex_peak_coincidence: 0.75,
            onsite_generation_mw: 200.0,
            generation_capital_cost: 0.0,
        }
    }
}

impl DataCenter {
    pub fn with_capacity(capacity_mw: f64) -> Self {
        Self {
            capacity_mw,
            onsite_generation_mw: capacity_mw * 0.2,
            ..Self::default()
        }
    }

    pub fn check(&self) -> EngineResult<()> {
        self.validate()?;
        Ok(())
    }
}

/// Peak coincidence seen by the grid once onsite generation covers part of
/// `capacity_mw`. Zero for an empty site.
pub fn grid_peak_coincidence(capacity_mw: f64, peak_coincidence: f64, onsite_mw: f64) -> f64 {
    if capacity_mw <= 0.0 {
        return 0.0;
    }
    (peak_coincidence - onsite_mw / capacity_mw).max(0.0)
}

/// MW the load adds to the system peak after onsite generation
pub fn effective_peak_mw(capacity_mw: f64, peak_coincidence: f64, onsite_mw: f64) -> f64 {
    (capacity_mw * peak_coincidence - onsite_mw).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_data_center() {
        let dc = DataCenter::default();
        assert!(dc.check().is_ok());
    }

    #[test]
    fn test_negative_capacity_rejected() {
        let dc = DataCenter {
            capacity_mw: -10.0,
            ..DataCenter::default()
        };
        assert!(dc.check().is_err());
    }

    #[test]
    fn test_flex_above_firm_rejected() {
        let dc = DataCenter {
            firm_peak_coincidence: 0.7,
            flex_peak_coincidence: 0.9,
            ..DataCenter::default()
        };
        assert!(dc.check().is_err());
    }

    #[test]
    fn test_onsite_generation_offsets_peak() {
        assert!((grid_peak_coincidence(1_000.0, 0.75, 200.0) - 0.55).abs() < 1e-12);
        assert_eq!(grid_peak_coincidence(1_000.0, 0.75, 5_000.0), 0.0);
        assert_eq!(grid_peak_coincidence(0.0, 0.75, 200.0), 0.0);

        assert!((effective_peak_mw(1_000.0, 0.75, 200.0) - 550.0).abs() < 1e-9);
        assert_eq!(effective_peak_mw(1_000.0, 0.75, 5_000.0), 0.0);
    }

    #[test]
    fn test_with_capacity_scales_generation() {
        let dc = DataCenter::with_capacity(1_500.0);
        assert_eq!(dc.capacity_mw, 1_500.0);
        assert_eq!(dc.onsite_generation_mw, 300.0);
    }
}
