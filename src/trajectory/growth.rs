//! Phased data center build-out

/// Online capacity (MW) at a year index when `total_capacity_mw` ramps in
/// linearly between `start_year` and `end_year`.
///
/// Nothing is online before the window opens and everything is online once
/// it closes. A window with `end_year <= start_year` is a single step at
/// `start_year`.
pub fn calculate_cumulative_dc_capacity(
    year: u32,
    total_capacity_mw: f64,
    start_year: u32,
    end_year: u32,
) -> f64 {
    total_capacity_mw.max(0.0) * phase_in_fraction(year, start_year, end_year)
}

/// Fraction of the build-out online at a year index
pub fn phase_in_fraction(year: u32, start_year: u32, end_year: u32) -> f64 {
    if year < start_year {
        return 0.0;
    }
    if year >= end_year {
        return 1.0;
    }
    f64::from(year - start_year) / f64::from(end_year - start_year)
}

/// Years since the first capacity came online, zero before the window opens
pub fn years_online(year: u32, start_year: u32) -> f64 {
    f64::from(year.saturating_sub(start_year))
}
