//! Multi-year residential bill projections

pub mod engine;
pub mod growth;
pub mod summary;

pub use engine::{
    calculate_baseline_trajectory, calculate_dispatchable_trajectory, calculate_flexible_trajectory,
    calculate_unoptimized_trajectory, generate_all_trajectories, ProjectionSettings,
    TrajectoryEngine,
};
pub use growth::{calculate_cumulative_dc_capacity, phase_in_fraction, years_online};
pub use summary::calculate_summary_stats;
