use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;
use validator::Validate;

use super::{error::ApiError, response::ApiResponse, AppState};
use crate::{
    cost::{revenue_adequacy, RevenueAdequacy},
    data::{self, UtilityProfile},
    domain::{
        AllTrajectories, CalibrationParams, DataCenter, EscalationConfig, MarketType, SummaryStats,
        TariffStructure, Utility,
    },
    market::{dynamic_capacity_price, CapacityPriceImpact, SupplyCurve},
    trajectory::{calculate_summary_stats, ProjectionSettings, TrajectoryEngine},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/utilities", get(list_utilities))
        .route("/utilities/:id", get(get_utility))
        .route("/trajectories", post(project_trajectories))
        .route("/revenue-adequacy", post(assess_revenue_adequacy))
        .route("/capacity-price", post(capacity_price))
        .with_state(state)
}

#[cfg_attr(feature = "swagger", utoipa::path(
    get,
    path = "/api/v1/healthz",
    responses((status = 200))
))]
pub async fn healthz() -> impl IntoResponse {
    StatusCode::OK
}

/// Utility selection shared by the calculation endpoints: an explicit profile
/// wins over a reference id, and the default utility fills in otherwise.
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UtilitySelection {
    #[serde(default)]
    pub utility_id: Option<String>,
    #[serde(default)]
    pub utility: Option<Utility>,
}

impl UtilitySelection {
    fn profile(&self) -> Result<Option<&'static UtilityProfile>, ApiError> {
        match &self.utility_id {
            Some(id) => Ok(Some(data::find_utility(id)?)),
            None => Ok(None),
        }
    }

    fn resolve(&self) -> Result<Utility, ApiError> {
        if let Some(utility) = &self.utility {
            utility.validate()?;
            return Ok(utility.clone());
        }
        Ok(self
            .profile()?
            .map(UtilityProfile::to_utility)
            .unwrap_or_default())
    }
}

/// Configured calibration with a request's supply curve swapped in
fn calibration_with(
    base: &CalibrationParams,
    supply_curve: Option<&SupplyCurve>,
) -> Result<CalibrationParams, ApiError> {
    let mut params = base.clone();
    if let Some(curve) = supply_curve {
        params.supply_curve = Some(curve.clone());
        params.validate()?;
    }
    Ok(params)
}

// ============================================================================
// Reference utilities
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct UtilityQuery {
    pub market: Option<MarketType>,
}

#[cfg_attr(feature = "swagger", utoipa::path(
    get,
    path = "/api/v1/utilities",
    params(("market" = Option<MarketType>, Query, description = "Only profiles in this market")),
    responses((status = 200, body = [UtilityProfile]))
))]
pub async fn list_utilities(Query(q): Query<UtilityQuery>) -> impl IntoResponse {
    let profiles: Vec<&UtilityProfile> = match q.market {
        Some(market) => data::utilities_by_market(market),
        None => data::utility_profiles().iter().collect(),
    };
    let count = profiles.len();
    ApiResponse::success(profiles).with_count(count)
}

#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize)]
pub struct UtilityDetail {
    pub profile: UtilityProfile,
    pub utility: Utility,
    pub default_data_center: DataCenter,
    pub market_adjusted_allocation: f64,
}

#[cfg_attr(feature = "swagger", utoipa::path(
    get,
    path = "/api/v1/utilities/{id}",
    params(("id" = String, Path, description = "Utility profile id")),
    responses(
        (status = 200, body = UtilityDetail),
        (status = 404, body = super::error::ErrorResponse)
    )
))]
pub async fn get_utility(Path(id): Path<String>) -> Result<impl IntoResponse, ApiError> {
    let profile = data::find_utility(&id)?;
    Ok(ApiResponse::success(UtilityDetail {
        profile: profile.clone(),
        utility: profile.to_utility(),
        default_data_center: profile.default_data_center(),
        market_adjusted_allocation: profile.market_adjusted_allocation(),
    }))
}

// ============================================================================
// Trajectories
// ============================================================================

#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrajectoryRequest {
    #[serde(flatten)]
    pub selection: UtilitySelection,
    /// Defaults to the selected profile's data center, then the default data center
    #[serde(default)]
    pub data_center: Option<DataCenter>,
    #[serde(default)]
    pub tariff: Option<TariffStructure>,
    #[serde(default)]
    pub escalation: Option<EscalationConfig>,
    /// Overrides the configured horizon
    #[serde(default)]
    pub years: Option<u32>,
    /// Overrides the configured or market supply curve
    #[serde(default)]
    pub supply_curve: Option<SupplyCurve>,
}

#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize)]
pub struct TrajectoryResponse {
    pub utility: Utility,
    pub data_center: DataCenter,
    pub trajectories: AllTrajectories,
    pub summary: SummaryStats,
}

#[cfg_attr(feature = "swagger", utoipa::path(
    post,
    path = "/api/v1/trajectories",
    request_body = TrajectoryRequest,
    responses(
        (status = 200, body = TrajectoryResponse),
        (status = 422, body = super::error::ErrorResponse)
    )
))]
pub async fn project_trajectories(
    State(st): State<AppState>,
    axum::Json(req): axum::Json<TrajectoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let started = Instant::now();
    let utility = req.selection.resolve()?;
    let data_center = match (&req.data_center, req.selection.profile()?) {
        (Some(dc), _) => dc.clone(),
        (None, Some(profile)) => profile.default_data_center(),
        (None, None) => DataCenter::default(),
    };

    let settings = ProjectionSettings {
        years: req.years.unwrap_or(st.config.projection.years),
        ..st.config.projection
    };
    let params = calibration_with(&st.config.calibration, req.supply_curve.as_ref())?;
    let engine = TrajectoryEngine::new(settings).with_calibration(params);
    let escalation = req.escalation.unwrap_or(st.config.escalation);

    let trajectories = engine.all(&utility, &data_center, req.tariff.as_ref(), Some(&escalation))?;
    let summary = calculate_summary_stats(&trajectories, &utility)?;

    info!(
        market = %utility.market_type,
        capacity_mw = data_center.capacity_mw,
        years = settings.years,
        "projected trajectories"
    );

    Ok(ApiResponse::success(TrajectoryResponse {
        utility,
        data_center,
        trajectories,
        summary,
    })
    .timed(started))
}

// ============================================================================
// Revenue adequacy
// ============================================================================

#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RevenueAdequacyRequest {
    #[serde(flatten)]
    pub selection: UtilitySelection,
    #[validate(range(min = 0.0))]
    pub capacity_mw: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub load_factor: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub peak_coincidence: f64,
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub onsite_generation_mw: f64,
    #[serde(default)]
    pub tariff: Option<TariffStructure>,
}

#[cfg_attr(feature = "swagger", utoipa::path(
    post,
    path = "/api/v1/revenue-adequacy",
    request_body = RevenueAdequacyRequest,
    responses(
        (status = 200, body = RevenueAdequacy),
        (status = 422, body = super::error::ErrorResponse)
    )
))]
pub async fn assess_revenue_adequacy(
    State(st): State<AppState>,
    axum::Json(req): axum::Json<RevenueAdequacyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let started = Instant::now();
    req.validate()?;
    if let Some(tariff) = &req.tariff {
        tariff.validate()?;
    }
    let utility = req.selection.resolve()?;

    let result: RevenueAdequacy = revenue_adequacy(
        req.capacity_mw,
        req.load_factor,
        req.peak_coincidence,
        req.tariff.as_ref(),
        Some(&utility),
        req.onsite_generation_mw,
        &st.config.calibration,
    );
    Ok(ApiResponse::success(result).timed(started))
}

// ============================================================================
// Capacity price
// ============================================================================

#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CapacityPriceRequest {
    #[serde(flatten)]
    pub selection: UtilitySelection,
    /// Data center load present at system peak (MW)
    #[validate(range(min = 0.0))]
    pub dc_peak_contribution_mw: f64,
    /// Overrides the configured or market supply curve
    #[serde(default)]
    pub supply_curve: Option<SupplyCurve>,
}

#[cfg_attr(feature = "swagger", utoipa::path(
    post,
    path = "/api/v1/capacity-price",
    request_body = CapacityPriceRequest,
    responses(
        (status = 200, body = CapacityPriceImpact),
        (status = 422, body = super::error::ErrorResponse)
    )
))]
pub async fn capacity_price(
    State(st): State<AppState>,
    axum::Json(req): axum::Json<CapacityPriceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;
    let utility = req.selection.resolve()?;
    let params = calibration_with(&st.config.calibration, req.supply_curve.as_ref())?;
    let impact: CapacityPriceImpact =
        dynamic_capacity_price(&utility, req.dc_peak_contribution_mw, &params);
    Ok(ApiResponse::success(impact))
}
