use utoipa::OpenApi;

use crate::api::{
    error::ErrorResponse,
    v1::{
        CapacityPriceRequest, RevenueAdequacyRequest, TrajectoryRequest, TrajectoryResponse,
        UtilityDetail, UtilitySelection,
    },
};
use crate::cost::RevenueAdequacy;
use crate::data::UtilityProfile;
use crate::domain::{
    AllTrajectories, DataCenter, DemandChargeType, EscalationConfig, MarketType, Scenario,
    SummaryStats, TariffStructure, TrajectoryPoint, Utility,
};
use crate::market::{CapacityPriceImpact, CurvePoint, SupplyCurve};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::v1::healthz,
        crate::api::v1::list_utilities,
        crate::api::v1::get_utility,
        crate::api::v1::project_trajectories,
        crate::api::v1::assess_revenue_adequacy,
        crate::api::v1::capacity_price,
    ),
    components(
        schemas(
            UtilitySelection, TrajectoryRequest, TrajectoryResponse, RevenueAdequacyRequest,
            CapacityPriceRequest, UtilityDetail, UtilityProfile, Utility, DataCenter,
            TariffStructure, DemandChargeType, EscalationConfig, MarketType, Scenario,
            TrajectoryPoint, AllTrajectories, SummaryStats, RevenueAdequacy,
            CapacityPriceImpact, SupplyCurve, CurvePoint, ErrorResponse
        )
    ),
    tags((name = "rate-impact", description = "Data center residential rate impact API v1"))
)]
pub struct ApiDoc;
