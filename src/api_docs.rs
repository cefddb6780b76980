use utoipa::OpenApi;

use crate::controllers::estimate_controller;
use crate::models::{geo, solar};

#[derive(OpenApi)]
#[openapi(
    paths(
        estimate_controller::get_estimate,
        estimate_controller::list_regions
    ),
    components(
        schemas(
            estimate_controller::EstimateResponse,
            estimate_controller::RegionInfo,
            geo::Coordinate,
            geo::ResolvedLocation,
            solar::AreaMeasurement,
            solar::UnitSystem,
            solar::IrradianceValue,
            solar::Provenance,
            solar::Orientation,
            solar::AreaPolicy,
            solar::CapacityModel,
            solar::EngineParams,
            solar::EstimationResult,
            solar::PanelType,
            solar::Advisory
        )
    ),
    tags(
        (name = "solar-rooftop-estimator", description = "Rooftop Solar Potential Estimation API")
    )
)]
pub struct ApiDoc;
