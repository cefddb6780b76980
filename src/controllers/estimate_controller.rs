use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::config::Config;
use crate::error::EstimateError;
use crate::models::geo::ResolvedLocation;
use crate::models::solar::{
    Advisory, AreaMeasurement, AreaPolicy, CapacityModel, EngineParams, EstimationResult,
    IrradianceValue, Orientation, PanelType, UnitSystem,
};
use crate::services::pipeline::{EstimateRequest, EstimationPipeline};

/// Shared handler state: immutable config plus the provider-wired pipeline.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pipeline: Arc<EstimationPipeline>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct EstimateQuery {
    /// Free-text address; required unless `roof_area` is given.
    pub address: Option<String>,
    /// Manual roof area in the selected unit system; skips the footprint
    /// lookup.
    pub roof_area: Option<f64>,
    /// Shadow quantity, interpreted per the area policy.
    pub shadow: Option<f64>,
    pub orientation: Option<Orientation>,
    /// Region key for tariff and irradiance fallback tables.
    pub region: Option<String>,
    /// Tariff override, currency per kWh.
    pub tariff: Option<f64>,
    pub unit: Option<UnitSystem>,
    pub area_policy: Option<AreaPolicy>,
    pub capacity_model: Option<CapacityModel>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EstimateResponse {
    pub timestamp: DateTime<Utc>,
    pub location: Option<ResolvedLocation>,
    pub roof_area: AreaMeasurement,
    pub irradiance: IrradianceValue,
    pub tariff: f64,
    pub params: EngineParams,
    pub result: EstimationResult,
    pub recommended_panel: PanelType,
    pub advisories: Vec<Advisory>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegionInfo {
    pub name: String,
    pub tariff_per_kwh: f64,
    pub irradiance_kwh_sqm_year: f64,
}

/// GET /api/estimate
/// Run a rooftop solar estimation
///
/// Resolves the address, derives a roof area (footprint or manual), fetches
/// irradiance with its fallback chain, and returns the full metric set plus
/// any degradation advisories.
#[utoipa::path(
    get,
    path = "/api/estimate",
    params(EstimateQuery),
    responses(
        (status = 200, description = "Estimation result", body = EstimateResponse),
        (status = 422, description = "No roof area determinable by any path"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_estimate(
    State(state): State<AppState>,
    Query(query): Query<EstimateQuery>,
) -> impl IntoResponse {
    let defaults = state.config.engine_defaults;
    let params = EngineParams {
        unit_system: query.unit.unwrap_or(defaults.unit_system),
        area_policy: query.area_policy.unwrap_or(defaults.area_policy),
        capacity_model: query.capacity_model.unwrap_or(defaults.capacity_model),
    };
    let request = EstimateRequest {
        address: query.address,
        roof_area: query.roof_area,
        shadow: query.shadow,
        orientation: query.orientation.unwrap_or_default(),
        region: query.region.unwrap_or_default(),
        tariff: query.tariff,
        params,
    };

    match state.pipeline.run(request).await {
        Ok(report) => {
            let response = EstimateResponse {
                timestamp: Utc::now(),
                location: report.location,
                roof_area: report.roof_area,
                irradiance: report.irradiance,
                tariff: report.tariff,
                params,
                result: report.result,
                recommended_panel: report.panel,
                advisories: report.advisories,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(EstimateError::DataUnavailable(msg)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({ "error": msg })),
        )
            .into_response(),
        Err(e) => {
            log::error!("estimation failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// GET /api/regions
/// List the region reference tables
///
/// Returns every configured region with its tariff and average annual
/// irradiance. The two tables are key-consistent by construction.
#[utoipa::path(
    get,
    path = "/api/regions",
    responses(
        (status = 200, description = "Configured regions", body = Vec<RegionInfo>)
    )
)]
pub async fn list_regions(State(state): State<AppState>) -> impl IntoResponse {
    let tables = &state.config.regions;
    let regions: Vec<RegionInfo> = tables
        .region_names()
        .into_iter()
        .map(|name| RegionInfo {
            tariff_per_kwh: tables.tariff_for(&name).unwrap_or(tables.default_tariff),
            irradiance_kwh_sqm_year: tables
                .irradiance_for(&name)
                .unwrap_or(tables.default_irradiance_kwh_sqm_year),
            name,
        })
        .collect();
    Json(regions).into_response()
}
