use std::sync::Arc;

use crate::config::{Config, RegionTables};
use crate::error::{EstimateError, EstimateResult};
use crate::models::geo::ResolvedLocation;
use crate::models::solar::{
    Advisory, AreaMeasurement, AreaPolicy, EngineConstants, EngineParams, EstimationResult,
    IrradianceValue, Orientation, PanelType, Provenance,
};
use crate::services::estimator::{self, EstimationInput};
use crate::services::footprint::FootprintProvider;
use crate::services::geocode::GeocodeProvider;
use crate::services::irradiance::IrradianceProvider;

/// One estimation request, as collected from the caller.
#[derive(Debug, Clone, Default)]
pub struct EstimateRequest {
    /// Free-text address; drives geocoding, footprint and live irradiance.
    pub address: Option<String>,
    /// Manually supplied roof area in the request's unit system. Takes the
    /// place of the footprint lookup when present.
    pub roof_area: Option<f64>,
    /// Shadow quantity, interpreted per the configured area policy. Absent
    /// means "no shadow constraint" under either policy.
    pub shadow: Option<f64>,
    pub orientation: Orientation,
    /// Region key for the tariff and irradiance fallback tables.
    pub region: String,
    /// Caller tariff override, currency per kWh.
    pub tariff: Option<f64>,
    pub params: EngineParams,
}

/// Everything the caller gets back for one request.
#[derive(Debug, Clone)]
pub struct EstimateReport {
    pub location: Option<ResolvedLocation>,
    /// Total roof area used, in the request's unit system.
    pub roof_area: AreaMeasurement,
    pub irradiance: IrradianceValue,
    /// Tariff actually applied (override, region table, or default).
    pub tariff: f64,
    pub result: EstimationResult,
    pub panel: PanelType,
    pub advisories: Vec<Advisory>,
}

/// Orchestrates one request: geocode, then footprint and irradiance keyed
/// by the coordinate, then the pure engine and the recommender. Each stage
/// degrades independently to its documented fallback; only "no area by any
/// path" is a hard failure.
pub struct EstimationPipeline {
    geocoder: Arc<dyn GeocodeProvider>,
    footprints: Arc<dyn FootprintProvider>,
    irradiance: Arc<dyn IrradianceProvider>,
    search_radius_m: f64,
    default_roof_area_sqm: f64,
    tables: RegionTables,
    constants: EngineConstants,
}

impl EstimationPipeline {
    pub fn new(
        geocoder: Arc<dyn GeocodeProvider>,
        footprints: Arc<dyn FootprintProvider>,
        irradiance: Arc<dyn IrradianceProvider>,
        config: &Config,
    ) -> Self {
        Self {
            geocoder,
            footprints,
            irradiance,
            search_radius_m: config.providers.search_radius_m,
            default_roof_area_sqm: config.providers.default_roof_area_sqm,
            tables: config.regions.clone(),
            constants: config.constants,
        }
    }

    pub async fn run(&self, request: EstimateRequest) -> EstimateResult<EstimateReport> {
        let mut advisories = Vec::new();
        let unit = request.params.unit_system;

        let address = request
            .address
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty());

        let location = match address {
            Some(addr) => {
                let resolved = self.geocoder.resolve(addr).await;
                if resolved.is_none() {
                    advisories.push(Advisory::GeocodeFailed);
                }
                resolved
            }
            None => None,
        };
        let coordinate = location.as_ref().map(|l| l.coordinate);

        // Roof area and irradiance. The two lookups are independent once
        // the coordinate is known, so they run joined.
        let (roof_area, irradiance) = match request.roof_area {
            Some(manual) => {
                let area = AreaMeasurement { value: manual.max(0.0), unit };
                let irradiance = self
                    .irradiance
                    .resolve(coordinate.as_ref(), &request.region)
                    .await;
                (area, irradiance)
            }
            None => {
                let coordinate = coordinate.ok_or_else(|| {
                    EstimateError::DataUnavailable(
                        "no roof area determinable: address unresolved and no area supplied"
                            .to_string(),
                    )
                })?;
                let (footprint, irradiance) = tokio::join!(
                    self.footprints.footprint_area(&coordinate, self.search_radius_m),
                    self.irradiance.resolve(Some(&coordinate), &request.region),
                );
                let area = match footprint {
                    Some(area) => area.to_unit(unit),
                    None => {
                        advisories.push(Advisory::FootprintUnavailable {
                            default_area_m2: self.default_roof_area_sqm,
                        });
                        AreaMeasurement::square_meters(self.default_roof_area_sqm).to_unit(unit)
                    }
                };
                (area, irradiance)
            }
        };

        if irradiance.provenance != Provenance::MeasuredApi {
            advisories.push(Advisory::IrradianceFallback { provenance: irradiance.provenance });
        }

        let tariff = request
            .tariff
            .or_else(|| self.tables.tariff_for(&request.region))
            .unwrap_or(self.tables.default_tariff)
            .max(0.0);

        // Absent shadow input means "unconstrained" under either policy.
        let shadow = match request.params.area_policy {
            AreaPolicy::Subtract => request.shadow.unwrap_or(0.0).max(0.0),
            AreaPolicy::ShadowFreeMin => request.shadow.unwrap_or(roof_area.value).max(0.0),
        };

        let input = EstimationInput {
            total_area: roof_area.value,
            shadow,
            irradiance_per_unit: irradiance.per_unit(unit),
            orientation_factor: request.orientation.factor(),
            tariff,
        };
        let result = estimator::estimate(&input, &request.params, &self.constants);
        let panel = estimator::recommend_panel(roof_area.value, unit);

        log::info!(
            "estimate: area {:.1} {:?}, irradiance {:.0} kWh/m²/yr ({:?}), {:.1} kW, {:.0} kWh/yr",
            roof_area.value,
            unit,
            irradiance.kwh_per_sqm_year,
            irradiance.provenance,
            result.capacity_kw,
            result.annual_generation_kwh
        );

        Ok(EstimateReport {
            location,
            roof_area,
            irradiance,
            tariff,
            result,
            panel,
            advisories,
        })
    }
}
