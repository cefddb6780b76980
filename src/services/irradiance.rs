use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::config::{ProviderConfig, RegionTables};
use crate::error::EstimateResult;
use crate::models::geo::Coordinate;
use crate::models::solar::{IrradianceValue, Provenance};

/// Annual-yield field names tried in order. The irradiance service's
/// response schema is not stable across deployments; tolerating the drift
/// is deliberate.
const ANNUAL_YIELD_FIELDS: [&str; 2] = ["E_y", "E_yr"];

/// Resolves annual irradiance for a location.
///
/// Never fails: the engine cannot run without irradiance, so the chain ends
/// in a constant. The provenance tag tells the caller which rung was used.
/// `coordinate` is `None` when geocoding failed but a manual roof area kept
/// the request alive — the live service is skipped in that case.
#[async_trait]
pub trait IrradianceProvider: Send + Sync {
    async fn resolve(&self, coordinate: Option<&Coordinate>, region: &str) -> IrradianceValue;
}

/// PVGIS-style irradiance client with the region-table fallback chain.
pub struct PvgisIrradiance {
    client: Client,
    base_url: String,
    system_loss_percent: f64,
    tables: RegionTables,
}

impl PvgisIrradiance {
    pub fn new(cfg: &ProviderConfig, tables: RegionTables) -> EstimateResult<Self> {
        let client = Client::builder()
            .user_agent(cfg.user_agent.clone())
            .timeout(cfg.timeout())
            .build()?;
        Ok(Self {
            client,
            base_url: cfg.irradiance_url.clone(),
            system_loss_percent: cfg.system_loss_percent,
            tables,
        })
    }

    async fn fetch(&self, coordinate: &Coordinate) -> EstimateResult<Value> {
        let body = self
            .client
            .get(&self.base_url)
            .query(&[
                ("lat", coordinate.latitude.to_string()),
                ("lon", coordinate.longitude.to_string()),
                ("peakpower", "1".to_string()),
                ("loss", self.system_loss_percent.to_string()),
                ("outputformat", "json".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;
        Ok(body)
    }

    fn fallback_value(&self, region: &str) -> IrradianceValue {
        match self.tables.irradiance_for(region) {
            Some(avg) => IrradianceValue::new(avg, Provenance::RegionalAverage),
            None => IrradianceValue::new(
                self.tables.default_irradiance_kwh_sqm_year,
                Provenance::HardcodedDefault,
            ),
        }
    }
}

#[async_trait]
impl IrradianceProvider for PvgisIrradiance {
    async fn resolve(&self, coordinate: Option<&Coordinate>, region: &str) -> IrradianceValue {
        if let Some(coordinate) = coordinate {
            match self.fetch(coordinate).await {
                Ok(body) => {
                    if let Some(yield_kwh) = annual_yield_from(&body) {
                        return IrradianceValue::new(yield_kwh, Provenance::MeasuredApi);
                    }
                    log::warn!("irradiance response carried no known annual-yield field");
                }
                Err(e) => log::warn!(
                    "irradiance fetch failed at ({:.4}, {:.4}): {}",
                    coordinate.latitude,
                    coordinate.longitude,
                    e
                ),
            }
        }
        self.fallback_value(region)
    }
}

/// Extracts the annual total energy yield (kWh/m²/yr) from the nested
/// response, probing the field-name candidates in order.
pub fn annual_yield_from(body: &Value) -> Option<f64> {
    let fixed = &body["outputs"]["totals"]["fixed"];
    for field in ANNUAL_YIELD_FIELDS {
        if let Some(v) = fixed[field].as_f64() {
            if v.is_finite() && v >= 0.0 {
                return Some(v);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;
    use serde_json::json;

    #[test]
    fn primary_field_is_parsed() {
        let body = json!({"outputs": {"totals": {"fixed": {"E_y": 1712.4}}}});
        assert_eq!(annual_yield_from(&body), Some(1712.4));
    }

    #[test]
    fn alternate_field_is_tried_after_primary() {
        let body = json!({"outputs": {"totals": {"fixed": {"E_yr": 1650.0}}}});
        assert_eq!(annual_yield_from(&body), Some(1650.0));
    }

    #[test]
    fn primary_wins_when_both_present() {
        let body = json!({"outputs": {"totals": {"fixed": {"E_y": 1712.4, "E_yr": 999.0}}}});
        assert_eq!(annual_yield_from(&body), Some(1712.4));
    }

    #[test]
    fn unknown_fields_yield_nothing() {
        let body = json!({"outputs": {"totals": {"fixed": {"E_monthly": 140.0}}}});
        assert_eq!(annual_yield_from(&body), None);
        assert_eq!(annual_yield_from(&json!({})), None);
    }

    #[test]
    fn negative_yield_is_rejected() {
        let body = json!({"outputs": {"totals": {"fixed": {"E_y": -5.0}}}});
        assert_eq!(annual_yield_from(&body), None);
    }

    #[tokio::test]
    async fn unreachable_service_falls_back_to_regional_average() {
        let cfg = ProviderConfig {
            // Port 9 (discard) refuses the connection immediately
            irradiance_url: "http://127.0.0.1:9/pvcalc".to_string(),
            timeout_secs: 2,
            ..ProviderConfig::default()
        };
        let provider = PvgisIrradiance::new(&cfg, RegionTables::default()).unwrap();
        let coord = Coordinate::new(26.9124, 75.7873).unwrap();

        let value = provider.resolve(Some(&coord), "Rajasthan").await;
        assert_eq!(value.provenance, Provenance::RegionalAverage);
        assert_eq!(value.kwh_per_sqm_year, 1900.0);
    }

    #[tokio::test]
    async fn missing_coordinate_skips_straight_to_fallback() {
        let provider =
            PvgisIrradiance::new(&ProviderConfig::default(), RegionTables::default()).unwrap();
        let value = provider.resolve(None, "Gujarat").await;
        assert_eq!(value.provenance, Provenance::RegionalAverage);
        assert_eq!(value.kwh_per_sqm_year, 1850.0);
    }

    #[test]
    fn fallback_prefers_region_then_default() {
        let provider =
            PvgisIrradiance::new(&ProviderConfig::default(), RegionTables::default()).unwrap();

        let regional = provider.fallback_value("Rajasthan");
        assert_eq!(regional.provenance, Provenance::RegionalAverage);

        let unknown = provider.fallback_value("Atlantis");
        assert_eq!(unknown.provenance, Provenance::HardcodedDefault);
        assert_eq!(
            unknown.kwh_per_sqm_year,
            RegionTables::default().default_irradiance_kwh_sqm_year
        );
    }
}
