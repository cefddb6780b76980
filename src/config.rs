use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::{EstimateError, EstimateResult};
use crate::models::solar::{EngineConstants, EngineParams};

fn default_server_port() -> u16 { 3000 }
fn default_geocode_url() -> String { "https://nominatim.openstreetmap.org/search".to_string() }
fn default_footprint_url() -> String { "https://overpass-api.de/api/interpreter".to_string() }
fn default_irradiance_url() -> String { "https://re.jrc.ec.europa.eu/api/v5_2/PVcalc".to_string() }
fn default_user_agent() -> String {
    format!("solar-rooftop-estimator/{}", env!("CARGO_PKG_VERSION"))
}
fn default_timeout_secs() -> u64 { 12 }
fn default_search_radius_m() -> f64 { 30.0 }
fn default_roof_area_sqm() -> f64 { 100.0 }
fn default_system_loss_percent() -> f64 { 14.0 }

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub providers: ProviderConfig,
    /// Default variant selection; callers may override per request.
    #[serde(default)]
    pub engine_defaults: EngineParams,
    #[serde(default)]
    pub constants: EngineConstants,
    #[serde(default)]
    pub regions: RegionTables,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: default_server_port() }
    }
}

/// Endpoints and request parameters for the three external services.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_geocode_url")]
    pub geocode_url: String,
    #[serde(default = "default_footprint_url")]
    pub footprint_url: String,
    #[serde(default = "default_irradiance_url")]
    pub irradiance_url: String,
    /// Client identifier sent with every outbound call — the public
    /// geocoder throttles anonymous traffic.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Per-call timeout; no external call may block indefinitely.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Footprint search radius around the geocoded point.
    #[serde(default = "default_search_radius_m")]
    pub search_radius_m: f64,
    /// Roof area assumed when no footprint is found.
    #[serde(default = "default_roof_area_sqm")]
    pub default_roof_area_sqm: f64,
    /// Standard system-loss assumption passed to the irradiance service.
    #[serde(default = "default_system_loss_percent")]
    pub system_loss_percent: f64,
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            geocode_url: default_geocode_url(),
            footprint_url: default_footprint_url(),
            irradiance_url: default_irradiance_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            search_radius_m: default_search_radius_m(),
            default_roof_area_sqm: default_roof_area_sqm(),
            system_loss_percent: default_system_loss_percent(),
        }
    }
}

/// The two static region lookups. Both maps are keyed by the same canonical
/// region-name set; `validate` enforces that at load time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionTables {
    /// Region → average annual irradiance, kWh/m²/yr.
    pub irradiance_kwh_sqm_year: BTreeMap<String, f64>,
    /// Region → electricity tariff, currency per kWh.
    pub tariff_per_kwh: BTreeMap<String, f64>,
    /// Last rung of the irradiance fallback chain.
    pub default_irradiance_kwh_sqm_year: f64,
    pub default_tariff: f64,
}

impl RegionTables {
    pub fn irradiance_for(&self, region: &str) -> Option<f64> {
        self.irradiance_kwh_sqm_year.get(region).copied()
    }

    pub fn tariff_for(&self, region: &str) -> Option<f64> {
        self.tariff_per_kwh.get(region).copied()
    }

    pub fn region_names(&self) -> Vec<String> {
        self.tariff_per_kwh.keys().cloned().collect()
    }

    /// Every tariff key must have a matching irradiance key and vice versa.
    pub fn validate(&self) -> EstimateResult<()> {
        for key in self.tariff_per_kwh.keys() {
            if !self.irradiance_kwh_sqm_year.contains_key(key) {
                return Err(EstimateError::Config(format!(
                    "region {:?} has a tariff but no irradiance average",
                    key
                )));
            }
        }
        for key in self.irradiance_kwh_sqm_year.keys() {
            if !self.tariff_per_kwh.contains_key(key) {
                return Err(EstimateError::Config(format!(
                    "region {:?} has an irradiance average but no tariff",
                    key
                )));
            }
        }
        Ok(())
    }
}

impl Default for RegionTables {
    fn default() -> Self {
        let entries: [(&str, f64, f64); 7] = [
            // (region, avg irradiance kWh/m²/yr, tariff ₹/kWh)
            ("Rajasthan", 1900.0, 6.0),
            ("Delhi", 1750.0, 8.0),
            ("Maharashtra", 1800.0, 9.0),
            ("Uttar Pradesh", 1700.0, 7.0),
            ("Gujarat", 1850.0, 7.5),
            ("Tamil Nadu", 1800.0, 6.5),
            ("Karnataka", 1850.0, 7.2),
        ];
        let mut irradiance = BTreeMap::new();
        let mut tariffs = BTreeMap::new();
        for (name, irr, tariff) in entries {
            irradiance.insert(name.to_string(), irr);
            tariffs.insert(name.to_string(), tariff);
        }
        Self {
            irradiance_kwh_sqm_year: irradiance,
            tariff_per_kwh: tariffs,
            default_irradiance_kwh_sqm_year: 1700.0,
            default_tariff: 7.0,
        }
    }
}

impl Config {
    pub fn load(path: &str) -> EstimateResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| EstimateError::Config(format!("failed to read {}: {}", path, e)))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| EstimateError::Config(format!("failed to parse {}: {}", path, e)))?;
        config.regions.validate()?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            providers: ProviderConfig::default(),
            engine_defaults: EngineParams::default(),
            constants: EngineConstants::default(),
            regions: RegionTables::default(),
        }
    }
}
