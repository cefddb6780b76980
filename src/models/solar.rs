use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Square feet per square meter. The single conversion constant used at the
/// designated unit boundaries (`AreaMeasurement::to_unit`,
/// `IrradianceValue::per_unit`) — nowhere else.
pub const SQFT_PER_SQM: f64 = 10.7639;

// ─── Unit-tagged quantities ──────────────────────────────────────────────────

/// Canonical area unit for a whole estimation request. Thresholds, ratios and
/// irradiance are resolved against this before any arithmetic happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum UnitSystem {
    #[serde(rename = "sqm")]
    SquareMeters,
    #[serde(rename = "sqft")]
    SquareFeet,
}

impl Default for UnitSystem {
    fn default() -> Self {
        UnitSystem::SquareMeters
    }
}

/// Nonnegative area with an explicit unit tag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct AreaMeasurement {
    pub value: f64,
    pub unit: UnitSystem,
}

impl AreaMeasurement {
    pub fn square_meters(value: f64) -> Self {
        Self { value: value.max(0.0), unit: UnitSystem::SquareMeters }
    }

    pub fn square_feet(value: f64) -> Self {
        Self { value: value.max(0.0), unit: UnitSystem::SquareFeet }
    }

    /// Converts into the requested unit. Identity when already there.
    pub fn to_unit(self, unit: UnitSystem) -> Self {
        let value = match (self.unit, unit) {
            (UnitSystem::SquareMeters, UnitSystem::SquareFeet) => self.value * SQFT_PER_SQM,
            (UnitSystem::SquareFeet, UnitSystem::SquareMeters) => self.value / SQFT_PER_SQM,
            _ => self.value,
        };
        Self { value, unit }
    }
}

/// Where an irradiance figure came from. Materially affects how much the
/// caller should trust the estimate, so it travels with the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    MeasuredApi,
    RegionalAverage,
    HardcodedDefault,
}

/// Annual solar energy per unit area, canonically kWh/m²/year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct IrradianceValue {
    pub kwh_per_sqm_year: f64,
    pub provenance: Provenance,
}

impl IrradianceValue {
    pub fn new(kwh_per_sqm_year: f64, provenance: Provenance) -> Self {
        Self { kwh_per_sqm_year: kwh_per_sqm_year.max(0.0), provenance }
    }

    /// Irradiance per unit of the configured area unit.
    ///
    /// The per-sqft figure is the per-m² figure divided by the area
    /// conversion constant. Dimensionally consistent with the sqft area it
    /// multiplies; not validated against the service's own unit semantics.
    pub fn per_unit(&self, unit: UnitSystem) -> f64 {
        match unit {
            UnitSystem::SquareMeters => self.kwh_per_sqm_year,
            UnitSystem::SquareFeet => self.kwh_per_sqm_year / SQFT_PER_SQM,
        }
    }
}

// ─── Request-side enumerations ───────────────────────────────────────────────

/// Compass facing of the panel plane. Fixed derate lookup; nothing else
/// feeds into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    South,
    East,
    West,
    North,
}

impl Orientation {
    pub fn factor(self) -> f64 {
        match self {
            Orientation::South => 1.0,
            Orientation::East => 0.8,
            Orientation::West => 0.8,
            Orientation::North => 0.5,
        }
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Orientation::South
    }
}

/// How the shadow input is interpreted when deriving effective area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AreaPolicy {
    /// Shadow input is a covered area subtracted from the total, floored at 0.
    Subtract,
    /// Shadow input is a shadow-free area; effective area is min(total, it).
    ShadowFreeMin,
}

impl Default for AreaPolicy {
    fn default() -> Self {
        AreaPolicy::Subtract
    }
}

/// How installed capacity is derived. The two paths diverge whenever local
/// irradiance deviates from the norm embedded in the specific-yield constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CapacityModel {
    /// Capacity = effective area / fixed area-per-kW ratio (unit-specific).
    AreaRatio,
    /// Capacity = annual generation / fixed specific yield (kWh/kW/yr).
    SpecificYield,
}

impl Default for CapacityModel {
    fn default() -> Self {
        CapacityModel::AreaRatio
    }
}

/// Panel technology class suggested for a given roof size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PanelType {
    Monocrystalline,
    Polycrystalline,
    ThinFilm,
}

// ─── Engine configuration ────────────────────────────────────────────────────

/// Selects which of the observed estimation variants applies to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub struct EngineParams {
    #[serde(default)]
    pub unit_system: UnitSystem,
    #[serde(default)]
    pub area_policy: AreaPolicy,
    #[serde(default)]
    pub capacity_model: CapacityModel,
}

fn default_panel_efficiency() -> f64 { 0.20 }
fn default_system_derate() -> f64 { 0.85 }
fn default_cost_per_kw() -> f64 { 50_000.0 }
fn default_co2_kg_per_kwh() -> f64 { 0.82 }
fn default_sqm_per_kw() -> f64 { 10.0 }
fn default_sqft_per_kw() -> f64 { 100.0 }
fn default_specific_yield() -> f64 { 1400.0 }

/// Physical and economic constants, injected rather than hardcoded so tests
/// and deployments can substitute their own assumptions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EngineConstants {
    #[serde(default = "default_panel_efficiency")]
    pub panel_efficiency: f64,
    #[serde(default = "default_system_derate")]
    pub system_derate: f64,
    /// Installed cost per kW, in currency units (INR).
    #[serde(default = "default_cost_per_kw")]
    pub cost_per_kw: f64,
    /// Grid emissions factor, kg CO₂ per kWh.
    #[serde(default = "default_co2_kg_per_kwh")]
    pub co2_kg_per_kwh: f64,
    /// Area-per-kW ratios, one per canonical unit — never cross-applied.
    #[serde(default = "default_sqm_per_kw")]
    pub sqm_per_kw: f64,
    #[serde(default = "default_sqft_per_kw")]
    pub sqft_per_kw: f64,
    /// Expected annual output per kW installed (kWh/kW/yr).
    #[serde(default = "default_specific_yield")]
    pub specific_yield_kwh_per_kw: f64,
}

impl Default for EngineConstants {
    fn default() -> Self {
        Self {
            panel_efficiency: default_panel_efficiency(),
            system_derate: default_system_derate(),
            cost_per_kw: default_cost_per_kw(),
            co2_kg_per_kwh: default_co2_kg_per_kwh(),
            sqm_per_kw: default_sqm_per_kw(),
            sqft_per_kw: default_sqft_per_kw(),
            specific_yield_kwh_per_kw: default_specific_yield(),
        }
    }
}

// ─── Outputs ─────────────────────────────────────────────────────────────────

/// Full set of derived solar metrics for one request. Areas are in the
/// request's unit system; energy in kWh/year; money in currency units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct EstimationResult {
    pub effective_area: f64,
    pub capacity_kw: f64,
    pub annual_generation_kwh: f64,
    pub annual_savings: f64,
    pub installation_cost: f64,
    /// Absent (not zero, not infinite) when annual savings ≤ 0.
    pub payback_years: Option<f64>,
    pub co2_avoided_tons: f64,
}

/// Non-fatal degradation notice. Each degraded pipeline step surfaces its
/// own advisory, independent of the others.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    /// Address could not be geocoded; estimation continued on manual area
    /// with region-table irradiance.
    GeocodeFailed,
    /// No building footprint found; a default roof area was assumed.
    FootprintUnavailable { default_area_m2: f64 },
    /// Live irradiance was unavailable; a fallback value was used.
    IrradianceFallback { provenance: Provenance },
}
