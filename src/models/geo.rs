use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ─── Core geographic value types ─────────────────────────────────────────────

/// WGS84 coordinate pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Validating constructor. Rejects out-of-range and non-finite values —
    /// external services return coordinates as text, so anything can arrive.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return None;
        }
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return None;
        }
        Some(Self { latitude, longitude })
    }
}

/// Geocoding result: coordinate plus the service's display label.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ResolvedLocation {
    pub coordinate: Coordinate,
    pub display_name: String,
}

/// Closed ring of (longitude, latitude) vertices describing a building
/// footprint. Vertex order follows the source response.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    vertices: Vec<(f64, f64)>,
}

impl Ring {
    /// Builds a ring from (lon, lat) pairs. An unclosed sequence is closed
    /// implicitly; fewer than 3 distinct vertices is rejected.
    pub fn new(mut vertices: Vec<(f64, f64)>) -> Option<Self> {
        if vertices.len() >= 2 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        let mut distinct = vertices.clone();
        distinct.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        distinct.dedup();
        if distinct.len() < 3 {
            return None;
        }
        if vertices
            .iter()
            .any(|(lon, lat)| !lon.is_finite() || !lat.is_finite())
        {
            return None;
        }
        Some(Self { vertices })
    }

    /// Open vertex list (closing edge implied).
    pub fn vertices(&self) -> &[(f64, f64)] {
        &self.vertices
    }

    pub fn min_lat(&self) -> f64 {
        self.vertices.iter().map(|v| v.1).fold(f64::INFINITY, f64::min)
    }

    pub fn max_lat(&self) -> f64 {
        self.vertices.iter().map(|v| v.1).fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn mid_lon(&self) -> f64 {
        let min = self.vertices.iter().map(|v| v.0).fold(f64::INFINITY, f64::min);
        let max = self.vertices.iter().map(|v| v.0).fold(f64::NEG_INFINITY, f64::max);
        (min + max) / 2.0
    }
}

// ─── Nominatim wire types ────────────────────────────────────────────────────

/// Single geocoder match. Latitude/longitude arrive as strings.
#[derive(Debug, Deserialize)]
pub struct GeocodeMatch {
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

// ─── Overpass wire types ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
pub struct OverpassElement {
    #[serde(default)]
    pub geometry: Vec<OverpassVertex>,
}

#[derive(Debug, Deserialize)]
pub struct OverpassVertex {
    pub lat: f64,
    pub lon: f64,
}
