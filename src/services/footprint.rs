use async_trait::async_trait;
use reqwest::Client;

use crate::config::ProviderConfig;
use crate::error::EstimateResult;
use crate::models::geo::{Coordinate, OverpassResponse, Ring};
use crate::models::solar::AreaMeasurement;
use crate::services::projection;

/// Derives a roof area from a building-footprint lookup around a point.
///
/// `None` means no usable footprint (no elements, degenerate geometry,
/// network failure) — the caller substitutes its default area and carries
/// on; this boundary never blocks estimation.
#[async_trait]
pub trait FootprintProvider: Send + Sync {
    async fn footprint_area(
        &self,
        coordinate: &Coordinate,
        search_radius_m: f64,
    ) -> Option<AreaMeasurement>;
}

/// Overpass-style footprint client.
pub struct OverpassFootprint {
    client: Client,
    base_url: String,
}

impl OverpassFootprint {
    pub fn new(cfg: &ProviderConfig) -> EstimateResult<Self> {
        let client = Client::builder()
            .user_agent(cfg.user_agent.clone())
            .timeout(cfg.timeout())
            .build()?;
        Ok(Self { client, base_url: cfg.footprint_url.clone() })
    }

    async fn fetch(
        &self,
        coordinate: &Coordinate,
        search_radius_m: f64,
    ) -> EstimateResult<OverpassResponse> {
        let query = building_query(coordinate, search_radius_m);
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("data", query)])
            .send()
            .await?
            .error_for_status()?
            .json::<OverpassResponse>()
            .await?;
        Ok(response)
    }
}

#[async_trait]
impl FootprintProvider for OverpassFootprint {
    async fn footprint_area(
        &self,
        coordinate: &Coordinate,
        search_radius_m: f64,
    ) -> Option<AreaMeasurement> {
        match self.fetch(coordinate, search_radius_m).await {
            Ok(response) => measure_first_footprint(response),
            Err(e) => {
                log::warn!(
                    "footprint lookup failed at ({:.4}, {:.4}): {}",
                    coordinate.latitude,
                    coordinate.longitude,
                    e
                );
                None
            }
        }
    }
}

/// Declarative query for building ways around a point.
fn building_query(coordinate: &Coordinate, search_radius_m: f64) -> String {
    format!(
        "[out:json];way(around:{:.0},{},{})[\"building\"];out geom;",
        search_radius_m, coordinate.latitude, coordinate.longitude
    )
}

/// Picks the first returned element and measures its ring.
///
/// No disambiguation by size, distance or shape plausibility — response
/// order decides. Known simplification, kept as observed behavior.
pub fn measure_first_footprint(response: OverpassResponse) -> Option<AreaMeasurement> {
    let element = response.elements.into_iter().next()?;
    let vertices: Vec<(f64, f64)> = element.geometry.iter().map(|v| (v.lon, v.lat)).collect();
    let ring = Ring::new(vertices)?;
    let sqm = projection::ring_ground_area_sqm(&ring)?;
    Some(AreaMeasurement::square_meters(sqm))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_includes_radius_and_point() {
        let coord = Coordinate::new(28.6139, 77.209).unwrap();
        let q = building_query(&coord, 30.0);
        assert!(q.contains("around:30"));
        assert!(q.contains("28.6139"));
        assert!(q.contains("[\"building\"]"));
        assert!(q.ends_with("out geom;"));
    }

    #[test]
    fn zero_elements_is_unavailable() {
        let response: OverpassResponse = serde_json::from_str(r#"{"elements": []}"#).unwrap();
        assert!(measure_first_footprint(response).is_none());
    }

    #[test]
    fn first_element_ring_is_measured() {
        // ~22 m × ~16 m building near Delhi
        let body = r#"{"elements": [
            {"geometry": [
                {"lat": 28.6139, "lon": 77.2090},
                {"lat": 28.6139, "lon": 77.2092},
                {"lat": 28.61404, "lon": 77.2092},
                {"lat": 28.61404, "lon": 77.2090},
                {"lat": 28.6139, "lon": 77.2090}
            ]},
            {"geometry": [
                {"lat": 0.0, "lon": 0.0},
                {"lat": 0.0, "lon": 1.0},
                {"lat": 1.0, "lon": 1.0}
            ]}
        ]}"#;
        let response: OverpassResponse = serde_json::from_str(body).unwrap();
        let area = measure_first_footprint(response).unwrap();
        assert_eq!(area.unit, crate::models::solar::UnitSystem::SquareMeters);
        // ~19.6 m (lon span at this latitude) × ~15.6 m (lat span)
        assert!(area.value > 200.0 && area.value < 400.0, "got {}", area.value);
    }

    #[test]
    fn degenerate_geometry_is_unavailable() {
        let body = r#"{"elements": [{"geometry": [
            {"lat": 28.0, "lon": 77.0},
            {"lat": 28.0, "lon": 77.0}
        ]}]}"#;
        let response: OverpassResponse = serde_json::from_str(body).unwrap();
        assert!(measure_first_footprint(response).is_none());
    }
}
