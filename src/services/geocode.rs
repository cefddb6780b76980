use async_trait::async_trait;
use reqwest::Client;

use crate::config::ProviderConfig;
use crate::error::EstimateResult;
use crate::models::geo::{Coordinate, GeocodeMatch, ResolvedLocation};

/// Turns a free-text address into a coordinate plus display label.
///
/// Every failure mode — network error, empty result set, malformed
/// response — collapses to `None` at this boundary. The first match is
/// authoritative; there is no ambiguity handling.
#[async_trait]
pub trait GeocodeProvider: Send + Sync {
    async fn resolve(&self, address: &str) -> Option<ResolvedLocation>;
}

/// Nominatim-style geocoder client.
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
}

impl NominatimGeocoder {
    /// The public geocoding service rejects anonymous traffic, so the
    /// client is built with an identifying `User-Agent`.
    pub fn new(cfg: &ProviderConfig) -> EstimateResult<Self> {
        let client = Client::builder()
            .user_agent(cfg.user_agent.clone())
            .timeout(cfg.timeout())
            .build()?;
        Ok(Self { client, base_url: cfg.geocode_url.clone() })
    }

    async fn fetch(&self, address: &str) -> EstimateResult<Vec<GeocodeMatch>> {
        let matches = self
            .client
            .get(&self.base_url)
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<GeocodeMatch>>()
            .await?;
        Ok(matches)
    }
}

#[async_trait]
impl GeocodeProvider for NominatimGeocoder {
    async fn resolve(&self, address: &str) -> Option<ResolvedLocation> {
        match self.fetch(address).await {
            Ok(matches) => location_from_matches(matches),
            Err(e) => {
                log::warn!("geocoding failed for {:?}: {}", address, e);
                None
            }
        }
    }
}

/// Converts the best match into a validated location. Coordinates arrive as
/// text; anything unparseable or out of range is a non-match.
pub fn location_from_matches(matches: Vec<GeocodeMatch>) -> Option<ResolvedLocation> {
    let best = matches.into_iter().next()?;
    let latitude = best.lat.parse::<f64>().ok()?;
    let longitude = best.lon.parse::<f64>().ok()?;
    let coordinate = Coordinate::new(latitude, longitude)?;
    Some(ResolvedLocation {
        coordinate,
        display_name: best.display_name.unwrap_or_default(),
    })
}
