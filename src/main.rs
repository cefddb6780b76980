mod api_docs;
mod config;
mod controllers;
mod error;
mod models;
mod routes;
mod services;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{response::Html, routing::get, Router};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::Scalar;

use crate::api_docs::ApiDoc;
use crate::config::Config;
use crate::controllers::estimate_controller::AppState;
use crate::error::EstimateResult;
use crate::routes::estimate_routes::api_routes;
use crate::services::footprint::OverpassFootprint;
use crate::services::geocode::NominatimGeocoder;
use crate::services::irradiance::PvgisIrradiance;
use crate::services::pipeline::EstimationPipeline;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 1. Load configuration; a missing or broken file degrades to defaults
    let config = match Config::load("config.json") {
        Ok(c) => c,
        Err(e) => {
            log::warn!("config.json not usable ({}); using built-in defaults", e);
            Config::default()
        }
    };
    log::info!(
        "starting solar-rooftop-estimator v{} ({} regions configured)",
        env!("CARGO_PKG_VERSION"),
        config.regions.region_names().len()
    );

    // 2. Wire the external providers into the pipeline
    let pipeline = match build_pipeline(&config) {
        Ok(p) => Arc::new(p),
        Err(e) => {
            log::error!("failed to build provider clients: {}", e);
            return;
        }
    };
    let state = AppState { config: config.clone(), pipeline };

    // 3. Serve the thin HTTP front-end
    let app = Router::new()
        .nest("/api", api_routes(state))
        .route(
            "/scalar",
            get(|| async { Html(Scalar::new(ApiDoc::openapi()).to_html()) }),
        )
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    log::info!("API server listening on http://{}", addr);
    log::info!("Scalar UI: http://{}/scalar", addr);

    axum_server::bind(addr)
        .serve(app.into_make_service())
        .await
        .unwrap();
}

/// Builds the production provider set and the pipeline around it.
fn build_pipeline(config: &Config) -> EstimateResult<EstimationPipeline> {
    let geocoder = Arc::new(NominatimGeocoder::new(&config.providers)?);
    let footprints = Arc::new(OverpassFootprint::new(&config.providers)?);
    let irradiance = Arc::new(PvgisIrradiance::new(
        &config.providers,
        config.regions.clone(),
    )?);
    Ok(EstimationPipeline::new(geocoder, footprints, irradiance, config))
}
