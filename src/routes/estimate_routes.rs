use axum::{routing::get, Router};

use crate::controllers::estimate_controller::{get_estimate, list_regions, AppState};

/// Build the `/api/*` sub-router. Handlers share one `AppState` carrying
/// the config and the provider-wired pipeline.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/estimate", get(get_estimate))
        .route("/regions", get(list_regions))
        .with_state(state)
}
