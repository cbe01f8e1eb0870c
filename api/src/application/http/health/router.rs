use axum::{Router, routing::get};
use utoipa::OpenApi;

use super::handlers::live::{__path_live, live};
use crate::application::http::server::app_state::AppState;

#[derive(OpenApi)]
#[openapi(paths(live))]
pub struct HealthApiDoc;

pub fn health_routes(root_path: &str) -> Router<AppState> {
    Router::new().route(&format!("{}/health/live", root_path), get(live))
}
