use crate::application::http::{chat::router::ChatApiDoc, health::router::HealthApiDoc};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "NutriScan Chat Relay API"
    ),
    nest(
        (path = "/chat", api = ChatApiDoc),
        (path = "/health", api = HealthApiDoc),
    )
)]
pub struct ApiDoc;
