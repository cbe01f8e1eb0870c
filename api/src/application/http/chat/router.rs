use axum::{Router, routing::post};
use utoipa::OpenApi;

use super::handlers::stream_chat::{__path_stream_chat, stream_chat};
use crate::application::http::server::app_state::AppState;

#[derive(OpenApi)]
#[openapi(paths(stream_chat))]
pub struct ChatApiDoc;

pub fn chat_routes(state: AppState) -> Router<AppState> {
    Router::new().route(
        &format!("{}/chat/stream", state.args.server.root_path),
        post(stream_chat),
    )
}
