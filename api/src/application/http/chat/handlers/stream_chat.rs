use axum::{
    body::Body,
    extract::State,
    http::header::{CACHE_CONTROL, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use nutriscan_core::domain::chat::{ports::ChatRelayService, value_objects::RelayChatInput};

use crate::application::http::{
    chat::validators::StreamChatValidator,
    server::{
        api_entities::api_error::{ApiError, ApiErrorResponse, ValidateJson},
        app_state::AppState,
    },
};

#[utoipa::path(
    post,
    path = "/stream",
    tag = "chat",
    summary = "Stream a chat reply",
    description = "Forwards the message, its analysis context and the prior turns to the completion gateway and pipes the gateway's event stream back unchanged.",
    request_body = StreamChatValidator,
    responses(
        (status = 200, content_type = "text/event-stream", body = String, description = "Raw server-sent events from the gateway"),
        (status = 400, body = ApiErrorResponse),
        (status = 402, body = ApiErrorResponse),
        (status = 429, body = ApiErrorResponse),
        (status = 500, body = ApiErrorResponse)
    )
)]
pub async fn stream_chat(
    State(state): State<AppState>,
    ValidateJson(payload): ValidateJson<StreamChatValidator>,
) -> Result<Response, ApiError> {
    let stream = state
        .service
        .relay_chat(RelayChatInput::from(payload))
        .await
        .map_err(ApiError::from)?;

    Ok((
        [(CONTENT_TYPE, "text/event-stream"), (CACHE_CONTROL, "no-cache")],
        Body::from_stream(stream),
    )
        .into_response())
}
