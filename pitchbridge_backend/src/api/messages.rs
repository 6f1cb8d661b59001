use super::{ApiError, ApiResult, AppState};
use crate::messaging::{MessageService, MessageView};
use crate::pitches::PitchService;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures_util::stream::Stream;
use futures_util::StreamExt;
use serde::Deserialize;
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;

#[derive(Debug, Deserialize)]
pub(crate) struct SendMessageRequest {
    sender_id: String,
    receiver_id: String,
    content: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HistoryParams {
    participant_id: String,
}

pub(crate) async fn send_message(
    State(state): State<AppState>,
    Path(pitch_id): Path<String>,
    Json(request): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<MessageView>), ApiError> {
    let message = MessageService::new(state.database.clone(), state.chat.clone()).send(
        &pitch_id,
        &request.sender_id,
        &request.receiver_id,
        &request.content,
    )?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub(crate) async fn message_history(
    State(state): State<AppState>,
    Path(pitch_id): Path<String>,
    Query(params): Query<HistoryParams>,
) -> ApiResult<Vec<MessageView>> {
    let messages = MessageService::new(state.database.clone(), state.chat.clone())
        .history(&pitch_id, &params.participant_id)?;
    Ok(Json(messages))
}

/// Server-sent events feed of new messages on one pitch. Lagging
/// subscribers silently skip messages they fell behind on; clients
/// reconcile through the history endpoint.
pub(crate) async fn message_events(
    State(state): State<AppState>,
    Path(pitch_id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    PitchService::new(state.database.clone()).get(&pitch_id)?;
    let receiver = state.chat.subscribe(&pitch_id);
    let stream = BroadcastStream::new(receiver).filter_map(|result| async move {
        match result {
            Ok(message) => match serde_json::to_string(&message) {
                Ok(json) => Some(Ok(Event::default().event("message").data(json))),
                Err(err) => {
                    tracing::warn!(error = ?err, "failed to serialize chat event");
                    None
                }
            },
            Err(_) => None,
        }
    });
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
