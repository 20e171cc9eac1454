//! In-app message endpoints.

use api_types::message::{MessageSend, MessageView, MessagesResponse, UnreadResponse};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::Message;

use crate::{ServerError, server::ServerState};

fn message_view(message: Message) -> MessageView {
    MessageView {
        id: message.id,
        message_text: message.message_text,
        is_read: message.is_read,
        created_at: message.created_at,
    }
}

/// Lists the caller's messages and marks them read, like opening the inbox
/// in the dashboard.
pub async fn list(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<MessagesResponse>, ServerError> {
    let messages = state
        .engine
        .list_messages(&user.id, true)
        .await?
        .into_iter()
        .map(message_view)
        .collect();

    Ok(Json(MessagesResponse { messages }))
}

/// The notification badge count.
pub async fn unread(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<UnreadResponse>, ServerError> {
    let unread = state.engine.unread_message_count(&user.id).await?;
    Ok(Json(UnreadResponse { unread }))
}

/// Admin-side send.
pub async fn send(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<MessageSend>,
) -> Result<(StatusCode, Json<MessageView>), ServerError> {
    let message = state
        .engine
        .send_message(user.role()?, &payload.user_id, &payload.text)
        .await?;

    Ok((StatusCode::CREATED, Json(message_view(message))))
}
