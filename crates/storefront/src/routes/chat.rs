//! Conversation route handlers.
//!
//! The conversation list, the open conversation and its messages are kept
//! in the session between requests.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use bazaar_core::models::{Conversation, Message};
use bazaar_core::{ConversationId, ProductId, UserId};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use super::ok;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::session_keys;
use crate::services::chat::ChatService;
use crate::state::AppState;
use crate::stores::{self, ChatState};

/// Start-conversation request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    pub product_id: ProductId,
    pub seller_id: UserId,
}

/// New message.
#[derive(Debug, Deserialize)]
pub struct SendRequest {
    pub content: String,
}

/// Conversation list with unread badge.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationsView {
    pub conversations: Vec<Conversation>,
    pub unread_total: usize,
    pub active: Option<ConversationId>,
}

impl From<&ChatState> for ConversationsView {
    fn from(chat: &ChatState) -> Self {
        Self {
            conversations: chat.conversations().to_vec(),
            unread_total: chat.unread_total(),
            active: chat.active(),
        }
    }
}

/// The open conversation's messages.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesView {
    pub conversation_id: Option<ConversationId>,
    pub messages: Vec<Message>,
}

impl From<&ChatState> for MessagesView {
    fn from(chat: &ChatState) -> Self {
        Self {
            conversation_id: chat.active(),
            messages: chat.messages().to_vec(),
        }
    }
}

/// Started conversation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartedView {
    pub conversation_id: ConversationId,
}

async fn load(session: &Session) -> Result<ChatState> {
    Ok(stores::load(session, session_keys::CHAT).await?)
}

async fn save(session: &Session, chat: &ChatState) -> Result<()> {
    Ok(stores::save(session, session_keys::CHAT, chat).await?)
}

/// Conversations, most recent activity first.
///
/// GET /api/conversations
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    let api = ChatService::new(state.supabase(), &user);
    let mut chat = load(&session).await?;

    chat.refresh(&api).await?;
    save(&session, &chat).await?;

    Ok(ok(ConversationsView::from(&chat)))
}

/// Find or create the conversation about a listing with its seller.
///
/// POST /api/conversations
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn start(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Json(request): Json<StartRequest>,
) -> Result<impl IntoResponse> {
    let api = ChatService::new(state.supabase(), &user);
    let mut chat = load(&session).await?;

    let conversation_id = chat
        .start(&api, request.product_id, request.seller_id)
        .await?;
    save(&session, &chat).await?;

    Ok(ok(StartedView { conversation_id }))
}

/// Open a conversation and mark its messages read.
///
/// POST /api/conversations/{id}/activate
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn activate(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ConversationId>,
) -> Result<impl IntoResponse> {
    let api = ChatService::new(state.supabase(), &user);
    let mut chat = load(&session).await?;

    chat.ensure_loaded(&api).await?;
    chat.activate(&api, id).await?;
    save(&session, &chat).await?;

    Ok(ok(MessagesView::from(&chat)))
}

/// Messages of the open conversation.
///
/// GET /api/conversations/active/messages
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn messages(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    let api = ChatService::new(state.supabase(), &user);
    let mut chat = load(&session).await?;

    chat.reload_messages(&api).await?;
    save(&session, &chat).await?;

    Ok(ok(MessagesView::from(&chat)))
}

/// Post to the open conversation.
///
/// POST /api/conversations/active/messages
#[instrument(skip(state, session, user, request), fields(user_id = %user.id))]
pub async fn send(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Json(request): Json<SendRequest>,
) -> Result<impl IntoResponse> {
    let api = ChatService::new(state.supabase(), &user);
    let mut chat = load(&session).await?;

    let message = chat.send(&api, &request.content).await?;
    save(&session, &chat).await?;

    Ok(ok(message))
}

/// Close the open conversation.
///
/// DELETE /api/conversations/active
#[instrument(skip(session, user), fields(user_id = %user.id))]
pub async fn close(session: Session, RequireAuth(user): RequireAuth) -> Result<impl IntoResponse> {
    let mut chat = load(&session).await?;
    chat.close();
    save(&session, &chat).await?;
    Ok(ok(()))
}
