//! Buyer/seller conversations.

use async_trait::async_trait;
use bazaar_core::models::{Conversation, Message, summarize_messages};
use bazaar_core::validation::require_text;
use bazaar_core::{ConversationId, ProductId, UserId};
use bazaar_supabase::SupabaseClient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, instrument};

use super::{IdRow, Result, ServiceError};
use crate::models::CurrentUser;
use crate::stores::ChatApi;

const CONVERSATION_SELECT: &str = "
    *,
    product:products!conversations_product_id_fkey(id, title, images),
    buyer:profiles!conversations_buyer_id_fkey(id, name, avatar_url),
    seller:profiles!conversations_seller_id_fkey(id, name, avatar_url),
    messages:messages(id, conversation_id, content, created_at, read_at, sender_id)
";

/// A conversation row with all of its messages embedded.
#[derive(Debug, Deserialize)]
struct ConversationRow {
    #[serde(flatten)]
    conversation: Conversation,
    #[serde(default)]
    messages: Vec<Message>,
}

impl ConversationRow {
    fn summarize(self, viewer: UserId) -> Conversation {
        let (last_message, unread_count) = summarize_messages(&self.messages, viewer);
        Conversation {
            last_message,
            unread_count,
            ..self.conversation
        }
    }
}

#[derive(Debug, Serialize)]
struct MessageInsert<'a> {
    conversation_id: ConversationId,
    sender_id: UserId,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ConversationInsert {
    product_id: ProductId,
    buyer_id: UserId,
    seller_id: UserId,
}

#[derive(Debug, Serialize)]
struct LastMessagePatch {
    last_message_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct ReadPatch {
    read_at: DateTime<Utc>,
}

/// Conversations of one signed-in user.
pub struct ChatService<'a> {
    client: &'a SupabaseClient,
    user: &'a CurrentUser,
}

impl<'a> ChatService<'a> {
    #[must_use]
    pub const fn new(client: &'a SupabaseClient, user: &'a CurrentUser) -> Self {
        Self { client, user }
    }
}

#[async_trait]
impl ChatApi for ChatService<'_> {
    #[instrument(skip(self), fields(user_id = %self.user.id))]
    async fn conversations(&self) -> Result<Vec<Conversation>> {
        let id = self.user.id;
        let rows: Vec<ConversationRow> = self
            .client
            .table("conversations")
            .auth(&self.user.access_token)
            .select(CONVERSATION_SELECT)
            .or(&format!("buyer_id.eq.{id},seller_id.eq.{id}"))
            .order("last_message_at", false)
            .fetch()
            .await?;
        Ok(rows.into_iter().map(|row| row.summarize(id)).collect())
    }

    #[instrument(skip(self), fields(user_id = %self.user.id))]
    async fn messages(&self, conversation_id: ConversationId) -> Result<Vec<Message>> {
        Ok(self
            .client
            .table("messages")
            .auth(&self.user.access_token)
            .select("*")
            .eq("conversation_id", conversation_id)
            .order("created_at", true)
            .fetch()
            .await?)
    }

    #[instrument(skip(self, content), fields(user_id = %self.user.id))]
    async fn send(&self, conversation_id: ConversationId, content: &str) -> Result<Message> {
        require_text("content", content)?;

        let message: Message = self
            .client
            .table("messages")
            .auth(&self.user.access_token)
            .select("*")
            .insert_returning(&MessageInsert {
                conversation_id,
                sender_id: self.user.id,
                content: content.trim(),
            })
            .await?;

        // The message is already stored at this point
        if let Err(e) = self
            .client
            .table("conversations")
            .auth(&self.user.access_token)
            .eq("id", conversation_id)
            .update(&LastMessagePatch {
                last_message_at: message.created_at,
            })
            .await
        {
            error!(error = %e, %conversation_id, "Failed to bump last_message_at");
        }

        Ok(message)
    }

    #[instrument(skip(self), fields(user_id = %self.user.id))]
    async fn mark_read(&self, conversation_id: ConversationId) -> Result<()> {
        self.client
            .table("messages")
            .auth(&self.user.access_token)
            .eq("conversation_id", conversation_id)
            .neq("sender_id", self.user.id)
            .is_null("read_at")
            .update(&ReadPatch {
                read_at: Utc::now(),
            })
            .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %self.user.id))]
    async fn start(&self, product_id: ProductId, seller_id: UserId) -> Result<ConversationId> {
        if seller_id == self.user.id {
            return Err(ServiceError::BadRequest(
                "Cannot start a conversation with yourself".to_string(),
            ));
        }

        let existing: Option<IdRow<ConversationId>> = self
            .client
            .table("conversations")
            .auth(&self.user.access_token)
            .select("id")
            .eq("product_id", product_id)
            .eq("buyer_id", self.user.id)
            .eq("seller_id", seller_id)
            .fetch_optional()
            .await?;
        if let Some(row) = existing {
            return Ok(row.id);
        }

        let row: IdRow<ConversationId> = self
            .client
            .table("conversations")
            .auth(&self.user.access_token)
            .select("id")
            .insert_returning(&ConversationInsert {
                product_id,
                buyer_id: self.user.id,
                seller_id,
            })
            .await?;
        Ok(row.id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ME: &str = "11111111-1111-4111-8111-111111111111";
    const THEM: &str = "33333333-3333-4333-8333-333333333333";

    #[test]
    fn test_conversation_row_summarized_for_viewer() {
        let json = serde_json::json!({
            "id": "66666666-6666-4666-8666-666666666666",
            "product_id": "22222222-2222-4222-8222-222222222222",
            "buyer_id": ME,
            "seller_id": THEM,
            "created_at": "2024-06-01T10:00:00Z",
            "updated_at": "2024-06-01T10:00:00Z",
            "last_message_at": "2024-06-01T10:05:00Z",
            "product": { "id": "22222222-2222-4222-8222-222222222222", "title": "Лампа", "images": [] },
            "buyer": { "id": ME, "name": "Иван", "avatar_url": null },
            "seller": { "id": THEM, "name": null, "avatar_url": null },
            "messages": [
                {
                    "id": "77777777-7777-4777-8777-777777777771",
                    "conversation_id": "66666666-6666-4666-8666-666666666666",
                    "sender_id": THEM,
                    "content": "Ещё продаётся?",
                    "created_at": "2024-06-01T10:05:00Z",
                    "read_at": null
                },
                {
                    "id": "77777777-7777-4777-8777-777777777772",
                    "conversation_id": "66666666-6666-4666-8666-666666666666",
                    "sender_id": ME,
                    "content": "Да",
                    "created_at": "2024-06-01T10:01:00Z",
                    "read_at": null
                }
            ]
        });

        let row: ConversationRow = serde_json::from_value(json).unwrap();
        let conversation = row.summarize(ME.parse().unwrap());

        assert_eq!(conversation.unread_count, 1);
        assert_eq!(
            conversation.last_message.clone().map(|m| m.content),
            Some("Ещё продаётся?".to_string())
        );
        assert_eq!(
            conversation
                .counterpart(ME.parse().unwrap())
                .map(|p| p.id.to_string()),
            Some(THEM.to_string())
        );
    }
}
