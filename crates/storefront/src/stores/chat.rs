//! Chat container: the conversation list, the open conversation and its
//! messages.

use async_trait::async_trait;
use bazaar_core::models::{Conversation, Message};
use bazaar_core::{ConversationId, ProductId, UserId};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::services::{Result, ServiceError};

/// Backend operations behind the chat panel.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Conversations the user takes part in, most recent activity first,
    /// with last message and unread count filled in.
    async fn conversations(&self) -> Result<Vec<Conversation>>;

    /// Messages of a conversation, oldest first.
    async fn messages(&self, conversation_id: ConversationId) -> Result<Vec<Message>>;

    /// Post a message.
    async fn send(&self, conversation_id: ConversationId, content: &str) -> Result<Message>;

    /// Mark the other party's messages read.
    async fn mark_read(&self, conversation_id: ConversationId) -> Result<()>;

    /// Find or create the conversation about `product_id` with its seller.
    async fn start(&self, product_id: ProductId, seller_id: UserId) -> Result<ConversationId>;
}

/// Chat state kept in the session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatState {
    loaded: bool,
    conversations: Vec<Conversation>,
    active: Option<ConversationId>,
    messages: Vec<Message>,
}

impl ChatState {
    #[must_use]
    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    /// The open conversation, if any.
    #[must_use]
    pub const fn active(&self) -> Option<ConversationId> {
        self.active
    }

    /// Messages of the open conversation.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Unread messages across all conversations.
    #[must_use]
    pub fn unread_total(&self) -> usize {
        self.conversations.iter().map(|c| c.unread_count).sum()
    }

    /// Fetch the conversation list unless it was already loaded.
    ///
    /// # Errors
    ///
    /// Returns the backend error if the fetch fails.
    pub async fn ensure_loaded(&mut self, api: &dyn ChatApi) -> Result<()> {
        if !self.loaded {
            self.refresh(api).await?;
        }
        Ok(())
    }

    /// Re-fetch the conversation list.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the local list is left as it was.
    pub async fn refresh(&mut self, api: &dyn ChatApi) -> Result<()> {
        self.conversations = api.conversations().await?;
        self.loaded = true;
        Ok(())
    }

    /// Find or create a conversation with a listing's seller, then re-fetch
    /// the list.
    ///
    /// # Errors
    ///
    /// Returns the backend error, or `ServiceError::BadRequest` when the
    /// user is the seller.
    pub async fn start(
        &mut self,
        api: &dyn ChatApi,
        product_id: ProductId,
        seller_id: UserId,
    ) -> Result<ConversationId> {
        let id = api.start(product_id, seller_id).await?;
        self.refresh(api).await?;
        Ok(id)
    }

    /// Open a conversation: load its messages and mark them read. A failure
    /// to mark is logged; the conversation still opens.
    ///
    /// # Errors
    ///
    /// Returns the backend error if the messages cannot be loaded.
    pub async fn activate(&mut self, api: &dyn ChatApi, id: ConversationId) -> Result<()> {
        self.messages = api.messages(id).await?;
        self.active = Some(id);

        if let Err(e) = api.mark_read(id).await {
            warn!(error = %e, conversation_id = %id, "Failed to mark messages read");
        }
        if let Some(conversation) = self.conversations.iter_mut().find(|c| c.id == id) {
            conversation.unread_count = 0;
        }
        Ok(())
    }

    /// Re-fetch the messages of the open conversation.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::BadRequest` when no conversation is open.
    pub async fn reload_messages(&mut self, api: &dyn ChatApi) -> Result<()> {
        let id = self.require_active()?;
        self.messages = api.messages(id).await?;
        Ok(())
    }

    /// Post to the open conversation, append the message locally and
    /// re-fetch the list so it reorders by activity.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::BadRequest` when no conversation is open, or
    /// the backend error.
    pub async fn send(&mut self, api: &dyn ChatApi, content: &str) -> Result<Message> {
        let id = self.require_active()?;
        let message = api.send(id, content).await?;
        self.messages.push(message.clone());
        self.refresh(api).await?;
        Ok(message)
    }

    /// Close the open conversation.
    pub fn close(&mut self) {
        self.active = None;
        self.messages.clear();
    }

    fn require_active(&self) -> Result<ConversationId> {
        self.active
            .ok_or_else(|| ServiceError::BadRequest("No active conversation".to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use bazaar_core::MessageId;
    use bazaar_supabase::SupabaseError;
    use chrono::Utc;

    use super::*;

    struct FakeChat {
        me: UserId,
        conversation: ConversationId,
        messages: Mutex<Vec<Message>>,
        marked: Mutex<Vec<ConversationId>>,
        fail_mark: bool,
    }

    impl FakeChat {
        fn new() -> Self {
            let me = UserId::random();
            let conversation = ConversationId::random();
            let incoming = Message {
                id: MessageId::random(),
                conversation_id: conversation,
                sender_id: UserId::random(),
                content: "Здравствуйте".to_string(),
                created_at: Utc::now(),
                read_at: None,
            };
            Self {
                me,
                conversation,
                messages: Mutex::new(vec![incoming]),
                marked: Mutex::new(Vec::new()),
                fail_mark: false,
            }
        }
    }

    #[async_trait]
    impl ChatApi for FakeChat {
        async fn conversations(&self) -> Result<Vec<Conversation>> {
            let messages = self.messages.lock().unwrap();
            let now = Utc::now();
            Ok(vec![Conversation {
                id: self.conversation,
                product_id: ProductId::random(),
                buyer_id: self.me,
                seller_id: UserId::random(),
                created_at: now,
                updated_at: now,
                last_message_at: now,
                product: None,
                buyer: None,
                seller: None,
                last_message: messages.last().cloned(),
                unread_count: messages.iter().filter(|m| m.is_unread_by(self.me)).count(),
            }])
        }

        async fn messages(&self, _conversation_id: ConversationId) -> Result<Vec<Message>> {
            Ok(self.messages.lock().unwrap().clone())
        }

        async fn send(&self, conversation_id: ConversationId, content: &str) -> Result<Message> {
            let message = Message {
                id: MessageId::random(),
                conversation_id,
                sender_id: self.me,
                content: content.to_string(),
                created_at: Utc::now(),
                read_at: None,
            };
            self.messages.lock().unwrap().push(message.clone());
            Ok(message)
        }

        async fn mark_read(&self, conversation_id: ConversationId) -> Result<()> {
            if self.fail_mark {
                return Err(ServiceError::Backend(SupabaseError::RateLimited(1)));
            }
            self.marked.lock().unwrap().push(conversation_id);
            Ok(())
        }

        async fn start(&self, _product_id: ProductId, _seller_id: UserId) -> Result<ConversationId> {
            Ok(self.conversation)
        }
    }

    #[tokio::test]
    async fn test_send_requires_active_conversation() {
        let api = FakeChat::new();
        let mut state = ChatState::default();

        let err = state.send(&api, "привет").await.unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(ref m) if m == "No active conversation"));
    }

    #[tokio::test]
    async fn test_activate_marks_read_and_clears_unread() {
        let api = FakeChat::new();
        let mut state = ChatState::default();
        state.refresh(&api).await.unwrap();
        assert_eq!(state.unread_total(), 1);

        state.activate(&api, api.conversation).await.unwrap();

        assert_eq!(state.active(), Some(api.conversation));
        assert_eq!(state.messages().len(), 1);
        assert_eq!(state.unread_total(), 0);
        assert_eq!(*api.marked.lock().unwrap(), vec![api.conversation]);
    }

    #[tokio::test]
    async fn test_activate_survives_mark_failure() {
        let api = FakeChat {
            fail_mark: true,
            ..FakeChat::new()
        };
        let mut state = ChatState::default();
        state.refresh(&api).await.unwrap();

        state.activate(&api, api.conversation).await.unwrap();

        assert_eq!(state.active(), Some(api.conversation));
        assert_eq!(state.unread_total(), 0);
    }

    #[tokio::test]
    async fn test_send_appends_and_refreshes() {
        let api = FakeChat::new();
        let mut state = ChatState::default();
        let id = state
            .start(&api, ProductId::random(), UserId::random())
            .await
            .unwrap();
        state.activate(&api, id).await.unwrap();

        let sent = state.send(&api, "Ещё продаётся?").await.unwrap();

        assert_eq!(state.messages().last(), Some(&sent));
        assert_eq!(
            state.conversations()[0].last_message.as_ref().map(|m| m.id),
            Some(sent.id)
        );
    }

    #[tokio::test]
    async fn test_close_clears_active() {
        let api = FakeChat::new();
        let mut state = ChatState::default();
        state.activate(&api, api.conversation).await.unwrap();

        state.close();

        assert!(state.active().is_none());
        assert!(state.messages().is_empty());
        assert!(state.reload_messages(&api).await.is_err());
    }
}
