//! Buyer/seller conversations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Participant, ProductThumb};
use crate::types::{ConversationId, MessageId, ProductId, UserId};

/// A conversation about one listing between its buyer and seller.
///
/// `last_message` and `unread_count` are derived per viewer from the
/// conversation's messages when it is fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub product_id: ProductId,
    pub buyer_id: UserId,
    pub seller_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_message_at: DateTime<Utc>,
    #[serde(default)]
    pub product: Option<ProductThumb>,
    #[serde(default)]
    pub buyer: Option<Participant>,
    #[serde(default)]
    pub seller: Option<Participant>,
    #[serde(default)]
    pub last_message: Option<Message>,
    #[serde(default)]
    pub unread_count: usize,
}

impl Conversation {
    /// The participant on the other side from `viewer`.
    #[must_use]
    pub fn counterpart(&self, viewer: UserId) -> Option<&Participant> {
        if viewer == self.buyer_id {
            self.seller.as_ref()
        } else {
            self.buyer.as_ref()
        }
    }

    /// Whether `user` is the buyer or the seller.
    #[must_use]
    pub fn involves(&self, user: UserId) -> bool {
        self.buyer_id == user || self.seller_id == user
    }
}

/// A chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub read_at: Option<DateTime<Utc>>,
}

impl Message {
    /// Whether `viewer` still has to read this message.
    #[must_use]
    pub fn is_unread_by(&self, viewer: UserId) -> bool {
        self.sender_id != viewer && self.read_at.is_none()
    }
}

/// Latest message and the number of messages `viewer` has not read.
///
/// Embedded rows come back in no particular order, so the latest message is
/// picked by timestamp rather than position.
#[must_use]
pub fn summarize_messages(messages: &[Message], viewer: UserId) -> (Option<Message>, usize) {
    let last = messages.iter().max_by_key(|m| m.created_at).cloned();
    let unread = messages.iter().filter(|m| m.is_unread_by(viewer)).count();
    (last, unread)
}
