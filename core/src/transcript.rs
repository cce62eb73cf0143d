//! Chat transcript with stable message ids.

use chrono::{DateTime, Utc};

use clara_types::{ChatRole, ChatTurn, MessageId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Author {
    User,
    Bot,
}

/// A selectable reply attached to a bot message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatOption {
    pub id: &'static str,
    pub text: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub author: Author,
    pub text: String,
    pub options: Vec<ChatOption>,
    pub created_at: DateTime<Utc>,
}

/// Append-only message list with a monotonic revision counter.
///
/// The revision is bumped on every push so renderers can cache by it.
#[derive(Debug, Clone)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    next_id: MessageId,
    revision: usize,
}

impl Default for Transcript {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            next_id: MessageId::new(1),
            revision: 0,
        }
    }
}

impl Transcript {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, text: impl Into<String>) -> MessageId {
        self.push(Author::User, text.into(), Vec::new())
    }

    pub fn push_bot(&mut self, text: impl Into<String>) -> MessageId {
        self.push(Author::Bot, text.into(), Vec::new())
    }

    pub fn push_bot_with_options(
        &mut self,
        text: impl Into<String>,
        options: Vec<ChatOption>,
    ) -> MessageId {
        self.push(Author::Bot, text.into(), options)
    }

    fn push(&mut self, author: Author, text: String, options: Vec<ChatOption>) -> MessageId {
        let id = self.next_id;
        self.next_id = id.next();
        self.messages.push(ChatMessage {
            id,
            author,
            text,
            options,
            created_at: Utc::now(),
        });
        self.revision = self.revision.wrapping_add(1);
        id
    }

    #[must_use]
    pub fn get(&self, id: MessageId) -> Option<&ChatMessage> {
        // Ids are assigned in increasing order.
        self.messages
            .binary_search_by_key(&id, |m| m.id)
            .ok()
            .map(|idx| &self.messages[idx])
    }

    #[must_use]
    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChatMessage> {
        self.messages.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[must_use]
    pub fn revision(&self) -> usize {
        self.revision
    }

    #[must_use]
    pub fn conversation_history(&self) -> Vec<ChatTurn> {
        self.messages
            .iter()
            .map(|m| ChatTurn {
                role: match m.author {
                    Author::User => ChatRole::User,
                    Author::Bot => ChatRole::Assistant,
                },
                content: m.text.clone(),
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a ChatMessage;
    type IntoIter = std::slice::Iter<'a, ChatMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
