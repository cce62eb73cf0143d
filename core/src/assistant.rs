//! General-assistance chat relayed to the backend.
//!
//! [`AssistantChat`] owns the transcript and builds requests; the caller does
//! the HTTP round trip and feeds the outcome back through [`AssistantChat::complete`].

use std::fmt::Display;

use clara_types::{ChatRequest, MessageId};

use crate::transcript::Transcript;

pub const ASSISTANT_GREETING: &str = "Hello! How can I assist you today?";
pub const ASSISTANT_FALLBACK: &str = "Sorry, I encountered an error. Please try again.";

#[derive(Debug, Clone)]
pub struct AssistantChat {
    user_id: String,
    user_data: serde_json::Value,
    transcript: Transcript,
}

impl AssistantChat {
    #[must_use]
    pub fn new(user_id: impl Into<String>) -> Self {
        let mut transcript = Transcript::new();
        transcript.push_bot(ASSISTANT_GREETING);
        Self {
            user_id: user_id.into(),
            user_data: serde_json::Value::Object(serde_json::Map::new()),
            transcript,
        }
    }

    #[must_use]
    pub fn with_user_data(mut self, user_data: serde_json::Value) -> Self {
        self.user_data = user_data;
        self
    }

    #[must_use]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Records the question and returns the request to send.
    ///
    /// History covers everything before the question. Blank input returns `None`
    /// and records nothing.
    pub fn begin(&mut self, question: &str) -> Option<ChatRequest> {
        let question = question.trim();
        if question.is_empty() {
            return None;
        }
        let conversation_history = self.transcript.conversation_history();
        self.transcript.push_user(question);
        Some(ChatRequest {
            user_id: self.user_id.clone(),
            user_data: self.user_data.clone(),
            conversation_history,
            user_question: question.to_string(),
        })
    }

    /// Appends the backend reply, or the fallback message if the request failed.
    pub fn complete<E: Display>(&mut self, outcome: Result<String, E>) -> MessageId {
        match outcome {
            Ok(reply) => self.transcript.push_bot(reply),
            Err(err) => {
                tracing::error!("Chat error: {err}");
                self.transcript.push_bot(ASSISTANT_FALLBACK)
            }
        }
    }
}
