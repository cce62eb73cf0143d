//! Scripted onboarding dialogue.
//!
//! The assistant is a fixed transition table: each option id either leads to
//! another bot prompt or hands off to a screen. See [`transition`].

use thiserror::Error;

use clara_types::MessageId;

use crate::transcript::{Author, ChatOption, Transcript};

const ROLE_HINT: &str = "Hint: if you are unsure pick the first option!";

const ROLE_OPTIONS: &[ChatOption] = &[
    ChatOption {
        id: "patient",
        text: "I am a patient",
    },
    ChatOption {
        id: "caregiver",
        text: "I am a caregiver",
    },
];

const PATIENT_OPTIONS: &[ChatOption] = &[
    ChatOption {
        id: "location",
        text: "Where am I?",
    },
    ChatOption {
        id: "family",
        text: "Who is my family?",
    },
    ChatOption {
        id: "emergency",
        text: "Emergency Contacts",
    },
    ChatOption {
        id: "assistance",
        text: "General Assistance",
    },
    ChatOption {
        id: "back",
        text: "Back",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeId {
    Welcome,
    RoleSelect,
    PatientMenu,
    FollowUp,
}

impl NodeId {
    #[must_use]
    pub fn prompt(self) -> String {
        match self {
            NodeId::Welcome => format!("Welcome! Are you a patient or a caregiver?\n{ROLE_HINT}"),
            NodeId::RoleSelect => format!("Are you a patient or a caregiver?\n{ROLE_HINT}"),
            NodeId::PatientMenu => "What can I help you with today?".to_string(),
            NodeId::FollowUp => "How else can I help you?".to_string(),
        }
    }

    #[must_use]
    pub fn options(self) -> &'static [ChatOption] {
        match self {
            NodeId::Welcome | NodeId::RoleSelect => ROLE_OPTIONS,
            NodeId::PatientMenu | NodeId::FollowUp => PATIENT_OPTIONS,
        }
    }
}

/// Screens the dialogue can hand off to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Geofence,
    Family,
    Contacts,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Reply(NodeId),
    Navigate(Screen),
}

/// Next step for `option_id`. Unrecognised ids fall through to [`NodeId::FollowUp`].
#[must_use]
pub fn transition(option_id: &str) -> Transition {
    match option_id {
        "patient" => Transition::Reply(NodeId::PatientMenu),
        "caregiver" => Transition::Navigate(Screen::Login),
        "back" => Transition::Reply(NodeId::RoleSelect),
        "location" => Transition::Navigate(Screen::Geofence),
        "family" => Transition::Navigate(Screen::Family),
        "emergency" => Transition::Navigate(Screen::Contacts),
        "assistance" => Transition::Navigate(Screen::Assistant),
        _ => Transition::Reply(NodeId::FollowUp),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DialogueError {
    #[error("message {0} has no options to choose from")]
    UnknownMessage(MessageId),
    #[error("options on message {0} were already answered")]
    OptionsDisabled(MessageId),
    #[error("message {message} has no option {option}")]
    UnknownOption { message: MessageId, option: String },
}

/// A running onboarding conversation.
#[derive(Debug, Clone)]
pub struct Dialogue {
    transcript: Transcript,
    disabled_batch: Option<MessageId>,
}

impl Default for Dialogue {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialogue {
    #[must_use]
    pub fn new() -> Self {
        let mut transcript = Transcript::new();
        push_node(&mut transcript, NodeId::Welcome);
        Self {
            transcript,
            disabled_batch: None,
        }
    }

    #[must_use]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// The most recent bot message that still offers options.
    #[must_use]
    pub fn active_prompt(&self) -> Option<MessageId> {
        self.transcript
            .iter()
            .rev()
            .find(|m| {
                m.author == Author::Bot
                    && !m.options.is_empty()
                    && self.disabled_batch != Some(m.id)
            })
            .map(|m| m.id)
    }

    /// Re-prompts with the follow-up menu, e.g. after returning from a screen.
    pub fn resume(&mut self) -> MessageId {
        push_node(&mut self.transcript, NodeId::FollowUp)
    }

    pub fn select(
        &mut self,
        message: MessageId,
        option_id: &str,
    ) -> Result<Transition, DialogueError> {
        let msg = self
            .transcript
            .get(message)
            .filter(|m| m.author == Author::Bot && !m.options.is_empty())
            .ok_or(DialogueError::UnknownMessage(message))?;

        if self.disabled_batch == Some(message) {
            return Err(DialogueError::OptionsDisabled(message));
        }

        let option = msg
            .options
            .iter()
            .find(|o| o.id == option_id)
            .ok_or_else(|| DialogueError::UnknownOption {
                message,
                option: option_id.to_string(),
            })?;
        let echo = option.text;

        self.disabled_batch = Some(message);
        let step = transition(option_id);
        tracing::debug!(%message, option = option_id, ?step, "Dialogue option selected");

        if let Transition::Reply(node) = step {
            self.transcript.push_user(echo);
            push_node(&mut self.transcript, node);
        }
        Ok(step)
    }
}

fn push_node(transcript: &mut Transcript, node: NodeId) -> MessageId {
    transcript.push_bot_with_options(node.prompt(), node.options().to_vec())
}
