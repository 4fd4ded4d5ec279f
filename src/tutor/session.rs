//! Conversation session state

use serde::{Deserialize, Serialize};

use super::{ProficiencyTier, build_system_prompt};
use crate::llm::ChatBackend;

/// Reply returned to the learner when the chat service fails
pub const APOLOGY: &str = "I'm sorry, I couldn't process that. Please try again.";

/// Author of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    role: Role,
    content: String,
}

impl Turn {
    /// System instruction turn
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Learner turn
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Tutor turn
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Ordered dialogue between the learner and the tutor for one run
///
/// The system prompt is never stored; it is rebuilt from the tier for
/// every request so history only ever holds user and assistant turns.
#[derive(Debug, Clone)]
pub struct ConversationSession {
    tier: ProficiencyTier,
    history: Vec<Turn>,
}

impl ConversationSession {
    /// Start an empty session for a learner at `tier`
    #[must_use]
    pub const fn new(tier: ProficiencyTier) -> Self {
        Self {
            tier,
            history: Vec::new(),
        }
    }

    /// Turns accumulated so far, oldest first
    #[must_use]
    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// Number of completed exchanges (user + assistant pairs)
    #[must_use]
    pub fn turn_count(&self) -> usize {
        self.history.len() / 2
    }

    /// Message list for the next request: system prompt, history, new user turn
    #[must_use]
    pub fn messages_for(&self, user_message: &str) -> Vec<Turn> {
        let mut messages = Vec::with_capacity(self.history.len() + 2);
        messages.push(Turn::system(build_system_prompt(self.tier)));
        messages.extend(self.history.iter().cloned());
        messages.push(Turn::user(user_message));
        messages
    }

    /// Send the learner's message and return the tutor's reply
    ///
    /// History is only extended when the chat backend succeeds. On failure
    /// the session is left untouched and [`APOLOGY`] is returned instead.
    pub async fn respond<C>(&mut self, chat: &C, user_message: &str) -> String
    where
        C: ChatBackend + ?Sized,
    {
        let messages = self.messages_for(user_message);

        match chat.complete(&messages).await {
            Ok(reply) => {
                self.history.push(Turn::user(user_message));
                self.history.push(Turn::assistant(reply.clone()));
                tracing::debug!(turns = self.turn_count(), "exchange recorded");
                reply
            }
            Err(e) => {
                tracing::warn!(error = %e, "chat request failed, history unchanged");
                APOLOGY.to_string()
            }
        }
    }
}
