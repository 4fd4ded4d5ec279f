//! Tutoring core
//!
//! Proficiency tiers, system prompt construction and the conversation
//! session that accumulates turns between the learner and the chat model.

mod prompt;
mod session;
mod tier;

pub use prompt::{PERSONA_PREAMBLE, build_system_prompt, tier_instructions};
pub use session::{APOLOGY, ConversationSession, Role, Turn};
pub use tier::ProficiencyTier;
