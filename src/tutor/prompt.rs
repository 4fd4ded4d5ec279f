//! System prompt construction

use super::ProficiencyTier;

/// Fixed tutoring persona every system prompt starts with
pub const PERSONA_PREAMBLE: &str = "You are a Japanese language tutor. \
The user might speak in Japanese or English, and may switch languages mid-sentence. \
Continue responding mostly in Japanese if they are practicing, \
but provide English explanations when needed. ";

/// Register and vocabulary clause for a tier
#[must_use]
pub const fn tier_instructions(tier: ProficiencyTier) -> &'static str {
    match tier {
        ProficiencyTier::Beginner => {
            "Use simple vocabulary and short sentences. \
             Provide brief explanations in English if the user seems confused."
        }
        ProficiencyTier::Intermediate => {
            "Use moderate-level vocabulary in Japanese, \
             explain grammar points in English if asked, \
             but keep the conversation primarily in Japanese."
        }
        ProficiencyTier::Advanced => {
            "Use natural, fluent Japanese with more advanced vocabulary. \
             Only switch to English if the user specifically asks for an explanation."
        }
        ProficiencyTier::Unspecified => {
            "Use Japanese appropriately. \
             Switch to English for clarifications upon user request."
        }
    }
}

/// Build the system instruction for the chat model
#[must_use]
pub fn build_system_prompt(tier: ProficiencyTier) -> String {
    format!("{PERSONA_PREAMBLE}{}", tier_instructions(tier))
}
