//! Kotoba - voice conversation tutor for Japanese practice
//!
//! This library provides the pieces of the `kotoba` command:
//! - Proficiency-tiered tutoring prompts and conversation state
//! - Voice capture, speech-to-text and text-to-speech collaborators
//! - Chat completion backends
//! - The sequential record, transcribe, reply loop
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  TutorPipeline                       │
//! │  Trigger │ Recorder │ Transcriber │ Chat │ Output    │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                 Tutoring core                        │
//! │   ProficiencyTier  │  Prompt builder  │  Session    │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod llm;
pub mod output;
pub mod pipeline;
pub mod setup;
pub mod trigger;
pub mod tutor;
pub mod voice;

pub use config::{Config, ConfigOverrides};
pub use error::{Error, Result};
pub use llm::{ChatBackend, OpenAiChat};
pub use output::{ConsoleOutput, OutputSink, SpokenOutput};
pub use pipeline::{
    NO_SPEECH_NOTICE, PipelineSettings, QUIT_KEYWORD, TurnOutcome, TutorPipeline, is_quit_command,
};
pub use trigger::{LineTrigger, StdinTrigger, Trigger, TriggerAction};
pub use tutor::{
    APOLOGY, ConversationSession, ProficiencyTier, Role, Turn, build_system_prompt,
};
