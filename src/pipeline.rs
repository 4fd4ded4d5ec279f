//! The tutoring loop
//!
//! One strictly sequential pass per turn:
//!
//! ```text
//! trigger ─► capture ─► WAV file ─► transcribe ─┬─ empty ──► next turn
//!                                               ├─ "quit" ─► stop
//!                                               └─ text ───► session ─► output
//! ```

use std::path::PathBuf;
use std::time::Duration;

use crate::Result;
use crate::llm::ChatBackend;
use crate::output::OutputSink;
use crate::trigger::{Trigger, TriggerAction};
use crate::tutor::{ConversationSession, ProficiencyTier};
use crate::voice::{Recorder, Transcriber};

/// Word that ends the session, typed or spoken
pub const QUIT_KEYWORD: &str = "quit";

/// Whether `text` is the quit keyword
///
/// Case-insensitive, ignoring surrounding whitespace and trailing sentence
/// punctuation (transcribers usually end a lone word with a period).
#[must_use]
pub fn is_quit_command(text: &str) -> bool {
    text.trim()
        .trim_end_matches(['.', '!', '?', '。', '！', '？'])
        .trim_end()
        .eq_ignore_ascii_case(QUIT_KEYWORD)
}

/// Shown when a clip yields no usable text
pub const NO_SPEECH_NOTICE: &str = "No speech detected. Try again.";

/// Result of a single pass through the loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The tutor replied (possibly with the apology)
    Replied(String),
    /// Nothing usable was transcribed; the chat service was not contacted
    NoSpeech,
    /// The learner asked to stop
    Quit,
}

/// Per-run pipeline settings
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Capture length per turn
    pub record_duration: Duration,
    /// Transient WAV file, overwritten every turn
    pub wav_path: PathBuf,
}

/// Capture, transcribe, converse, output: repeated until quit
pub struct TutorPipeline<T, R, S, C, O> {
    trigger: T,
    recorder: R,
    transcriber: S,
    chat: C,
    output: O,
    session: ConversationSession,
    settings: PipelineSettings,
}

impl<T, R, S, C, O> TutorPipeline<T, R, S, C, O>
where
    T: Trigger,
    R: Recorder,
    S: Transcriber,
    C: ChatBackend,
    O: OutputSink,
{
    #[must_use]
    pub fn new(
        trigger: T,
        recorder: R,
        transcriber: S,
        chat: C,
        output: O,
        tier: ProficiencyTier,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            trigger,
            recorder,
            transcriber,
            chat,
            output,
            session: ConversationSession::new(tier),
            settings,
        }
    }

    /// Conversation so far
    #[must_use]
    pub const fn session(&self) -> &ConversationSession {
        &self.session
    }

    /// Run turns until the learner quits
    ///
    /// Returns the number of completed exchanges.
    ///
    /// # Errors
    ///
    /// Returns error only for unrecoverable failures: the input device or
    /// the trigger input becoming unavailable, or the WAV file being unwritable
    pub async fn run(&mut self) -> Result<usize> {
        loop {
            match self.step().await? {
                TurnOutcome::Quit => break,
                TurnOutcome::NoSpeech | TurnOutcome::Replied(_) => {}
            }
        }

        tracing::info!(exchanges = self.session.turn_count(), "session finished");
        Ok(self.session.turn_count())
    }

    /// Run one turn
    ///
    /// # Errors
    ///
    /// See [`TutorPipeline::run`]
    pub async fn step(&mut self) -> Result<TurnOutcome> {
        if self.trigger.next().await? == TriggerAction::Quit {
            return Ok(TurnOutcome::Quit);
        }

        self.output.notice(&format!(
            "Recording... ({} seconds)",
            self.settings.record_duration.as_secs()
        ));
        let clip = self.recorder.record(self.settings.record_duration)?;
        tracing::debug!(
            secs = clip.duration().as_secs_f32(),
            rms = clip.rms(),
            "clip captured"
        );

        clip.write_wav(&self.settings.wav_path)?;
        let wav = tokio::fs::read(&self.settings.wav_path).await?;

        self.output.notice("Transcribing...");
        let transcription = match self.transcriber.transcribe(&wav).await {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(error = %e, "transcription failed");
                self.output.notice(NO_SPEECH_NOTICE);
                return Ok(TurnOutcome::NoSpeech);
            }
        };

        if transcription.is_empty() {
            tracing::debug!("empty transcript");
            self.output.notice(NO_SPEECH_NOTICE);
            return Ok(TurnOutcome::NoSpeech);
        }

        let text = transcription.text.trim();
        let heard = match transcription.language.as_deref() {
            Some(language) => format!("You said: {text} (detected language: {language})"),
            None => format!("You said: {text}"),
        };
        self.output.notice(&heard);

        if is_quit_command(text) {
            return Ok(TurnOutcome::Quit);
        }

        let reply = self.session.respond(&self.chat, text).await;

        if let Err(e) = self.output.deliver(&reply).await {
            tracing::warn!(error = %e, "failed to deliver reply");
        }

        Ok(TurnOutcome::Replied(reply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quit_matches_any_case() {
        assert!(is_quit_command("quit"));
        assert!(is_quit_command("QUIT"));
        assert!(is_quit_command("Quit"));
        assert!(is_quit_command("  quit \n"));
    }

    #[test]
    fn quit_tolerates_trailing_punctuation() {
        assert!(is_quit_command("Quit."));
        assert!(is_quit_command("quit!"));
        assert!(is_quit_command("quit。"));
    }

    #[test]
    fn quit_must_be_the_whole_utterance() {
        assert!(!is_quit_command("I want to quit"));
        assert!(!is_quit_command("quitting"));
        assert!(!is_quit_command(""));
        assert!(!is_quit_command("exit"));
    }
}
