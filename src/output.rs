//! Reply output sinks

use async_trait::async_trait;

use crate::Result;
use crate::voice::{Player, Synthesizer};

/// Destination for the tutor's replies
#[async_trait]
pub trait OutputSink: Send {
    /// Present one reply to the learner
    ///
    /// # Errors
    ///
    /// Returns error if the reply could not be delivered at all
    async fn deliver(&mut self, reply: &str) -> Result<()>;

    /// Show a progress line ("Recording...", "You said: ...")
    fn notice(&mut self, message: &str);
}

#[async_trait]
impl<T: OutputSink + ?Sized> OutputSink for Box<T> {
    async fn deliver(&mut self, reply: &str) -> Result<()> {
        (**self).deliver(reply).await
    }

    fn notice(&mut self, message: &str) {
        (**self).notice(message);
    }
}

/// Label printed in front of every reply
const SPEAKER_LABEL: &str = "Tutor";

/// Prints replies to stdout
#[derive(Debug, Default)]
pub struct ConsoleOutput;

#[async_trait]
impl OutputSink for ConsoleOutput {
    async fn deliver(&mut self, reply: &str) -> Result<()> {
        println!("\n{SPEAKER_LABEL}: {reply}\n");
        Ok(())
    }

    fn notice(&mut self, message: &str) {
        println!("{message}");
    }
}

/// Prints replies, then speaks them aloud
///
/// Speech is best effort: if synthesis or playback fails the printed
/// reply stands and the failure is only logged.
pub struct SpokenOutput<S, P> {
    synthesizer: S,
    playback: P,
}

impl<S: Synthesizer, P: Player> SpokenOutput<S, P> {
    #[must_use]
    pub fn new(synthesizer: S, playback: P) -> Self {
        Self {
            synthesizer,
            playback,
        }
    }
}

#[async_trait]
impl<S: Synthesizer, P: Player> OutputSink for SpokenOutput<S, P> {
    async fn deliver(&mut self, reply: &str) -> Result<()> {
        ConsoleOutput.deliver(reply).await?;

        let mp3 = match self.synthesizer.synthesize(reply).await {
            Ok(mp3) => mp3,
            Err(e) => {
                tracing::warn!(error = %e, "speech synthesis failed");
                return Ok(());
            }
        };

        if let Err(e) = self.playback.play_mp3(&mp3) {
            tracing::warn!(error = %e, "speech playback failed");
        }

        Ok(())
    }

    fn notice(&mut self, message: &str) {
        ConsoleOutput.notice(message);
    }
}
