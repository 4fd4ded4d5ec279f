//! Turn triggers: what starts each recording

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};

use crate::Result;
use crate::pipeline::is_quit_command;

/// What the learner asked for at the start of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerAction {
    /// Record and process one clip
    Record,
    /// Leave the session
    Quit,
}

/// Gate in front of every capture
#[async_trait]
pub trait Trigger: Send {
    /// Wait for the learner's next action
    ///
    /// # Errors
    ///
    /// Returns error if input cannot be read
    async fn next(&mut self) -> Result<TriggerAction>;
}

/// Prompt shown before every turn
pub const PROMPT: &str = "Press Enter to record, or type 'quit' to exit: ";

/// Reads Enter / `quit` lines from any buffered reader
pub struct LineTrigger<R> {
    lines: Lines<R>,
}

/// [`LineTrigger`] on the process's standard input
pub type StdinTrigger = LineTrigger<BufReader<Stdin>>;

impl<R: AsyncBufRead + Unpin + Send> LineTrigger<R> {
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }
}

impl StdinTrigger {
    #[must_use]
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl Default for StdinTrigger {
    fn default() -> Self {
        Self::stdin()
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> Trigger for LineTrigger<R> {
    async fn next(&mut self) -> Result<TriggerAction> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(PROMPT.as_bytes()).await?;
        stdout.flush().await?;

        match self.lines.next_line().await? {
            // EOF (Ctrl-D, closed pipe)
            None => Ok(TriggerAction::Quit),
            Some(line) if is_quit_command(&line) => Ok(TriggerAction::Quit),
            Some(_) => Ok(TriggerAction::Record),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn actions(input: &'static [u8], count: usize) -> Vec<TriggerAction> {
        let mut trigger = LineTrigger::new(input);
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(trigger.next().await.unwrap());
        }
        out
    }

    #[tokio::test]
    async fn enter_records() {
        assert_eq!(actions(b"\n", 1).await, vec![TriggerAction::Record]);
    }

    #[tokio::test]
    async fn any_other_text_records() {
        assert_eq!(
            actions(b"hello\nquitting\n", 2).await,
            vec![TriggerAction::Record, TriggerAction::Record]
        );
    }

    #[tokio::test]
    async fn typed_quit_in_any_case_quits() {
        assert_eq!(actions(b"QUIT\n", 1).await, vec![TriggerAction::Quit]);
        assert_eq!(actions(b" quit. \n", 1).await, vec![TriggerAction::Quit]);
    }

    #[tokio::test]
    async fn end_of_input_quits() {
        assert_eq!(actions(b"", 1).await, vec![TriggerAction::Quit]);
        assert_eq!(
            actions(b"\n", 2).await,
            vec![TriggerAction::Record, TriggerAction::Quit]
        );
    }
}
