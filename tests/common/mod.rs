//! Shared test utilities: scripted collaborators for the tutor pipeline

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use kotoba::voice::{AudioClip, Recorder, SAMPLE_RATE, Transcriber, Transcription};
use kotoba::{ChatBackend, Error, OutputSink, Result, Trigger, TriggerAction, Turn};

/// Generate sine wave audio samples
pub fn generate_sine_samples(frequency: f32, duration_secs: f32, amplitude: f32) -> Vec<f32> {
    let num_samples = (SAMPLE_RATE as f32 * duration_secs) as usize;
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin()
        })
        .collect()
}

/// Trigger that replays a fixed list of actions, then quits
pub struct ScriptedTrigger {
    actions: VecDeque<TriggerAction>,
}

impl ScriptedTrigger {
    pub fn new(actions: impl IntoIterator<Item = TriggerAction>) -> Self {
        Self {
            actions: actions.into_iter().collect(),
        }
    }

    /// Press Enter `n` times
    pub fn records(n: usize) -> Self {
        Self::new(std::iter::repeat_n(TriggerAction::Record, n))
    }
}

#[async_trait]
impl Trigger for ScriptedTrigger {
    async fn next(&mut self) -> Result<TriggerAction> {
        Ok(self.actions.pop_front().unwrap_or(TriggerAction::Quit))
    }
}

/// Recorder that returns a short tone without touching audio hardware
#[derive(Clone, Default)]
pub struct FakeRecorder {
    pub calls: Arc<Mutex<Vec<Duration>>>,
}

impl FakeRecorder {
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Recorder for FakeRecorder {
    fn record(&mut self, duration: Duration) -> Result<AudioClip> {
        self.calls.lock().unwrap().push(duration);
        Ok(AudioClip::new(
            generate_sine_samples(440.0, 0.1, 0.3),
            SAMPLE_RATE,
        ))
    }
}

/// Recorder standing in for a machine with no microphone
pub struct MissingMicrophone;

impl Recorder for MissingMicrophone {
    fn record(&mut self, _duration: Duration) -> Result<AudioClip> {
        Err(Error::Audio("no input device available".to_string()))
    }
}

/// Transcriber that replays scripted results
#[derive(Clone)]
pub struct ScriptedTranscriber {
    results: Arc<Mutex<VecDeque<Result<Transcription>>>>,
    pub received: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl ScriptedTranscriber {
    pub fn new(results: Vec<Result<Transcription>>) -> Self {
        Self {
            results: Arc::new(Mutex::new(results.into())),
            received: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every clip transcribes to the given texts, in order
    pub fn texts(texts: &[&str]) -> Self {
        Self::new(
            texts
                .iter()
                .map(|t| {
                    Ok(Transcription {
                        text: (*t).to_string(),
                        language: None,
                    })
                })
                .collect(),
        )
    }
}

#[async_trait]
impl Transcriber for ScriptedTranscriber {
    async fn transcribe(&self, wav: &[u8]) -> Result<Transcription> {
        self.received.lock().unwrap().push(wav.to_vec());
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Transcription::default()))
    }
}

/// Chat backend that records every request and answers from a script
#[derive(Clone)]
pub struct RecordingChat {
    replies: Arc<Mutex<VecDeque<Result<String>>>>,
    pub requests: Arc<Mutex<Vec<Vec<Turn>>>>,
}

impl RecordingChat {
    pub fn new(replies: Vec<Result<String>>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatBackend for RecordingChat {
    async fn complete(&self, messages: &[Turn]) -> Result<String> {
        self.requests.lock().unwrap().push(messages.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Chat("no scripted reply".to_string())))
    }
}

/// Output sink that collects delivered replies and progress lines
#[derive(Clone, Default)]
pub struct CollectingOutput {
    pub replies: Arc<Mutex<Vec<String>>>,
    pub notices: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl OutputSink for CollectingOutput {
    async fn deliver(&mut self, reply: &str) -> Result<()> {
        self.replies.lock().unwrap().push(reply.to_string());
        Ok(())
    }

    fn notice(&mut self, message: &str) {
        self.notices.lock().unwrap().push(message.to_string());
    }
}
