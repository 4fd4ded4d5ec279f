//! Voice processing module
//!
//! Handles audio capture, transcription, speech synthesis and playback.

mod capture;
mod playback;
mod stt;
mod tts;

pub use capture::{
    AudioCapture, AudioClip, Recorder, SAMPLE_RATE, calculate_rms, downmix, resample,
    samples_to_wav,
};
pub use playback::{AudioPlayback, PLAYBACK_SAMPLE_RATE, Player, decode_mp3};
pub use stt::{Transcriber, Transcription, WhisperTranscriber};
pub use tts::{Synthesizer, TextToSpeech};
