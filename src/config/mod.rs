//! Configuration management for the Kotoba tutor
//!
//! Values are layered: built-in defaults, then the TOML config file, then
//! environment variables, then command-line overrides.

pub mod file;

use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::tutor::ProficiencyTier;
use crate::{Error, Result};

use file::KotobaConfigFile;

/// Default API base URL for chat, transcription and speech
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default capture length per turn
pub const DEFAULT_RECORD_SECS: u64 = 5;

/// Kotoba configuration
#[derive(Debug)]
pub struct Config {
    /// Learner proficiency tier, fixed for the session
    pub tier: ProficiencyTier,

    /// API key for the remote services (from `OPENAI_API_KEY`)
    pub api_key: SecretString,

    /// API base URL shared by all remote collaborators
    pub base_url: String,

    /// Chat model configuration
    pub chat: ChatConfig,

    /// Voice processing configuration
    pub voice: VoiceConfig,
}

/// Chat model configuration
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Model identifier for chat completions
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
        }
    }
}

/// Voice processing configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Seconds captured per turn
    pub record_secs: u64,

    /// STT model (e.g. "whisper-1")
    pub stt_model: String,

    /// Optional language hint for the transcriber
    pub language: Option<String>,

    /// Optional context prompt for the transcriber
    pub stt_prompt: Option<String>,

    /// Speak replies after printing them
    pub speak: bool,

    /// TTS model (e.g. "tts-1")
    pub tts_model: String,

    /// TTS voice identifier
    pub tts_voice: String,

    /// TTS speed multiplier (0.25 to 4.0)
    pub tts_speed: f32,

    /// Transient WAV file overwritten by every capture
    pub wav_path: PathBuf,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            record_secs: DEFAULT_RECORD_SECS,
            stt_model: "whisper-1".to_string(),
            language: None,
            stt_prompt: None,
            speak: false,
            tts_model: "tts-1".to_string(),
            tts_voice: "alloy".to_string(),
            tts_speed: 1.0,
            wav_path: std::env::temp_dir().join("kotoba-capture.wav"),
        }
    }
}

impl VoiceConfig {
    /// Capture length as a [`Duration`]
    #[must_use]
    pub const fn record_duration(&self) -> Duration {
        Duration::from_secs(self.record_secs)
    }
}

/// Command-line overrides applied last
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub tier: Option<ProficiencyTier>,
    pub speak: Option<bool>,
    pub record_secs: Option<u64>,
}

impl Config {
    /// Load configuration from the config file, environment and overrides
    ///
    /// # Errors
    ///
    /// Returns error if no API key is configured or a value is invalid
    pub fn load(overrides: &ConfigOverrides) -> Result<Self> {
        let file = file::load_config_file();
        Self::from_sources(file, |key| std::env::var(key).ok(), overrides)
    }

    /// Build configuration from explicit sources
    ///
    /// `env` looks up an environment variable by name.
    ///
    /// # Errors
    ///
    /// Returns error if no API key is configured or a value is invalid
    pub fn from_sources<F>(
        file: KotobaConfigFile,
        env: F,
        overrides: &ConfigOverrides,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = env("OPENAI_API_KEY")
            .or(file.api_keys.openai)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                Error::Config(
                    "OPENAI_API_KEY is not set (export it or run `kotoba setup`)".to_string(),
                )
            })?;

        let base_url = env("OPENAI_BASE_URL")
            .or(file.chat.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let tier = overrides
            .tier
            .or_else(|| env("KOTOBA_TIER").map(|t| ProficiencyTier::parse(&t)))
            .or(file.tier)
            .unwrap_or_default();

        let chat_defaults = ChatConfig::default();
        let chat = ChatConfig {
            model: env("KOTOBA_CHAT_MODEL")
                .or(file.chat.model)
                .unwrap_or(chat_defaults.model),
            temperature: file.chat.temperature.unwrap_or(chat_defaults.temperature),
        };

        let voice_defaults = VoiceConfig::default();
        let record_secs = match overrides.record_secs {
            Some(secs) => secs,
            None => match env("KOTOBA_RECORD_SECS") {
                Some(raw) => raw.parse().map_err(|_| {
                    Error::Config(format!("KOTOBA_RECORD_SECS is not a number: {raw}"))
                })?,
                None => file.voice.record_secs.unwrap_or(voice_defaults.record_secs),
            },
        };
        if record_secs == 0 {
            return Err(Error::Config(
                "recording duration must be at least one second".to_string(),
            ));
        }

        let speak = overrides
            .speak
            .or_else(|| env("KOTOBA_SPEAK").map(|v| v == "1" || v.eq_ignore_ascii_case("true")))
            .or(file.voice.speak)
            .unwrap_or(voice_defaults.speak);

        let voice = VoiceConfig {
            record_secs,
            stt_model: env("KOTOBA_STT_MODEL")
                .or(file.voice.stt_model)
                .unwrap_or(voice_defaults.stt_model),
            language: env("KOTOBA_LANGUAGE").or(file.voice.language),
            stt_prompt: file.voice.stt_prompt,
            speak,
            tts_model: env("KOTOBA_TTS_MODEL")
                .or(file.voice.tts_model)
                .unwrap_or(voice_defaults.tts_model),
            tts_voice: env("KOTOBA_TTS_VOICE")
                .or(file.voice.tts_voice)
                .unwrap_or(voice_defaults.tts_voice),
            tts_speed: file
                .voice
                .tts_speed
                .unwrap_or(voice_defaults.tts_speed)
                .clamp(0.25, 4.0),
            wav_path: env("KOTOBA_WAV_PATH")
                .map(PathBuf::from)
                .or(file.voice.wav_path)
                .unwrap_or(voice_defaults.wav_path),
        };

        Ok(Self {
            tier,
            api_key: SecretString::from(api_key),
            base_url,
            chat,
            voice,
        })
    }

    /// Fresh handle on the API key for a client constructor
    #[must_use]
    pub fn api_key(&self) -> SecretString {
        SecretString::from(self.api_key.expose_secret().to_string())
    }
}
