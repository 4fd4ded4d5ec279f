//! TOML configuration file loading
//!
//! Supports `~/.config/kotoba/config.toml` as a persistent config source.
//! All fields are optional: the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::tutor::ProficiencyTier;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct KotobaConfigFile {
    /// Learner proficiency tier
    #[serde(default)]
    pub tier: Option<ProficiencyTier>,

    /// Chat model configuration
    #[serde(default)]
    pub chat: ChatFileConfig,

    /// Voice/audio configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,
}

/// Chat model configuration
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ChatFileConfig {
    /// Model identifier (e.g. "gpt-4o-mini")
    pub model: Option<String>,

    /// Sampling temperature
    pub temperature: Option<f32>,

    /// API base URL (e.g. "https://api.openai.com/v1")
    pub base_url: Option<String>,
}

/// Voice processing configuration
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct VoiceFileConfig {
    /// Seconds of audio captured per turn
    pub record_secs: Option<u64>,

    /// STT model (e.g. "whisper-1")
    pub stt_model: Option<String>,

    /// Language hint for transcription (ISO-639-1, e.g. "ja")
    pub language: Option<String>,

    /// Context prompt passed to the transcriber
    pub stt_prompt: Option<String>,

    /// Speak replies aloud
    pub speak: Option<bool>,

    /// TTS model (e.g. "tts-1")
    pub tts_model: Option<String>,

    /// TTS voice identifier (e.g. "alloy")
    pub tts_voice: Option<String>,

    /// TTS speed multiplier
    pub tts_speed: Option<f32>,

    /// Where each capture is written before upload
    pub wav_path: Option<PathBuf>,
}

/// API keys configuration
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ApiKeysFileConfig {
    pub openai: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `KotobaConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> KotobaConfigFile {
    let Some(path) = config_file_path() else {
        return KotobaConfigFile::default();
    };

    if !path.exists() {
        return KotobaConfigFile::default();
    }

    match read_config_file(&path) {
        Ok(config) => {
            tracing::info!(path = %path.display(), "loaded config file");
            config
        }
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to load config file, using defaults"
            );
            KotobaConfigFile::default()
        }
    }
}

/// Read and parse a config file at `path`
///
/// # Errors
///
/// Returns error if the file cannot be read or is not valid TOML
pub fn read_config_file(path: &Path) -> Result<KotobaConfigFile> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Write a config file to `path`, creating parent directories
///
/// # Errors
///
/// Returns error if serialization or the write fails
pub fn write_config_file(path: &Path, config: &KotobaConfigFile) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| crate::Error::Config(format!("failed to serialize config: {e}")))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

/// Return the config file path: `~/.config/kotoba/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("kotoba").join("config.toml"))
}
