//! Interactive first-run setup wizard (`kotoba setup`)

use std::path::PathBuf;

use dialoguer::{Confirm, Input, Select};

use crate::config::file::{
    ApiKeysFileConfig, ChatFileConfig, KotobaConfigFile, VoiceFileConfig,
};
use crate::config::{ChatConfig, DEFAULT_RECORD_SECS};
use crate::tutor::ProficiencyTier;

/// Run the interactive setup wizard
///
/// # Errors
///
/// Returns error if user input fails or config cannot be written
pub fn run_setup() -> anyhow::Result<()> {
    println!("Kotoba Setup\n");

    // Load existing config if present
    let existing = crate::config::file::load_config_file();
    let config_path = crate::config::file::config_file_path()
        .unwrap_or_else(|| PathBuf::from("~/.config/kotoba/config.toml"));

    if config_path.exists() {
        println!("Existing config found at {}\n", config_path.display());
    }

    // 1. Proficiency tier
    let tiers = ProficiencyTier::ALL;
    let tier_labels: Vec<&str> = tiers.iter().map(|t| t.as_str()).collect();
    let default_tier = existing
        .tier
        .and_then(|t| tiers.iter().position(|&candidate| candidate == t))
        .unwrap_or(0);

    let tier_idx = Select::new()
        .with_prompt("Your Japanese level")
        .items(&tier_labels)
        .default(default_tier)
        .interact()?;
    let tier = tiers[tier_idx];

    // 2. API key
    let existing_key = existing.api_keys.openai.as_deref();
    let masked = existing_key.map(mask_key);

    let prompt = masked.as_ref().map_or_else(
        || "OpenAI API key (leave blank to use OPENAI_API_KEY)".to_string(),
        |m| format!("OpenAI API key (current: {m}, leave blank to keep)"),
    );

    let api_key_input: String = Input::new()
        .with_prompt(&prompt)
        .allow_empty(true)
        .interact_text()?;

    let openai = if api_key_input.is_empty() {
        existing_key.map(str::to_string)
    } else {
        Some(api_key_input)
    };

    // 3. Chat model
    let default_model = existing
        .chat
        .model
        .clone()
        .unwrap_or_else(|| ChatConfig::default().model);

    let model: String = Input::new()
        .with_prompt("Chat model")
        .default(default_model)
        .interact_text()?;

    // 4. Voice
    let record_secs: u64 = Input::new()
        .with_prompt("Seconds to record per turn")
        .default(existing.voice.record_secs.unwrap_or(DEFAULT_RECORD_SECS))
        .validate_with(|secs: &u64| {
            if *secs == 0 {
                Err("must be at least 1")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let speak = Confirm::new()
        .with_prompt("Speak replies aloud?")
        .default(existing.voice.speak.unwrap_or(false))
        .interact()?;

    // 5. Build and write config
    let config_file = KotobaConfigFile {
        tier: Some(tier),
        chat: ChatFileConfig {
            model: Some(model),
            ..existing.chat
        },
        voice: VoiceFileConfig {
            record_secs: Some(record_secs),
            speak: Some(speak),
            ..existing.voice
        },
        api_keys: ApiKeysFileConfig { openai },
    };

    crate::config::file::write_config_file(&config_path, &config_file)?;
    println!("\nConfig written to {}", config_path.display());

    Ok(())
}

/// Show only the ends of a stored key
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "****".to_string()
    }
}
