use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use kotoba::voice::{
    AudioCapture, AudioPlayback, PLAYBACK_SAMPLE_RATE, Recorder, Synthesizer, TextToSpeech,
    WhisperTranscriber,
};
use kotoba::{
    Config, ConfigOverrides, ConsoleOutput, OpenAiChat, OutputSink, PipelineSettings,
    ProficiencyTier, QUIT_KEYWORD, SpokenOutput, StdinTrigger, TutorPipeline,
};

/// Kotoba - speak Japanese with an AI tutor
#[derive(Parser)]
#[command(name = "kotoba", version, about)]
struct Cli {
    /// Your Japanese level: beginner, intermediate or advanced
    #[arg(short, long, env = "KOTOBA_TIER")]
    tier: Option<String>,

    /// Speak replies aloud
    #[arg(long, overrides_with = "no_speak")]
    speak: bool,

    /// Only print replies
    #[arg(long)]
    no_speak: bool,

    /// Seconds of audio recorded per turn
    #[arg(short, long)]
    duration: Option<u64>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        let speak = match (self.speak, self.no_speak) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };

        ConfigOverrides {
            tier: self.tier.as_deref().map(ProficiencyTier::parse),
            speak,
            record_secs: self.duration,
        }
    }
}

#[derive(Subcommand)]
#[allow(clippy::enum_variant_names)]
enum Command {
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Test speaker output
    TestSpeaker,
    /// Test TTS output
    TestTts {
        /// Text to speak
        #[arg(default_value = "こんにちは！日本語の練習を始めましょう。")]
        text: String,
    },
    /// Interactive first-run setup
    Setup,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,kotoba=info",
        1 => "info,kotoba=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let overrides = cli.overrides();

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::TestMic { duration } => test_mic(duration),
            Command::TestSpeaker => test_speaker(),
            Command::TestTts { text } => test_tts(&overrides, &text).await,
            Command::Setup => kotoba::setup::run_setup(),
        };
    }

    let config = Config::load(&overrides)?;
    tracing::debug!(?config, "loaded configuration");

    // The microphone is the one resource we cannot run without
    let recorder = AudioCapture::new()?;

    let transcriber = WhisperTranscriber::new(config.api_key(), &config.base_url, &config.voice)?;
    let chat = OpenAiChat::new(config.api_key(), &config.base_url, &config.chat)?;

    let output: Box<dyn OutputSink> = if config.voice.speak {
        let tts = TextToSpeech::new(config.api_key(), &config.base_url, &config.voice)?;
        Box::new(SpokenOutput::new(tts, AudioPlayback::new()?))
    } else {
        Box::new(ConsoleOutput)
    };

    let settings = PipelineSettings {
        record_duration: config.voice.record_duration(),
        wav_path: config.voice.wav_path.clone(),
    };

    println!("=== Kotoba: Japanese conversation practice ===");
    println!("Level: {}  |  Model: {}", config.tier, chat.model());
    println!(
        "Speak in Japanese, English, or both. Each recording lasts {} seconds.",
        settings.record_duration.as_secs()
    );
    println!("Type or say '{QUIT_KEYWORD}' to exit.\n");

    tracing::info!(
        tier = %config.tier,
        speak = config.voice.speak,
        record_secs = config.voice.record_secs,
        "starting tutor session"
    );

    let mut pipeline = TutorPipeline::new(
        StdinTrigger::stdin(),
        recorder,
        transcriber,
        chat,
        output,
        config.tier,
        settings,
    );

    let exchanges = pipeline.run().await?;
    println!("Goodbye! Keep practicing! ({exchanges} exchanges)");

    Ok(())
}

/// Test microphone input
fn test_mic(duration: u64) -> anyhow::Result<()> {
    println!("Testing microphone for {duration} seconds...");
    println!("Speak into your microphone!\n");

    let mut capture = AudioCapture::new()?;
    println!("Device sample rate: {} Hz", capture.device_sample_rate());
    println!("---");

    for i in 0..duration {
        let clip = capture.record(Duration::from_secs(1))?;
        let energy = clip.rms();
        let peak = clip.samples().iter().map(|s| s.abs()).fold(0.0f32, f32::max);

        // Visual meter
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let meter_len = (energy * 100.0).min(50.0) as usize;
        let meter: String = "█".repeat(meter_len) + &" ".repeat(50 - meter_len);

        println!(
            "[{:2}s] RMS: {:.4} | Peak: {:.4} | [{}]",
            i + 1,
            energy,
            peak,
            meter
        );
    }

    println!("\n---");
    println!("If you saw movement in the meter, your mic is working!");
    println!("If RMS stayed near 0, check:");
    println!("  1. Is your mic plugged in?");
    println!("  2. Run: pactl info | grep 'Default Source'");
    println!("  3. Run: arecord -l (to list devices)");

    Ok(())
}

/// Test speaker output with a sine wave
fn test_speaker() -> anyhow::Result<()> {
    println!("Testing speaker output...");
    println!("You should hear a 440Hz tone for 2 seconds\n");

    let playback = AudioPlayback::new()?;

    let frequency = 440.0_f32;
    let num_samples = PLAYBACK_SAMPLE_RATE as usize * 2;

    #[allow(clippy::cast_precision_loss)]
    let samples: Vec<f32> = (0..num_samples)
        .map(|i| {
            let t = i as f32 / PLAYBACK_SAMPLE_RATE as f32;
            (2.0 * std::f32::consts::PI * frequency * t).sin() * 0.3 // 30% volume
        })
        .collect();

    println!(
        "Playing {} samples at {} Hz...",
        samples.len(),
        PLAYBACK_SAMPLE_RATE
    );
    playback.play(samples)?;

    println!("\n---");
    println!("If you heard the tone, your speakers are working!");
    println!("If you didn't hear anything, check:");
    println!("  1. Run: pactl info | grep 'Default Sink'");
    println!("  2. Run: pactl list sinks short");

    Ok(())
}

/// Test TTS output
async fn test_tts(overrides: &ConfigOverrides, text: &str) -> anyhow::Result<()> {
    println!("Testing TTS with text: \"{text}\"\n");

    let config = Config::load(overrides)?;
    let tts = TextToSpeech::new(config.api_key(), &config.base_url, &config.voice)?;

    println!("Synthesizing speech...");
    let mp3_data = tts.synthesize(text).await?;
    println!("Got {} bytes of audio data", mp3_data.len());

    println!("Playing audio...");
    AudioPlayback::new()?.play_mp3(&mp3_data)?;

    println!("\n---");
    println!("If you heard the speech, TTS is working!");

    Ok(())
}
