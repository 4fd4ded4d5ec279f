//! Tutor loop integration tests
//!
//! Drives the full pipeline with scripted collaborators, no audio hardware
//! or network required

mod common;

use std::time::Duration;

use common::{
    CollectingOutput, FakeRecorder, MissingMicrophone, RecordingChat, ScriptedTranscriber,
    ScriptedTrigger,
};
use kotoba::voice::Transcription;
use kotoba::{
    APOLOGY, Error, NO_SPEECH_NOTICE, PipelineSettings, ProficiencyTier, Role, TriggerAction,
    TurnOutcome, TutorPipeline,
};

fn settings(dir: &tempfile::TempDir) -> PipelineSettings {
    PipelineSettings {
        record_duration: Duration::from_secs(5),
        wav_path: dir.path().join("capture.wav"),
    }
}

#[tokio::test]
async fn test_conversation_accumulates_history() {
    let dir = tempfile::tempdir().unwrap();
    let recorder = FakeRecorder::default();
    let chat = RecordingChat::new(vec![
        Ok("こんにちは！お元気ですか？".to_string()),
        Ok("それはよかったです。".to_string()),
    ]);
    let output = CollectingOutput::default();

    let mut pipeline = TutorPipeline::new(
        ScriptedTrigger::records(2),
        recorder.clone(),
        ScriptedTranscriber::texts(&["こんにちは", "元気です"]),
        chat.clone(),
        output.clone(),
        ProficiencyTier::Beginner,
        settings(&dir),
    );

    let exchanges = pipeline.run().await.unwrap();
    assert_eq!(exchanges, 2);
    assert_eq!(recorder.call_count(), 2);
    assert_eq!(
        recorder.calls.lock().unwrap()[0],
        Duration::from_secs(5)
    );

    let history = pipeline.session().history();
    let roles: Vec<Role> = history.iter().map(|t| t.role()).collect();
    assert_eq!(
        roles,
        vec![Role::User, Role::Assistant, Role::User, Role::Assistant]
    );
    assert_eq!(history[2].content(), "元気です");

    assert_eq!(
        *output.replies.lock().unwrap(),
        vec!["こんにちは！お元気ですか？", "それはよかったです。"]
    );

    // Second request carries the first exchange between system and new turn
    let requests = chat.requests.lock().unwrap();
    assert_eq!(requests[1].len(), 4);
    assert_eq!(requests[1][0].role(), Role::System);
    assert_eq!(requests[1][1].content(), "こんにちは");
    assert_eq!(requests[1][3].content(), "元気です");
}

#[tokio::test]
async fn test_spoken_quit_stops_without_chat() {
    let dir = tempfile::tempdir().unwrap();
    let chat = RecordingChat::new(vec![Ok("unused".to_string())]);
    let recorder = FakeRecorder::default();

    let mut pipeline = TutorPipeline::new(
        ScriptedTrigger::records(3),
        recorder.clone(),
        ScriptedTranscriber::texts(&["Quit."]),
        chat.clone(),
        CollectingOutput::default(),
        ProficiencyTier::Intermediate,
        settings(&dir),
    );

    assert_eq!(pipeline.run().await.unwrap(), 0);
    assert_eq!(chat.request_count(), 0);
    // Loop ended on the first clip even though more triggers were queued
    assert_eq!(recorder.call_count(), 1);
}

#[tokio::test]
async fn test_typed_quit_stops_before_recording() {
    let dir = tempfile::tempdir().unwrap();
    let chat = RecordingChat::new(Vec::new());
    let recorder = FakeRecorder::default();

    let mut pipeline = TutorPipeline::new(
        ScriptedTrigger::new([TriggerAction::Quit, TriggerAction::Record]),
        recorder.clone(),
        ScriptedTranscriber::texts(&["こんにちは"]),
        chat.clone(),
        CollectingOutput::default(),
        ProficiencyTier::Advanced,
        settings(&dir),
    );

    assert_eq!(pipeline.step().await.unwrap(), TurnOutcome::Quit);
    assert_eq!(recorder.call_count(), 0);
    assert_eq!(chat.request_count(), 0);
}

#[tokio::test]
async fn test_blank_transcript_never_reaches_chat() {
    let dir = tempfile::tempdir().unwrap();
    let chat = RecordingChat::new(vec![Ok("はい".to_string())]);
    let output = CollectingOutput::default();

    let mut pipeline = TutorPipeline::new(
        ScriptedTrigger::records(3),
        FakeRecorder::default(),
        ScriptedTranscriber::texts(&["", "   \n", "はい"]),
        chat.clone(),
        output.clone(),
        ProficiencyTier::Beginner,
        settings(&dir),
    );

    assert_eq!(pipeline.step().await.unwrap(), TurnOutcome::NoSpeech);
    assert_eq!(pipeline.step().await.unwrap(), TurnOutcome::NoSpeech);
    assert_eq!(chat.request_count(), 0);

    assert_eq!(
        pipeline.step().await.unwrap(),
        TurnOutcome::Replied("はい".to_string())
    );
    assert_eq!(chat.request_count(), 1);
    assert_eq!(output.replies.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_transcription_failure_is_treated_as_no_speech() {
    let dir = tempfile::tempdir().unwrap();
    let chat = RecordingChat::new(Vec::new());

    let mut pipeline = TutorPipeline::new(
        ScriptedTrigger::records(1),
        FakeRecorder::default(),
        ScriptedTranscriber::new(vec![Err(Error::Stt("401 Unauthorized".to_string()))]),
        chat.clone(),
        CollectingOutput::default(),
        ProficiencyTier::Beginner,
        settings(&dir),
    );

    assert_eq!(pipeline.step().await.unwrap(), TurnOutcome::NoSpeech);
    assert_eq!(chat.request_count(), 0);
    assert!(pipeline.session().history().is_empty());
}

#[tokio::test]
async fn test_chat_failure_delivers_apology_and_keeps_history() {
    let dir = tempfile::tempdir().unwrap();
    let chat = RecordingChat::new(vec![
        Ok("どうぞ".to_string()),
        Err(Error::Chat("rate limited".to_string())),
        Ok("もう一度どうぞ".to_string()),
    ]);
    let output = CollectingOutput::default();

    let mut pipeline = TutorPipeline::new(
        ScriptedTrigger::records(3),
        FakeRecorder::default(),
        ScriptedTranscriber::texts(&["始めます", "次", "次"]),
        chat.clone(),
        output.clone(),
        ProficiencyTier::Beginner,
        settings(&dir),
    );

    pipeline.step().await.unwrap();
    assert_eq!(pipeline.session().history().len(), 2);

    let outcome = pipeline.step().await.unwrap();
    assert_eq!(outcome, TurnOutcome::Replied(APOLOGY.to_string()));
    assert_eq!(pipeline.session().history().len(), 2);
    assert_eq!(output.replies.lock().unwrap()[1], APOLOGY);

    // Retry on the next turn is unaffected by the failed attempt
    pipeline.step().await.unwrap();
    let requests = chat.requests.lock().unwrap();
    assert_eq!(requests[1], requests[2]);
    assert_eq!(pipeline.session().history().len(), 4);
}

#[tokio::test]
async fn test_missing_microphone_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let chat = RecordingChat::new(Vec::new());

    let mut pipeline = TutorPipeline::new(
        ScriptedTrigger::records(1),
        MissingMicrophone,
        ScriptedTranscriber::texts(&[]),
        chat.clone(),
        CollectingOutput::default(),
        ProficiencyTier::Beginner,
        settings(&dir),
    );

    let err = pipeline.run().await.unwrap_err();
    assert!(matches!(err, Error::Audio(_)));
    assert_eq!(chat.request_count(), 0);
}

#[tokio::test]
async fn test_capture_is_written_to_wav_file_and_uploaded() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings(&dir);
    let wav_path = settings.wav_path.clone();
    let transcriber = ScriptedTranscriber::new(vec![Ok(Transcription {
        text: "hello".to_string(),
        language: Some("english".to_string()),
    })]);

    let mut pipeline = TutorPipeline::new(
        ScriptedTrigger::records(1),
        FakeRecorder::default(),
        transcriber.clone(),
        RecordingChat::new(vec![Ok("こんにちは".to_string())]),
        CollectingOutput::default(),
        ProficiencyTier::Beginner,
        settings,
    );

    pipeline.step().await.unwrap();

    let on_disk = std::fs::read(&wav_path).unwrap();
    let uploaded = transcriber.received.lock().unwrap();
    assert_eq!(uploaded.len(), 1);
    assert_eq!(uploaded[0], on_disk);
    assert_eq!(&on_disk[0..4], b"RIFF");
}

#[tokio::test]
async fn test_progress_lines_go_through_the_output_sink() {
    let dir = tempfile::tempdir().unwrap();
    let output = CollectingOutput::default();

    let mut pipeline = TutorPipeline::new(
        ScriptedTrigger::records(2),
        FakeRecorder::default(),
        ScriptedTranscriber::new(vec![
            Ok(Transcription::default()),
            Ok(Transcription {
                text: "おはよう".to_string(),
                language: Some("japanese".to_string()),
            }),
        ]),
        RecordingChat::new(vec![Ok("おはようございます。".to_string())]),
        output.clone(),
        ProficiencyTier::Beginner,
        settings(&dir),
    );

    pipeline.run().await.unwrap();

    assert_eq!(
        *output.notices.lock().unwrap(),
        vec![
            "Recording... (5 seconds)".to_string(),
            "Transcribing...".to_string(),
            NO_SPEECH_NOTICE.to_string(),
            "Recording... (5 seconds)".to_string(),
            "Transcribing...".to_string(),
            "You said: おはよう (detected language: japanese)".to_string(),
        ]
    );
    assert_eq!(*output.replies.lock().unwrap(), vec!["おはようございます。"]);
}
