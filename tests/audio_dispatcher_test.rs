// ABOUTME: Integration tests for the speech dispatcher task
// ABOUTME: FIFO delivery, flush cancellation, stale dropping, mute and queue bounds
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{init_test_logging, recording_dispatcher, RecordingSpeechSink};
use pierre_form_coach::audio::{AudioConfig, AudioDispatcher, SpeechSink};
use tokio::time::sleep;

fn dispatcher(sink: &Arc<RecordingSpeechSink>, config: AudioConfig) -> AudioDispatcher {
    init_test_logging();
    AudioDispatcher::spawn(Arc::clone(sink) as Arc<dyn SpeechSink>, config)
}

#[tokio::test(start_paused = true)]
async fn test_messages_play_in_enqueue_order() {
    init_test_logging();
    let sink = RecordingSpeechSink::with_duration(Duration::from_millis(300));
    let audio = recording_dispatcher(&sink);

    assert!(audio.enqueue("one"));
    assert!(audio.enqueue("two"));
    assert!(audio.enqueue("three"));
    audio.shutdown().await;

    assert_eq!(sink.finished(), vec!["one", "two", "three"]);
}

#[tokio::test(start_paused = true)]
async fn test_new_message_waits_for_current() {
    init_test_logging();
    let sink = RecordingSpeechSink::with_duration(Duration::from_secs(1));
    let audio = recording_dispatcher(&sink);

    audio.enqueue("first");
    sleep(Duration::from_millis(100)).await;
    assert!(audio.is_playing());

    audio.enqueue("second");
    sleep(Duration::from_millis(100)).await;
    assert_eq!(sink.started(), vec!["first"]);

    audio.shutdown().await;
    assert_eq!(sink.finished(), vec!["first", "second"]);
}

#[tokio::test(start_paused = true)]
async fn test_flush_cancels_current_and_queued() {
    let sink = RecordingSpeechSink::with_duration(Duration::from_secs(1));
    let audio = dispatcher(&sink, AudioConfig::default());

    audio.enqueue("interrupted");
    audio.enqueue("discarded");
    sleep(Duration::from_millis(100)).await;
    assert!(audio.is_playing());

    audio.flush();
    audio.enqueue("after flush");
    audio.shutdown().await;

    assert_eq!(sink.started(), vec!["interrupted", "after flush"]);
    assert_eq!(sink.finished(), vec!["after flush"]);
}

#[tokio::test(start_paused = true)]
async fn test_stale_messages_are_dropped() {
    let sink = RecordingSpeechSink::with_duration(Duration::from_secs(1));
    let audio = dispatcher(
        &sink,
        AudioConfig {
            queue_capacity: 8,
            speech_max_age: Duration::from_millis(1500),
        },
    );

    for text in ["one", "two", "three", "four"] {
        audio.enqueue(text);
    }
    audio.shutdown().await;

    // "three" reaches the head 2 s after it was queued
    assert_eq!(sink.started(), vec!["one", "two"]);
}

#[tokio::test(start_paused = true)]
async fn test_mute_rejects_and_unmute_restores() {
    let sink = RecordingSpeechSink::new();
    let audio = dispatcher(&sink, AudioConfig::default());

    audio.set_muted(true);
    assert!(audio.is_muted());
    assert!(!audio.enqueue("silenced"));

    audio.set_muted(false);
    assert!(audio.enqueue("audible"));
    audio.shutdown().await;

    assert_eq!(sink.finished(), vec!["audible"]);
}

#[tokio::test(start_paused = true)]
async fn test_full_queue_rejects_message() {
    let sink = RecordingSpeechSink::new();
    let audio = dispatcher(
        &sink,
        AudioConfig {
            queue_capacity: 2,
            ..AudioConfig::default()
        },
    );

    // The worker has not run yet on the current-thread runtime
    assert!(audio.enqueue("a"));
    assert!(audio.enqueue("b"));
    assert!(!audio.enqueue("c"));
    assert_eq!(audio.pending(), 2);

    audio.shutdown().await;
    assert_eq!(sink.finished(), vec!["a", "b"]);
}

#[tokio::test(start_paused = true)]
async fn test_idle_dispatcher_is_not_playing() {
    let sink = RecordingSpeechSink::new();
    let audio = dispatcher(&sink, AudioConfig::default());
    sleep(Duration::from_millis(10)).await;
    assert!(!audio.is_playing());
    assert_eq!(audio.pending(), 0);
    audio.shutdown().await;
}
