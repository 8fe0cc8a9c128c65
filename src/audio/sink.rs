// ABOUTME: Speech sink trait for text-to-speech backends and a tracing-based sink
// ABOUTME: Hosts plug in a real TTS engine; the tracing sink logs utterances with pacing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::info;

use crate::errors::AppResult;

/// Text-to-speech backend
///
/// `speak` resolves when the utterance has finished playing. The dispatcher
/// drops the future to cut speech short, so implementations must stop playback
/// when dropped.
#[async_trait]
pub trait SpeechSink: Send + Sync {
    /// Play one utterance to completion
    async fn speak(&self, text: &str) -> AppResult<()>;

    /// Backend name for logs
    fn name(&self) -> &'static str;
}

/// Sink that logs each utterance and optionally simulates its duration
#[derive(Debug, Clone, Default)]
pub struct TracingSpeechSink {
    per_word: Option<Duration>,
}

impl TracingSpeechSink {
    /// Sink that returns immediately
    #[must_use]
    pub const fn new() -> Self {
        Self { per_word: None }
    }

    /// Sink that takes `per_word` for every word spoken
    #[must_use]
    pub const fn with_pacing(per_word: Duration) -> Self {
        Self {
            per_word: Some(per_word),
        }
    }
}

#[async_trait]
impl SpeechSink for TracingSpeechSink {
    async fn speak(&self, text: &str) -> AppResult<()> {
        info!(speech = %text, "Speaking");
        if let Some(per_word) = self.per_word {
            let words = u32::try_from(text.split_whitespace().count()).unwrap_or(u32::MAX);
            sleep(per_word.saturating_mul(words)).await;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "tracing"
    }
}
