// ABOUTME: Background speech dispatcher with a bounded FIFO queue and flush support
// ABOUTME: Plays one utterance at a time, drops stale entries, and cancels on flush or mute
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pierre_core::constants::feedback::{DEFAULT_AUDIO_QUEUE_CAPACITY, DEFAULT_SPEECH_MAX_AGE_MS};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::sink::SpeechSink;

/// Speech queue settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioConfig {
    /// Maximum queued utterances; enqueue fails when full
    pub queue_capacity: usize,
    /// Utterances older than this when dequeued are dropped unspoken
    pub speech_max_age: Duration,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_AUDIO_QUEUE_CAPACITY,
            speech_max_age: Duration::from_millis(DEFAULT_SPEECH_MAX_AGE_MS),
        }
    }
}

#[derive(Debug)]
struct SpeechRequest {
    text: String,
    enqueued_at: Instant,
    epoch: u64,
}

/// Handle to the speech worker task
///
/// Every flush bumps an epoch; queued requests from an earlier epoch are
/// discarded and the utterance in progress is cut short.
pub struct AudioDispatcher {
    sender: mpsc::Sender<SpeechRequest>,
    epoch: watch::Sender<u64>,
    playing: Arc<AtomicBool>,
    pending: Arc<AtomicUsize>,
    muted: AtomicBool,
    worker: JoinHandle<()>,
}

impl AudioDispatcher {
    /// Spawn the worker on the current tokio runtime
    #[must_use]
    pub fn spawn(sink: Arc<dyn SpeechSink>, config: AudioConfig) -> Self {
        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let (epoch, epoch_rx) = watch::channel(0_u64);
        let playing = Arc::new(AtomicBool::new(false));
        let pending = Arc::new(AtomicUsize::new(0));

        debug!(sink = sink.name(), capacity = config.queue_capacity, "Starting audio dispatcher");
        let worker = tokio::spawn(run_worker(
            sink,
            receiver,
            epoch_rx,
            Arc::clone(&playing),
            Arc::clone(&pending),
            config.speech_max_age,
        ));

        Self {
            sender,
            epoch,
            playing,
            pending,
            muted: AtomicBool::new(false),
            worker,
        }
    }

    /// Queue an utterance; returns `false` if muted, full, or shut down
    pub fn enqueue(&self, text: impl Into<String>) -> bool {
        if self.is_muted() {
            return false;
        }
        let request = SpeechRequest {
            text: text.into(),
            enqueued_at: Instant::now(),
            epoch: *self.epoch.borrow(),
        };
        self.pending.fetch_add(1, Ordering::AcqRel);
        match self.sender.try_send(request) {
            Ok(()) => true,
            Err(TrySendError::Full(request)) => {
                self.pending.fetch_sub(1, Ordering::AcqRel);
                warn!(speech = %request.text, "Speech queue full, dropping message");
                false
            }
            Err(TrySendError::Closed(_)) => {
                self.pending.fetch_sub(1, Ordering::AcqRel);
                false
            }
        }
    }

    /// Discard queued speech and stop the current utterance
    pub fn flush(&self) {
        self.epoch.send_modify(|epoch| *epoch = epoch.wrapping_add(1));
        debug!("Flushed speech queue");
    }

    /// Muting flushes and rejects new speech until unmuted
    pub fn set_muted(&self, muted: bool) {
        self.muted.store(muted, Ordering::Release);
        if muted {
            self.flush();
        }
    }

    /// Whether speech is currently muted
    #[must_use]
    pub fn is_muted(&self) -> bool {
        self.muted.load(Ordering::Acquire)
    }

    /// Whether an utterance is being spoken right now
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    /// Requests not yet taken by the worker, including flushed ones
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Close the queue and wait for the worker to drain it
    pub async fn shutdown(self) {
        let Self {
            sender,
            epoch,
            worker,
            ..
        } = self;
        drop(sender);
        if let Err(e) = worker.await {
            warn!(error = %e, "Audio worker terminated abnormally");
        }
        drop(epoch);
    }
}

async fn run_worker(
    sink: Arc<dyn SpeechSink>,
    mut receiver: mpsc::Receiver<SpeechRequest>,
    mut epoch_rx: watch::Receiver<u64>,
    playing: Arc<AtomicBool>,
    pending: Arc<AtomicUsize>,
    max_age: Duration,
) {
    while let Some(request) = receiver.recv().await {
        pending.fetch_sub(1, Ordering::AcqRel);

        let current = *epoch_rx.borrow_and_update();
        if request.epoch != current {
            debug!(speech = %request.text, "Discarding flushed speech");
            continue;
        }
        let age = request.enqueued_at.elapsed();
        if age > max_age {
            debug!(speech = %request.text, age_ms = age.as_millis(), "Discarding stale speech");
            continue;
        }

        playing.store(true, Ordering::Release);
        tokio::select! {
            result = sink.speak(&request.text) => {
                if let Err(e) = result {
                    warn!(sink = sink.name(), error = %e, "Speech sink failed");
                }
            }
            _ = epoch_rx.changed() => {
                debug!(speech = %request.text, "Speech interrupted by flush");
            }
        }
        playing.store(false, Ordering::Release);
    }
    debug!("Audio dispatcher stopped");
}
