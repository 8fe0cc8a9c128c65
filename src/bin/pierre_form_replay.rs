// ABOUTME: Replays recorded landmark frames through a workout session from the command line
// ABOUTME: Reads newline-delimited JSON frames, logs coaching speech, prints the session summary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Usage:
//! ```bash
//! # Replay a recording as a beginner squat session
//! cargo run --bin pierre-form-replay -- --input squat.ndjson --exercise squat
//!
//! # Switch to pro thresholds at frame 120 and print every frame analysis
//! cargo run --bin pierre-form-replay -- --input squat.ndjson --switch-at 120 --switch-mode pro --emit-frames
//!
//! # Read frames from stdin
//! cat curl.ndjson | cargo run --bin pierre-form-replay -- --exercise bicep_curl
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::Parser;
use pierre_core::models::{ExerciseType, LandmarkFrame, SkillMode};
use pierre_form_coach::audio::{AudioDispatcher, SpeechSink, TracingSpeechSink};
use pierre_form_coach::config::{FormCoachConfig, ThresholdStore};
use pierre_form_coach::logging;
use pierre_form_coach::session::WorkoutSession;
use tokio::fs::File;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "pierre-form-replay",
    about = "Replay recorded pose landmarks through the form coach",
    long_about = "Runs newline-delimited JSON landmark frames through a workout session and prints the session summary as JSON."
)]
struct ReplayArgs {
    /// Frame file; stdin when omitted
    #[arg(long, short = 'i')]
    input: Option<PathBuf>,

    /// Exercise (squat, push_up, bicep_curl); overrides the environment default
    #[arg(long, short = 'e')]
    exercise: Option<ExerciseType>,

    /// Skill mode (beginner, pro); overrides the environment default
    #[arg(long, short = 'm')]
    mode: Option<SkillMode>,

    /// Frame index at which to switch skill mode
    #[arg(long, requires = "switch_mode")]
    switch_at: Option<usize>,

    /// Mode to switch to at `--switch-at`
    #[arg(long, requires = "switch_at")]
    switch_mode: Option<SkillMode>,

    /// YAML profile table; overrides the environment setting
    #[arg(long)]
    profiles: Option<PathBuf>,

    /// Simulated speech duration per word, in milliseconds
    #[arg(long, default_value = "0")]
    speech_word_ms: u64,

    /// Print every frame analysis as a JSON line before the summary
    #[arg(long)]
    emit_frames: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = ReplayArgs::parse();
    logging::init_from_env()?;

    let mut config = FormCoachConfig::from_env()?;
    if let Some(exercise) = args.exercise {
        config.default_exercise = exercise;
    }
    if let Some(mode) = args.mode {
        config.default_mode = mode;
    }
    if args.profiles.is_some() {
        config.profiles_path.clone_from(&args.profiles);
    }

    let store = Arc::new(ThresholdStore::new(
        config.load_profile_table()?,
        config.default_exercise,
        config.default_mode,
    )?);
    let sink: Arc<dyn SpeechSink> = if args.speech_word_ms == 0 {
        Arc::new(TracingSpeechSink::new())
    } else {
        Arc::new(TracingSpeechSink::with_pacing(Duration::from_millis(
            args.speech_word_ms,
        )))
    };
    let audio = AudioDispatcher::spawn(sink, config.audio);
    let mut session = WorkoutSession::start(store, audio);

    let reader: Box<dyn AsyncBufRead + Unpin> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path)
                .await
                .map_err(|e| anyhow!("Failed to open {}: {e}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };
    let mut lines = reader.lines();
    let mut stdout = io::stdout();
    let mut index = 0_usize;
    let mut skipped = 0_usize;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        if args.switch_at == Some(index) {
            if let Some(mode) = args.switch_mode {
                let exercise = session.store().active().exercise();
                session.switch(exercise, mode)?;
            }
        }
        index += 1;

        let frame: LandmarkFrame = match serde_json::from_str(&line) {
            Ok(frame) => frame,
            Err(e) => {
                skipped += 1;
                warn!(line = index, error = %e, "Skipping malformed frame");
                continue;
            }
        };
        let analysis = session.process_frame(&frame);
        if args.emit_frames {
            let mut encoded = serde_json::to_vec(&analysis)?;
            encoded.push(b'\n');
            stdout.write_all(&encoded).await?;
        }
    }

    info!(frames = index, skipped, "Replay finished");
    let summary = session.stop().await;
    let mut encoded = serde_json::to_vec_pretty(&summary)?;
    encoded.push(b'\n');
    stdout.write_all(&encoded).await?;
    stdout.flush().await?;
    Ok(())
}
