use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use ultex_capture::{CameraSettings, SessionRecorder};
use ultex_experiment::{Design, Session, SessionConfig};
use ultex_timing::SystemClock;

mod app;
mod screens;
mod text;

use app::App;
use screens::ImageBank;
use text::LabelPainter;

/// Runs the simulated Ultimatum Game session: full-screen stimuli,
/// synchronized webcam recording, and per-transition trial logs.
#[derive(Parser)]
#[command(name = "ultex")]
struct Args {
    /// Participant identifier
    #[arg(default_value_t = 101)]
    subject: u32,

    /// Design table (whitespace-delimited, header row skipped)
    #[arg(long, default_value = "include/design.txt")]
    design: PathBuf,

    /// Stimulus image directory
    #[arg(long, default_value = "include/img")]
    assets: PathBuf,

    /// Font for the offer label
    #[arg(long, default_value = "include/DejaVuSans.ttf")]
    font: PathBuf,

    /// Where run logs and videos are written
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Shuffle trial order once at startup
    #[arg(long)]
    shuffle: bool,

    /// Camera index
    #[arg(long, default_value_t = 0)]
    camera: i32,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut design = Design::load(&args.design)?;
    if args.shuffle {
        design.shuffle(&mut rand::rng());
    }

    let mut emotion_ids: Vec<u32> = design.rows().iter().map(|r| r.emotion_id).collect();
    emotion_ids.sort_unstable();
    emotion_ids.dedup();

    let images = ImageBank::load(&args.assets, &emotion_ids)?;
    let font_bytes = fs::read(&args.font)
        .with_context(|| format!("failed to read font {}", args.font.display()))?;
    let label = LabelPainter::new(font_bytes, 48.0)?;

    let config = SessionConfig {
        subject_id: args.subject,
        data_dir: args.data_dir.clone(),
        ..SessionConfig::default()
    };

    let settings = CameraSettings {
        index: args.camera,
        ..CameraSettings::default()
    };
    let recorder = SessionRecorder::new(settings, &args.data_dir, args.subject)
        .context("camera unavailable; aborting before the session starts")?;

    let session = Session::new(config, design, SystemClock::new(), recorder)?;
    App::new(session, images, label).run()
}
