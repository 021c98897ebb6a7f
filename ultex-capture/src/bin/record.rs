use anyhow::Result;
use clap::Parser;
use log::info;
use std::sync::atomic::AtomicBool;
use std::time::Duration;
use ultex_capture::{
    BackgroundCapture, CameraSettings, FrameInfoLog, OutputMode, RecordingPlan, VideoGrabber,
    run_capture,
};
use ultex_timing::{Clock, SystemClock};

/// Records webcam video, or numbered frame files, with a per-frame info
/// log written alongside the output.
#[derive(Parser)]
#[command(name = "ultex-record")]
struct Args {
    /// Output file; the extension picks the mode (avi/mov/mp4/mkv record
    /// a video, png/jpg/jpeg record numbered frames)
    #[arg(default_value = "movie.mp4")]
    filename: String,

    /// Capture on the calling thread; pass `false` to capture on a
    /// background thread instead
    #[arg(value_name = "LOOP", default_value_t = true)]
    capture_loop: bool,

    /// Seconds to record; unlimited when not positive
    #[arg(default_value_t = -1.0, allow_negative_numbers = true)]
    duration: f64,

    /// Camera index
    #[arg(long, default_value_t = 0)]
    camera: i32,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let plan = RecordingPlan::from_filename(&args.filename);
    let settings = CameraSettings {
        index: args.camera,
        ..CameraSettings::standalone()
    };
    let duration = (args.duration > 0.0).then(|| Duration::from_secs_f64(args.duration));

    let mut grabber = match plan.mode {
        OutputMode::Video => VideoGrabber::open(&settings, &plan.video_path())?,
        OutputMode::Frames => VideoGrabber::open_frames(&settings, &plan)?,
    };
    let mut frame_log = FrameInfoLog::create(&plan.frame_log_path())?;
    info!(
        "recording to {} ({:?} mode), info log {}",
        plan.video_path().display(),
        plan.mode,
        plan.frame_log_path().display()
    );

    let clock = SystemClock::new();
    if args.capture_loop {
        run_capture(
            &mut grabber,
            &mut frame_log,
            &clock,
            duration,
            &AtomicBool::new(true),
        );
        frame_log.close()?;
        grabber.release();
    } else {
        let mut capture = BackgroundCapture::spawn(grabber, frame_log, SystemClock::new());
        match duration {
            Some(limit) => clock.sleep(limit),
            // Until the process is killed.
            None => loop {
                clock.sleep(Duration::from_secs(1));
            },
        }
        capture.stop();
    }

    println!("Recording finished.");
    Ok(())
}
