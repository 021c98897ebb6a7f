use crate::frame_log::FrameInfoLog;
use crate::grabber::VideoGrabber;
use log::{error, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;
use ultex_timing::Clock;

/// Shared capture loop: one iteration grabs a frame and records an info
/// row. The loop free-runs; the blocking camera read sets the pace.
/// Used on the calling thread by the standalone recorder and inside
/// [`BackgroundCapture`].
pub fn run_capture<C: Clock>(
    grabber: &mut VideoGrabber,
    info: &mut FrameInfoLog,
    clock: &C,
    duration: Option<Duration>,
    running: &AtomicBool,
) {
    let started = clock.now();
    let mut iteration: u64 = 0;
    while running.load(Ordering::SeqCst) {
        let acquired = grabber.capture_frame();
        if let Err(e) = info.write(iteration, acquired, clock.unix_time()) {
            warn!("frame info log write failed: {e}");
        }
        iteration += 1;
        if let Some(limit) = duration {
            if clock.elapsed(started) >= limit {
                break;
            }
        }
    }
}

/// Free-running capture on a dedicated thread.
///
/// The thread owns the grabber and the info log exclusively from spawn
/// to stop, so nothing else can touch their file handles while it runs.
/// [`BackgroundCapture::stop`] does not return until the thread has
/// exited, and is idempotent.
pub struct BackgroundCapture {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl BackgroundCapture {
    pub fn spawn<C: Clock + 'static>(
        mut grabber: VideoGrabber,
        mut info: FrameInfoLog,
        clock: C,
    ) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let handle = std::thread::spawn(move || {
            run_capture(&mut grabber, &mut info, &clock, None, &flag);
            if let Err(e) = info.close() {
                warn!("frame info log close failed: {e}");
            }
            grabber.release();
        });
        Self {
            running,
            handle: Some(handle),
        }
    }

    /// Signals the loop to exit and joins the thread; the camera handle
    /// and both output files are released exactly once, before return.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("capture thread panicked");
            }
        }
    }
}

impl Drop for BackgroundCapture {
    fn drop(&mut self) {
        self.stop();
    }
}
