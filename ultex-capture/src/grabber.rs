use crate::plan::RecordingPlan;
use log::warn;
use opencv::core::{Mat, Size, Vector};
use opencv::prelude::*;
use opencv::videoio::{self, CAP_ANY, VideoCapture, VideoWriter};
use opencv::imgcodecs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("camera {index} unavailable")]
    CameraUnavailable { index: i32 },
    #[error("could not create video writer for {path}")]
    WriterUnavailable { path: PathBuf },
    #[error("output path {path} is not valid UTF-8")]
    BadPath { path: PathBuf },
    #[error(transparent)]
    OpenCv(#[from] opencv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Camera and container settings for one recording session.
#[derive(Debug, Clone)]
pub struct CameraSettings {
    pub index: i32,
    pub width: i32,
    pub height: i32,
    pub fps: f64,
    pub fourcc: [char; 4],
    /// Frames read and discarded after opening, before the writer is
    /// sized. The standalone recorder uses this to pick up the camera's
    /// real frame size.
    pub warmup_frames: u32,
}

impl Default for CameraSettings {
    /// Session capture: 640×426 at 15 fps, mp4v.
    fn default() -> Self {
        Self {
            index: 0,
            width: 640,
            height: 426,
            fps: 15.0,
            fourcc: ['m', 'p', '4', 'v'],
            warmup_frames: 0,
        }
    }
}

impl CameraSettings {
    /// Standalone recorder capture: 640×480 at 30 fps, five warm-up frames.
    pub fn standalone() -> Self {
        Self {
            width: 640,
            height: 480,
            fps: 30.0,
            warmup_frames: 5,
            ..Self::default()
        }
    }
}

enum VideoSink {
    Container(VideoWriter),
    Frames {
        dir: PathBuf,
        stem: String,
        ext: String,
    },
}

/// One open camera plus one open output, written frame by frame.
///
/// A single capture miss returns `false` and is never fatal; the caller's
/// schedule proceeds regardless. Opening is the only fallible phase.
pub struct VideoGrabber {
    camera: VideoCapture,
    sink: VideoSink,
    frame: Mat,
    frames_written: u64,
    released: bool,
}

impl VideoGrabber {
    /// Opens the camera and a container writer at `path`.
    pub fn open(settings: &CameraSettings, path: &Path) -> Result<Self, CaptureError> {
        let (camera, size) = Self::open_camera(settings)?;
        let name = path.to_str().ok_or_else(|| CaptureError::BadPath {
            path: path.to_path_buf(),
        })?;
        let [c1, c2, c3, c4] = settings.fourcc;
        let fourcc = VideoWriter::fourcc(c1, c2, c3, c4)?;
        let writer = VideoWriter::new(name, fourcc, settings.fps, size, true)?;
        if !writer.is_opened()? {
            return Err(CaptureError::WriterUnavailable {
                path: path.to_path_buf(),
            });
        }
        Ok(Self {
            camera,
            sink: VideoSink::Container(writer),
            frame: Mat::default(),
            frames_written: 0,
            released: false,
        })
    }

    /// Opens the camera for numbered frame-file output per `plan`.
    pub fn open_frames(settings: &CameraSettings, plan: &RecordingPlan) -> Result<Self, CaptureError> {
        let (camera, _) = Self::open_camera(settings)?;
        Ok(Self {
            camera,
            sink: VideoSink::Frames {
                dir: plan.dir.clone(),
                stem: plan.stem.clone(),
                ext: plan.ext.clone(),
            },
            frame: Mat::default(),
            frames_written: 0,
            released: false,
        })
    }

    /// Camera-open failure is distinguishable so callers can abort the
    /// session before any trial starts.
    fn open_camera(settings: &CameraSettings) -> Result<(VideoCapture, Size), CaptureError> {
        let mut camera = VideoCapture::new(settings.index, CAP_ANY)?;
        if !camera.is_opened()? {
            return Err(CaptureError::CameraUnavailable {
                index: settings.index,
            });
        }
        camera.set(videoio::CAP_PROP_FRAME_WIDTH, settings.width as f64)?;
        camera.set(videoio::CAP_PROP_FRAME_HEIGHT, settings.height as f64)?;
        camera.set(videoio::CAP_PROP_FPS, settings.fps)?;

        let mut size = Size::new(settings.width, settings.height);
        if settings.warmup_frames > 0 {
            let mut frame = Mat::default();
            for _ in 0..settings.warmup_frames {
                let _ = camera.read(&mut frame);
            }
            if !frame.empty() {
                size = Size::new(frame.cols(), frame.rows());
            }
        }
        Ok((camera, size))
    }

    /// Grabs one frame and appends it to the open output. Returns `false`
    /// without erroring when the camera produced nothing this call.
    pub fn capture_frame(&mut self) -> bool {
        match self.camera.read(&mut self.frame) {
            Ok(true) if !self.frame.empty() => match &mut self.sink {
                VideoSink::Container(writer) => match writer.write(&self.frame) {
                    Ok(()) => {
                        self.frames_written += 1;
                        true
                    }
                    Err(e) => {
                        warn!("frame write failed: {e}");
                        false
                    }
                },
                VideoSink::Frames { dir, stem, ext } => {
                    let path = dir.join(format!("{stem}_{:08}.{ext}", self.frames_written));
                    let written = path
                        .to_str()
                        .map(|p| imgcodecs::imwrite(p, &self.frame, &Vector::new()).unwrap_or(false))
                        .unwrap_or(false);
                    if written {
                        self.frames_written += 1;
                        true
                    } else {
                        warn!("frame file write failed at {}", path.display());
                        false
                    }
                }
            },
            Ok(_) => {
                warn!("camera produced no frame");
                false
            }
            Err(e) => {
                warn!("camera read failed: {e}");
                false
            }
        }
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Releases writer and camera. Idempotent; also runs on drop.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        if let VideoSink::Container(writer) = &mut self.sink {
            if let Err(e) = writer.release() {
                warn!("video writer release failed: {e}");
            }
        }
        if let Err(e) = self.camera.release() {
            warn!("camera release failed: {e}");
        }
        self.released = true;
    }
}

impl Drop for VideoGrabber {
    fn drop(&mut self) {
        self.release();
    }
}
