use std::path::{Path, PathBuf};

const VIDEO_EXTENSIONS: &[&str] = &["avi", "mov", "mp4", "mkv"];
const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// One container file.
    Video,
    /// Numbered image files, one per frame.
    Frames,
}

/// Where a standalone recording goes, derived from the requested
/// filename. The extension picks the mode: container formats record a
/// video, image formats record numbered frames, no extension defaults to
/// `.mp4`, and an unknown extension is attempted as a video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingPlan {
    pub mode: OutputMode,
    pub dir: PathBuf,
    pub stem: String,
    pub ext: String,
}

impl RecordingPlan {
    pub fn from_filename(filename: &str) -> Self {
        let path = Path::new(filename);
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_string();

        let (mode, ext) = match ext {
            None => (OutputMode::Video, "mp4".to_string()),
            Some(e) if FRAME_EXTENSIONS.contains(&e.as_str()) => (OutputMode::Frames, e),
            Some(e) => {
                if !VIDEO_EXTENSIONS.contains(&e.as_str()) {
                    log::warn!("unknown extension .{e}, attempting video output");
                }
                (OutputMode::Video, e)
            }
        };

        let stem = if stem.is_empty() {
            match mode {
                OutputMode::Video => "movie".to_string(),
                OutputMode::Frames => "frame".to_string(),
            }
        } else {
            stem
        };

        Self {
            mode,
            dir,
            stem,
            ext,
        }
    }

    pub fn video_path(&self) -> PathBuf {
        self.dir.join(format!("{}.{}", self.stem, self.ext))
    }

    pub fn frame_log_path(&self) -> PathBuf {
        self.dir.join(format!("frame_{}.txt", self.stem))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_extensions_record_video() {
        for ext in ["avi", "mov", "mp4", "mkv"] {
            let plan = RecordingPlan::from_filename(&format!("clip.{ext}"));
            assert_eq!(plan.mode, OutputMode::Video);
            assert_eq!(plan.ext, ext);
        }
    }

    #[test]
    fn image_extensions_record_frames() {
        for ext in ["png", "jpg", "jpeg"] {
            let plan = RecordingPlan::from_filename(&format!("shot.{ext}"));
            assert_eq!(plan.mode, OutputMode::Frames);
        }
    }

    #[test]
    fn missing_extension_defaults_to_mp4() {
        let plan = RecordingPlan::from_filename("session");
        assert_eq!(plan.mode, OutputMode::Video);
        assert_eq!(plan.video_path(), PathBuf::from("./session.mp4"));
    }

    #[test]
    fn unknown_extension_is_attempted_as_video() {
        let plan = RecordingPlan::from_filename("weird.xyz");
        assert_eq!(plan.mode, OutputMode::Video);
        assert_eq!(plan.ext, "xyz");
    }

    #[test]
    fn extension_case_is_ignored() {
        let plan = RecordingPlan::from_filename("CLIP.MOV");
        assert_eq!(plan.mode, OutputMode::Video);
        assert_eq!(plan.ext, "mov");
    }

    #[test]
    fn paths_keep_the_requested_directory() {
        let plan = RecordingPlan::from_filename("out/run1/take.mov");
        assert_eq!(plan.video_path(), PathBuf::from("out/run1/take.mov"));
        assert_eq!(plan.frame_log_path(), PathBuf::from("out/run1/frame_take.txt"));
    }
}
