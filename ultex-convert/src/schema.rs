//! The fixed output schema for FACET analysis documents.
//!
//! One table row per (track, frame). The column order is load-bearing:
//! downstream tooling indexes these files positionally.

/// Where a column's value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// `output.resolution.height`, repeated on every row.
    FrameRows,
    /// `output.resolution.width`, repeated on every row.
    FrameCols,
    /// A numeric field inside the frame object, addressed by path.
    Scalar(&'static [&'static str]),
    /// `landmarks.<name>.x`
    LandmarkX(&'static str),
    /// `landmarks.<name>.y`
    LandmarkY(&'static str),
    /// Index of the track the frame belongs to.
    TrackId,
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub source: Source,
}

const fn scalar(name: &'static str, path: &'static [&'static str]) -> Column {
    Column {
        name,
        source: Source::Scalar(path),
    }
}

/// All 59 output columns, in order.
pub static COLUMNS: &[Column] = &[
    Column { name: "FrameRows", source: Source::FrameRows },
    Column { name: "FrameCols", source: Source::FrameCols },
    scalar("timestamp", &["timestamp"]),
    scalar("FaceBoxH", &["face-location", "height"]),
    scalar("FaceBoxW", &["face-location", "width"]),
    scalar("FaceBoxX", &["face-location", "x"]),
    scalar("FaceBoxY", &["face-location", "y"]),
    scalar("isMale", &["demographic-evidence", "isMale"]),
    scalar("AU1", &["au-evidence", "AU1"]),
    scalar("AU2", &["au-evidence", "AU2"]),
    scalar("AU4", &["au-evidence", "AU4"]),
    scalar("AU5", &["au-evidence", "AU5"]),
    scalar("AU6", &["au-evidence", "AU6"]),
    scalar("AU7", &["au-evidence", "AU7"]),
    scalar("AU9", &["au-evidence", "AU9"]),
    scalar("AU10", &["au-evidence", "AU10"]),
    scalar("AU12", &["au-evidence", "AU12"]),
    scalar("AU14", &["au-evidence", "AU14"]),
    scalar("AU15", &["au-evidence", "AU15"]),
    scalar("AU17", &["au-evidence", "AU17"]),
    scalar("AU18", &["au-evidence", "AU18"]),
    scalar("AU20", &["au-evidence", "AU20"]),
    scalar("AU23", &["au-evidence", "AU23"]),
    scalar("AU24", &["au-evidence", "AU24"]),
    scalar("AU25", &["au-evidence", "AU25"]),
    scalar("AU26", &["au-evidence", "AU26"]),
    scalar("AU28", &["au-evidence", "AU28"]),
    scalar("anger", &["emotion-evidence", "anger"]),
    scalar("contempt", &["emotion-evidence", "contempt"]),
    scalar("disgust", &["emotion-evidence", "disgust"]),
    scalar("fear", &["emotion-evidence", "fear"]),
    scalar("joy", &["emotion-evidence", "joy"]),
    scalar("sadness", &["emotion-evidence", "sadness"]),
    scalar("surprise", &["emotion-evidence", "surprise"]),
    scalar("confusion", &["emotion-evidence", "confusion"]),
    scalar("frustration", &["emotion-evidence", "frustration"]),
    scalar("positive", &["emotion-evidence", "positive"]),
    scalar("negative", &["emotion-evidence", "negative"]),
    scalar("neutral", &["emotion-evidence", "neutral"]),
    Column { name: "center_mouth_x", source: Source::LandmarkX("center_mouth") },
    Column { name: "center_mouth_y", source: Source::LandmarkY("center_mouth") },
    Column { name: "left_eye_lateral_x", source: Source::LandmarkX("left_eye_lateral") },
    Column { name: "left_eye_lateral_y", source: Source::LandmarkY("left_eye_lateral") },
    Column { name: "left_eye_medial_x", source: Source::LandmarkX("left_eye_medial") },
    Column { name: "left_eye_medial_y", source: Source::LandmarkY("left_eye_medial") },
    Column { name: "left_eye_pupil_x", source: Source::LandmarkX("left_eye_pupil") },
    Column { name: "left_eye_pupil_y", source: Source::LandmarkY("left_eye_pupil") },
    Column { name: "nose_tip_x", source: Source::LandmarkX("nose_tip") },
    Column { name: "nose_tip_y", source: Source::LandmarkY("nose_tip") },
    Column { name: "right_eye_lateral_x", source: Source::LandmarkX("right_eye_lateral") },
    Column { name: "right_eye_lateral_y", source: Source::LandmarkY("right_eye_lateral") },
    Column { name: "right_eye_medial_x", source: Source::LandmarkX("right_eye_medial") },
    Column { name: "right_eye_medial_y", source: Source::LandmarkY("right_eye_medial") },
    Column { name: "right_eye_pupil_x", source: Source::LandmarkX("right_eye_pupil") },
    Column { name: "right_eye_pupil_y", source: Source::LandmarkY("right_eye_pupil") },
    scalar("pitch", &["pose", "pitch"]),
    scalar("roll", &["pose", "roll"]),
    scalar("yaw", &["pose", "yaw"]),
    Column { name: "track_id", source: Source::TrackId },
];

/// Column names in output order.
pub fn header_names() -> Vec<&'static str> {
    COLUMNS.iter().map(|c| c.name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_has_59_columns_in_fixed_order() {
        assert_eq!(COLUMNS.len(), 59);
        let names = header_names();
        assert_eq!(names[0], "FrameRows");
        assert_eq!(names[2], "timestamp");
        assert_eq!(names[7], "isMale");
        assert_eq!(names[8], "AU1");
        assert_eq!(names[26], "AU28");
        assert_eq!(names[27], "anger");
        assert_eq!(names[38], "neutral");
        assert_eq!(names[39], "center_mouth_x");
        assert_eq!(names[54], "right_eye_pupil_y");
        assert_eq!(names[55], "pitch");
        assert_eq!(names[58], "track_id");
    }

    #[test]
    fn names_are_unique() {
        let mut names = header_names();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), COLUMNS.len());
    }
}
