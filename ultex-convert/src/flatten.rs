use crate::schema::{COLUMNS, Source, header_names};
use serde_json::Value;
use std::io::{self, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("document has no {path}")]
    MissingSection { path: &'static str },
    #[error("missing field {path} (track {track}, frame {frame})")]
    MissingField {
        path: String,
        track: usize,
        frame: usize,
    },
    #[error("field {path} is not a number (track {track}, frame {frame})")]
    NotANumber {
        path: String,
        track: usize,
        frame: usize,
    },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Flattens a FACET document into one numeric row per (track, frame),
/// tracks concatenated in order, columns per [`COLUMNS`].
///
/// Any missing or non-numeric expected field is a hard error naming the
/// JSON path; nothing is silently zero-filled.
pub fn flatten(doc: &Value) -> Result<Vec<Vec<f64>>, SchemaError> {
    let output = doc
        .get("output")
        .ok_or(SchemaError::MissingSection { path: "output" })?;
    let resolution = output
        .get("resolution")
        .ok_or(SchemaError::MissingSection {
            path: "output.resolution",
        })?;
    let frame_rows = number(resolution.get("height"), "output.resolution.height", 0, 0)?;
    let frame_cols = number(resolution.get("width"), "output.resolution.width", 0, 0)?;
    let tracks = output
        .get("tracks")
        .and_then(Value::as_array)
        .ok_or(SchemaError::MissingSection {
            path: "output.tracks",
        })?;

    let mut rows = Vec::new();
    for (track_id, track) in tracks.iter().enumerate() {
        let frames =
            track
                .get("frames")
                .and_then(Value::as_array)
                .ok_or(SchemaError::MissingSection {
                    path: "output.tracks[].frames",
                })?;
        for (frame_no, frame) in frames.iter().enumerate() {
            let mut row = Vec::with_capacity(COLUMNS.len());
            for column in COLUMNS {
                let value = match column.source {
                    Source::FrameRows => frame_rows,
                    Source::FrameCols => frame_cols,
                    Source::TrackId => track_id as f64,
                    Source::Scalar(path) => {
                        let mut node = Some(frame);
                        for seg in path {
                            node = node.and_then(|n| n.get(seg));
                        }
                        number(node, &path.join("."), track_id, frame_no)?
                    }
                    Source::LandmarkX(name) => landmark(frame, name, "x", track_id, frame_no)?,
                    Source::LandmarkY(name) => landmark(frame, name, "y", track_id, frame_no)?,
                };
                row.push(value);
            }
            rows.push(row);
        }
    }
    Ok(rows)
}

fn landmark(
    frame: &Value,
    name: &str,
    axis: &str,
    track: usize,
    frame_no: usize,
) -> Result<f64, SchemaError> {
    let node = frame
        .get("landmarks")
        .and_then(|l| l.get(name))
        .and_then(|p| p.get(axis));
    number(node, &format!("landmarks.{name}.{axis}"), track, frame_no)
}

fn number(
    node: Option<&Value>,
    path: &str,
    track: usize,
    frame: usize,
) -> Result<f64, SchemaError> {
    let value = node.ok_or_else(|| SchemaError::MissingField {
        path: path.to_string(),
        track,
        frame,
    })?;
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| SchemaError::NotANumber {
            path: path.to_string(),
            track,
            frame,
        }),
        // Boolean evidence fields (isMale) flatten to 0/1.
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        _ => Err(SchemaError::NotANumber {
            path: path.to_string(),
            track,
            frame,
        }),
    }
}

/// Comma-delimited with a header row.
pub fn write_csv<W: Write>(mut out: W, rows: &[Vec<f64>]) -> io::Result<()> {
    writeln!(out, "{}", header_names().join(","))?;
    for row in rows {
        let fields: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        writeln!(out, "{}", fields.join(","))?;
    }
    Ok(())
}

/// Whitespace-delimited numbers, no header.
pub fn write_plain<W: Write>(mut out: W, rows: &[Vec<f64>]) -> io::Result<()> {
    for row in rows {
        let fields: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        writeln!(out, "{}", fields.join(" "))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn frame(timestamp: f64) -> Value {
        let aus: serde_json::Map<String, Value> = [
            "AU1", "AU2", "AU4", "AU5", "AU6", "AU7", "AU9", "AU10", "AU12", "AU14", "AU15",
            "AU17", "AU18", "AU20", "AU23", "AU24", "AU25", "AU26", "AU28",
        ]
        .iter()
        .map(|k| (k.to_string(), json!(0.25)))
        .collect();
        let emotions: serde_json::Map<String, Value> = [
            "anger",
            "contempt",
            "disgust",
            "fear",
            "joy",
            "sadness",
            "surprise",
            "confusion",
            "frustration",
            "positive",
            "negative",
            "neutral",
        ]
        .iter()
        .map(|k| (k.to_string(), json!(0.5)))
        .collect();
        let landmarks: serde_json::Map<String, Value> = [
            "center_mouth",
            "left_eye_lateral",
            "left_eye_medial",
            "left_eye_pupil",
            "nose_tip",
            "right_eye_lateral",
            "right_eye_medial",
            "right_eye_pupil",
        ]
        .iter()
        .map(|k| (k.to_string(), json!({"x": 10.0, "y": 20.0})))
        .collect();

        json!({
            "timestamp": timestamp,
            "face-location": {"height": 100.0, "width": 90.0, "x": 5.0, "y": 6.0},
            "demographic-evidence": {"isMale": 1.0},
            "au-evidence": aus,
            "emotion-evidence": emotions,
            "landmarks": landmarks,
            "pose": {"pitch": 0.1, "roll": 0.2, "yaw": 0.3},
        })
    }

    fn document(tracks: usize, frames_per_track: usize) -> Value {
        let tracks: Vec<Value> = (0..tracks)
            .map(|_| {
                let frames: Vec<Value> =
                    (0..frames_per_track).map(|i| frame(i as f64 / 15.0)).collect();
                json!({"frames": frames})
            })
            .collect();
        json!({
            "output": {
                "resolution": {"height": 480.0, "width": 640.0},
                "frametimes": [],
                "tracks": tracks,
            }
        })
    }

    #[test]
    fn two_tracks_ten_frames_make_twenty_rows() {
        let rows = flatten(&document(2, 10)).unwrap();
        assert_eq!(rows.len(), 20);
        for row in &rows {
            assert_eq!(row.len(), 59);
            assert_eq!(row[0], 480.0); // FrameRows
            assert_eq!(row[1], 640.0); // FrameCols
        }
        // track_id is the last column, first 10 rows track 0, rest track 1.
        assert_eq!(rows[9][58], 0.0);
        assert_eq!(rows[10][58], 1.0);
    }

    #[test]
    fn missing_is_male_is_a_fatal_error() {
        let mut doc = document(1, 3);
        doc["output"]["tracks"][0]["frames"][1]
            .as_object_mut()
            .unwrap()
            .get_mut("demographic-evidence")
            .unwrap()
            .as_object_mut()
            .unwrap()
            .remove("isMale");
        let err = flatten(&doc).unwrap_err();
        match err {
            SchemaError::MissingField { path, track, frame } => {
                assert_eq!(path, "demographic-evidence.isMale");
                assert_eq!(track, 0);
                assert_eq!(frame, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn boolean_evidence_flattens_to_zero_or_one() {
        let mut doc = document(1, 1);
        doc["output"]["tracks"][0]["frames"][0]["demographic-evidence"]["isMale"] = json!(true);
        let rows = flatten(&doc).unwrap();
        assert_eq!(rows[0][7], 1.0);
    }

    #[test]
    fn non_numeric_field_is_reported() {
        let mut doc = document(1, 1);
        doc["output"]["tracks"][0]["frames"][0]["pose"]["yaw"] = json!("sideways");
        assert!(matches!(
            flatten(&doc).unwrap_err(),
            SchemaError::NotANumber { .. }
        ));
    }

    #[test]
    fn csv_writer_emits_header_and_rows() {
        let rows = flatten(&document(1, 2)).unwrap();
        let mut buf = Vec::new();
        write_csv(&mut buf, &rows).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("FrameRows,FrameCols,timestamp,"));
        assert_eq!(lines[1].split(',').count(), 59);
    }

    #[test]
    fn plain_writer_has_no_header() {
        let rows = flatten(&document(1, 2)).unwrap();
        let mut buf = Vec::new();
        write_plain(&mut buf, &rows).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].split(' ').count(), 59);
        assert!(lines[0].starts_with("480 640 0 "));
    }
}
