use serde::{Deserialize, Serialize};

/// Per-trial parameters from the design table.
///
/// One row per trial: the offer amount shown to the participant, which
/// emotion image to flash, how long to hold it, and how long after the
/// offer disappears the image comes up. Durations are in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DesignRow {
    pub offer: f64,
    pub emotion_id: u32,
    pub emotion_duration: f64,
    pub onset_delay: f64,
}
