use std::path::PathBuf;
use std::time::Duration;

/// Session parameters.
///
/// The defaults reproduce the Ultimatum Game protocol: a 4 s offer hold,
/// a 6 s emotion window, a 6 s decision window, 100 trials split into
/// four 25-trial runs, 450 baseline frames per run, and 6 acknowledgement
/// presses through the instruction screens.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub subject_id: u32,
    pub offer_hold: Duration,
    pub emotion_window: Duration,
    pub decision_window: Duration,
    pub ack_presses: u32,
    pub baseline_frames: u32,
    pub trials_per_run: u32,
    pub total_trials: u32,
    pub data_dir: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            subject_id: 101,
            offer_hold: Duration::from_secs(4),
            emotion_window: Duration::from_secs(6),
            decision_window: Duration::from_secs(6),
            ack_presses: 6,
            baseline_frames: 450,
            trials_per_run: 25,
            total_trials: 100,
            data_dir: PathBuf::from("data"),
        }
    }
}
