use serde::{Deserialize, Serialize};
use std::fmt;

/// Stage within a session.
///
/// A trial cycles Offer → Emotion → Decision; Instructions, Baseline,
/// RunBreak and Done frame the trial blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Instructions,
    Baseline,
    Offer,
    Emotion,
    Decision,
    RunBreak,
    Done,
}

impl Stage {
    /// Numeric code written to the trial log.
    pub fn code(self) -> i32 {
        match self {
            Stage::Instructions | Stage::Baseline | Stage::RunBreak => 0,
            Stage::Offer => 1,
            Stage::Emotion => 2,
            Stage::Decision => 3,
            Stage::Done => -1,
        }
    }

    /// True for the stages that make up one trial cycle.
    pub fn is_trial_stage(self) -> bool {
        matches!(self, Stage::Offer | Stage::Emotion | Stage::Decision)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Done)
    }
}

/// Sub-phase of the Emotion stage.
///
/// `Pre` runs from stage entry until the trial's onset delay has passed,
/// `Onset` while the emotion image is up, `Offset` after it reverts to
/// neutral. `Inactive` everywhere outside the Emotion stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExpressionPhase {
    #[default]
    Inactive,
    Pre,
    Onset,
    Offset,
}

impl ExpressionPhase {
    pub fn code(self) -> u8 {
        match self {
            ExpressionPhase::Inactive => 0,
            ExpressionPhase::Pre => 1,
            ExpressionPhase::Onset => 2,
            ExpressionPhase::Offset => 3,
        }
    }
}

/// Participant response in the decision window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Decision {
    #[default]
    None,
    Left,
    Right,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Decision::None => "None",
            Decision::Left => "Left",
            Decision::Right => "Right",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_codes_match_log_wire_values() {
        assert_eq!(Stage::Instructions.code(), 0);
        assert_eq!(Stage::Offer.code(), 1);
        assert_eq!(Stage::Emotion.code(), 2);
        assert_eq!(Stage::Decision.code(), 3);
        assert_eq!(Stage::RunBreak.code(), 0);
        assert_eq!(Stage::Done.code(), -1);
    }

    #[test]
    fn trial_stages() {
        assert!(Stage::Offer.is_trial_stage());
        assert!(Stage::Emotion.is_trial_stage());
        assert!(Stage::Decision.is_trial_stage());
        assert!(!Stage::Baseline.is_trial_stage());
        assert!(!Stage::Done.is_trial_stage());
    }

    #[test]
    fn expression_phase_codes() {
        assert_eq!(ExpressionPhase::Inactive.code(), 0);
        assert_eq!(ExpressionPhase::Pre.code(), 1);
        assert_eq!(ExpressionPhase::Onset.code(), 2);
        assert_eq!(ExpressionPhase::Offset.code(), 3);
    }

    #[test]
    fn decision_display() {
        assert_eq!(Decision::None.to_string(), "None");
        assert_eq!(Decision::Left.to_string(), "Left");
        assert_eq!(Decision::Right.to_string(), "Right");
    }
}
