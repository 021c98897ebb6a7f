use crate::{Decision, DesignRow, ExpressionPhase, Stage};
use serde::{Deserialize, Serialize};

/// Header line of a per-run trial log.
pub const LOG_HEADER: &str =
    "SID\tRun\tTrial\tStage\tExpression\tDecision\tTime\tOffer\tJoy\tDuration\tOnset";

/// One trial-log row, written on entry to a new stage or sub-phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub sid: u32,
    pub run: u32,
    pub trial: u32,
    pub stage: Stage,
    pub expression: ExpressionPhase,
    pub decision: Decision,
    /// Unix seconds, with fraction.
    pub time: f64,
    pub design: DesignRow,
}

impl LogRecord {
    /// Tab-delimited row matching [`LOG_HEADER`].
    pub fn to_row(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{:.6}\t{}\t{}\t{}\t{}",
            self.sid,
            self.run,
            self.trial,
            self.stage.code(),
            self.expression.code(),
            self.decision,
            self.time,
            self.design.offer,
            self.design.emotion_id,
            self.design.emotion_duration,
            self.design.onset_delay,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_matches_header_column_count() {
        let record = LogRecord {
            sid: 101,
            run: 2,
            trial: 27,
            stage: Stage::Emotion,
            expression: ExpressionPhase::Onset,
            decision: Decision::None,
            time: 1700000000.25,
            design: DesignRow {
                offer: 4.0,
                emotion_id: 1,
                emotion_duration: 2.0,
                onset_delay: 0.5,
            },
        };
        let row = record.to_row();
        assert_eq!(row.split('\t').count(), LOG_HEADER.split('\t').count());
        assert!(row.starts_with("101\t2\t27\t2\t2\tNone\t1700000000.250000\t"));
        assert!(row.ends_with("4\t1\t2\t0.5"));
    }
}
