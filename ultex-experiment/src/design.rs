use rand::Rng;
use rand::seq::SliceRandom;
use std::fs;
use std::path::Path;
use thiserror::Error;
use ultex_core::DesignRow;

#[derive(Debug, Error)]
pub enum DesignError {
    #[error("failed to read design file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("design line {line}: expected 4 columns, found {found}")]
    ColumnCount { line: usize, found: usize },
    #[error("design line {line}: invalid number {value:?}")]
    BadNumber { line: usize, value: String },
    #[error("design has {rows} rows but the session needs {needed}")]
    TooShort { rows: usize, needed: usize },
}

/// The loaded design table: one [`DesignRow`] per trial.
#[derive(Debug, Clone)]
pub struct Design {
    rows: Vec<DesignRow>,
}

impl Design {
    /// Reads a whitespace-delimited numeric matrix, skipping the header row.
    pub fn load(path: &Path) -> Result<Self, DesignError> {
        let text = fs::read_to_string(path).map_err(|source| DesignError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, DesignError> {
        let mut rows = Vec::new();
        // Line 1 is the header.
        for (idx, line) in text.lines().enumerate().skip(1) {
            if line.trim().is_empty() {
                continue;
            }
            let line_no = idx + 1;
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != 4 {
                return Err(DesignError::ColumnCount {
                    line: line_no,
                    found: fields.len(),
                });
            }
            let mut values = [0.0f64; 4];
            for (v, field) in values.iter_mut().zip(&fields) {
                *v = field.parse().map_err(|_| DesignError::BadNumber {
                    line: line_no,
                    value: field.to_string(),
                })?;
            }
            rows.push(DesignRow {
                offer: values[0],
                emotion_id: values[1] as u32,
                emotion_duration: values[2],
                onset_delay: values[3],
            });
        }
        Ok(Self { rows })
    }

    pub fn from_rows(rows: Vec<DesignRow>) -> Self {
        Self { rows }
    }

    pub fn require_trials(&self, trials: u32) -> Result<(), DesignError> {
        if self.rows.len() < trials as usize {
            return Err(DesignError::TooShort {
                rows: self.rows.len(),
                needed: trials as usize,
            });
        }
        Ok(())
    }

    /// Uniformly random permutation of trial order.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        self.rows.shuffle(rng);
    }

    /// Row for a 1-based trial index.
    pub fn row(&self, trial: u32) -> &DesignRow {
        &self.rows[(trial - 1) as usize]
    }

    pub fn rows(&self) -> &[DesignRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Offer\tJoy\tDuration\tOnset\n\
                          4.0 1 2.0 0.5\n\
                          6.0 2 1.5 1.0\n\
                          2.0 1 2.5 0.0\n";

    #[test]
    fn parses_rows_and_skips_header() {
        let design = Design::parse(SAMPLE).unwrap();
        assert_eq!(design.len(), 3);
        assert_eq!(
            *design.row(2),
            DesignRow {
                offer: 6.0,
                emotion_id: 2,
                emotion_duration: 1.5,
                onset_delay: 1.0,
            }
        );
    }

    #[test]
    fn rejects_wrong_column_count() {
        let err = Design::parse("hdr\n1.0 2 3.0\n").unwrap_err();
        match err {
            DesignError::ColumnCount { line, found } => {
                assert_eq!(line, 2);
                assert_eq!(found, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_non_numeric_field() {
        let err = Design::parse("hdr\n1.0 two 3.0 4.0\n").unwrap_err();
        assert!(matches!(err, DesignError::BadNumber { line: 2, .. }));
    }

    #[test]
    fn require_trials_checks_length() {
        let design = Design::parse(SAMPLE).unwrap();
        assert!(design.require_trials(3).is_ok());
        assert!(matches!(
            design.require_trials(4),
            Err(DesignError::TooShort { rows: 3, needed: 4 })
        ));
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let rows: Vec<DesignRow> = (0..100)
            .map(|i| DesignRow {
                offer: i as f64,
                emotion_id: 1 + (i % 2),
                emotion_duration: 2.0,
                onset_delay: 0.5,
            })
            .collect();
        let mut design = Design::from_rows(rows.clone());
        design.shuffle(&mut rand::rng());
        assert_eq!(design.len(), rows.len());

        let mut before: Vec<u64> = rows.iter().map(|r| r.offer as u64).collect();
        let mut after: Vec<u64> = design.rows().iter().map(|r| r.offer as u64).collect();
        before.sort_unstable();
        after.sort_unstable();
        assert_eq!(before, after);
    }
}
