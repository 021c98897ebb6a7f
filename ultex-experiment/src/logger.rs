use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use ultex_core::{LOG_HEADER, LogRecord};

/// Per-run trial log.
///
/// One logger per run; the session closes it at every run boundary and
/// opens a fresh one for the next run. The main loop is the only writer.
#[derive(Debug)]
pub struct TrialLogger {
    writer: Option<BufWriter<File>>,
    path: PathBuf,
}

impl TrialLogger {
    /// Creates (truncating) `{dir}/{sid}/{sid}_run_{run}.txt` and writes
    /// the header line.
    pub fn create(dir: &Path, sid: u32, run: u32) -> io::Result<Self> {
        let subject_dir = dir.join(sid.to_string());
        fs::create_dir_all(&subject_dir)?;
        let path = subject_dir.join(format!("{sid}_run_{run}.txt"));
        let mut writer = BufWriter::new(File::create(&path)?);
        writeln!(writer, "{LOG_HEADER}")?;
        Ok(Self {
            writer: Some(writer),
            path,
        })
    }

    pub fn write(&mut self, record: &LogRecord) -> io::Result<()> {
        if let Some(w) = &mut self.writer {
            writeln!(w, "{}", record.to_row())?;
        }
        Ok(())
    }

    /// Flushes and releases the file handle. Idempotent.
    pub fn close(&mut self) -> io::Result<()> {
        if let Some(mut w) = self.writer.take() {
            w.flush()?;
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TrialLogger {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ultex_core::{Decision, DesignRow, ExpressionPhase, Stage};

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ultex-logger-{tag}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn record(trial: u32, time: f64) -> LogRecord {
        LogRecord {
            sid: 101,
            run: 1,
            trial,
            stage: Stage::Offer,
            expression: ExpressionPhase::Inactive,
            decision: Decision::None,
            time,
            design: DesignRow {
                offer: 4.0,
                emotion_id: 1,
                emotion_duration: 2.0,
                onset_delay: 0.5,
            },
        }
    }

    #[test]
    fn writes_header_and_rows() {
        let dir = temp_dir("rows");
        let mut logger = TrialLogger::create(&dir, 101, 1).unwrap();
        logger.write(&record(1, 10.0)).unwrap();
        logger.write(&record(2, 11.5)).unwrap();
        logger.close().unwrap();

        let text = fs::read_to_string(dir.join("101").join("101_run_1.txt")).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], LOG_HEADER);
        assert!(lines[1].starts_with("101\t1\t1\t"));
        assert!(lines[2].starts_with("101\t1\t2\t"));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn close_is_idempotent() {
        let dir = temp_dir("close");
        let mut logger = TrialLogger::create(&dir, 101, 2).unwrap();
        logger.close().unwrap();
        logger.close().unwrap();
        // Writes after close are silently ignored.
        logger.write(&record(1, 1.0)).unwrap();
        let text = fs::read_to_string(logger.path()).unwrap();
        assert_eq!(text.lines().count(), 1);
        fs::remove_dir_all(&dir).ok();
    }
}
