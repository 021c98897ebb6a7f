use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

pub const FRAME_LOG_HEADER: &str = "Frame\tAcquired\tTime";

/// Per-frame info log: one row per capture-loop iteration.
#[derive(Debug)]
pub struct FrameInfoLog {
    writer: Option<BufWriter<File>>,
}

impl FrameInfoLog {
    pub fn create(path: &Path) -> io::Result<Self> {
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(writer, "{FRAME_LOG_HEADER}")?;
        Ok(Self {
            writer: Some(writer),
        })
    }

    pub fn write(&mut self, frame: u64, acquired: bool, time: f64) -> io::Result<()> {
        if let Some(w) = &mut self.writer {
            writeln!(w, "{frame}\t{acquired}\t{time:.6}")?;
        }
        Ok(())
    }

    pub fn close(&mut self) -> io::Result<()> {
        if let Some(mut w) = self.writer.take() {
            w.flush()?;
        }
        Ok(())
    }
}

impl Drop for FrameInfoLog {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn writes_header_and_rows() {
        let path = std::env::temp_dir().join(format!("ultex-frame-log-{}.txt", std::process::id()));
        let mut log = FrameInfoLog::create(&path).unwrap();
        log.write(0, true, 100.5).unwrap();
        log.write(1, false, 100.566667).unwrap();
        log.close().unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], FRAME_LOG_HEADER);
        assert_eq!(lines[1], "0\ttrue\t100.500000");
        assert_eq!(lines[2], "1\tfalse\t100.566667");
        fs::remove_file(&path).ok();
    }
}
