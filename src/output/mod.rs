use chrono::Utc;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Append-only timestamped diagnostic log
///
/// Records the monitor's lifecycle: start, stop, alerts raised, channel
/// failures, block actions. One line per event, flushed immediately so the
/// file is useful while the daemon runs.
pub struct DiagnosticLog {
    writer: BufWriter<std::fs::File>,
}

impl DiagnosticLog {
    /// Open (or create) the diagnostic log for appending
    ///
    /// Creates the parent directory if it does not exist.
    pub fn new(path: &PathBuf) -> Result<Self, std::io::Error> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(DiagnosticLog {
            writer: BufWriter::new(file),
        })
    }

    /// Append one timestamped line
    ///
    /// Write failures degrade to a process-log warning; the pipeline never
    /// stops because the diagnostic file became unwritable.
    pub fn record(&mut self, message: &str) {
        let stamp = Utc::now().format("%Y-%m-%d %H:%M:%S");
        if let Err(e) = writeln!(self.writer, "[{}] {}", stamp, message)
            .and_then(|_| self.writer.flush())
        {
            log::warn!("Failed to write diagnostic log: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_timestamped_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monitor.log");

        let mut log = DiagnosticLog::new(&path).unwrap();
        log.record("SSH intrusion monitoring started");
        log.record("Monitoring stopped");

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("SSH intrusion monitoring started"));
        assert!(lines[1].ends_with("Monitoring stopped"));
    }

    #[test]
    fn test_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("monitor.log");

        let mut log = DiagnosticLog::new(&path).unwrap();
        log.record("started");

        assert!(path.exists());
    }

    #[test]
    fn test_appends_across_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monitor.log");

        DiagnosticLog::new(&path).unwrap().record("first");
        DiagnosticLog::new(&path).unwrap().record("second");

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }
}
