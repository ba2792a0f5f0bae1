use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Tails a log file for newly appended data
///
/// The tailer is positioned at end-of-file when initialized, so historical
/// content is never reprocessed at startup. It only answers "has a new line
/// arrived"; re-deriving events from the tail window is the extractor's job.
pub struct FileTailer {
    file_path: PathBuf,
    reader: Option<BufReader<File>>,
    file_position: u64,
}

impl FileTailer {
    /// Create a new file tailer
    pub fn new(file_path: PathBuf) -> Self {
        FileTailer {
            file_path,
            reader: None,
            file_position: 0,
        }
    }

    /// Open the file and seek to its end
    ///
    /// Failure here is the one fatal startup condition: the daemon refuses
    /// to run against a source it cannot open.
    pub fn initialize(&mut self) -> Result<(), std::io::Error> {
        let file = File::open(&self.file_path)?;
        let mut reader = BufReader::new(file);

        reader.seek(SeekFrom::End(0))?;
        self.file_position = reader.stream_position()?;
        self.reader = Some(reader);

        Ok(())
    }

    /// Check whether a new line has been appended since the last poll
    ///
    /// Consumes at most one line per call. A file shorter than the current
    /// read position means the log was rotated; the tailer reopens it from
    /// the start so the replacement file's content is not missed. Read
    /// errors after startup are recoverable; the caller logs them and
    /// retries on the next poll.
    pub fn poll_new_line(&mut self) -> Result<bool, std::io::Error> {
        if self.reader.is_none() {
            self.initialize()?;
        }

        if std::fs::metadata(&self.file_path)?.len() < self.file_position {
            log::info!("Log file {:?} was rotated, reopening", self.file_path);
            self.reader = Some(BufReader::new(File::open(&self.file_path)?));
            self.file_position = 0;
        }

        let reader = self
            .reader
            .as_mut()
            .ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::Other, "reader not initialized")
            })?;

        let mut line = String::new();
        let bytes_read = reader.read_line(&mut line)?;
        self.file_position += bytes_read as u64;
        Ok(bytes_read > 0)
    }

    /// Path of the tailed file
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Check if the file still exists
    pub fn is_valid(&self) -> bool {
        self.file_path.exists()
    }
}
