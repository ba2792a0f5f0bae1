//! Failed-login extraction from authentication log text
//!
//! Matches the sshd "Failed password" line format and turns each match
//! into a structured event. Anything that does not match is skipped.

use crate::models::FailedLoginEvent;
use chrono::Utc;
use regex::Regex;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Lines kept when re-deriving events from the end of a log file
pub const TAIL_WINDOW_LINES: usize = 1000;

const FAILED_LOGIN_PATTERN: &str =
    r"Failed password for (invalid user )?(\S+) from (\S+) port \d+ ssh2";

/// Extracts failed-login events from raw log text
pub struct FailedLoginExtractor {
    pattern: Regex,
}

impl FailedLoginExtractor {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(FailedLoginExtractor {
            pattern: Regex::new(FAILED_LOGIN_PATTERN)?,
        })
    }

    /// Extract failed-login events from a chunk of raw text
    ///
    /// One event per matched line, stamped with the extraction time. Lines
    /// that do not match, or whose address does not parse as an IP, yield
    /// nothing. Extraction itself never fails.
    pub fn extract(&self, text: &str) -> Vec<FailedLoginEvent> {
        let observed_at = Utc::now();

        self.pattern
            .captures_iter(text)
            .filter_map(|cap| {
                let addr = IpAddr::from_str(cap.get(3)?.as_str()).ok()?;
                let username = cap
                    .get(2)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default();

                Some(FailedLoginEvent {
                    source_addr: addr,
                    username,
                    observed_at,
                })
            })
            .collect()
    }

    /// Extract from the tail of a log file, bounded to the last `max_lines`
    /// lines
    ///
    /// Read failures (missing file, permissions) are recoverable: they are
    /// logged and reported as an empty result, never as an error.
    pub fn extract_from_file(&self, path: &Path, max_lines: usize) -> Vec<FailedLoginEvent> {
        let tail = match read_tail_lines(path, max_lines) {
            Ok(tail) => tail,
            Err(e) => {
                log::warn!("Failed to read log tail from {:?}: {}", path, e);
                return Vec::new();
            }
        };

        self.extract(&tail)
    }

    /// Extract from the tails of several log files, combined in order
    pub fn extract_from_files(
        &self,
        paths: &[PathBuf],
        max_lines: usize,
    ) -> Vec<FailedLoginEvent> {
        paths
            .iter()
            .flat_map(|path| self.extract_from_file(path, max_lines))
            .collect()
    }
}

/// Read the last `max_lines` lines of a file as a single string
///
/// Invalid UTF-8 is replaced rather than treated as an error.
pub fn read_tail_lines(path: &Path, max_lines: usize) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);

    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(max_lines);
    Ok(lines[start..].join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn extractor() -> FailedLoginExtractor {
        FailedLoginExtractor::new().unwrap()
    }

    #[test]
    fn test_extract_failed_password_line() {
        let line = "Jul 14 02:11:05 web1 sshd[3041]: Failed password for root from 198.51.100.23 port 48022 ssh2";
        let events = extractor().extract(line);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].username, "root");
        assert_eq!(events[0].source_addr.to_string(), "198.51.100.23");
    }

    #[test]
    fn test_extract_invalid_user_prefix() {
        let line = "Jul 14 02:11:06 web1 sshd[3041]: Failed password for invalid user admin from 203.0.113.7 port 22 ssh2";
        let events = extractor().extract(line);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].username, "admin");
        assert_eq!(events[0].source_addr.to_string(), "203.0.113.7");
    }

    #[test]
    fn test_extract_ipv6_address() {
        let line = "Failed password for invalid user git from 2001:db8::beef port 51423 ssh2";
        let events = extractor().extract(line);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].source_addr.to_string(), "2001:db8::beef");
    }

    #[test]
    fn test_non_matching_lines_skipped() {
        let text = "\
            Jul 14 02:10:00 web1 sshd[3000]: Accepted publickey for deploy from 192.0.2.9 port 40100 ssh2\n\
            Jul 14 02:10:01 web1 CRON[3001]: pam_unix(cron:session): session opened for user root\n\
            garbage line with no structure\n";

        assert!(extractor().extract(text).is_empty());
    }

    #[test]
    fn test_unparseable_address_skipped() {
        let line = "Failed password for root from not-an-address port 22 ssh2";
        assert!(extractor().extract(line).is_empty());
    }

    #[test]
    fn test_extract_multiple_events() {
        let mut text = String::new();
        for i in 0..5 {
            text.push_str(&format!(
                "Jul 14 02:1{}:00 web1 sshd[3041]: Failed password for invalid user admin from 203.0.113.7 port 22 ssh2\n",
                i
            ));
        }

        let events = extractor().extract(&text);
        assert_eq!(events.len(), 5);
        assert!(events.iter().all(|e| e.username == "admin"));
        assert!(events
            .iter()
            .all(|e| e.source_addr.to_string() == "203.0.113.7"));
    }

    #[test]
    fn test_extract_from_missing_file_is_empty() {
        let events = extractor().extract_from_file(Path::new("/nonexistent/auth.log"), 1000);
        assert!(events.is_empty());
    }

    #[test]
    fn test_tail_window_bounds_extraction() {
        let mut file = tempfile::NamedTempFile::new().unwrap();

        // Matching lines first, pushed out of a 10-line tail by filler
        for _ in 0..3 {
            writeln!(
                file,
                "Failed password for root from 198.51.100.23 port 22 ssh2"
            )
            .unwrap();
        }
        for i in 0..10 {
            writeln!(file, "filler line {}", i).unwrap();
        }
        file.flush().unwrap();

        let events = extractor().extract_from_file(file.path(), 10);
        assert!(events.is_empty());

        // A generous window still sees them
        let events = extractor().extract_from_file(file.path(), 1000);
        assert_eq!(events.len(), 3);
    }

    #[test]
    fn test_extract_from_files_combines_tails() {
        let mut a = tempfile::NamedTempFile::new().unwrap();
        let mut b = tempfile::NamedTempFile::new().unwrap();
        writeln!(a, "Failed password for root from 198.51.100.23 port 22 ssh2").unwrap();
        writeln!(b, "Failed password for admin from 203.0.113.7 port 22 ssh2").unwrap();
        a.flush().unwrap();
        b.flush().unwrap();

        let paths = vec![a.path().to_path_buf(), b.path().to_path_buf()];
        let events = extractor().extract_from_files(&paths, 1000);

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].username, "root");
        assert_eq!(events[1].username, "admin");
    }
}
