//! Reference collector log verification
//!
//! The instrumented library writes free-text logs named
//! `*libittnotify_refcol_*.log` into a directory chosen by
//! `INTEL_LIBITTNOTIFY_LOG_DIR`. [`LogVerifier`] finds and scans those files;
//! it never parses them structurally.
//!
//! The reference collector may only flush at process exit. Tests that need to
//! observe log content synchronously should run the instrumented workload in a
//! subprocess, or poll with [`wait_for_log_content`].

use crate::config::HarnessConfig;
use crate::error::{HarnessError, HarnessResult};
use regex::Regex;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant, SystemTime};
use tracing::debug;

/// Substring every collector log file name contains
pub const LOG_MARKER: &str = "libittnotify_refcol_";
/// Suffix every collector log file name ends with
pub const LOG_SUFFIX: &str = ".log";

/// Poll interval used by [`wait_for_log_content`]
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);
/// Default timeout for [`wait_for_log_content`]
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_millis(1000);

/// Scanner over collector log files in one directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogVerifier {
    log_dir: PathBuf,
}

impl LogVerifier {
    /// Verifier for an explicit directory
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
        }
    }

    /// Verifier for `INTEL_LIBITTNOTIFY_LOG_DIR`, or the default temp directory
    pub fn from_env() -> Self {
        Self::new(HarnessConfig::from_env().resolved_log_dir())
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Most recently modified collector log in the directory (non-recursive).
    ///
    /// Returns `None` when the directory is missing or holds no matching file.
    /// Files with identical modification times are ordered by file name and the
    /// lexicographically greatest one wins.
    pub fn find_latest_log(&self) -> Option<PathBuf> {
        let entries = match fs::read_dir(&self.log_dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(dir = %self.log_dir.display(), error = %e, "log directory not readable");
                return None;
            }
        };

        let latest = entries
            .filter_map(Result::ok)
            .filter(|entry| is_collector_log(&entry.file_name().to_string_lossy()))
            .filter_map(|entry| {
                let path = entry.path();
                let metadata = fs::metadata(&path).ok()?;
                if !metadata.is_file() {
                    return None;
                }
                let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
                Some((modified, path))
            })
            .max_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.file_name().cmp(&b.1.file_name())))
            .map(|(_, path)| path);

        debug!(dir = %self.log_dir.display(), latest = ?latest, "scanned for collector logs");
        latest
    }

    /// Full file contents, or an empty string if the file cannot be read
    pub fn read_log(&self, path: &Path) -> String {
        fs::read(path)
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .unwrap_or_default()
    }

    /// Literal substring containment
    pub fn contains(text: &str, pattern: &str) -> bool {
        text.contains(pattern)
    }

    /// Whether any substring of `text` matches `pattern`.
    ///
    /// A malformed pattern is returned as [`HarnessError::InvalidPattern`].
    pub fn matches_regex(text: &str, pattern: &str) -> HarnessResult<bool> {
        let re = Regex::new(pattern).map_err(|e| HarnessError::invalid_pattern(pattern, e))?;
        Ok(re.is_match(text))
    }

    /// Non-overlapping literal occurrences of `pattern`; an empty pattern counts zero
    pub fn count_occurrences(text: &str, pattern: &str) -> usize {
        if pattern.is_empty() {
            return 0;
        }
        text.matches(pattern).count()
    }

    /// Lines of `text` containing `pattern`, in input order
    pub fn matching_lines(text: &str, pattern: &str) -> Vec<String> {
        text.lines()
            .filter(|line| line.contains(pattern))
            .map(str::to_string)
            .collect()
    }

    /// Remove every regular file whose name contains the collector marker.
    ///
    /// A missing directory is not an error.
    pub fn clear_logs(&self) -> HarnessResult<()> {
        let entries = match fs::read_dir(&self.log_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(HarnessError::io(&self.log_dir, e)),
        };

        let mut removed = 0usize;
        for entry in entries {
            let entry = entry.map_err(|e| HarnessError::io(&self.log_dir, e))?;
            if !entry.file_name().to_string_lossy().contains(LOG_MARKER) {
                continue;
            }
            let path = entry.path();
            let is_file = fs::metadata(&path).map(|m| m.is_file()).unwrap_or(false);
            if is_file {
                fs::remove_file(&path).map_err(|e| HarnessError::io(&path, e))?;
                removed += 1;
            }
        }

        debug!(dir = %self.log_dir.display(), removed, "cleared collector logs");
        Ok(())
    }
}

fn is_collector_log(file_name: &str) -> bool {
    file_name.contains(LOG_MARKER) && file_name.ends_with(LOG_SUFFIX)
}

/// Poll the latest log until it contains `expected` or `timeout` elapses.
///
/// The log is always checked at least once, even for a zero timeout.
pub fn wait_for_log_content(verifier: &LogVerifier, expected: &str, timeout: Duration) -> bool {
    let start = Instant::now();
    loop {
        if let Some(path) = verifier.find_latest_log() {
            let content = verifier.read_log(&path);
            if LogVerifier::contains(&content, expected) {
                return true;
            }
        }
        if start.elapsed() >= timeout {
            return false;
        }
        thread::sleep(POLL_INTERVAL);
    }
}

#[macro_export]
macro_rules! check_log_contains {
    ($verifier:expr, $pattern:expr $(,)?) => {{
        let verifier: &$crate::log_verifier::LogVerifier = &$verifier;
        let pattern: &str = &$pattern;
        match verifier.find_latest_log() {
            None => $crate::check_msg!(false, "Log file not found"),
            Some(path) => {
                let content = verifier.read_log(&path);
                $crate::check_msg!(
                    $crate::log_verifier::LogVerifier::contains(&content, pattern),
                    ::std::format!("Log does not contain pattern: {}", pattern)
                );
            }
        }
    }};
}

/// Like `check_log_contains!` with a regex; a malformed pattern escalates to
/// the runner boundary as a panic carrying the [`HarnessError`].
#[macro_export]
macro_rules! check_log_matches {
    ($verifier:expr, $pattern:expr $(,)?) => {{
        let verifier: &$crate::log_verifier::LogVerifier = &$verifier;
        let pattern: &str = &$pattern;
        match verifier.find_latest_log() {
            None => $crate::check_msg!(false, "Log file not found"),
            Some(path) => {
                let content = verifier.read_log(&path);
                match $crate::log_verifier::LogVerifier::matches_regex(&content, pattern) {
                    Ok(matched) => $crate::check_msg!(
                        matched,
                        ::std::format!("Log does not match regex: {}", pattern)
                    ),
                    Err(err) => ::std::panic::panic_any(err),
                }
            }
        }
    }};
}
