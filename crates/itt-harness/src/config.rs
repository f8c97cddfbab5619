//! Runner options and environment configuration
//!
//! The harness keeps configuration small: three runner switches that come from
//! the command line, plus two environment variables.
//!
//! - `INTEL_LIBITTNOTIFY_LOG_DIR` - where the reference collector writes its logs
//! - `NO_COLOR` - start with colored output disabled

use std::env;
use std::path::PathBuf;

/// Environment variable naming the collector log directory
pub const LOG_DIR_ENV: &str = "INTEL_LIBITTNOTIFY_LOG_DIR";

/// Options controlling one runner invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerOptions {
    /// Emit ANSI colors
    pub color: bool,
    /// Substring matched against `suite.name`
    pub filter: Option<String>,
    /// Print failure detail beneath failed tests
    pub verbose: bool,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            color: true,
            filter: None,
            verbose: true,
        }
    }
}

impl RunnerOptions {
    /// Whether `full_name` passes the active filter
    pub fn matches(&self, full_name: &str) -> bool {
        match self.filter.as_deref() {
            None | Some("") => true,
            Some(pattern) => full_name.contains(pattern),
        }
    }
}

/// Harness configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Collector log directory override (`INTEL_LIBITTNOTIFY_LOG_DIR`, empty means unset)
    pub log_dir: Option<PathBuf>,
    /// Disable colored output (`NO_COLOR`)
    pub no_color: bool,
}

impl HarnessConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            log_dir: env::var_os(LOG_DIR_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            no_color: env::var_os("NO_COLOR").is_some(),
        }
    }

    /// Log directory to scan
    ///
    /// Returns:
    /// 1. `INTEL_LIBITTNOTIFY_LOG_DIR` if set and non-empty
    /// 2. the platform default temp directory otherwise
    pub fn resolved_log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(default_log_dir)
    }

    /// Runner options seeded from the environment
    pub fn runner_options(&self) -> RunnerOptions {
        RunnerOptions {
            color: !self.no_color,
            ..RunnerOptions::default()
        }
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(unix)]
pub fn default_log_dir() -> PathBuf {
    PathBuf::from("/tmp")
}

#[cfg(not(unix))]
pub fn default_log_dir() -> PathBuf {
    env::temp_dir()
}
