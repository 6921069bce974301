// system-tests/src/config/env.rs
// ============================================================================
// Module: System Test Environment
// Description: Environment-backed configuration for system tests.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8 or unparseable values fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys for system test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeTestEnv {
    /// Optional artifact run-root override.
    RunRoot,
    /// Optional base URL of an externally managed system under test.
    BaseUrl,
    /// Optional transport timeout override in seconds (positive integer).
    TimeoutSeconds,
}

impl ProbeTestEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RunRoot => "SCENARIO_PROBE_TEST_RUN_ROOT",
            Self::BaseUrl => "SCENARIO_PROBE_TEST_BASE_URL",
            Self::TimeoutSeconds => "SCENARIO_PROBE_TEST_TIMEOUT_SEC",
        }
    }
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Typed system test configuration derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProbeTestConfig {
    /// Optional artifact run-root override.
    pub run_root: Option<PathBuf>,
    /// Optional base URL of an externally managed system under test.
    pub base_url: Option<String>,
    /// Optional transport timeout override.
    pub timeout: Option<Duration>,
}

impl ProbeTestConfig {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error string when a value is not UTF-8 or fails to parse.
    pub fn load() -> Result<Self, String> {
        Self::load_from(|key| env::var_os(key))
    }

    /// Loads configuration from an injected environment lookup.
    ///
    /// # Errors
    ///
    /// Returns an error string when a value is not UTF-8 or fails to parse.
    pub fn load_from(
        lookup: impl Fn(&str) -> Option<OsString>,
    ) -> Result<Self, String> {
        let run_root =
            read_utf8(&lookup, ProbeTestEnv::RunRoot)?.map(PathBuf::from);
        let base_url = read_utf8(&lookup, ProbeTestEnv::BaseUrl)?;
        let timeout = match read_utf8(&lookup, ProbeTestEnv::TimeoutSeconds)? {
            None => None,
            Some(raw) => {
                let seconds: u64 = raw.parse().map_err(|_| {
                    format!(
                        "{} must be a positive integer, got `{raw}`",
                        ProbeTestEnv::TimeoutSeconds.as_str()
                    )
                })?;
                if seconds == 0 {
                    return Err(format!(
                        "{} must be positive",
                        ProbeTestEnv::TimeoutSeconds.as_str()
                    ));
                }
                Some(Duration::from_secs(seconds))
            }
        };
        Ok(Self {
            run_root,
            base_url,
            timeout,
        })
    }
}

/// Reads one environment value, enforcing strict UTF-8.
fn read_utf8(
    lookup: &impl Fn(&str) -> Option<OsString>,
    key: ProbeTestEnv,
) -> Result<Option<String>, String> {
    match lookup(key.as_str()) {
        None => Ok(None),
        Some(value) => value
            .into_string()
            .map(Some)
            .map_err(|_| format!("{} is not valid UTF-8", key.as_str())),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
