// system-tests/tests/helpers/artifacts.rs
// ============================================================================
// Module: Test Artifacts
// Description: Artifact helpers for system-tests.
// Purpose: Create per-test run roots and write deterministic summaries.
// Dependencies: system-tests, serde, serde_jcs
// ============================================================================

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use system_tests::config::ProbeTestConfig;

#[derive(Debug, Serialize)]
struct TestSummary {
    test_name: String,
    status: String,
    started_at_ms: u128,
    ended_at_ms: u128,
    duration_ms: u128,
    notes: Vec<String>,
}

fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

fn default_run_root(test_name: &str) -> PathBuf {
    let stamp = now_millis();
    PathBuf::from("target/system-tests").join(format!("run_{stamp}")).join(test_name)
}

/// Artifact manager for a single system-test.
#[derive(Debug)]
pub struct TestArtifacts {
    test_name: String,
    root: PathBuf,
    started_at_ms: u128,
    notes: Vec<String>,
}

impl TestArtifacts {
    /// Creates the artifact root for a test.
    pub fn new(test_name: &str) -> io::Result<Self> {
        let config =
            ProbeTestConfig::load().map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
        let root = config
            .run_root
            .map_or_else(|| default_run_root(test_name), |base| base.join(test_name));
        fs::create_dir_all(&root)?;
        Ok(Self {
            test_name: test_name.to_string(),
            root,
            started_at_ms: now_millis(),
            notes: Vec::new(),
        })
    }

    /// Returns the root directory for the test artifacts.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Records a note for the final summary.
    pub fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    /// Writes a JSON artifact using canonical JCS serialization.
    pub fn write_json<T: Serialize>(&self, name: &str, value: &T) -> io::Result<PathBuf> {
        let path = self.root.join(name);
        let bytes = serde_jcs::to_vec(value)
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err.to_string()))?;
        fs::write(&path, bytes)?;
        Ok(path)
    }

    /// Writes the final summary artifact for the test.
    pub fn finish(self, status: &str) -> io::Result<PathBuf> {
        let ended_at_ms = now_millis();
        let summary = TestSummary {
            test_name: self.test_name.clone(),
            status: status.to_string(),
            started_at_ms: self.started_at_ms,
            ended_at_ms,
            duration_ms: ended_at_ms.saturating_sub(self.started_at_ms),
            notes: self.notes.clone(),
        };
        self.write_json("summary.json", &summary)
    }
}
