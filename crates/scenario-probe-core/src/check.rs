// crates/scenario-probe-core/src/check.rs
// ============================================================================
// Module: Field Equality Checks
// Description: Labeled value-level assertions over captured responses.
// Purpose: Report exactly which named business-value check failed.
// Dependencies: serde_json, time
// ============================================================================

//! ## Overview
//! Where [`crate::shape`] answers "is the payload structurally sound", this
//! module answers "do the values match what the scenario submitted". Checks
//! are labeled so a failure names the offending field, and the update-law
//! helpers enforce immutable-field stability and strict timestamp ordering
//! across updates.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Value-level check error.
///
/// # Invariants
/// - Variants are stable for failure classification.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckError {
    /// A labeled equality check failed.
    #[error("check `{label}` failed: actual {actual} != expected {expected}")]
    Mismatch {
        /// Label naming the failed check.
        label: String,
        /// Value observed in the response.
        actual: Value,
        /// Value the scenario expected.
        expected: Value,
    },
    /// A timestamp field was not valid RFC 3339.
    #[error("timestamp `{label}` is not RFC 3339: `{value}`")]
    InvalidTimestamp {
        /// Label naming the timestamp field.
        label: String,
        /// Offending string value.
        value: String,
    },
    /// A timestamp that must strictly advance did not.
    #[error("`{after_label}` ({after}) is not strictly after `{before_label}` ({before})")]
    NotStrictlyAfter {
        /// Label of the earlier timestamp.
        before_label: String,
        /// Earlier timestamp value.
        before: String,
        /// Label of the later timestamp.
        after_label: String,
        /// Later timestamp value.
        after: String,
    },
}

// ============================================================================
// SECTION: Checks
// ============================================================================

/// One labeled (actual, expected) equality pair.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCheck {
    /// Label naming the check in failure reports.
    pub label: String,
    /// Value observed in the response.
    pub actual: Value,
    /// Value the scenario expected.
    pub expected: Value,
}

impl FieldCheck {
    /// Creates a labeled equality check.
    #[must_use]
    pub fn new(label: &str, actual: Value, expected: Value) -> Self {
        Self {
            label: label.to_string(),
            actual,
            expected,
        }
    }
}

/// Verifies every labeled pair for equality, reporting the first failure.
///
/// # Errors
///
/// Returns [`CheckError::Mismatch`] naming the first failing label.
pub fn verify_fields(checks: &[FieldCheck]) -> Result<(), CheckError> {
    for check in checks {
        if check.actual != check.expected {
            return Err(CheckError::Mismatch {
                label: check.label.clone(),
                actual: check.actual.clone(),
                expected: check.expected.clone(),
            });
        }
    }
    Ok(())
}

/// Verifies that a field did not change across an update.
///
/// # Errors
///
/// Returns [`CheckError::Mismatch`] when the field drifted.
pub fn verify_unchanged(label: &str, before: &Value, after: &Value) -> Result<(), CheckError> {
    if before == after {
        Ok(())
    } else {
        Err(CheckError::Mismatch {
            label: label.to_string(),
            actual: after.clone(),
            expected: before.clone(),
        })
    }
}

/// Verifies that one RFC 3339 timestamp is strictly after another.
///
/// # Errors
///
/// Returns [`CheckError`] when either value fails to parse or ordering is not strict.
pub fn verify_strictly_after(
    before_label: &str,
    before: &str,
    after_label: &str,
    after: &str,
) -> Result<(), CheckError> {
    let before_at = parse_timestamp(before_label, before)?;
    let after_at = parse_timestamp(after_label, after)?;
    if after_at > before_at {
        Ok(())
    } else {
        Err(CheckError::NotStrictlyAfter {
            before_label: before_label.to_string(),
            before: before.to_string(),
            after_label: after_label.to_string(),
            after: after.to_string(),
        })
    }
}

/// Parses a labeled RFC 3339 timestamp.
fn parse_timestamp(label: &str, value: &str) -> Result<OffsetDateTime, CheckError> {
    OffsetDateTime::parse(value, &Rfc3339).map_err(|_| CheckError::InvalidTimestamp {
        label: label.to_string(),
        value: value.to_string(),
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================
