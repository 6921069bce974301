// crates/scenario-probe-client/src/negative.rs
// ============================================================================
// Module: Negative-Path Assertion
// Description: Await an operation expected to fail and require that it does.
// Purpose: Make expected-failure steps explicit without inspecting error codes.
// Dependencies: scenario-probe-client context
// ============================================================================

//! ## Overview
//! Negative paths assert that a restricted or invalid operation is rejected.
//! The helper always awaits the operation fully before deciding, never
//! inspects a specific status code or message, and fails loudly with the
//! step's label when the operation unexpectedly succeeds.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::future::Future;

use crate::context::ClientError;

// ============================================================================
// SECTION: Rejection Proof
// ============================================================================

/// Evidence that a negative-path step was rejected as required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectionProof {
    /// Label naming the negative-path step.
    pub label: String,
    /// Rendered error the rejection produced (for artifacts only).
    pub message: String,
}

// ============================================================================
// SECTION: Assertion
// ============================================================================

/// Awaits an operation expected to fail and requires that it does.
///
/// # Errors
///
/// Returns [`ClientError::UnexpectedSuccess`] when the operation completes.
pub async fn expect_rejection<F, T, E>(
    label: &str,
    operation: F,
) -> Result<RejectionProof, ClientError>
where
    F: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    match operation.await {
        Ok(_) => Err(ClientError::UnexpectedSuccess {
            label: label.to_string(),
        }),
        Err(err) => Ok(RejectionProof {
            label: label.to_string(),
            message: err.to_string(),
        }),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
