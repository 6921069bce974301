// crates/scenario-probe-client/src/lib.rs
// ============================================================================
// Module: Scenario Probe Client
// Description: Authenticated client context and scenario driver over HTTP.
// Purpose: Drive role-based systems under test with identity switching.
// Dependencies: scenario-probe-core, reqwest, serde_json
// ============================================================================

//! ## Overview
//! Scenario Probe Client owns the side-effecting half of the harness: a
//! per-scenario [`ClientContext`] holding the single mutable session-token
//! slot, a negative-path assertion helper for expected failures, and the
//! [`Scenario`] driver that sequences calls and captures response snapshots
//! for cross-step consistency checks.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod context;
pub mod driver;
pub mod negative;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use context::ClientContext;
pub use context::ClientError;
pub use context::TokenSource;
pub use context::TranscriptEntry;
pub use driver::DriverError;
pub use driver::ListOutcome;
pub use driver::ListQuery;
pub use driver::Scenario;
pub use negative::RejectionProof;
pub use negative::expect_rejection;
