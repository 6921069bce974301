// system-tests/src/config/mod.rs
// ============================================================================
// Module: System Test Configuration
// Description: Typed configuration for system-test runs.
// Purpose: Re-export environment-backed configuration types.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Configuration for system tests comes from environment variables with
//! strict parsing; invalid values fail closed rather than falling back.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use env::ProbeTestConfig;
pub use env::ProbeTestEnv;
