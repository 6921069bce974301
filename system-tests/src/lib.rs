// system-tests/src/lib.rs
// ============================================================================
// Module: Scenario Probe System Tests Library
// Description: Shared configuration for system test scenarios.
// Purpose: Provide common utilities for Scenario Probe system-test binaries.
// Dependencies: std
// ============================================================================

//! ## Overview
//! This crate hosts shared configuration utilities used by the Scenario Probe
//! system-test binaries in `system-tests/tests`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
