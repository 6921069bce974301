// crates/scenario-probe-core/src/lib.rs
// ============================================================================
// Module: Scenario Probe Core
// Description: Fixtures, validators, and identity model for scenario probing.
// Purpose: Provide the pure building blocks used by the scenario driver.
// Dependencies: serde, serde_json, jsonschema, rand, time
// ============================================================================

//! ## Overview
//! Scenario Probe Core holds the side-effect-free pieces of the harness:
//! constraint-driven random fixtures, structural response validation, labeled
//! field-equality checks, pagination invariants, and the actor identity model.
//! Nothing in this crate performs I/O against a system under test.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod check;
pub mod fixture;
pub mod identity;
pub mod page;
pub mod shape;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use check::CheckError;
pub use check::FieldCheck;
pub use check::verify_fields;
pub use check::verify_strictly_after;
pub use check::verify_unchanged;
pub use fixture::Constraint;
pub use fixture::FixtureError;
pub use identity::ActorIdentity;
pub use identity::Credentials;
pub use identity::Role;
pub use identity::SessionToken;
pub use page::PageError;
pub use page::PageInfo;
pub use page::PageRequest;
pub use page::verify_filtered;
pub use page::verify_limit;
pub use page::verify_page;
pub use page::verify_page_echo;
pub use page::verify_totals;
pub use shape::FieldKind;
pub use shape::FieldSpec;
pub use shape::Shape;
pub use shape::ShapeError;
