// crates/scenario-probe-core/src/identity.rs
// ============================================================================
// Module: Actor Identity Model
// Description: Role, credential, and session-token types for client contexts.
// Purpose: Represent "who is making requests right now" without leaking secrets.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! An actor identity is a role tag plus a credential pair; a session token is
//! the opaque authorization value a successful registration or login yields.
//! At most one identity is active on a client context at a time, and
//! switching replaces the token wholesale. Tokens redact themselves in debug
//! output so transcripts and failure reports never carry live credentials.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Identity Types
// ============================================================================

/// Opaque role tag for an actor (e.g. the system under test's own role names).
///
/// # Invariants
/// - Opaque UTF-8 string; the harness assigns no meaning to specific tags.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    /// Creates a new role tag.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Returns the role tag as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Credential pair identifying an actor to the system under test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Unique identifier the actor registers and logs in with.
    pub identifier: String,
    /// Secret paired with the identifier.
    pub secret: String,
}

/// Actor identity: a role tag plus its credential pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorIdentity {
    /// Role tag for the actor.
    pub role: Role,
    /// Credential pair for registration and login.
    pub credentials: Credentials,
}

impl ActorIdentity {
    /// Creates an actor identity from a role tag and credential pair.
    #[must_use]
    pub fn new(role: Role, credentials: Credentials) -> Self {
        Self {
            role,
            credentials,
        }
    }

    /// Builds the canonical login payload for this identity.
    ///
    /// The harness's canonical credential wire form uses `identifier` and
    /// `secret` field names; systems under test with different field names
    /// take a hand-built payload instead.
    #[must_use]
    pub fn login_payload(&self) -> Value {
        json!({
            "identifier": self.credentials.identifier,
            "secret": self.credentials.secret,
        })
    }

    /// Builds the canonical registration payload: login payload plus role.
    #[must_use]
    pub fn registration_payload(&self) -> Value {
        json!({
            "identifier": self.credentials.identifier,
            "secret": self.credentials.secret,
            "role": self.role.as_str(),
        })
    }
}

// ============================================================================
// SECTION: Session Token
// ============================================================================

/// Opaque session/authorization token returned by the system under test.
///
/// # Invariants
/// - Never serialized and never rendered in debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Creates a session token from its opaque wire value.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token value for request authorization.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
