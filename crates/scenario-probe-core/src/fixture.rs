// crates/scenario-probe-core/src/fixture.rs
// ============================================================================
// Module: Random Fixture Generator
// Description: Constraint-driven random values for request payloads.
// Purpose: Produce shape-deterministic, value-random fixtures without collisions.
// Dependencies: rand, serde_json
// ============================================================================

//! ## Overview
//! Fixtures are deterministic in shape and random in value: every generated
//! value satisfies its constraint, and unique-keyed values (emails, UUIDs)
//! carry enough entropy that two invocations in one run collide only with
//! negligible probability. Invalid constraint descriptors are programmer
//! errors and fail fast as [`FixtureError`] results.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rand::Rng;
use rand::distributions::Alphanumeric;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Fixture generation error.
///
/// # Invariants
/// - Every variant marks a programmer error in the constraint descriptor.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FixtureError {
    /// Alphanumeric constraint with a zero length.
    #[error("alphanumeric constraint requires a length of at least 1")]
    EmptyLength,
    /// Paragraph constraint with zero sentences.
    #[error("paragraph constraint requires at least 1 sentence")]
    EmptyParagraph,
    /// Choice constraint with no candidates.
    #[error("choice constraint requires a non-empty candidate set")]
    EmptyChoices,
    /// Integer range where the minimum exceeds the maximum.
    #[error("integer range is empty: min {min} exceeds max {max}")]
    EmptyRange {
        /// Inclusive lower bound supplied by the caller.
        min: i64,
        /// Inclusive upper bound supplied by the caller.
        max: i64,
    },
}

// ============================================================================
// SECTION: Constraint Descriptors
// ============================================================================

/// Constraint descriptor for a generated fixture value.
///
/// # Invariants
/// - Generation always satisfies the described constraint or fails fast.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// String formatted as an email address with a random local part.
    Email,
    /// UUID-shaped string (version 4, variant 1).
    Uuid,
    /// Alphanumeric string of the given length.
    Alphanumeric {
        /// Number of characters to generate (must be >= 1).
        length: usize,
    },
    /// Prose paragraph with the given number of sentences.
    Paragraph {
        /// Number of sentences to generate (must be >= 1).
        sentences: usize,
    },
    /// One value chosen uniformly from an enumerated set.
    OneOf {
        /// Candidate values (must be non-empty).
        choices: Vec<Value>,
    },
    /// Integer chosen uniformly from an inclusive range.
    IntInRange {
        /// Inclusive lower bound.
        min: i64,
        /// Inclusive upper bound.
        max: i64,
    },
}

// ============================================================================
// SECTION: Generators
// ============================================================================

/// Generates a value satisfying the supplied constraint.
///
/// # Errors
///
/// Returns [`FixtureError`] when the constraint descriptor is invalid.
pub fn generate(constraint: &Constraint) -> Result<Value, FixtureError> {
    match constraint {
        Constraint::Email => Ok(Value::String(email())),
        Constraint::Uuid => Ok(Value::String(uuid())),
        Constraint::Alphanumeric { length } => alphanumeric(*length).map(Value::String),
        Constraint::Paragraph { sentences } => paragraph(*sentences).map(Value::String),
        Constraint::OneOf { choices } => pick(choices).cloned(),
        Constraint::IntInRange { min, max } => int_in(*min, *max).map(Value::from),
    }
}

/// Generates a random email address with a high-entropy local part.
#[must_use]
pub fn email() -> String {
    let local = random_token(20).to_lowercase();
    let domain = random_token(8).to_lowercase();
    format!("{local}@{domain}.test")
}

/// Generates a UUID-shaped string (version 4, variant 1).
#[must_use]
pub fn uuid() -> String {
    let mut bytes = [0_u8; 16];
    rand::thread_rng().fill(&mut bytes);
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    let mut rendered = String::with_capacity(36);
    for (index, byte) in bytes.iter().enumerate() {
        if matches!(index, 4 | 6 | 8 | 10) {
            rendered.push('-');
        }
        rendered.push_str(&format!("{byte:02x}"));
    }
    rendered
}

/// Generates an alphanumeric string of the given length.
///
/// # Errors
///
/// Returns [`FixtureError::EmptyLength`] when `length` is zero.
pub fn alphanumeric(length: usize) -> Result<String, FixtureError> {
    if length == 0 {
        return Err(FixtureError::EmptyLength);
    }
    Ok(random_token(length))
}

/// Generates a prose paragraph with the given number of sentences.
///
/// # Errors
///
/// Returns [`FixtureError::EmptyParagraph`] when `sentences` is zero.
pub fn paragraph(sentences: usize) -> Result<String, FixtureError> {
    if sentences == 0 {
        return Err(FixtureError::EmptyParagraph);
    }
    let mut rng = rand::thread_rng();
    let mut rendered = String::new();
    for index in 0..sentences {
        if index > 0 {
            rendered.push(' ');
        }
        let words = rng.gen_range(4..=9);
        for word_index in 0..words {
            let word = random_word(&mut rng);
            if word_index == 0 {
                let mut chars = word.chars();
                if let Some(first) = chars.next() {
                    rendered.push(first.to_ascii_uppercase());
                    rendered.push_str(chars.as_str());
                }
            } else {
                rendered.push(' ');
                rendered.push_str(&word);
            }
        }
        rendered.push('.');
    }
    Ok(rendered)
}

/// Picks one value uniformly from a candidate slice.
///
/// # Errors
///
/// Returns [`FixtureError::EmptyChoices`] when the slice is empty.
pub fn pick<T>(choices: &[T]) -> Result<&T, FixtureError> {
    if choices.is_empty() {
        return Err(FixtureError::EmptyChoices);
    }
    let index = rand::thread_rng().gen_range(0..choices.len());
    choices.get(index).ok_or(FixtureError::EmptyChoices)
}

/// Picks an integer uniformly from an inclusive range.
///
/// # Errors
///
/// Returns [`FixtureError::EmptyRange`] when `min` exceeds `max`.
pub fn int_in(min: i64, max: i64) -> Result<i64, FixtureError> {
    if min > max {
        return Err(FixtureError::EmptyRange {
            min,
            max,
        });
    }
    Ok(rand::thread_rng().gen_range(min..=max))
}

/// Generates an alphanumeric token of the given non-zero length.
fn random_token(length: usize) -> String {
    rand::thread_rng().sample_iter(&Alphanumeric).take(length).map(char::from).collect()
}

/// Generates one lowercase pseudo-word of 3 to 9 letters.
fn random_word(rng: &mut impl Rng) -> String {
    let length = rng.gen_range(3..=9);
    (0..length).map(|_| char::from(rng.gen_range(b'a'..=b'z'))).collect()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
