// crates/scenario-probe-core/src/page.rs
// ============================================================================
// Module: Pagination and Filter Invariants
// Description: Consistency checks for listing responses.
// Purpose: Enforce limit bounds, page echo, and filter predicates fail-closed.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Listing calls return a data array plus a pagination block. This module
//! verifies the block against the request: the returned count never exceeds
//! the requested limit, the reported current page echoes the request, total
//! pages agree with total records, and a page beyond the last yields an empty
//! array with a still-valid block. Filter verification confirms every
//! returned item satisfies the requested predicate; supplying no filter means
//! no predicate is applied at all.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Pagination or filter invariant violation.
///
/// # Invariants
/// - Variants are stable for violation classification.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageError {
    /// The data array exceeded the requested limit.
    #[error("listing returned {returned} items but the requested limit is {limit}")]
    CountExceedsLimit {
        /// Number of items in the data array.
        returned: usize,
        /// Limit requested by the caller.
        limit: u32,
    },
    /// The reported current page does not echo the request.
    #[error("pagination reports page {reported} but page {requested} was requested")]
    PageEchoMismatch {
        /// Page number the block reported.
        reported: u32,
        /// Page number the caller requested.
        requested: u32,
    },
    /// The reported limit does not echo the request.
    #[error("pagination reports limit {reported} but limit {requested} was requested")]
    LimitEchoMismatch {
        /// Limit the block reported.
        reported: u32,
        /// Limit the caller requested.
        requested: u32,
    },
    /// Total pages disagree with total records and limit.
    #[error("pagination reports {pages} pages for {records} records at limit {limit}")]
    InconsistentTotals {
        /// Total pages the block reported.
        pages: u64,
        /// Total records the block reported.
        records: u64,
        /// Limit the block reported.
        limit: u32,
    },
    /// A page beyond the last returned a non-empty data array.
    #[error("page {requested} is beyond the last page ({pages}) but returned {returned} items")]
    BeyondLastNotEmpty {
        /// Page number the caller requested.
        requested: u32,
        /// Total pages the block reported.
        pages: u64,
        /// Number of items in the data array.
        returned: usize,
    },
    /// A returned item violated the requested filter predicate.
    #[error("filter `{label}` violated by item at index {index}")]
    FilterViolation {
        /// Label describing the filter predicate.
        label: String,
        /// Index of the offending item in the data array.
        index: usize,
    },
}

// ============================================================================
// SECTION: Pagination Model
// ============================================================================

/// Pagination parameters for a listing request (1-based page).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    /// Requested page number (1-based).
    pub page: u32,
    /// Requested page size.
    pub limit: u32,
}

/// Pagination block reported by a listing response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Current page number (1-based).
    pub current: u32,
    /// Page size applied by the server.
    pub limit: u32,
    /// Total records matching the request.
    pub records: u64,
    /// Total pages at the applied limit.
    pub pages: u64,
}

// ============================================================================
// SECTION: Verification
// ============================================================================

/// Verifies a pagination block against the request that produced it.
///
/// # Errors
///
/// Returns [`PageError`] on the first violated invariant.
pub fn verify_page(
    request: &PageRequest,
    info: &PageInfo,
    data_len: usize,
) -> Result<(), PageError> {
    verify_limit(request.limit, info, data_len)?;
    verify_totals(info)?;
    verify_page_echo(request.page, info, data_len)?;
    Ok(())
}

/// Verifies the limit facet of a pagination block: the block echoes the
/// requested limit and the data array never exceeds it.
///
/// # Errors
///
/// Returns [`PageError`] on the first violated invariant.
pub fn verify_limit(requested: u32, info: &PageInfo, data_len: usize) -> Result<(), PageError> {
    if info.limit != requested {
        return Err(PageError::LimitEchoMismatch {
            reported: info.limit,
            requested,
        });
    }
    if data_len > requested as usize {
        return Err(PageError::CountExceedsLimit {
            returned: data_len,
            limit: requested,
        });
    }
    Ok(())
}

/// Verifies the page facet of a pagination block: the block echoes the
/// requested page number and a page beyond the last carries no items.
///
/// # Errors
///
/// Returns [`PageError`] on the first violated invariant.
pub fn verify_page_echo(requested: u32, info: &PageInfo, data_len: usize) -> Result<(), PageError> {
    if info.current != requested {
        return Err(PageError::PageEchoMismatch {
            reported: info.current,
            requested,
        });
    }
    if u64::from(requested) > info.pages && data_len != 0 {
        return Err(PageError::BeyondLastNotEmpty {
            requested,
            pages: info.pages,
            returned: data_len,
        });
    }
    Ok(())
}

/// Verifies that total pages agree with total records at the reported limit.
///
/// # Errors
///
/// Returns [`PageError::InconsistentTotals`] when the counts disagree.
pub fn verify_totals(info: &PageInfo) -> Result<(), PageError> {
    let expected_pages = expected_page_count(info.records, info.limit);
    if info.pages != expected_pages {
        return Err(PageError::InconsistentTotals {
            pages: info.pages,
            records: info.records,
            limit: info.limit,
        });
    }
    Ok(())
}

/// Verifies that every returned item satisfies the filter predicate.
///
/// # Errors
///
/// Returns [`PageError::FilterViolation`] naming the first offending index.
pub fn verify_filtered<T>(
    items: &[T],
    predicate: impl Fn(&T) -> bool,
    label: &str,
) -> Result<(), PageError> {
    for (index, item) in items.iter().enumerate() {
        if !predicate(item) {
            return Err(PageError::FilterViolation {
                label: label.to_string(),
                index,
            });
        }
    }
    Ok(())
}

/// Computes the page count implied by total records at a given limit.
fn expected_page_count(records: u64, limit: u32) -> u64 {
    if limit == 0 {
        return 0;
    }
    records.div_ceil(u64::from(limit))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
