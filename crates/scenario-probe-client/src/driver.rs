// crates/scenario-probe-client/src/driver.rs
// ============================================================================
// Module: Scenario Driver
// Description: Sequential orchestration of calls against a system under test.
// Purpose: Compose fixtures, context calls, and validators into scenarios.
// Dependencies: scenario-probe-core, scenario-probe-client context
// ============================================================================

//! ## Overview
//! A [`Scenario`] owns one [`ClientContext`] plus a snapshot store of captured
//! responses. Write steps validate the response shape and capture it under a
//! label; later steps read captured identifiers back for referential
//! cross-checks. Listing steps deserialize the pagination block and verify
//! each facet the query made explicit: a set limit enforces the echo and the
//! count bound, a set page enforces the echo and the beyond-last boundary.
//! Scenarios are all-or-nothing: the first unexpected failure propagates and
//! fails the whole procedure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use scenario_probe_core::PageError;
use scenario_probe_core::PageInfo;
use scenario_probe_core::PageRequest;
use scenario_probe_core::Shape;
use scenario_probe_core::ShapeError;
use scenario_probe_core::verify_limit;
use scenario_probe_core::verify_page_echo;
use scenario_probe_core::verify_totals;
use serde_json::Value;
use thiserror::Error;
use url::form_urlencoded;

use crate::context::ClientContext;
use crate::context::ClientError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Scenario-driver error.
///
/// # Invariants
/// - Variants are stable for failure classification.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The underlying client call failed.
    #[error(transparent)]
    Client(#[from] ClientError),
    /// A response failed structural validation.
    #[error(transparent)]
    Shape(#[from] ShapeError),
    /// A pagination invariant was violated.
    #[error(transparent)]
    Page(#[from] PageError),
    /// No snapshot was captured under the requested label.
    #[error("no snapshot captured under label `{0}`")]
    MissingSnapshot(String),
    /// A captured snapshot has no value at the requested pointer.
    #[error("snapshot `{label}` has no value at pointer `{pointer}`")]
    MissingField {
        /// Snapshot label that was probed.
        label: String,
        /// JSON pointer that found nothing.
        pointer: String,
    },
    /// A listing response did not carry the expected envelope.
    #[error("listing response from `{route}` is missing `{part}`")]
    MalformedListing {
        /// Route that produced the listing.
        route: String,
        /// Envelope part that was absent or mistyped.
        part: &'static str,
    },
}

// ============================================================================
// SECTION: List Query
// ============================================================================

/// Filter and pagination descriptor for a listing step.
///
/// Each facet left absent means the server's default applies and the driver
/// skips that facet's request-echo verification; absent filters mean all
/// records are returned regardless of null fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Requested page number, when explicit.
    page: Option<u32>,
    /// Requested page size, when explicit.
    limit: Option<u32>,
    /// Filter key/value pairs, in insertion order.
    filters: Vec<(String, String)>,
}

impl ListQuery {
    /// Creates an empty query (server defaults, no filter).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the requested page number (1-based).
    #[must_use]
    pub const fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Sets the requested page size.
    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Adds one filter key/value pair.
    #[must_use]
    pub fn filter(mut self, key: &str, value: &str) -> Self {
        self.filters.push((key.to_string(), value.to_string()));
        self
    }

    /// Returns the explicit pagination request, when both values are set.
    #[must_use]
    pub const fn page_request(&self) -> Option<PageRequest> {
        match (self.page, self.limit) {
            (Some(page), Some(limit)) => Some(PageRequest {
                page,
                limit,
            }),
            _ => None,
        }
    }

    /// Renders the query string, including the leading `?` when non-empty.
    #[must_use]
    pub fn query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        if let Some(page) = self.page {
            serializer.append_pair("page", &page.to_string());
        }
        if let Some(limit) = self.limit {
            serializer.append_pair("limit", &limit.to_string());
        }
        for (key, value) in &self.filters {
            serializer.append_pair(key, value);
        }
        let rendered = serializer.finish();
        if rendered.is_empty() {
            rendered
        } else {
            format!("?{rendered}")
        }
    }
}

/// Validated outcome of a listing step.
#[derive(Debug, Clone, PartialEq)]
pub struct ListOutcome {
    /// Items from the response's data array, each shape-validated.
    pub items: Vec<Value>,
    /// Pagination block reported by the server.
    pub page_info: PageInfo,
}

// ============================================================================
// SECTION: Scenario
// ============================================================================

/// Sequential scenario procedure over one client context.
///
/// # Invariants
/// - Steps run strictly in order; no two calls are ever in flight at once.
/// - Snapshots live only as long as the scenario value itself.
pub struct Scenario {
    /// Client context carrying the active identity.
    context: ClientContext,
    /// Captured response snapshots keyed by step label.
    snapshots: BTreeMap<String, Value>,
}

impl Scenario {
    /// Creates a scenario over a fresh client context.
    #[must_use]
    pub fn new(context: ClientContext) -> Self {
        Self {
            context,
            snapshots: BTreeMap::new(),
        }
    }

    /// Returns the underlying context for direct calls.
    pub const fn context_mut(&mut self) -> &mut ClientContext {
        &mut self.context
    }

    /// Consumes the scenario and returns its context (for transcript output).
    #[must_use]
    pub fn into_context(self) -> ClientContext {
        self.context
    }

    /// Establishes or switches the active actor identity.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] when the registration-or-login call is rejected.
    pub async fn act_as(&mut self, route: &str, payload: &Value) -> Result<Value, DriverError> {
        Ok(self.context.act_as(route, payload).await?)
    }

    /// Runs a create step: POST, validate shape, capture snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] on rejection or structural mismatch.
    pub async fn create(
        &mut self,
        label: &str,
        route: &str,
        payload: &Value,
        shape: &Shape,
    ) -> Result<Value, DriverError> {
        let response = self.context.post(route, payload).await?;
        shape.validate(&response)?;
        self.snapshots.insert(label.to_string(), response.clone());
        Ok(response)
    }

    /// Runs a read step: GET, validate shape, capture snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] on rejection or structural mismatch.
    pub async fn read(
        &mut self,
        label: &str,
        route: &str,
        shape: &Shape,
    ) -> Result<Value, DriverError> {
        let response = self.context.get(route).await?;
        shape.validate(&response)?;
        self.snapshots.insert(label.to_string(), response.clone());
        Ok(response)
    }

    /// Runs an update step: PUT, validate shape, capture snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] on rejection or structural mismatch.
    pub async fn update(
        &mut self,
        label: &str,
        route: &str,
        payload: &Value,
        shape: &Shape,
    ) -> Result<Value, DriverError> {
        let response = self.context.put(route, payload).await?;
        shape.validate(&response)?;
        self.snapshots.insert(label.to_string(), response.clone());
        Ok(response)
    }

    /// Runs a delete step, requiring only that the call completes.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] when the call is rejected.
    pub async fn delete(&mut self, route: &str) -> Result<(), DriverError> {
        self.context.delete(route).await?;
        Ok(())
    }

    /// Runs a listing step with filter and pagination validation.
    ///
    /// Every item is validated against the item shape. Each pagination facet
    /// the query set explicitly is verified against the block: an explicit
    /// limit enforces the echo and the count bound, an explicit page enforces
    /// the echo and the beyond-last boundary.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] on rejection, malformed envelope, structural
    /// mismatch, or pagination inconsistency.
    pub async fn list(
        &mut self,
        route: &str,
        query: &ListQuery,
        item_shape: &Shape,
    ) -> Result<ListOutcome, DriverError> {
        let full_route = format!("{route}{}", query.query_string());
        let response = self.context.get(&full_route).await?;
        let items = response
            .get("data")
            .and_then(Value::as_array)
            .ok_or(DriverError::MalformedListing {
                route: route.to_string(),
                part: "data array",
            })?
            .clone();
        for item in &items {
            item_shape.validate(item)?;
        }
        let pagination = response.get("pagination").ok_or(DriverError::MalformedListing {
            route: route.to_string(),
            part: "pagination block",
        })?;
        let page_info: PageInfo = serde_json::from_value(pagination.clone()).map_err(|_| {
            DriverError::MalformedListing {
                route: route.to_string(),
                part: "pagination block",
            }
        })?;
        if query.page.is_some() || query.limit.is_some() {
            verify_totals(&page_info)?;
        }
        if let Some(limit) = query.limit {
            verify_limit(limit, &page_info, items.len())?;
        }
        if let Some(page) = query.page {
            verify_page_echo(page, &page_info, items.len())?;
        }
        Ok(ListOutcome {
            items,
            page_info,
        })
    }

    /// Returns a captured snapshot by label.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::MissingSnapshot`] when the label is unknown.
    pub fn snapshot(&self, label: &str) -> Result<&Value, DriverError> {
        self.snapshots.get(label).ok_or_else(|| DriverError::MissingSnapshot(label.to_string()))
    }

    /// Returns a field of a captured snapshot by JSON pointer.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] when the label or pointer finds nothing.
    pub fn field(&self, label: &str, pointer: &str) -> Result<&Value, DriverError> {
        self.snapshot(label)?.pointer(pointer).ok_or_else(|| DriverError::MissingField {
            label: label.to_string(),
            pointer: pointer.to_string(),
        })
    }

    /// Returns a string field of a captured snapshot by JSON pointer.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] when the field is absent or not a string.
    pub fn text_field(&self, label: &str, pointer: &str) -> Result<&str, DriverError> {
        self.field(label, pointer)?.as_str().ok_or_else(|| DriverError::MissingField {
            label: label.to_string(),
            pointer: pointer.to_string(),
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
