// crates/scenario-probe-client/src/context.rs
// ============================================================================
// Module: Authenticated Client Context
// Description: HTTP client with a single mutable session-token slot.
// Purpose: Attach the active identity's token to every call until switched.
// Dependencies: reqwest, scenario-probe-core, serde_json, url
// ============================================================================

//! ## Overview
//! One [`ClientContext`] serves one scenario, strictly sequentially. The only
//! identity transition is [`ClientContext::act_as`]: a registration-or-login
//! call that, on success, replaces the token slot atomically. A failed switch
//! leaves the previous identity active and propagates the error, which is the
//! mechanism negative registration scenarios rely on. The context never
//! retries and manages no timeouts beyond the transport's own.
//!
//! Every call appends a redacted [`TranscriptEntry`]; tokens and bodies are
//! never recorded, so transcripts are safe to write as test artifacts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use reqwest::Client;
use reqwest::Method;
use scenario_probe_core::SessionToken;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Client-context error.
///
/// # Invariants
/// - Variants are stable for failure classification.
/// - Messages never include session tokens or secrets.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The base URL failed to parse.
    #[error("invalid base url `{url}`: {message}")]
    InvalidBaseUrl {
        /// Offending base URL.
        url: String,
        /// Parse failure detail.
        message: String,
    },
    /// The HTTP client failed to build.
    #[error("http client failed to build: {0}")]
    Build(String),
    /// The request never produced an HTTP response.
    #[error("transport failure on {method} {route}: {message}")]
    Transport {
        /// HTTP method of the failed call.
        method: String,
        /// Route of the failed call.
        route: String,
        /// Transport failure detail.
        message: String,
    },
    /// The server answered with a non-success status.
    #[error("{method} {route} returned status {status}: {body}")]
    Status {
        /// HTTP method of the rejected call.
        method: String,
        /// Route of the rejected call.
        route: String,
        /// HTTP status code.
        status: u16,
        /// Response body text (truncated).
        body: String,
    },
    /// The response body was not valid JSON.
    #[error("response to {method} {route} is not valid JSON: {message}")]
    Decode {
        /// HTTP method of the call.
        method: String,
        /// Route of the call.
        route: String,
        /// Decode failure detail.
        message: String,
    },
    /// A login/registration response carried no token at the expected pointer.
    #[error("login response has no token at pointer `{pointer}`")]
    TokenMissing {
        /// JSON pointer that was probed for the token.
        pointer: String,
    },
    /// An operation expected to be rejected completed successfully.
    #[error("operation `{label}` succeeded but was expected to be rejected")]
    UnexpectedSuccess {
        /// Label naming the negative-path step.
        label: String,
    },
}

// ============================================================================
// SECTION: Token Source
// ============================================================================

/// JSON pointer locating the session token in a login/registration response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSource(String);

impl TokenSource {
    /// Creates a token source from a JSON pointer.
    #[must_use]
    pub fn new(pointer: impl Into<String>) -> Self {
        Self(pointer.into())
    }

    /// Returns the JSON pointer.
    #[must_use]
    pub fn pointer(&self) -> &str {
        &self.0
    }
}

impl Default for TokenSource {
    fn default() -> Self {
        Self("/token".to_string())
    }
}

// ============================================================================
// SECTION: Transcript
// ============================================================================

/// Redacted record of one call issued through a context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptEntry {
    /// Monotonic sequence number within the context.
    pub sequence: u64,
    /// HTTP method of the call.
    pub method: String,
    /// Route of the call.
    pub route: String,
    /// HTTP status code when a response arrived.
    pub status: Option<u16>,
    /// Failure summary when the call did not succeed.
    pub error: Option<String>,
    /// Whether an identity token was attached to the call.
    pub authenticated: bool,
}

// ============================================================================
// SECTION: Client Context
// ============================================================================

/// Maximum response-body length preserved in error messages.
const ERROR_BODY_LIMIT: usize = 512;

/// Per-scenario HTTP context with a single mutable identity slot.
///
/// # Invariants
/// - At most one identity is active; `act_as` replaces it only on success.
/// - Calls are strictly sequential; the context is never shared.
#[derive(Debug)]
pub struct ClientContext {
    /// Base URL with no trailing slash.
    base_url: String,
    /// Underlying HTTP client.
    http: Client,
    /// Active session token, if any identity has been established.
    token: Option<SessionToken>,
    /// Pointer locating tokens in login/registration responses.
    token_source: TokenSource,
    /// Redacted call log for artifact output.
    transcript: Vec<TranscriptEntry>,
    /// Next transcript sequence number.
    sequence: u64,
}

impl ClientContext {
    /// Creates an unauthenticated context for a base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the URL is invalid or the client fails to build.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    /// Creates an unauthenticated context with an explicit transport timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the URL is invalid or the client fails to build.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        Url::parse(base_url).map_err(|err| ClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            message: err.to_string(),
        })?;
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ClientError::Build(err.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            token: None,
            token_source: TokenSource::default(),
            transcript: Vec::new(),
            sequence: 0,
        })
    }

    /// Overrides the JSON pointer used to extract session tokens.
    #[must_use]
    pub fn with_token_source(mut self, source: TokenSource) -> Self {
        self.token_source = source;
        self
    }

    /// Returns true when an identity is currently active.
    #[must_use]
    pub const fn has_identity(&self) -> bool {
        self.token.is_some()
    }

    /// Returns the redacted call transcript.
    #[must_use]
    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    /// Performs a registration-or-login call and switches the active identity.
    ///
    /// The token slot is replaced only when the call succeeds and the response
    /// carries a token at the configured pointer; on any failure the previous
    /// identity stays active and the error propagates.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the call is rejected or no token is present.
    pub async fn act_as(&mut self, route: &str, payload: &Value) -> Result<Value, ClientError> {
        let response = self.send(Method::POST, route, Some(payload)).await?;
        let pointer = self.token_source.pointer().to_string();
        let token = response
            .pointer(&pointer)
            .and_then(Value::as_str)
            .ok_or(ClientError::TokenMissing {
                pointer,
            })?;
        self.token = Some(SessionToken::new(token));
        Ok(response)
    }

    /// Issues a GET request with the active identity attached.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure, rejection, or bad JSON.
    pub async fn get(&mut self, route: &str) -> Result<Value, ClientError> {
        self.send(Method::GET, route, None).await
    }

    /// Issues a POST request with the active identity attached.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure, rejection, or bad JSON.
    pub async fn post(&mut self, route: &str, body: &Value) -> Result<Value, ClientError> {
        self.send(Method::POST, route, Some(body)).await
    }

    /// Issues a PUT request with the active identity attached.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure, rejection, or bad JSON.
    pub async fn put(&mut self, route: &str, body: &Value) -> Result<Value, ClientError> {
        self.send(Method::PUT, route, Some(body)).await
    }

    /// Issues a DELETE request with the active identity attached.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure, rejection, or bad JSON.
    pub async fn delete(&mut self, route: &str) -> Result<Value, ClientError> {
        self.send(Method::DELETE, route, None).await
    }

    /// Sends one request, records a transcript entry, and decodes the body.
    async fn send(
        &mut self,
        method: Method,
        route: &str,
        body: Option<&Value>,
    ) -> Result<Value, ClientError> {
        let url = format!("{}{route}", self.base_url);
        let method_label = method.to_string();
        let authenticated = self.token.is_some();
        let mut request = self.http.request(method, &url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.as_str());
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        let outcome = request.send().await;
        let result = match outcome {
            Err(err) => Err(ClientError::Transport {
                method: method_label.clone(),
                route: route.to_string(),
                message: err.to_string(),
            }),
            Ok(response) => {
                let status = response.status();
                match response.text().await {
                    Err(err) => Err(ClientError::Transport {
                        method: method_label.clone(),
                        route: route.to_string(),
                        message: err.to_string(),
                    }),
                    Ok(text) if status.is_success() => decode_body(&method_label, route, &text),
                    Ok(text) => Err(ClientError::Status {
                        method: method_label.clone(),
                        route: route.to_string(),
                        status: status.as_u16(),
                        body: truncate(&text),
                    }),
                }
            }
        };
        self.record(&method_label, route, authenticated, &result);
        result
    }

    /// Appends a redacted transcript entry for a finished call.
    fn record(
        &mut self,
        method: &str,
        route: &str,
        authenticated: bool,
        result: &Result<Value, ClientError>,
    ) {
        self.sequence = self.sequence.saturating_add(1);
        let (status, error) = match result {
            Ok(_) => (None, None),
            Err(ClientError::Status {
                status, ..
            }) => (Some(*status), Some(format!("status {status}"))),
            Err(err) => (None, Some(err.to_string())),
        };
        self.transcript.push(TranscriptEntry {
            sequence: self.sequence,
            method: method.to_string(),
            route: route.to_string(),
            status,
            error,
            authenticated,
        });
    }
}

/// Decodes a response body, treating an empty body as JSON null.
fn decode_body(method: &str, route: &str, text: &str) -> Result<Value, ClientError> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text).map_err(|err| ClientError::Decode {
        method: method.to_string(),
        route: route.to_string(),
        message: err.to_string(),
    })
}

/// Truncates a response body for error reporting.
fn truncate(text: &str) -> String {
    if text.len() <= ERROR_BODY_LIMIT {
        return text.to_string();
    }
    let mut cut = ERROR_BODY_LIMIT;
    while !text.is_char_boundary(cut) {
        cut = cut.saturating_sub(1);
    }
    format!("{}…", &text[..cut])
}

// ============================================================================
// SECTION: Tests
// ============================================================================
