// crates/wps-execute-fetch/src/http.rs
// ============================================================================
// Module: HTTP Reference Fetcher
// Description: Blocking HTTP dereferencing for referenced complex inputs.
// Purpose: Fetch payload bytes with the method, headers, and body requested.
// Dependencies: wps-execute-core, reqwest, serde_json, tracing, url
// ============================================================================

//! ## Overview
//! [`HttpReferenceFetcher`] performs the fetch a [`ReferencedComplexInput`]
//! describes. GET references send only headers. POST references send an
//! inline body (strings verbatim, other JSON values serialized) or the bytes
//! fetched from a body reference.
//! Invariants:
//! - Only schemes in the allow-list are contacted, body references included.
//! - Redirects are rejected.
//! - Non-success status codes fail closed.
//! - Payload bytes are capped at [`FetchSettings::max_bytes`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::blocking::RequestBuilder;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use serde_json::Value;
use tracing::debug;
use url::Url;
use wps_execute_core::FetchError;
use wps_execute_core::FetchedPayload;
use wps_execute_core::HttpMethod;
use wps_execute_core::ReferenceBody;
use wps_execute_core::ReferenceFetcher;
use wps_execute_core::ReferencedComplexInput;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default maximum payload size in bytes.
const DEFAULT_MAX_BYTES: usize = 64 * 1024 * 1024;

// ============================================================================
// SECTION: Settings
// ============================================================================

/// Fetch behavior settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    /// URL schemes that may be contacted.
    pub allowed_schemes: Vec<String>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Maximum payload size in bytes.
    pub max_bytes: usize,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            allowed_schemes: vec!["http".to_string(), "https".to_string()],
            timeout: DEFAULT_TIMEOUT,
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

// ============================================================================
// SECTION: HTTP Fetcher
// ============================================================================

/// HTTP-backed reference fetcher.
#[derive(Debug, Clone)]
pub struct HttpReferenceFetcher {
    /// HTTP client used for fetch requests.
    client: Client,
    /// Fetch settings.
    settings: FetchSettings,
}

impl HttpReferenceFetcher {
    /// Builds a fetcher with a client configured from `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] when the HTTP client cannot be constructed.
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(settings.timeout)
            .build()
            .map_err(|err| FetchError::Http(err.to_string()))?;
        Ok(Self {
            client,
            settings,
        })
    }

    /// Creates a fetcher with a preconfigured client.
    #[must_use]
    pub const fn with_client(client: Client, settings: FetchSettings) -> Self {
        Self {
            client,
            settings,
        }
    }

    /// Returns the fetch settings.
    #[must_use]
    pub const fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    /// Fails when the URL scheme is not allowed.
    fn check_scheme(&self, url: &Url) -> Result<(), FetchError> {
        if self.settings.allowed_schemes.iter().any(|scheme| scheme == url.scheme()) {
            return Ok(());
        }
        Err(FetchError::UnsupportedScheme(url.scheme().to_string()))
    }

    /// Builds the POST body bytes.
    fn body_bytes(&self, body: Option<&ReferenceBody>) -> Result<Vec<u8>, FetchError> {
        match body {
            None => Err(FetchError::Body("POST reference has no body".to_string())),
            Some(ReferenceBody::Inline(Value::String(text))) => Ok(text.clone().into_bytes()),
            Some(ReferenceBody::Inline(value)) => {
                serde_json::to_vec(value).map_err(|err| FetchError::Body(err.to_string()))
            }
            Some(ReferenceBody::Reference(url)) => {
                debug!(url = %url, "fetching POST body reference");
                self.check_scheme(url)?;
                Ok(self.execute(url, self.client.get(url.as_str()))?.bytes)
            }
        }
    }

    /// Sends a prepared request and reads the capped response body.
    fn execute(&self, url: &Url, request: RequestBuilder) -> Result<FetchedPayload, FetchError> {
        let response = request.send().map_err(|err| FetchError::Http(err.to_string()))?;
        if response.url() != url {
            return Err(FetchError::Redirected {
                from: url.to_string(),
                to: response.url().to_string(),
            });
        }
        let status = response.status();
        if status.is_redirection() {
            let to = response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default()
                .to_string();
            return Err(FetchError::Redirected {
                from: url.to_string(),
                to,
            });
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let max_bytes = self.settings.max_bytes;
        let max_bytes_u64 = u64::try_from(max_bytes).unwrap_or(u64::MAX);
        if let Some(length) = response.content_length()
            && length > max_bytes_u64
        {
            return Err(FetchError::TooLarge {
                max_bytes,
                actual_bytes: usize::try_from(length).unwrap_or(usize::MAX),
            });
        }
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let mut limited = response.take(max_bytes_u64.saturating_add(1));
        let mut bytes = Vec::new();
        limited.read_to_end(&mut bytes).map_err(|err| FetchError::Http(err.to_string()))?;
        if bytes.len() > max_bytes {
            return Err(FetchError::TooLarge {
                max_bytes,
                actual_bytes: bytes.len(),
            });
        }
        Ok(FetchedPayload {
            bytes,
            content_type,
        })
    }
}

impl ReferenceFetcher for HttpReferenceFetcher {
    fn fetch(&self, input: &ReferencedComplexInput) -> Result<FetchedPayload, FetchError> {
        let reference = &input.reference;
        let url = &reference.href;
        self.check_scheme(url)?;
        let mut request = match reference.method {
            HttpMethod::Get => self.client.get(url.as_str()),
            HttpMethod::Post => {
                let body = self.body_bytes(reference.body.as_ref())?;
                self.client.post(url.as_str()).body(body)
            }
        };
        for header in &reference.headers {
            request = request.header(header.key.as_str(), header.value.as_str());
        }
        debug!(url = %url, method = %reference.method, "fetching referenced input");
        self.execute(url, request)
    }
}
