//! Purpose: Provide the blocking HTTP client for the Increase REST API.
//! Exports: `Client`, `Environment`.
//! Role: Builds authenticated requests, retries transient failures, decodes responses.
//! Invariants: Every successful body goes through the tolerant decoder (`core::decode`).
//! Invariants: Error bodies map to stable `ErrorKind`s; unknown error types fall back to status.
//! Invariants: Cloning a client is cheap and shares config and transport.
#![allow(clippy::result_large_err)]

use super::page::{AutoPager, ListRequest, Page};
use super::transport::{Method, Request, Response, Transport, UreqTransport};
use crate::core::decode::{self, Decode};
use crate::core::error::{Error, ErrorKind};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

pub type ApiResult<T> = Result<T, Error>;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_MAX_RETRIES: u32 = 2;

const INITIAL_RETRY_DELAY: Duration = Duration::from_millis(500);
const MAX_RETRY_DELAY: Duration = Duration::from_secs(8);
const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Environment {
    Production,
    Sandbox,
}

impl Environment {
    pub fn base_url(self) -> &'static str {
        match self {
            Environment::Production => "https://api.increase.com",
            Environment::Sandbox => "https://sandbox.increase.com",
        }
    }

    pub fn parse(value: &str) -> ApiResult<Self> {
        match value {
            "production" => Ok(Environment::Production),
            "sandbox" => Ok(Environment::Sandbox),
            other => Err(Error::new(ErrorKind::Usage)
                .with_message(format!("unknown environment `{other}`"))
                .with_hint("Use `production` or `sandbox`.")),
        }
    }
}

#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

#[derive(Clone)]
struct ClientInner {
    base_url: Url,
    api_key: String,
    max_retries: u32,
    transport: Arc<dyn Transport>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    #[serde(rename = "type")]
    kind: Option<String>,
    title: Option<String>,
    detail: Option<String>,
}

impl Client {
    /// Client for the production environment.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                base_url: Url::parse(Environment::Production.base_url()).expect("static base url"),
                api_key: api_key.into(),
                max_retries: DEFAULT_MAX_RETRIES,
                transport: Arc::new(UreqTransport::new(DEFAULT_TIMEOUT)),
            }),
        }
    }

    /// Reads `INCREASE_API_KEY`, `INCREASE_ENVIRONMENT` and `INCREASE_BASE_URL`.
    pub fn from_env() -> ApiResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like `from_env`, but reads the same variable names through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ApiResult<Self> {
        let api_key = lookup("INCREASE_API_KEY")
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                Error::new(ErrorKind::Usage)
                    .with_message("missing API key")
                    .with_hint("Set INCREASE_API_KEY or pass --api-key.")
            })?;
        let mut client = Self::new(api_key);
        if let Some(environment) = lookup("INCREASE_ENVIRONMENT") {
            client = client.with_environment(Environment::parse(&environment)?);
        }
        if let Some(base_url) = lookup("INCREASE_BASE_URL") {
            client = client.with_base_url(base_url)?;
        }
        Ok(client)
    }

    pub fn with_environment(self, environment: Environment) -> Self {
        let base_url = Url::parse(environment.base_url()).expect("static base url");
        self.update(|inner| inner.base_url = base_url)
    }

    pub fn with_base_url(self, base_url: impl Into<String>) -> ApiResult<Self> {
        let base_url = normalize_base_url(base_url.into())?;
        Ok(self.update(|inner| inner.base_url = base_url))
    }

    /// Replaces the transport with a default one using `timeout`.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.update(|inner| inner.transport = Arc::new(UreqTransport::new(timeout)))
    }

    pub fn with_max_retries(self, max_retries: u32) -> Self {
        self.update(|inner| inner.max_retries = max_retries)
    }

    pub fn with_transport(self, transport: Arc<dyn Transport>) -> Self {
        self.update(|inner| inner.transport = transport)
    }

    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    pub fn max_retries(&self) -> u32 {
        self.inner.max_retries
    }

    fn update(mut self, apply: impl FnOnce(&mut ClientInner)) -> Self {
        apply(Arc::make_mut(&mut self.inner));
        self
    }

    pub(crate) fn get<R: Decode>(&self, segments: &[&str]) -> ApiResult<R> {
        let url = build_url(&self.inner.base_url, segments, &[])?;
        self.request_json::<(), R>(Method::Get, url, None)
    }

    pub(crate) fn post<B, R>(&self, segments: &[&str], body: &B) -> ApiResult<R>
    where
        B: Serialize,
        R: Decode,
    {
        let url = build_url(&self.inner.base_url, segments, &[])?;
        self.request_json(Method::Post, url, Some(body))
    }

    pub(crate) fn post_empty<R: Decode>(&self, segments: &[&str]) -> ApiResult<R> {
        let url = build_url(&self.inner.base_url, segments, &[])?;
        self.request_json::<(), R>(Method::Post, url, None)
    }

    pub(crate) fn patch<B, R>(&self, segments: &[&str], body: &B) -> ApiResult<R>
    where
        B: Serialize,
        R: Decode,
    {
        let url = build_url(&self.inner.base_url, segments, &[])?;
        self.request_json(Method::Patch, url, Some(body))
    }

    pub(crate) fn list<T: Decode>(&self, request: ListRequest) -> ApiResult<Page<T>> {
        Page::fetch(self.clone(), request)
    }

    pub(crate) fn list_auto_paging<T: Decode>(&self, request: ListRequest) -> AutoPager<T> {
        AutoPager::new(self.clone(), request)
    }

    /// Status and body of one list call; decoding is left to `Page`.
    pub(crate) fn fetch_list_body(&self, request: &ListRequest) -> ApiResult<(u16, String)> {
        let url = build_url(&self.inner.base_url, &request.segments(), request.query())?;
        let response = self.send(&self.build_request(Method::Get, url, None))?;
        let status = response.status;
        Ok((status, success_body(response)?))
    }

    fn request_json<B, R>(&self, method: Method, url: Url, body: Option<&B>) -> ApiResult<R>
    where
        B: Serialize,
        R: Decode,
    {
        let payload = match body {
            Some(body) => Some(serde_json::to_string(body).map_err(|err| {
                Error::new(ErrorKind::Internal)
                    .with_message("failed to encode request json")
                    .with_source(err)
            })?),
            None => None,
        };
        let response = self.send(&self.build_request(method, url, payload))?;
        let status = response.status;
        let body = success_body(response)?;
        decode::from_str(&body).map_err(|err| err.with_status(status))
    }

    fn build_request(&self, method: Method, url: Url, body: Option<String>) -> Request {
        let mut headers = vec![
            (
                "Authorization".to_string(),
                format!("Bearer {}", self.inner.api_key),
            ),
            ("Accept".to_string(), "application/json".to_string()),
        ];
        if body.is_some() {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }
        Request {
            method,
            url,
            headers,
            body,
        }
    }

    fn send(&self, request: &Request) -> ApiResult<Response> {
        let mut attempt = 0;
        loop {
            tracing::debug!(
                method = request.method.as_str(),
                path = request.url.path(),
                attempt,
                "sending request"
            );
            let outcome = self.inner.transport.execute(request);
            let delay = match &outcome {
                Ok(response) if response.is_success() => None,
                Ok(response) => retry_delay_for_response(response, attempt),
                Err(err) if err.kind() == ErrorKind::Io => Some(backoff(attempt)),
                Err(_) => None,
            };
            match delay {
                Some(delay) if attempt < self.inner.max_retries => {
                    tracing::warn!(
                        method = request.method.as_str(),
                        path = request.url.path(),
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        status = outcome.as_ref().ok().map(|response| response.status),
                        "retrying request"
                    );
                    std::thread::sleep(delay);
                    attempt += 1;
                }
                _ => return outcome,
            }
        }
    }
}

fn success_body(response: Response) -> ApiResult<String> {
    if response.is_success() {
        Ok(response.body)
    } else {
        Err(parse_error_response(&response))
    }
}

fn retry_delay_for_response(response: &Response, attempt: u32) -> Option<Duration> {
    let should_retry = match response.header("x-should-retry") {
        Some("true") => true,
        Some("false") => false,
        _ => matches!(response.status, 408 | 409 | 429 | 500..=599),
    };
    if !should_retry {
        return None;
    }
    let retry_after = response
        .header("retry-after")
        .and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|seconds| (0.0..=MAX_RETRY_AFTER.as_secs_f64()).contains(seconds))
        .map(Duration::from_secs_f64);
    Some(retry_after.unwrap_or_else(|| backoff(attempt)))
}

fn backoff(attempt: u32) -> Duration {
    INITIAL_RETRY_DELAY
        .saturating_mul(2u32.saturating_pow(attempt))
        .min(MAX_RETRY_DELAY)
}

fn normalize_base_url(raw: String) -> ApiResult<Url> {
    let mut url = Url::parse(&raw).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("invalid base url")
            .with_source(err)
    })?;
    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(
            Error::new(ErrorKind::Usage).with_message("base url must use http or https scheme")
        );
    }
    if url.cannot_be_a_base() {
        return Err(Error::new(ErrorKind::Usage).with_message("base url cannot be a base"));
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

fn build_url(base_url: &Url, segments: &[&str], query: &[(String, String)]) -> ApiResult<Url> {
    let mut url = base_url.clone();
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| Error::new(ErrorKind::Usage).with_message("base url cannot be a base"))?;
        path.pop_if_empty();
        for segment in segments {
            path.push(segment);
        }
    }
    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in query {
            pairs.append_pair(key, value);
        }
    }
    Ok(url)
}

fn parse_error_response(response: &Response) -> Error {
    let status = response.status;
    let body: Option<ApiErrorBody> = serde_json::from_str(&response.body).ok();
    let kind = body
        .as_ref()
        .and_then(|body| body.kind.as_deref())
        .and_then(error_kind_from_type)
        .unwrap_or_else(|| error_kind_from_status(status));
    let message = body
        .as_ref()
        .and_then(|body| body.title.clone())
        .unwrap_or_else(|| format!("remote error status {status}"));
    let mut err = Error::new(kind).with_message(message).with_status(status);
    if let Some(detail) = body.and_then(|body| body.detail) {
        err = err.with_hint(detail);
    }
    err
}

fn error_kind_from_type(kind: &str) -> Option<ErrorKind> {
    let mapped = match kind {
        "invalid_parameters_error" | "malformed_request_error" => ErrorKind::InvalidRequest,
        "invalid_api_key_error" => ErrorKind::Authentication,
        "environment_mismatch_error"
        | "insufficient_permissions_error"
        | "private_feature_error" => ErrorKind::Permission,
        "api_method_not_found_error" | "object_not_found_error" => ErrorKind::NotFound,
        "idempotency_key_already_used_error" | "invalid_operation_error" => ErrorKind::Conflict,
        "rate_limited_error" => ErrorKind::RateLimited,
        "internal_server_error" => ErrorKind::Server,
        _ => return None,
    };
    Some(mapped)
}

fn error_kind_from_status(status: u16) -> ErrorKind {
    match status {
        400 | 422 => ErrorKind::InvalidRequest,
        401 => ErrorKind::Authentication,
        403 => ErrorKind::Permission,
        404 => ErrorKind::NotFound,
        409 => ErrorKind::Conflict,
        429 => ErrorKind::RateLimited,
        500..=599 => ErrorKind::Server,
        _ => ErrorKind::Io,
    }
}
