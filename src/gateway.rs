use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value as JsonValue;
use tokio::time::sleep;

use crate::{GatewayOptions, IntegrationError, Result};

/// Specification of a single outbound REST call.
///
/// Immutable per call attempt; the gateway reuses the same spec for every
/// retry of one `request` invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestSpec {
    /// Target URL.
    pub url: String,
    /// HTTP verb, one of GET/POST/PUT (case-insensitive).
    ///
    /// Carried as text so that an unsupported verb surfaces as
    /// [`IntegrationError::UnsupportedMethod`] instead of being silently
    /// coerced.
    pub method: String,
    /// Optional JSON payload.
    pub body: Option<JsonValue>,
    /// Custom request headers.
    pub headers: Vec<(String, String)>,
}

impl RequestSpec {
    /// Creates a spec with an explicit verb.
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: method.into(),
            body: None,
            headers: Vec::new(),
        }
    }

    /// Creates a GET spec.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    /// Creates a POST spec with a JSON body.
    pub fn post(url: impl Into<String>, body: JsonValue) -> Self {
        Self::new("POST", url).with_body(body)
    }

    /// Creates a PUT spec with a JSON body.
    pub fn put(url: impl Into<String>, body: JsonValue) -> Self {
        Self::new("PUT", url).with_body(body)
    }

    /// Attaches a JSON body.
    pub fn with_body(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }

    /// Appends a request header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Outbound HTTP gateway with bounded retries and exponential backoff.
///
/// Transient transport failures (timeouts, connection errors) are retried up
/// to the attempt budget; non-2xx responses are definitive and surface
/// immediately. Every call is self-contained, so a single gateway instance
/// can be shared freely across concurrent tasks.
#[derive(Clone, Debug)]
pub struct HttpGateway {
    http: reqwest::Client,
    options: GatewayOptions,
}

impl Default for HttpGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpGateway {
    /// Creates a gateway with default options.
    pub fn new() -> Self {
        Self::with_options(GatewayOptions::default())
    }

    /// Creates a gateway with explicit timeout and retry options.
    pub fn with_options(options: GatewayOptions) -> Self {
        // Connections are scoped per call: an empty idle pool means the
        // connection is released after each attempt instead of being reused.
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .build()
            .expect("HTTP client construction must succeed");
        Self { http, options }
    }

    /// Executes an outbound REST call described by `spec`.
    ///
    /// Returns the parsed JSON body of a 2xx response. Transient transport
    /// errors are retried with `retry_backoff_ms * 2^attempt` delays until
    /// the attempt budget is exhausted; backoff delays are suspension points,
    /// not busy-waits. Non-2xx statuses and unsupported verbs are never
    /// retried.
    pub async fn request(&self, spec: &RequestSpec) -> Result<JsonValue> {
        let method = parse_method(&spec.method)?;
        let headers = build_header_map(&spec.headers)?;

        let mut attempt = 0usize;
        loop {
            let mut builder = self
                .http
                .request(method.clone(), &spec.url)
                .headers(headers.clone())
                .timeout(Duration::from_millis(self.options.timeout_ms));
            if let Some(body) = &spec.body {
                builder = builder.json(body);
            }

            match builder.send().await {
                Ok(response) => {
                    let status = response.status();
                    let body = response.text().await.map_err(IntegrationError::Transport)?;

                    if !status.is_success() {
                        // Status rejections are deterministic; retrying would
                        // hammer a service that keeps refusing the request.
                        return Err(IntegrationError::Http {
                            status: status.as_u16(),
                            body,
                        });
                    }

                    return serde_json::from_str(&body).map_err(|err| {
                        IntegrationError::Decode(format!(
                            "invalid JSON response: {err}; body: {body}"
                        ))
                    });
                }
                Err(err) => {
                    if is_transient(&err) && attempt + 1 < self.options.max_attempts {
                        self.wait_before_retry(attempt).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(IntegrationError::Transport(err));
                }
            }
        }
    }

    /// Waits before the next retry attempt (exponential backoff).
    async fn wait_before_retry(&self, attempt: usize) {
        let exp = attempt.min(16) as u32;
        let multiplier = 1u64 << exp;
        let delay_ms = self.options.retry_backoff_ms.saturating_mul(multiplier);

        tracing::debug!(attempt, delay_ms, "retrying outbound request");

        sleep(Duration::from_millis(delay_ms)).await;
    }
}

fn parse_method(method: &str) -> Result<reqwest::Method> {
    match method.to_ascii_uppercase().as_str() {
        "GET" => Ok(reqwest::Method::GET),
        "POST" => Ok(reqwest::Method::POST),
        "PUT" => Ok(reqwest::Method::PUT),
        _ => Err(IntegrationError::UnsupportedMethod(method.to_owned())),
    }
}

fn build_header_map(headers: &[(String, String)]) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|err| IntegrationError::Decode(format!("invalid header name '{name}': {err}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|err| IntegrationError::Decode(format!("invalid header value for '{name}': {err}")))?;
        map.append(name, value);
    }
    Ok(map)
}

fn is_transient(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request() || err.is_body()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{parse_method, RequestSpec};
    use crate::IntegrationError;

    #[test]
    fn parse_method_accepts_supported_verbs_case_insensitively() {
        assert_eq!(parse_method("get").expect("must parse"), reqwest::Method::GET);
        assert_eq!(parse_method("Post").expect("must parse"), reqwest::Method::POST);
        assert_eq!(parse_method("PUT").expect("must parse"), reqwest::Method::PUT);
    }

    #[test]
    fn parse_method_rejects_unsupported_verb() {
        let err = parse_method("DELETE").expect_err("must fail");
        match err {
            IntegrationError::UnsupportedMethod(verb) => assert_eq!(verb, "DELETE"),
            _ => panic!("expected unsupported method error"),
        }
    }

    #[test]
    fn spec_builders_set_verb_and_body() {
        let get = RequestSpec::get("https://api.example/v1/items");
        assert_eq!(get.method, "GET");
        assert!(get.body.is_none());

        let post = RequestSpec::post("https://api.example/v1/items", json!({"name": "kit"}))
            .with_header("x-api-key", "secret");
        assert_eq!(post.method, "POST");
        assert_eq!(post.body, Some(json!({"name": "kit"})));
        assert_eq!(post.headers.len(), 1);
    }
}
