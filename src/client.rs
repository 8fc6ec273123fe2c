//! Request engine for the Nimbus Cloud API.
//!
//! [`ProviderClient`] owns the HTTP connection pool, the credentials and the
//! retry policies. Every resource call funnels through [`ProviderClient::request`],
//! which handles body encoding, header assembly, authorization injection,
//! 401 reauthentication (single-flight across concurrent callers), 409
//! conflict retries and optional 5xx retries for GET requests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::Method;
use tokio::sync::RwLock;
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::{message_from_body, ApiError, ErrorContext};
use crate::results::ApiResponse;

const DEFAULT_USER_AGENT: &str = concat!("nimbuscli/", env!("CARGO_PKG_VERSION"));

/// Credentials presented on every request. Refresh-token pairs can be
/// replaced through reauthentication; API keys are permanent and never
/// refreshed.
#[derive(Debug, Clone)]
pub enum Credentials {
    Token {
        access_token: String,
        refresh_token: String,
    },
    ApiKey {
        key: String,
    },
}

impl Credentials {
    pub fn authorization(&self) -> String {
        match self {
            Credentials::Token { access_token, .. } => format!("Bearer {}", access_token),
            Credentials::ApiKey { key } => format!("APIKey {}", key),
        }
    }

    pub fn refresh_token(&self) -> Option<&str> {
        match self {
            Credentials::Token { refresh_token, .. } => Some(refresh_token),
            Credentials::ApiKey { .. } => None,
        }
    }
}

/// Handler invoked on a 401 to obtain fresh credentials. The handler must
/// use its own bare HTTP client so that the refresh call can never trigger
/// another reauthentication.
pub type ReauthHandler =
    Arc<dyn Fn(Credentials) -> BoxFuture<'static, Result<Credentials, ApiError>> + Send + Sync>;

type SharedReauth = Shared<BoxFuture<'static, Result<(), String>>>;

/// Single-flight gate. The first 401 installs a shared future in the slot;
/// concurrent 401s clone it and await the same outcome. The epoch counter
/// advances on every successful refresh so that a caller whose 401 raced a
/// refresh can detect it already happened and skip straight to the retry.
struct ReauthGate {
    epoch: AtomicU64,
    in_flight: StdMutex<Option<SharedReauth>>,
}

impl ReauthGate {
    fn new() -> Self {
        ReauthGate {
            epoch: AtomicU64::new(0),
            in_flight: StdMutex::new(None),
        }
    }
}

/// Retry policy for GET requests answered with a 5xx status.
#[derive(Debug, Clone, Copy)]
struct GetRetryPolicy {
    attempts: u32,
    base_interval: u64,
}

/// Per-call request options. `Default` gives a bare call: no body, default
/// success codes for the verb, no extra headers and no conflict retries.
#[derive(Debug, Clone, Default)]
pub struct RequestOpts {
    /// JSON body, serialized and sent with `Content-Type: application/json`.
    pub json_body: Option<serde_json::Value>,
    /// Raw body bytes, passed through untouched. Mutually exclusive with
    /// `json_body`.
    pub raw_body: Option<Vec<u8>>,
    /// Success codes for this call. `None` selects the verb defaults.
    pub ok_codes: Option<Vec<u16>>,
    /// Extra headers applied after the defaults. An empty value deletes the
    /// header instead of setting it.
    pub more_headers: Vec<(String, String)>,
    /// Number of retries performed on a 409 response.
    pub conflict_retry_amount: u32,
    /// Seconds slept between 409 retries.
    pub conflict_retry_interval: u64,
    /// Per-status error message overrides.
    pub error_context: Option<ErrorContext>,
}

impl RequestOpts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json<B: serde::Serialize>(mut self, body: &B) -> Result<Self, ApiError> {
        self.json_body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn with_ok_codes(mut self, codes: &[u16]) -> Self {
        self.ok_codes = Some(codes.to_vec());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.more_headers.push((name.into(), value.into()));
        self
    }

    pub fn with_conflict_retries(mut self, amount: u32, interval_secs: u64) -> Self {
        self.conflict_retry_amount = amount;
        self.conflict_retry_interval = interval_secs;
        self
    }

    pub fn with_error_context(mut self, context: ErrorContext) -> Self {
        self.error_context = Some(context);
        self
    }
}

/// Success codes assumed for a verb when the caller sets none.
fn default_ok_codes(method: &Method) -> Vec<u16> {
    match *method {
        Method::GET => vec![200],
        Method::POST => vec![200, 201, 202],
        Method::PUT => vec![201, 202],
        Method::PATCH => vec![200, 202, 204],
        Method::DELETE => vec![200, 202, 204],
        _ => vec![200],
    }
}

/// Exponential backoff with jitter for GET 5xx retries. `attempt` is
/// zero-based; the interval is uniform in
/// `[base * 2^attempt * 0.5, base * 2^attempt]` seconds.
fn backoff_interval(base_interval: u64, attempt: u32) -> Duration {
    let factor = 0.5 + rand::random::<f64>() / 2.0;
    Duration::from_secs_f64(base_interval as f64 * f64::from(2u32.pow(attempt)) * factor)
}

#[derive(Clone)]
pub struct ProviderClient {
    http: reqwest::Client,
    endpoint: Url,
    user_agent: String,
    project_id: u64,
    region_id: u64,
    credentials: Arc<RwLock<Credentials>>,
    reauth: Option<ReauthHandler>,
    gate: Arc<ReauthGate>,
    get_retry: Option<GetRetryPolicy>,
    debug: bool,
}

impl std::fmt::Debug for ProviderClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("project_id", &self.project_id)
            .field("region_id", &self.region_id)
            .field("reauth", &self.reauth.is_some())
            .finish()
    }
}

impl ProviderClient {
    pub fn builder() -> ProviderClientBuilder {
        ProviderClientBuilder::default()
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn project_id(&self) -> u64 {
        self.project_id
    }

    pub fn region_id(&self) -> u64 {
        self.region_id
    }

    /// Snapshot of the current credentials, e.g. for persisting refreshed
    /// tokens back to the configuration file.
    pub async fn credentials(&self) -> Credentials {
        self.credentials.read().await.clone()
    }

    /// Enable retries with exponential backoff and jitter for GET requests
    /// answered with a 5xx status.
    pub fn enable_get_retries_on_5xx(&mut self, attempts: u32, base_interval_secs: u64) {
        self.get_retry = Some(GetRetryPolicy {
            attempts,
            base_interval: base_interval_secs,
        });
    }

    /// Resolve a path relative to the API endpoint.
    pub fn resource_url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.endpoint.join(path)?)
    }

    pub async fn get(&self, url: Url, opts: RequestOpts) -> Result<ApiResponse, ApiError> {
        self.request(Method::GET, url, opts).await
    }

    pub async fn post(&self, url: Url, opts: RequestOpts) -> Result<ApiResponse, ApiError> {
        self.request(Method::POST, url, opts).await
    }

    pub async fn put(&self, url: Url, opts: RequestOpts) -> Result<ApiResponse, ApiError> {
        self.request(Method::PUT, url, opts).await
    }

    pub async fn patch(&self, url: Url, opts: RequestOpts) -> Result<ApiResponse, ApiError> {
        self.request(Method::PATCH, url, opts).await
    }

    pub async fn delete(&self, url: Url, opts: RequestOpts) -> Result<ApiResponse, ApiError> {
        self.request(Method::DELETE, url, opts).await
    }

    /// Issue a request and apply the engine policies.
    ///
    /// A 401 triggers at most one reauthentication per top-level call; a
    /// second 401 after the refreshed retry is surfaced as
    /// [`ApiError::AfterReauth`] rather than refreshing again. A 409 is
    /// retried `conflict_retry_amount` times with a fixed sleep. A 5xx on
    /// GET is retried with exponential backoff when the policy is enabled.
    pub async fn request(
        &self,
        method: Method,
        url: Url,
        opts: RequestOpts,
    ) -> Result<ApiResponse, ApiError> {
        if opts.json_body.is_some() && opts.raw_body.is_some() {
            return Err(ApiError::AmbiguousBody);
        }
        let ok_codes = opts
            .ok_codes
            .clone()
            .unwrap_or_else(|| default_ok_codes(&method));

        let mut has_reauthenticated = false;
        let mut conflict_retries: u32 = 0;
        let mut get_attempt: u32 = 0;

        loop {
            let observed_epoch = self.gate.epoch.load(Ordering::SeqCst);
            let response = self.send_once(&method, &url, &opts).await;
            let response = match response {
                Ok(response) => response,
                Err(err) if has_reauthenticated => {
                    return Err(ApiError::AfterReauth {
                        source: Box::new(err),
                    })
                }
                Err(err) => return Err(err),
            };
            let status = response.status().as_u16();

            if ok_codes.contains(&status) {
                trace!("{} {} -> {}", method, url, status);
                return ApiResponse::capture(response).await;
            }

            if status == 401 && self.reauth.is_some() && !has_reauthenticated {
                debug!("401 from {} {}, reauthenticating", method, url);
                self.ensure_reauthenticated(observed_epoch).await?;
                has_reauthenticated = true;
                continue;
            }

            if status == 409 && conflict_retries < opts.conflict_retry_amount {
                conflict_retries += 1;
                debug!(
                    "409 from {} {}, conflict retry {}/{} in {}s",
                    method, url, conflict_retries, opts.conflict_retry_amount,
                    opts.conflict_retry_interval
                );
                tokio::time::sleep(Duration::from_secs(opts.conflict_retry_interval)).await;
                continue;
            }

            if method == Method::GET && (500..=599).contains(&status) {
                if let Some(policy) = self.get_retry {
                    if get_attempt < policy.attempts {
                        let interval = backoff_interval(policy.base_interval, get_attempt);
                        get_attempt += 1;
                        warn!(
                            "{} from GET {}, retry {}/{} in {:.1}s",
                            status,
                            url,
                            get_attempt,
                            policy.attempts,
                            interval.as_secs_f64()
                        );
                        tokio::time::sleep(interval).await;
                        continue;
                    }
                }
            }

            let body = response.text().await?;
            if self.debug {
                debug!("{} {} -> {}: {}", method, url, status, body);
            }
            let err = ApiError::from_status(status, message_from_body(&body), opts.error_context.as_ref());
            return Err(if has_reauthenticated {
                ApiError::AfterReauth {
                    source: Box::new(err),
                }
            } else {
                err
            });
        }
    }

    async fn send_once(
        &self,
        method: &Method,
        url: &Url,
        opts: &RequestOpts,
    ) -> Result<reqwest::Response, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, parse_header_value("User-Agent", &self.user_agent)?);
        if opts.json_body.is_some() || opts.raw_body.is_some() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        {
            // Token reads block while a reauthentication holds the write lock.
            let credentials = self.credentials.read().await;
            headers.insert(
                AUTHORIZATION,
                parse_header_value("Authorization", &credentials.authorization())?,
            );
        }
        for (name, value) in &opts.more_headers {
            let header_name = parse_header_name(name)?;
            if value.is_empty() {
                headers.remove(&header_name);
            } else {
                headers.insert(header_name, parse_header_value(name, value)?);
            }
        }

        let mut builder = self.http.request(method.clone(), url.clone()).headers(headers);
        if let Some(json) = &opts.json_body {
            if self.debug {
                debug!("{} {} body: {}", method, url, json);
            }
            builder = builder.body(serde_json::to_vec(json)?);
        } else if let Some(raw) = &opts.raw_body {
            builder = builder.body(raw.clone());
        }

        Ok(builder.send().await?)
    }

    /// Refresh the credentials at most once across concurrent callers.
    ///
    /// The first caller installs a shared refresh future in the gate slot;
    /// everyone else observing the same credential epoch awaits the same
    /// future and receives the same outcome. A caller whose observed epoch
    /// is already stale skips the refresh: the token it was rejected with
    /// has been replaced since.
    async fn ensure_reauthenticated(&self, observed_epoch: u64) -> Result<(), ApiError> {
        let handler = match &self.reauth {
            Some(handler) => Arc::clone(handler),
            None => {
                return Err(ApiError::ReauthFailed {
                    message: "no reauthentication handler configured".to_string(),
                })
            }
        };

        let shared = {
            let mut slot = self
                .gate
                .in_flight
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if self.gate.epoch.load(Ordering::SeqCst) != observed_epoch {
                trace!("credentials already refreshed by a concurrent caller");
                return Ok(());
            }
            match slot.as_ref() {
                Some(shared) => shared.clone(),
                None => {
                    let credentials = Arc::clone(&self.credentials);
                    let gate = Arc::clone(&self.gate);
                    let refresh: BoxFuture<'static, Result<(), String>> = async move {
                        let current = credentials.read().await.clone();
                        let outcome = match handler(current).await {
                            Ok(fresh) => {
                                *credentials.write().await = fresh;
                                gate.epoch.fetch_add(1, Ordering::SeqCst);
                                debug!("reauthentication succeeded");
                                Ok(())
                            }
                            Err(err) => {
                                warn!("reauthentication failed: {}", err);
                                // Strip a pre-wrapped variant so the final
                                // error is not wrapped twice.
                                Err(match err {
                                    ApiError::ReauthFailed { message } => message,
                                    other => other.to_string(),
                                })
                            }
                        };
                        // Clear the slot so the next 401 starts a fresh refresh.
                        *gate
                            .in_flight
                            .lock()
                            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
                        outcome
                    }
                    .boxed();
                    let shared = refresh.shared();
                    *slot = Some(shared.clone());
                    shared
                }
            }
        };

        shared
            .await
            .map_err(|message| ApiError::ReauthFailed { message })
    }
}

#[derive(Default)]
pub struct ProviderClientBuilder {
    endpoint: Option<String>,
    user_agent: Option<String>,
    project_id: Option<u64>,
    region_id: Option<u64>,
    credentials: Option<Credentials>,
    reauth: Option<ReauthHandler>,
    debug: bool,
}

impl ProviderClientBuilder {
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn project(mut self, project_id: u64) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn region(mut self, region_id: u64) -> Self {
        self.region_id = Some(region_id);
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn reauth_handler(mut self, handler: ReauthHandler) -> Self {
        self.reauth = Some(handler);
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn build(self) -> Result<ProviderClient, ApiError> {
        let endpoint = Url::parse(
            self.endpoint
                .as_deref()
                .unwrap_or("https://api.nimbuscloud.io/"),
        )?;
        let credentials = self.credentials.ok_or_else(|| ApiError::ReauthFailed {
            message: "no credentials configured".to_string(),
        })?;
        Ok(ProviderClient {
            http: reqwest::Client::new(),
            endpoint,
            user_agent: self.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            project_id: self.project_id.unwrap_or(0),
            region_id: self.region_id.unwrap_or(0),
            credentials: Arc::new(RwLock::new(credentials)),
            reauth: self.reauth,
            gate: Arc::new(ReauthGate::new()),
            get_retry: None,
            debug: self.debug,
        })
    }
}

fn parse_header_name(name: &str) -> Result<HeaderName, ApiError> {
    HeaderName::try_from(name).map_err(|_| ApiError::InvalidHeader {
        name: name.to_string(),
    })
}

fn parse_header_value(name: &str, value: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(value).map_err(|_| ApiError::InvalidHeader {
        name: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ok_codes_per_verb() {
        assert_eq!(default_ok_codes(&Method::GET), vec![200]);
        assert_eq!(default_ok_codes(&Method::POST), vec![200, 201, 202]);
        assert_eq!(default_ok_codes(&Method::PUT), vec![201, 202]);
        assert_eq!(default_ok_codes(&Method::PATCH), vec![200, 202, 204]);
        assert_eq!(default_ok_codes(&Method::DELETE), vec![200, 202, 204]);
        assert_eq!(default_ok_codes(&Method::HEAD), vec![200]);
    }

    #[test]
    fn test_backoff_interval_is_bounded() {
        for attempt in 0..4 {
            let upper = 2.0_f64 * f64::from(2u32.pow(attempt));
            for _ in 0..50 {
                let interval = backoff_interval(2, attempt).as_secs_f64();
                assert!(interval >= upper / 2.0, "interval {} below bound", interval);
                assert!(interval <= upper, "interval {} above bound", interval);
            }
        }
    }

    #[test]
    fn test_credentials_authorization_header() {
        let token = Credentials::Token {
            access_token: "abc".to_string(),
            refresh_token: "def".to_string(),
        };
        assert_eq!(token.authorization(), "Bearer abc");
        assert_eq!(token.refresh_token(), Some("def"));

        let key = Credentials::ApiKey {
            key: "k-123".to_string(),
        };
        assert_eq!(key.authorization(), "APIKey k-123");
        assert_eq!(key.refresh_token(), None);
    }

    #[tokio::test]
    async fn test_ambiguous_body_rejected_before_network() {
        let client = ProviderClient::builder()
            .endpoint("http://localhost:1/")
            .credentials(Credentials::ApiKey {
                key: "k".to_string(),
            })
            .build()
            .unwrap();
        let opts = RequestOpts {
            json_body: Some(serde_json::json!({"a": 1})),
            raw_body: Some(b"raw".to_vec()),
            ..RequestOpts::default()
        };
        // The endpoint is unreachable; an error other than AmbiguousBody
        // would mean a network call was attempted.
        let url = client.resource_url("v1/things").unwrap();
        let err = client.post(url, opts).await.unwrap_err();
        assert!(matches!(err, ApiError::AmbiguousBody));
    }

    #[test]
    fn test_request_opts_builders() {
        let opts = RequestOpts::new()
            .with_ok_codes(&[204])
            .with_header("X-Request-Id", "42")
            .with_header("Accept", "")
            .with_conflict_retries(3, 5);
        assert_eq!(opts.ok_codes, Some(vec![204]));
        assert_eq!(opts.more_headers.len(), 2);
        assert_eq!(opts.conflict_retry_amount, 3);
        assert_eq!(opts.conflict_retry_interval, 5);
    }
}
