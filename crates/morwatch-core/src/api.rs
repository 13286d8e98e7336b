//! Typed client for the proxy-router HTTP API.
//!
//! Every call resolves to an [`ApiResult`] and never panics: configuration
//! problems, network failures, non-2xx statuses, and timeouts all travel as
//! [`ApiError`](crate::ApiError) values. JSON decode failures on a 2xx
//! response degrade to absent data instead of failing the call.
//!
//! # Endpoints
//!
//! | Method | Path | Normalized into |
//! |--------|------|-----------------|
//! | [`get_health`](ApiClient::get_health) | `GET /healthcheck` | [`RouterHealth`] |
//! | [`get_balance`](ApiClient::get_balance) | `GET /blockchain/balance` | [`BlockchainBalance`] |
//! | [`get_providers`](ApiClient::get_providers) | `GET /blockchain/providers` | `Vec<Provider>` |
//! | [`get_models`](ApiClient::get_models) | `GET /blockchain/models` | `Vec<Model>` |
//! | [`get_provider_bids`](ApiClient::get_provider_bids) | `GET /blockchain/providers/{id}/bids` | `Vec<Bid>` |
//! | [`get_config`](ApiClient::get_config) | configurable `/config` | [`RouterConfig`] |
//! | [`get_underlying_config`](ApiClient::get_underlying_config) | underlying router `/config` | raw JSON |

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::cache::ResponseCache;
use crate::domain::{Bid, BlockchainBalance, Model, Provider, RouterConfig, RouterHealth};
use crate::error::{ApiError, ApiResult};
use crate::http_client::{
    HttpAuth, HttpClient, HttpMethod, HttpRequest, ReqwestHttpClient, DEFAULT_TIMEOUT_MS,
};
use crate::normalize::{
    normalize_balance, normalize_bids, normalize_health, normalize_models, normalize_providers,
};
use crate::settings::Settings;

/// Port the underlying router's config endpoint listens on when no explicit
/// URL is configured.
const UNDERLYING_CONFIG_PORT: &str = "8080";

/// Per-call request options. The defaults describe a plain GET.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Option<HttpMethod>,
    pub body: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub timeout_ms: Option<u64>,
}

/// Client bound to one settings snapshot.
///
/// Cheap to clone; rebuild it when settings change.
#[derive(Clone)]
pub struct ApiClient {
    http: Arc<dyn HttpClient>,
    base_url: String,
    auth: HttpAuth,
    timeout_ms: u64,
    config_url: Option<String>,
    underlying_config_url: Option<String>,
    config_cache: ResponseCache,
}

impl ApiClient {
    /// Client over the production reqwest transport.
    pub fn new(settings: &Settings) -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()), settings)
    }

    /// Client over an injected transport (used by tests and tooling).
    pub fn with_http_client(http: Arc<dyn HttpClient>, settings: &Settings) -> Self {
        Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_owned(),
            auth: HttpAuth::from_credentials(settings.credentials()),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            config_url: settings.config_url.clone().filter(|url| !url.trim().is_empty()),
            underlying_config_url: settings
                .underlying_config_url
                .clone()
                .filter(|url| !url.trim().is_empty()),
            config_cache: ResponseCache::with_default_ttl(),
        }
    }

    /// Replace the per-call timeout budget used for every request.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Disable caching of config lookups.
    pub fn without_config_cache(mut self) -> Self {
        self.config_cache = ResponseCache::disabled();
        self
    }

    /// Perform one request and decode the body leniently.
    ///
    /// `path_or_url` is joined to the configured base URL unless it is
    /// already absolute. Returns `Ok(None)` when the response was a 2xx but
    /// not valid JSON.
    pub async fn request_json(
        &self,
        path_or_url: &str,
        options: RequestOptions,
    ) -> ApiResult<Option<Value>> {
        let target = if path_or_url.starts_with("http://") || path_or_url.starts_with("https://") {
            path_or_url.to_owned()
        } else {
            format!("{}{}", self.base_url, path_or_url)
        };

        // An empty or relative target means the base URL was never set.
        if !target.starts_with("http") {
            return Err(ApiError::NotConfigured);
        }

        tracing::debug!(url = %target, "router api request");

        let mut request = HttpRequest::new(options.method.unwrap_or(HttpMethod::Get), target)
            .with_timeout_ms(options.timeout_ms.unwrap_or(self.timeout_ms))
            .with_header("Content-Type", "application/json")
            .with_auth(&self.auth);
        for (name, value) in options.headers {
            // Caller-supplied headers win on conflict.
            request = request.with_header(name, value);
        }
        if let Some(body) = options.body {
            request = request.with_body(body);
        }

        match self.http.execute(request).await {
            Err(error) if error.timed_out() => Err(ApiError::Timeout),
            Err(error) => Err(ApiError::Network(error.message().to_owned())),
            Ok(response) if !response.is_success() => {
                let body = response.body.trim();
                let message = if body.is_empty() {
                    format!("Request failed ({})", response.status)
                } else {
                    body.to_owned()
                };
                Err(ApiError::Status {
                    status: response.status,
                    message,
                })
            }
            Ok(response) => Ok(serde_json::from_str(&response.body).ok()),
        }
    }

    async fn get_json(&self, path: &str) -> ApiResult<Option<Value>> {
        self.request_json(path, RequestOptions::default()).await
    }

    /// `GET /healthcheck`; absent when the body did not decode.
    pub async fn get_health(&self) -> ApiResult<Option<RouterHealth>> {
        let data = self.get_json("/healthcheck").await?;
        Ok(normalize_health(data.as_ref()))
    }

    /// `GET /blockchain/balance`, normalized to whole units.
    pub async fn get_balance(&self) -> ApiResult<BlockchainBalance> {
        let data = self.get_json("/blockchain/balance").await?;
        Ok(normalize_balance(data.as_ref()))
    }

    /// `GET /blockchain/providers`, bare or keyed list accepted.
    pub async fn get_providers(&self) -> ApiResult<Vec<Provider>> {
        let data = self.get_json("/blockchain/providers").await?;
        Ok(normalize_providers(data.as_ref()))
    }

    /// `GET /blockchain/models`, bare or keyed list accepted.
    pub async fn get_models(&self) -> ApiResult<Vec<Model>> {
        let data = self.get_json("/blockchain/models").await?;
        Ok(normalize_models(data.as_ref()))
    }

    /// `GET /blockchain/providers/{id}/bids` for one provider.
    pub async fn get_provider_bids(&self, provider_id: &str) -> ApiResult<Vec<Bid>> {
        let path = format!(
            "/blockchain/providers/{}/bids",
            urlencoding::encode(provider_id)
        );
        let data = self.get_json(&path).await?;
        Ok(normalize_bids(data.as_ref()))
    }

    /// Router `/config`, honoring the explicit override URL. Config rarely
    /// changes while the dashboard runs, so responses are served from a
    /// short-lived cache.
    pub async fn get_config(&self) -> ApiResult<Option<RouterConfig>> {
        let url = self
            .config_url
            .clone()
            .unwrap_or_else(|| format!("{}/config", self.base_url));
        let data = self.cached_json(&url).await?;
        Ok(data.and_then(|value| serde_json::from_value(value).ok()))
    }

    /// Config of the underlying router, defaulting to the same host on
    /// port 8080. Returned raw: its schema is not ours to model.
    pub async fn get_underlying_config(&self) -> ApiResult<Option<Value>> {
        let url = self.underlying_config_url.clone().unwrap_or_else(|| {
            if self.base_url.is_empty() {
                String::new()
            } else {
                format!(
                    "{}/config",
                    swap_port(&self.base_url, UNDERLYING_CONFIG_PORT)
                )
            }
        });
        self.cached_json(&url).await
    }

    async fn cached_json(&self, url: &str) -> ApiResult<Option<Value>> {
        if let Some(hit) = self.config_cache.get(url).await {
            return Ok(hit);
        }
        let data = self.request_json(url, RequestOptions::default()).await?;
        self.config_cache.put(url, data.clone()).await;
        Ok(data)
    }
}

/// Replace a trailing `:port` on a URL with another port, appending the
/// port when none is present.
fn swap_port(url: &str, port: &str) -> String {
    let scheme_end = url.find("://").map(|at| at + 3).unwrap_or(0);
    let authority = &url[scheme_end..];
    match authority.rfind(':') {
        Some(colon) if authority[colon + 1..].bytes().all(|b| b.is_ascii_digit()) => {
            format!("{}{}:{}", &url[..scheme_end], &authority[..colon], port)
        }
        _ => format!("{url}:{port}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::{HttpError, HttpResponse};
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    /// Records every request and replays a scripted response.
    struct ScriptedHttpClient {
        response: Result<HttpResponse, HttpError>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedHttpClient {
        fn respond(response: Result<HttpResponse, HttpError>) -> Arc<Self> {
            Arc::new(Self {
                response,
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<HttpRequest> {
            self.requests
                .lock()
                .expect("request store is not poisoned")
                .clone()
        }
    }

    impl HttpClient for ScriptedHttpClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            self.requests
                .lock()
                .expect("request store is not poisoned")
                .push(request);
            let response = self.response.clone();
            Box::pin(async move { response })
        }
    }

    fn settings_with_base(base: &str) -> Settings {
        Settings {
            base_url: base.to_owned(),
            ..Settings::default()
        }
    }

    #[tokio::test]
    async fn joins_paths_to_the_base_url() {
        let http = ScriptedHttpClient::respond(Ok(HttpResponse::ok_json("{}")));
        let client =
            ApiClient::with_http_client(http.clone(), &settings_with_base("http://router:8082/"));

        client.get_health().await.expect("call succeeds");

        let sent = http.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].url, "http://router:8082/healthcheck");
    }

    #[tokio::test]
    async fn unconfigured_base_url_short_circuits() {
        let http = ScriptedHttpClient::respond(Ok(HttpResponse::ok_json("{}")));
        let client = ApiClient::with_http_client(http.clone(), &settings_with_base(""));

        let err = client.get_health().await.expect_err("must fail");
        assert_eq!(err, ApiError::NotConfigured);
        // No network attempt was made.
        assert!(http.requests().is_empty());
    }

    #[tokio::test]
    async fn default_headers_yield_to_caller_headers() {
        let http = ScriptedHttpClient::respond(Ok(HttpResponse::ok_json("{}")));
        let mut settings = settings_with_base("http://router:8082");
        settings.username = Some("admin".into());
        settings.password = Some("pw".into());
        let client = ApiClient::with_http_client(http.clone(), &settings);

        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_owned(), "text/plain".to_owned());
        client
            .request_json(
                "/healthcheck",
                RequestOptions {
                    headers,
                    ..RequestOptions::default()
                },
            )
            .await
            .expect("call succeeds");

        let sent = http.requests();
        assert_eq!(
            sent[0].headers.get("content-type").map(String::as_str),
            Some("text/plain")
        );
        assert!(sent[0].headers.contains_key("authorization"));
    }

    #[tokio::test]
    async fn non_success_status_surfaces_body_text() {
        let http = ScriptedHttpClient::respond(Ok(HttpResponse {
            status: 503,
            body: "router draining".to_owned(),
        }));
        let client =
            ApiClient::with_http_client(http, &settings_with_base("http://router:8082"));

        let err = client.get_health().await.expect_err("must fail");
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.to_string(), "router draining");
    }

    #[tokio::test]
    async fn empty_error_body_synthesizes_a_message() {
        let http = ScriptedHttpClient::respond(Ok(HttpResponse {
            status: 404,
            body: String::new(),
        }));
        let client =
            ApiClient::with_http_client(http, &settings_with_base("http://router:8082"));

        let err = client.get_health().await.expect_err("must fail");
        assert_eq!(err.to_string(), "Request failed (404)");
    }

    #[tokio::test]
    async fn timeout_maps_to_the_timeout_error() {
        let http = ScriptedHttpClient::respond(Err(HttpError::timeout("request timeout")));
        let client =
            ApiClient::with_http_client(http, &settings_with_base("http://router:8082"));

        let err = client.get_health().await.expect_err("must fail");
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "Request timed out");
    }

    #[tokio::test]
    async fn undecodable_success_body_becomes_absent_data() {
        let http = ScriptedHttpClient::respond(Ok(HttpResponse::ok_json("<html>oops</html>")));
        let client =
            ApiClient::with_http_client(http, &settings_with_base("http://router:8082"));

        let health = client.get_health().await.expect("call succeeds");
        assert!(health.is_none());
    }

    #[tokio::test]
    async fn provider_bids_path_is_percent_encoded() {
        let http = ScriptedHttpClient::respond(Ok(HttpResponse::ok_json("[]")));
        let client =
            ApiClient::with_http_client(http.clone(), &settings_with_base("http://router:8082"));

        client
            .get_provider_bids("0xAB/..")
            .await
            .expect("call succeeds");

        let sent = http.requests();
        assert_eq!(
            sent[0].url,
            "http://router:8082/blockchain/providers/0xAB%2F../bids"
        );
    }

    #[tokio::test]
    async fn underlying_config_defaults_to_port_8080() {
        let http = ScriptedHttpClient::respond(Ok(HttpResponse::ok_json("{}")));
        let mut settings = settings_with_base("http://router:8082");
        settings.underlying_config_url = None;
        let client = ApiClient::with_http_client(http.clone(), &settings);

        client
            .get_underlying_config()
            .await
            .expect("call succeeds");

        assert_eq!(http.requests()[0].url, "http://router:8080/config");
    }

    #[tokio::test]
    async fn config_lookups_are_cached() {
        let http = ScriptedHttpClient::respond(Ok(HttpResponse::ok_json("{\"host\":\"h\"}")));
        let client =
            ApiClient::with_http_client(http.clone(), &settings_with_base("http://router:8082"));

        client.get_config().await.expect("first call succeeds");
        client.get_config().await.expect("second call succeeds");

        assert_eq!(http.requests().len(), 1);
    }

    #[test]
    fn swap_port_handles_present_and_missing_ports() {
        assert_eq!(
            swap_port("http://localhost:8082", "8080"),
            "http://localhost:8080"
        );
        assert_eq!(
            swap_port("http://localhost", "8080"),
            "http://localhost:8080"
        );
        assert_eq!(swap_port("https://router:9", "8080"), "https://router:8080");
    }
}
