//! mws-http
//!
//! Signed, blocking HTTP client for the MWS Orders API.
//!
//! Implements `mws_orders::RestClient`. Every call is a form-encoded `POST`
//! to `{endpoint}/Orders/2013-09-01`, signed with Signature Version 2
//! (HMAC-SHA256). Non-2xx answers are decoded from `<ErrorResponse>` into
//! `OrdersError::Api`. No retries: throttling and outages reach the caller.
//!
//! Credentials are passed in by the caller; never log them.

pub mod signature;

use std::collections::BTreeMap;
use std::time::Duration;

use mws_orders::filter::mws_timestamp;
use mws_orders::xml::api_error;
use mws_orders::{
    Clock, Credentials, OrdersError, Request, Response, RestClient, RestClientFactory, SystemClock,
};
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use tracing::{debug, warn};

/// Orders API version sent as `Version`.
pub const API_VERSION: &str = "2013-09-01";

/// Path segment under the endpoint; also the namespace suffix.
pub const API_PATH: &str = "Orders/2013-09-01";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_USER_AGENT: &str = concat!(
    "mws-sync/",
    env!("CARGO_PKG_VERSION"),
    " (Language=Rust)"
);

pub struct MwsHttpClient {
    http: reqwest::blocking::Client,
    url: Url,
    credentials: Credentials,
    clock: Box<dyn Clock>,
}

impl MwsHttpClient {
    pub fn new(
        credentials: Credentials,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, OrdersError> {
        let url = service_url(&credentials.endpoint)?;
        check_not_blank(&credentials)?;
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| OrdersError::Config(format!("http client build failed: {e}")))?;

        Ok(Self {
            http,
            url,
            credentials,
            clock: Box::new(SystemClock),
        })
    }

    /// Override the clock used for the `Timestamp` parameter.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Form body for `request`, including the signature.
    pub fn signed_body(&self, request: &Request) -> Result<String, OrdersError> {
        let action = request.action();
        let mut params: BTreeMap<String, String> = request.params().clone();
        let mut common = |k: &str, v: &str| {
            params.insert(k.to_string(), v.to_string());
        };
        common("AWSAccessKeyId", &self.credentials.access_key_id);
        common("Action", action.as_str());
        common("SellerId", &self.credentials.merchant_id);
        common("SignatureMethod", signature::SIGNATURE_METHOD);
        common("SignatureVersion", signature::SIGNATURE_VERSION);
        common("Timestamp", &mws_timestamp(self.clock.now_utc()));
        common("Version", API_VERSION);
        if action.scoped_to_marketplace() {
            common("MarketplaceId.Id.1", &self.credentials.marketplace_id);
        }

        let canonical = signature::canonical_query(&params);
        let to_sign = signature::string_to_sign("POST", &host_header(&self.url), self.url.path(), &canonical);
        let sig = signature::sign(&self.credentials.secret_access_key, &to_sign)?;

        Ok(format!(
            "{canonical}&Signature={}",
            urlencoding::encode(&sig)
        ))
    }
}

impl std::fmt::Debug for MwsHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MwsHttpClient")
            .field("url", &self.url.as_str())
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl RestClient for MwsHttpClient {
    fn version(&self) -> &str {
        API_PATH
    }

    fn send_request(&self, request: &Request) -> Result<Response, OrdersError> {
        let body = self.signed_body(request)?;
        debug!(action = %request.action(), url = %self.url, "mws request");

        let resp = self
            .http
            .post(self.url.clone())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded; charset=utf-8")
            .body(body)
            .send()
            .map_err(|e| OrdersError::Transport(format!("mws request failed: {e}")))?;

        let status = resp.status();
        let text = resp
            .text()
            .map_err(|e| OrdersError::Transport(format!("mws response read failed: {e}")))?;

        if !status.is_success() {
            let err = api_error(&text);
            warn!(
                action = %request.action(),
                status = status.as_u16(),
                error = %err,
                "mws error response"
            );
            return Err(err);
        }

        Ok(Response {
            status: status.as_u16(),
            body: text,
        })
    }
}

/// Builds [`MwsHttpClient`]s for `Transport::init`.
#[derive(Debug, Clone)]
pub struct HttpClientFactory {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpClientFactory {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpClientFactory {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }
}

impl RestClientFactory for HttpClientFactory {
    fn create(&self, credentials: Credentials) -> Result<Box<dyn RestClient>, OrdersError> {
        let client = MwsHttpClient::new(credentials, self.timeout, &self.user_agent)?;
        Ok(Box::new(client))
    }
}

/// `{endpoint}/Orders/2013-09-01`; the endpoint must be an absolute http(s) URL.
fn service_url(endpoint: &str) -> Result<Url, OrdersError> {
    let raw = format!("{}/{}", endpoint.trim_end_matches('/'), API_PATH);
    let url = Url::parse(&raw)
        .map_err(|e| OrdersError::Config(format!("invalid endpoint '{endpoint}': {e}")))?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(OrdersError::Config(format!(
            "invalid endpoint '{endpoint}': expected an http(s) URL"
        ))),
    }
}

fn check_not_blank(c: &Credentials) -> Result<(), OrdersError> {
    let fields = [
        ("access_key_id", &c.access_key_id),
        ("secret_access_key", &c.secret_access_key),
        ("merchant_id", &c.merchant_id),
        ("marketplace_id", &c.marketplace_id),
    ];
    match fields.iter().find(|(_, v)| v.trim().is_empty()) {
        Some((name, _)) => Err(OrdersError::Config(format!("credential '{name}' is empty"))),
        None => Ok(()),
    }
}

/// Host header value as signed: lowercase host, plus the port when it is not
/// the scheme default.
fn host_header(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host,
    }
}
