//! In-process fakes for exercising the sync path without a network.
//!
//! - [`ScriptedClient`]: replays a fixed sequence of responses and records
//!   every request it receives.
//! - [`ScriptedFactory`]: hands a `ScriptedClient` to `Transport::init`.
//! - [`FixedClock`]: a wall clock that never moves.
//! - [`fixtures`]: XML bodies shaped like Orders API responses.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use mws_orders::settings::{
    KEY_ACCESS_KEY_ID, KEY_ENDPOINT, KEY_MARKETPLACE_ID, KEY_MERCHANT_ID, KEY_SECRET_ACCESS_KEY,
};
use mws_orders::{
    Clock, Credentials, OrdersError, Request, Response, RestClient, RestClientFactory, SettingsBag,
};

pub mod fixtures;

pub const TEST_ENDPOINT: &str = "https://mws.amazonservices.com";
pub const TEST_VERSION: &str = "Orders/2013-09-01";
pub const TEST_NAMESPACE: &str = "https://mws.amazonservices.com/Orders/2013-09-01";

/// A complete settings bag pointing at [`TEST_ENDPOINT`].
pub fn settings_bag() -> SettingsBag {
    [
        (KEY_ENDPOINT, TEST_ENDPOINT),
        (KEY_ACCESS_KEY_ID, "AKIDEXAMPLE"),
        (KEY_SECRET_ACCESS_KEY, "test-secret"),
        (KEY_MERCHANT_ID, "A2MERCHANT"),
        (KEY_MARKETPLACE_ID, "ATVPDKIKX0DER"),
    ]
    .into_iter()
    .collect()
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Scripted client
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Script {
    responses: VecDeque<Result<String, OrdersError>>,
    requests: Vec<Request>,
}

/// Cloneable handle; clones share the same script and request log, so a test
/// can keep one handle while the transport owns another.
#[derive(Clone, Default)]
pub struct ScriptedClient {
    inner: Arc<Mutex<Script>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful body.
    pub fn push_body(&self, body: impl Into<String>) -> &Self {
        self.lock().responses.push_back(Ok(body.into()));
        self
    }

    /// Queue a failure.
    pub fn push_error(&self, err: OrdersError) -> &Self {
        self.lock().responses.push_back(Err(err));
        self
    }

    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    pub fn requests(&self) -> Vec<Request> {
        self.lock().requests.clone()
    }

    /// Responses queued but never requested.
    pub fn remaining(&self) -> usize {
        self.lock().responses.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        // A panicking test thread must not hide the script from the others.
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl RestClient for ScriptedClient {
    fn version(&self) -> &str {
        TEST_VERSION
    }

    fn send_request(&self, request: &Request) -> Result<Response, OrdersError> {
        let mut script = self.lock();
        script.requests.push(request.clone());
        match script.responses.pop_front() {
            Some(Ok(body)) => Ok(Response::ok(body)),
            Some(Err(e)) => Err(e),
            None => Err(OrdersError::Transport(format!(
                "scripted client has no response for {}",
                request.action()
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Returns clones of one [`ScriptedClient`] and remembers the credentials it
/// was asked to build with.
#[derive(Clone, Default)]
pub struct ScriptedFactory {
    client: ScriptedClient,
    created_with: Arc<Mutex<Vec<Credentials>>>,
}

impl ScriptedFactory {
    pub fn new(client: ScriptedClient) -> Self {
        Self {
            client,
            created_with: Arc::default(),
        }
    }

    pub fn created_with(&self) -> Vec<Credentials> {
        self.created_with
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }
}

impl RestClientFactory for ScriptedFactory {
    fn create(&self, credentials: Credentials) -> Result<Box<dyn RestClient>, OrdersError> {
        self.created_with
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(credentials);
        Ok(Box::new(self.client.clone()))
    }
}
