//! Remote client boundary.
//!
//! This module defines **only** the request/response shapes and the client
//! traits. Signing, HTTP and retries live in the implementations.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::OrdersError;
use crate::settings::Credentials;

/// Orders API actions used by the sync path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    GetServiceStatus,
    ListOrders,
    ListOrdersByNextToken,
    GetOrder,
    ListOrderItems,
    ListOrderItemsByNextToken,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::GetServiceStatus => "GetServiceStatus",
            Action::ListOrders => "ListOrders",
            Action::ListOrdersByNextToken => "ListOrdersByNextToken",
            Action::GetOrder => "GetOrder",
            Action::ListOrderItems => "ListOrderItems",
            Action::ListOrderItemsByNextToken => "ListOrderItemsByNextToken",
        }
    }

    /// Name of the `<...Result>` element wrapping the payload.
    pub fn result_element(&self) -> String {
        format!("{}Result", self.as_str())
    }

    /// Follow-up action for a `NextToken`, if this action paginates.
    pub fn next_token_action(&self) -> Option<Action> {
        match self {
            Action::ListOrders | Action::ListOrdersByNextToken => {
                Some(Action::ListOrdersByNextToken)
            }
            Action::ListOrderItems | Action::ListOrderItemsByNextToken => {
                Some(Action::ListOrderItemsByNextToken)
            }
            Action::GetServiceStatus | Action::GetOrder => None,
        }
    }

    /// Actions that must carry `MarketplaceId.Id.1`.
    pub fn scoped_to_marketplace(&self) -> bool {
        matches!(self, Action::ListOrders)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One remote call: an action plus its action-specific parameters.
///
/// Authentication and common parameters (`SellerId`, `Timestamp`, ...) are
/// added by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    action: Action,
    params: BTreeMap<String, String>,
}

impl Request {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            params: BTreeMap::new(),
        }
    }

    pub fn with_params(action: Action, params: BTreeMap<String, String>) -> Self {
        Self { action, params }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }
}

/// Raw response as handed back by a client. Error statuses have already been
/// mapped to [`OrdersError`] by the client; this carries successful bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }
}

/// Stateless (per request) remote client. Shared read-only by the transport
/// and every iterator it hands out.
pub trait RestClient: Send + Sync {
    /// API path segment appended to the endpoint, e.g. `Orders/2013-09-01`.
    fn version(&self) -> &str;

    fn send_request(&self, request: &Request) -> Result<Response, OrdersError>;
}

/// Builds a configured client from credentials. Validation of the
/// credentials beyond presence belongs to the factory.
pub trait RestClientFactory {
    fn create(&self, credentials: Credentials) -> Result<Box<dyn RestClient>, OrdersError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_token_actions() {
        assert_eq!(
            Action::ListOrders.next_token_action(),
            Some(Action::ListOrdersByNextToken)
        );
        assert_eq!(
            Action::ListOrdersByNextToken.next_token_action(),
            Some(Action::ListOrdersByNextToken)
        );
        assert_eq!(
            Action::ListOrderItems.next_token_action(),
            Some(Action::ListOrderItemsByNextToken)
        );
        assert_eq!(Action::GetOrder.next_token_action(), None);
        assert_eq!(Action::GetServiceStatus.next_token_action(), None);
    }

    #[test]
    fn only_list_orders_is_marketplace_scoped() {
        assert!(Action::ListOrders.scoped_to_marketplace());
        assert!(!Action::ListOrdersByNextToken.scoped_to_marketplace());
        assert!(!Action::GetOrder.scoped_to_marketplace());
    }

    #[test]
    fn result_element_name() {
        assert_eq!(
            Action::GetServiceStatus.result_element(),
            "GetServiceStatusResult"
        );
    }

    #[test]
    fn request_builder_collects_params() {
        let r = Request::new(Action::ListOrderItems).param("AmazonOrderId", "A-1");
        assert_eq!(r.action(), Action::ListOrderItems);
        assert_eq!(r.params().get("AmazonOrderId").map(String::as_str), Some("A-1"));
    }
}
