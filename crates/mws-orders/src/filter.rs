//! Filter descriptors that scope a remote order query.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::client::{Action, Request};
use crate::error::OrdersError;

/// Half-open UTC interval `[from, to)` with `from < to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Self, OrdersError> {
        if from >= to {
            return Err(OrdersError::InvalidRange { from, to });
        }
        Ok(Self { from, to })
    }

    /// Caller has already established `from < to`.
    pub(crate) fn from_validated(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        debug_assert!(from < to);
        Self { from, to }
    }

    pub fn from(&self) -> DateTime<Utc> {
        self.from
    }

    pub fn to(&self) -> DateTime<Utc> {
        self.to
    }
}

/// What a single sync call asks MWS for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Filter {
    /// Orders whose last update falls in the range (incremental sync).
    ModificationTimeRange(TimeRange),
    /// Orders created in the range (backfill).
    CreationTimeRange(TimeRange),
    /// One order by its marketplace id.
    OrderId(String),
}

impl Filter {
    pub fn modified_in(range: TimeRange) -> Self {
        Filter::ModificationTimeRange(range)
    }

    pub fn created_in(range: TimeRange) -> Self {
        Filter::CreationTimeRange(range)
    }

    pub fn order_id(id: impl Into<String>) -> Self {
        Filter::OrderId(id.into())
    }

    pub fn action(&self) -> Action {
        match self {
            Filter::ModificationTimeRange(_) | Filter::CreationTimeRange(_) => Action::ListOrders,
            Filter::OrderId(_) => Action::GetOrder,
        }
    }

    /// Request parameters understood by the Orders API.
    pub fn to_params(&self) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        match self {
            Filter::ModificationTimeRange(r) => {
                params.insert("LastUpdatedAfter".to_string(), mws_timestamp(r.from));
                params.insert("LastUpdatedBefore".to_string(), mws_timestamp(r.to));
            }
            Filter::CreationTimeRange(r) => {
                params.insert("CreatedAfter".to_string(), mws_timestamp(r.from));
                params.insert("CreatedBefore".to_string(), mws_timestamp(r.to));
            }
            Filter::OrderId(id) => {
                params.insert("AmazonOrderId.Id.1".to_string(), id.clone());
            }
        }
        params
    }

    pub fn to_request(&self) -> Request {
        Request::with_params(self.action(), self.to_params())
    }

    /// JSON rendering for logs.
    pub fn describe(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"))
    }
}

/// ISO-8601 with second precision and a `Z` suffix, as MWS expects.
pub fn mws_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}
