//! Error type shared by every layer of the sync path.

use std::fmt;

use chrono::{DateTime, Utc};

/// Errors surfaced by the transport, the loader and the iterators.
///
/// Nothing in this crate retries or swallows these; they reach the direct
/// caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrdersError {
    /// Settings are incomplete or invalid. Not worth retrying.
    Config(String),
    /// Network/HTTP failure or a response body that is not well-formed XML.
    Transport(String),
    /// MWS answered with an `<ErrorResponse>`.
    Api {
        code: Option<String>,
        message: String,
    },
    /// A record inside an otherwise valid page is missing required data.
    Decode(String),
    /// A time range whose start is not strictly before its end.
    InvalidRange {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
}

impl OrdersError {
    /// `true` for errors a caller should treat as fatal for the workflow.
    pub fn is_config(&self) -> bool {
        matches!(self, OrdersError::Config(_))
    }
}

impl fmt::Display for OrdersError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrdersError::Config(msg) => write!(f, "config error: {msg}"),
            OrdersError::Transport(msg) => write!(f, "transport error: {msg}"),
            OrdersError::Api {
                code: Some(c),
                message,
            } => write!(f, "mws api error code={c}: {message}"),
            OrdersError::Api {
                code: None,
                message,
            } => write!(f, "mws api error: {message}"),
            OrdersError::Decode(msg) => write!(f, "decode error: {msg}"),
            OrdersError::InvalidRange { from, to } => write!(
                f,
                "invalid time range: from={} is not before to={}",
                from.to_rfc3339(),
                to.to_rfc3339()
            ),
        }
    }
}

impl std::error::Error for OrdersError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_api_with_code() {
        let err = OrdersError::Api {
            code: Some("RequestThrottled".to_string()),
            message: "Request is throttled".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "mws api error code=RequestThrottled: Request is throttled"
        );
    }

    #[test]
    fn display_api_without_code() {
        let err = OrdersError::Api {
            code: None,
            message: "service unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "mws api error: service unavailable");
    }

    #[test]
    fn only_config_errors_are_config() {
        assert!(OrdersError::Config("missing merchant_id".into()).is_config());
        assert!(!OrdersError::Transport("connection refused".into()).is_config());
    }
}
