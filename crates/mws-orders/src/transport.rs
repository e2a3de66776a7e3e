//! Transport facade used by the host.
//!
//! A [`Transport`] only exists once it has been initialised from settings, so
//! the namespace every response lookup depends on is always established.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::client::{Action, Request, RestClient, RestClientFactory};
use crate::error::OrdersError;
use crate::filter::Filter;
use crate::iter::{OrderItemIterator, OrderIterator, PagedIterator};
use crate::loader::PagedLoader;
use crate::settings::{Credentials, SettingsBag};
use crate::window::{Clock, SystemClock, TimeWindow};
use crate::xml::{parse_document, ResponseSchema};

/// The only status value treated as healthy (compared case-insensitively).
pub const STATUS_GREEN: &str = "GREEN";

pub struct Transport {
    client: Box<dyn RestClient>,
    schema: ResponseSchema,
    window: TimeWindow,
    clock: Box<dyn Clock>,
}

impl Transport {
    /// Build the remote client from the host settings bag and derive the
    /// response namespace (`endpoint/version`).
    pub fn init(
        settings: &SettingsBag,
        factory: &dyn RestClientFactory,
    ) -> Result<Self, OrdersError> {
        let credentials = Credentials::from_settings_bag(settings)?;
        let endpoint = credentials.endpoint.trim_end_matches('/').to_string();
        let client = factory.create(credentials)?;
        let namespace = format!("{}/{}", endpoint, client.version());
        debug!(%namespace, "transport initialised");

        Ok(Self {
            client,
            schema: ResponseSchema::new(namespace),
            window: TimeWindow::default(),
            clock: Box::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    pub fn namespace(&self) -> &str {
        self.schema.namespace()
    }

    pub fn window(&self) -> &TimeWindow {
        &self.window
    }

    /// `GetServiceStatus` health check. A missing or empty status reads as
    /// unhealthy; transport and API failures are returned as errors.
    pub fn get_status(&self) -> Result<bool, OrdersError> {
        let action = Action::GetServiceStatus;
        let response = self.client.send_request(&Request::new(action))?;
        let status = self.status_from_body(&response.body)?;

        info!(
            service = %action.result_element(),
            status = %status,
            "status response"
        );

        Ok(status.eq_ignore_ascii_case(STATUS_GREEN))
    }

    fn status_from_body(&self, body: &str) -> Result<String, OrdersError> {
        let doc = parse_document(body)?;
        let root = doc.root_element();
        let lookup = self.schema.lookup_for(root);
        let status = lookup
            .child(root, &Action::GetServiceStatus.result_element())
            .and_then(|result| lookup.raw_text(result, "Status"))
            .unwrap_or("")
            .trim()
            .to_string();
        Ok(status)
    }

    /// Orders modified in `[validate(from, now), now)`.
    pub fn get_mod_orders(&self, from: DateTime<Utc>) -> OrderIterator<'_> {
        let range = self.window.range(from, self.clock.as_ref());
        self.get_orders(Filter::modified_in(range))
    }

    /// Orders created in `[validate(from, now), now)`; used for backfill.
    pub fn get_initial_orders(&self, from: DateTime<Utc>) -> OrderIterator<'_> {
        let range = self.window.range(from, self.clock.as_ref());
        self.get_orders(Filter::created_in(range))
    }

    /// Single-order lookup.
    pub fn get_order(&self, amazon_order_id: &str) -> OrderIterator<'_> {
        self.get_orders(Filter::order_id(amazon_order_id))
    }

    /// Line items of one order, following `ListOrderItemsByNextToken`.
    pub fn get_order_items(&self, amazon_order_id: &str) -> OrderItemIterator<'_> {
        debug!(amazon_order_id, "getting order items");
        let request = Request::new(Action::ListOrderItems).param("AmazonOrderId", amazon_order_id);
        PagedIterator::new(PagedLoader::new(self.client.as_ref(), &self.schema, request))
    }

    pub fn get_orders(&self, filter: Filter) -> OrderIterator<'_> {
        debug!(filter = %filter.describe(), "getting orders");
        let loader = PagedLoader::new(self.client.as_ref(), &self.schema, filter.to_request());
        PagedIterator::new(loader)
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("namespace", &self.schema.namespace())
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}
