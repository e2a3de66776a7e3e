//! mws-orders
//!
//! Incremental order sync against the MWS Orders API.
//!
//! This crate owns the sync window, the filter descriptors, the paginated
//! loader and the lazy iterator built on top of it, plus the [`Transport`]
//! facade that wires them together for a host.
//!
//! It does **not** talk HTTP itself. The remote side is the [`RestClient`]
//! trait; `mws-http` provides the signed HTTP implementation and
//! `mws-testkit` a scripted one. It also does not persist anything: callers
//! consume the iterators and hand records to their own storage.

pub mod client;
pub mod error;
pub mod filter;
pub mod iter;
pub mod loader;
pub mod model;
pub mod settings;
pub mod transport;
pub mod window;
pub mod xml;

pub use client::{Action, Request, Response, RestClient, RestClientFactory};
pub use error::OrdersError;
pub use filter::{Filter, TimeRange};
pub use iter::{OrderItemIterator, OrderIterator, PagedIterator};
pub use loader::{LoaderState, PageRecord, PagedLoader};
pub use model::{Address, CodFeeInfo, Money, OrderItem, OrderRecord};
pub use settings::{Credentials, SettingsBag};
pub use transport::{Transport, STATUS_GREEN};
pub use window::{Clock, SystemClock, TimeWindow, CLOCK_SKEW_BUFFER_SECS};
pub use xml::ResponseSchema;
