//! Paginated loader.
//!
//! One loader exhausts one filtered result set by following `NextToken`
//! continuation markers. States:
//!
//! ```text
//! Start --next_page()--> [fetching] --> HasPage { next_token }
//! HasPage { Some(t) } --next_page()--> [fetching] --> HasPage { .. }
//! HasPage { None } --next_page()--> Exhausted
//! [fetching] --error--> Exhausted
//! ```
//!
//! "Fetching" is the span of a single `next_page()` call and is not stored.
//! Failures are returned as-is: the loader never retries, and once a fetch
//! has failed it issues no further requests.

use std::marker::PhantomData;

use roxmltree::Node;
use tracing::{debug, warn};

use crate::client::{Request, RestClient};
use crate::error::OrdersError;
use crate::xml::{parse_document, Lookup, ResponseSchema};

/// A record type that can be decoded from a list page.
pub trait PageRecord: Sized {
    /// Element under `<{Action}Result>` holding the records.
    const LIST_ELEMENT: &'static str;
    /// Element name of a single record.
    const RECORD_ELEMENT: &'static str;

    fn from_node(lookup: Lookup<'_>, node: Node<'_, '_>) -> Result<Self, OrdersError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderState {
    /// No request issued yet.
    Start,
    /// A page has been decoded; `next_token` says whether more exist.
    HasPage { next_token: Option<String> },
    /// Terminal.
    Exhausted,
}

pub struct PagedLoader<'c, R> {
    client: &'c dyn RestClient,
    schema: &'c ResponseSchema,
    first: Request,
    state: LoaderState,
    requests: usize,
    _record: PhantomData<fn() -> R>,
}

impl<'c, R: PageRecord> PagedLoader<'c, R> {
    /// Nothing is sent until the first [`next_page`](Self::next_page).
    pub fn new(client: &'c dyn RestClient, schema: &'c ResponseSchema, first: Request) -> Self {
        Self {
            client,
            schema,
            first,
            state: LoaderState::Start,
            requests: 0,
            _record: PhantomData,
        }
    }

    pub fn state(&self) -> &LoaderState {
        &self.state
    }

    /// Remote calls issued so far.
    pub fn requests_issued(&self) -> usize {
        self.requests
    }

    /// Fetch and decode the next page. `Ok(None)` once the result set is
    /// exhausted; further calls keep returning `Ok(None)` without I/O.
    pub fn next_page(&mut self) -> Result<Option<Vec<R>>, OrdersError> {
        let request = match &self.state {
            LoaderState::Start => self.first.clone(),
            LoaderState::HasPage {
                next_token: Some(token),
            } => match self.first.action().next_token_action() {
                Some(action) => Request::new(action).param("NextToken", token.as_str()),
                None => {
                    warn!(
                        action = %self.first.action(),
                        "next token returned for a non-paginated action; stopping"
                    );
                    self.state = LoaderState::Exhausted;
                    return Ok(None);
                }
            },
            LoaderState::HasPage { next_token: None } | LoaderState::Exhausted => {
                self.state = LoaderState::Exhausted;
                return Ok(None);
            }
        };

        match self.fetch(&request) {
            Ok((records, next_token)) => {
                debug!(
                    action = %request.action(),
                    records = records.len(),
                    has_next = next_token.is_some(),
                    "page loaded"
                );
                self.state = LoaderState::HasPage { next_token };
                Ok(Some(records))
            }
            Err(e) => {
                self.state = LoaderState::Exhausted;
                Err(e)
            }
        }
    }

    fn fetch(&mut self, request: &Request) -> Result<(Vec<R>, Option<String>), OrdersError> {
        debug!(
            action = %request.action(),
            params = ?request.params(),
            "fetching page"
        );
        self.requests += 1;
        let response = self.client.send_request(request)?;
        decode_page(self.schema, &request.action().result_element(), &response.body)
    }
}

/// Decode `<{Action}Result>` into its records and optional `NextToken`.
///
/// A page without the result element is malformed; a result element without
/// the list element is an empty page. Any undecodable record fails the whole
/// page.
pub fn decode_page<R: PageRecord>(
    schema: &ResponseSchema,
    result_element: &str,
    body: &str,
) -> Result<(Vec<R>, Option<String>), OrdersError> {
    let doc = parse_document(body)?;
    let root = doc.root_element();
    let lookup = schema.lookup_for(root);

    let result = lookup.child(root, result_element).ok_or_else(|| {
        OrdersError::Transport(format!(
            "response has no <{result_element}> element (root <{}>)",
            root.tag_name().name()
        ))
    })?;

    let next_token = lookup.text(result, "NextToken");

    let records = match lookup.child(result, R::LIST_ELEMENT) {
        Some(list) => lookup
            .children(list, R::RECORD_ELEMENT)
            .into_iter()
            .map(|node| R::from_node(lookup, node))
            .collect::<Result<Vec<R>, OrdersError>>()?,
        None => Vec::new(),
    };

    Ok((records, next_token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{Action, Response};
    use crate::model::OrderRecord;
    use std::sync::Mutex;

    const NS: &str = "https://mws.amazonservices.com/Orders/2013-09-01";

    struct Pages {
        bodies: Mutex<Vec<Result<String, OrdersError>>>,
        seen: Mutex<Vec<Request>>,
    }

    impl Pages {
        fn new(mut bodies: Vec<Result<String, OrdersError>>) -> Self {
            bodies.reverse();
            Self {
                bodies: Mutex::new(bodies),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl RestClient for Pages {
        fn version(&self) -> &str {
            "Orders/2013-09-01"
        }

        fn send_request(&self, request: &Request) -> Result<Response, OrdersError> {
            self.seen.lock().unwrap().push(request.clone());
            match self.bodies.lock().unwrap().pop() {
                Some(r) => r.map(Response::ok),
                None => Err(OrdersError::Transport("no scripted response".into())),
            }
        }
    }

    fn order(id: &str) -> String {
        format!(
            "<Order><AmazonOrderId>{id}</AmazonOrderId><PurchaseDate>2014-03-09T10:00:00Z</PurchaseDate>\
             <LastUpdateDate>2014-03-09T10:00:00Z</LastUpdateDate><OrderStatus>Pending</OrderStatus></Order>"
        )
    }

    fn page(action: &str, ids: &[&str], token: Option<&str>) -> String {
        let orders: String = ids.iter().map(|id| order(id)).collect();
        let token = token
            .map(|t| format!("<NextToken>{t}</NextToken>"))
            .unwrap_or_default();
        format!(
            r#"<{action}Response xmlns="{NS}"><{action}Result>{token}<Orders>{orders}</Orders></{action}Result></{action}Response>"#
        )
    }

    fn first() -> Request {
        Request::new(Action::ListOrders).param("CreatedAfter", "2014-03-01T00:00:00Z")
    }

    #[test]
    fn follows_tokens_until_exhausted() {
        let client = Pages::new(vec![
            Ok(page("ListOrders", &["A", "B"], Some("T1"))),
            Ok(page("ListOrdersByNextToken", &["C"], None)),
        ]);
        let schema = ResponseSchema::new(NS);
        let mut loader: PagedLoader<'_, OrderRecord> = PagedLoader::new(&client, &schema, first());
        assert_eq!(loader.state(), &LoaderState::Start);

        let p1 = loader.next_page().unwrap().unwrap();
        assert_eq!(p1.len(), 2);
        assert_eq!(
            loader.state(),
            &LoaderState::HasPage {
                next_token: Some("T1".into())
            }
        );

        let p2 = loader.next_page().unwrap().unwrap();
        assert_eq!(p2[0].amazon_order_id, "C");

        assert!(loader.next_page().unwrap().is_none());
        assert_eq!(loader.state(), &LoaderState::Exhausted);
        assert!(loader.next_page().unwrap().is_none());
        assert_eq!(loader.requests_issued(), 2);

        let seen = client.seen.lock().unwrap();
        assert_eq!(seen[1].action(), Action::ListOrdersByNextToken);
        assert_eq!(
            seen[1].params().get("NextToken").map(String::as_str),
            Some("T1")
        );
    }

    #[test]
    fn failure_is_returned_and_terminal() {
        let client = Pages::new(vec![Err(OrdersError::Transport("reset".into()))]);
        let schema = ResponseSchema::new(NS);
        let mut loader: PagedLoader<'_, OrderRecord> = PagedLoader::new(&client, &schema, first());

        assert_eq!(
            loader.next_page().unwrap_err(),
            OrdersError::Transport("reset".into())
        );
        assert_eq!(loader.state(), &LoaderState::Exhausted);
        assert!(loader.next_page().unwrap().is_none());
        assert_eq!(loader.requests_issued(), 1);
    }

    #[test]
    fn page_without_list_is_empty() {
        let body = format!(
            r#"<ListOrdersResponse xmlns="{NS}"><ListOrdersResult><CreatedBefore>x</CreatedBefore></ListOrdersResult></ListOrdersResponse>"#
        );
        let (records, token) =
            decode_page::<OrderRecord>(&ResponseSchema::new(NS), "ListOrdersResult", &body)
                .unwrap();
        assert!(records.is_empty());
        assert!(token.is_none());
    }

    #[test]
    fn page_without_result_element_is_rejected() {
        let body = "<SomethingElse/>";
        let err = decode_page::<OrderRecord>(&ResponseSchema::new(NS), "ListOrdersResult", body)
            .unwrap_err();
        assert!(matches!(err, OrdersError::Transport(ref m) if m.contains("ListOrdersResult")));
    }

    #[test]
    fn one_bad_record_fails_the_page() {
        let body = page("ListOrders", &["A"], None).replace(
            "</Orders>",
            "<Order><AmazonOrderId>B</AmazonOrderId></Order></Orders>",
        );
        let err = decode_page::<OrderRecord>(&ResponseSchema::new(NS), "ListOrdersResult", &body)
            .unwrap_err();
        assert!(matches!(err, OrdersError::Decode(_)));
    }
}
