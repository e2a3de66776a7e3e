//! Response bodies in the Orders API shape.

use crate::TEST_NAMESPACE;

pub fn service_status(status: &str) -> String {
    format!(
        r#"<?xml version="1.0"?>
<GetServiceStatusResponse xmlns="{TEST_NAMESPACE}">
  <GetServiceStatusResult>
    <Status>{status}</Status>
    <Timestamp>2014-03-10T12:00:00.000Z</Timestamp>
  </GetServiceStatusResult>
  <ResponseMetadata><RequestId>d80c6c7b-f7c7-4fa7-bdd7-854711cb3bcc</RequestId></ResponseMetadata>
</GetServiceStatusResponse>"#
    )
}

/// Same as [`service_status`] without the namespace declaration.
pub fn service_status_unqualified(status: &str) -> String {
    format!(
        r#"<GetServiceStatusResponse><GetServiceStatusResult><Status>{status}</Status></GetServiceStatusResult></GetServiceStatusResponse>"#
    )
}

pub fn order_xml(id: &str) -> String {
    format!(
        r#"<Order>
      <AmazonOrderId>{id}</AmazonOrderId>
      <PurchaseDate>2014-03-09T10:00:00Z</PurchaseDate>
      <LastUpdateDate>2014-03-10T08:00:00Z</LastUpdateDate>
      <OrderStatus>Unshipped</OrderStatus>
      <FulfillmentChannel>MFN</FulfillmentChannel>
      <SalesChannel>Amazon.com</SalesChannel>
      <OrderTotal><CurrencyCode>USD</CurrencyCode><Amount>19.99</Amount></OrderTotal>
      <NumberOfItemsShipped>0</NumberOfItemsShipped>
      <NumberOfItemsUnshipped>1</NumberOfItemsUnshipped>
      <MarketplaceId>ATVPDKIKX0DER</MarketplaceId>
    </Order>"#
    )
}

/// A list page for `action` (`ListOrders`, `ListOrdersByNextToken`, `GetOrder`).
pub fn orders_page(action: &str, ids: &[String], next_token: Option<&str>) -> String {
    let orders: String = ids.iter().map(|id| order_xml(id)).collect();
    let token = next_token
        .map(|t| format!("<NextToken>{t}</NextToken>"))
        .unwrap_or_default();
    format!(
        r#"<?xml version="1.0"?>
<{action}Response xmlns="{TEST_NAMESPACE}">
  <{action}Result>
    {token}
    <LastUpdatedBefore>2014-03-10T11:57:00Z</LastUpdatedBefore>
    <Orders>{orders}</Orders>
  </{action}Result>
</{action}Response>"#
    )
}

/// `count` sequential order ids starting at `start`: `ORD-0000001`, ...
pub fn order_ids(start: usize, count: usize) -> Vec<String> {
    (start..start + count).map(|n| format!("ORD-{n:07}")).collect()
}

pub fn order_item_xml(item_id: &str, cod_amount: Option<&str>) -> String {
    let cod = cod_amount
        .map(|a| {
            format!(
                "<CODFee><CurrencyCode>JPY</CurrencyCode><Amount>{a}</Amount></CODFee>\
                 <CODFeeDiscount><CurrencyCode>JPY</CurrencyCode><Amount></Amount></CODFeeDiscount>"
            )
        })
        .unwrap_or_default();
    format!(
        r#"<OrderItem>
      <ASIN>B00{item_id}</ASIN>
      <OrderItemId>{item_id}</OrderItemId>
      <SellerSKU>SKU-{item_id}</SellerSKU>
      <Title>Item {item_id}</Title>
      <QuantityOrdered>1</QuantityOrdered>
      <QuantityShipped>0</QuantityShipped>
      <ItemPrice><CurrencyCode>JPY</CurrencyCode><Amount>2500</Amount></ItemPrice>
      {cod}
    </OrderItem>"#
    )
}

pub fn order_items_page(
    action: &str,
    order_id: &str,
    items: &[String],
    next_token: Option<&str>,
) -> String {
    let token = next_token
        .map(|t| format!("<NextToken>{t}</NextToken>"))
        .unwrap_or_default();
    let items: String = items.concat();
    format!(
        r#"<{action}Response xmlns="{TEST_NAMESPACE}">
  <{action}Result>
    {token}
    <AmazonOrderId>{order_id}</AmazonOrderId>
    <OrderItems>{items}</OrderItems>
  </{action}Result>
</{action}Response>"#
    )
}

pub fn error_response(code: &str, message: &str) -> String {
    format!(
        r#"<?xml version="1.0"?>
<ErrorResponse xmlns="{TEST_NAMESPACE}">
  <Error><Type>Sender</Type><Code>{code}</Code><Message>{message}</Message></Error>
  <RequestId>e1a2</RequestId>
</ErrorResponse>"#
    )
}
