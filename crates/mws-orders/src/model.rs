//! Order and order-item records as decoded from MWS pages.
//!
//! Amounts stay decimal strings exactly as MWS sent them so the host can
//! convert them with its own money rules; nothing here goes through floats.

use chrono::{DateTime, Utc};
use roxmltree::Node;
use serde::{Deserialize, Serialize};

use crate::error::OrdersError;
use crate::loader::PageRecord;
use crate::xml::Lookup;

// ---------------------------------------------------------------------------
// Value types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub currency_code: String,
    pub amount: String,
}

impl Money {
    /// `None` when the element is absent or carries neither field.
    fn parse(lookup: Lookup<'_>, parent: Node<'_, '_>, name: &str) -> Option<Money> {
        let node = lookup.child(parent, name)?;
        let currency_code = lookup.text(node, "CurrencyCode");
        let amount = lookup.text(node, "Amount");
        if currency_code.is_none() && amount.is_none() {
            return None;
        }
        Some(Money {
            currency_code: currency_code.unwrap_or_default(),
            amount: amount.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub name: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub address_line3: Option<String>,
    pub city: Option<String>,
    pub county: Option<String>,
    pub district: Option<String>,
    pub state_or_region: Option<String>,
    pub postal_code: Option<String>,
    pub country_code: Option<String>,
    pub phone: Option<String>,
}

impl Address {
    fn parse(lookup: Lookup<'_>, parent: Node<'_, '_>, name: &str) -> Option<Address> {
        let node = lookup.child(parent, name)?;
        let t = |field: &str| lookup.text(node, field);
        Some(Address {
            name: t("Name"),
            address_line1: t("AddressLine1"),
            address_line2: t("AddressLine2"),
            address_line3: t("AddressLine3"),
            city: t("City"),
            county: t("County"),
            district: t("District"),
            state_or_region: t("StateOrRegion"),
            postal_code: t("PostalCode"),
            country_code: t("CountryCode"),
            phone: t("Phone"),
        })
    }
}

/// Cash-on-delivery fee attached to an order item.
///
/// Blank amounts are stored as `None`: downstream, "blank" and "absent" must
/// be indistinguishable. Only empty or whitespace counts as blank; a literal
/// `"0"` is a real amount and is kept. Currency ids are kept as sent.
///
/// Deserializing goes through [`CodFeeInfo::new`], so the blank rule holds
/// for every constructed value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CodFeeFields")]
pub struct CodFeeInfo {
    currency_id: Option<String>,
    amount: Option<String>,
    discount_currency_id: Option<String>,
    discount_amount: Option<String>,
}

#[derive(Deserialize)]
struct CodFeeFields {
    #[serde(default)]
    currency_id: Option<String>,
    #[serde(default)]
    amount: Option<String>,
    #[serde(default)]
    discount_currency_id: Option<String>,
    #[serde(default)]
    discount_amount: Option<String>,
}

impl From<CodFeeFields> for CodFeeInfo {
    fn from(f: CodFeeFields) -> Self {
        CodFeeInfo::new(
            f.currency_id,
            f.amount,
            f.discount_currency_id,
            f.discount_amount,
        )
    }
}

impl CodFeeInfo {
    pub fn new(
        currency_id: Option<String>,
        amount: Option<String>,
        discount_currency_id: Option<String>,
        discount_amount: Option<String>,
    ) -> Self {
        Self {
            currency_id,
            amount: non_blank(amount),
            discount_currency_id,
            discount_amount: non_blank(discount_amount),
        }
    }

    pub fn currency_id(&self) -> Option<&str> {
        self.currency_id.as_deref()
    }

    pub fn amount(&self) -> Option<&str> {
        self.amount.as_deref()
    }

    pub fn discount_currency_id(&self) -> Option<&str> {
        self.discount_currency_id.as_deref()
    }

    pub fn discount_amount(&self) -> Option<&str> {
        self.discount_amount.as_deref()
    }

    /// Built from `CODFee` / `CODFeeDiscount`; `None` when neither is present.
    fn parse(lookup: Lookup<'_>, item: Node<'_, '_>) -> Option<CodFeeInfo> {
        let fee = lookup.child(item, "CODFee");
        let discount = lookup.child(item, "CODFeeDiscount");
        if fee.is_none() && discount.is_none() {
            return None;
        }
        Some(CodFeeInfo::new(
            verbatim(lookup, fee, "CurrencyCode"),
            verbatim(lookup, fee, "Amount"),
            verbatim(lookup, discount, "CurrencyCode"),
            verbatim(lookup, discount, "Amount"),
        ))
    }
}

fn verbatim(lookup: Lookup<'_>, node: Option<Node<'_, '_>>, field: &str) -> Option<String> {
    node.and_then(|n| lookup.raw_text(n, field))
        .map(|s| s.trim().to_string())
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A marketplace order as returned by `ListOrders` / `GetOrder`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub amazon_order_id: String,
    pub seller_order_id: Option<String>,
    pub purchase_date: DateTime<Utc>,
    pub last_update_date: DateTime<Utc>,
    pub order_status: String,
    pub fulfillment_channel: Option<String>,
    pub sales_channel: Option<String>,
    pub ship_service_level: Option<String>,
    pub order_total: Option<Money>,
    pub number_of_items_shipped: u32,
    pub number_of_items_unshipped: u32,
    pub payment_method: Option<String>,
    pub marketplace_id: Option<String>,
    pub buyer_email: Option<String>,
    pub buyer_name: Option<String>,
    pub shipping_address: Option<Address>,
}

impl PageRecord for OrderRecord {
    const LIST_ELEMENT: &'static str = "Orders";
    const RECORD_ELEMENT: &'static str = "Order";

    fn from_node(lookup: Lookup<'_>, node: Node<'_, '_>) -> Result<Self, OrdersError> {
        let amazon_order_id = required(lookup, node, "Order", "AmazonOrderId")?;
        let ctx = |field: &str| format!("order {amazon_order_id}: {field}");

        Ok(OrderRecord {
            seller_order_id: lookup.text(node, "SellerOrderId"),
            purchase_date: required_date(lookup, node, "PurchaseDate", &ctx)?,
            last_update_date: required_date(lookup, node, "LastUpdateDate", &ctx)?,
            order_status: lookup
                .text(node, "OrderStatus")
                .ok_or_else(|| OrdersError::Decode(format!("{} is missing", ctx("OrderStatus"))))?,
            fulfillment_channel: lookup.text(node, "FulfillmentChannel"),
            sales_channel: lookup.text(node, "SalesChannel"),
            ship_service_level: lookup.text(node, "ShipServiceLevel"),
            order_total: Money::parse(lookup, node, "OrderTotal"),
            number_of_items_shipped: count(lookup, node, "NumberOfItemsShipped", &ctx)?,
            number_of_items_unshipped: count(lookup, node, "NumberOfItemsUnshipped", &ctx)?,
            payment_method: lookup.text(node, "PaymentMethod"),
            marketplace_id: lookup.text(node, "MarketplaceId"),
            buyer_email: lookup.text(node, "BuyerEmail"),
            buyer_name: lookup.text(node, "BuyerName"),
            shipping_address: Address::parse(lookup, node, "ShippingAddress"),
            amazon_order_id,
        })
    }
}

/// One line of an order as returned by `ListOrderItems`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub order_item_id: String,
    pub asin: String,
    pub seller_sku: Option<String>,
    pub title: Option<String>,
    pub quantity_ordered: u32,
    pub quantity_shipped: u32,
    pub item_price: Option<Money>,
    pub shipping_price: Option<Money>,
    pub item_tax: Option<Money>,
    pub promotion_discount: Option<Money>,
    pub cod_fee: Option<CodFeeInfo>,
}

impl PageRecord for OrderItem {
    const LIST_ELEMENT: &'static str = "OrderItems";
    const RECORD_ELEMENT: &'static str = "OrderItem";

    fn from_node(lookup: Lookup<'_>, node: Node<'_, '_>) -> Result<Self, OrdersError> {
        let order_item_id = required(lookup, node, "OrderItem", "OrderItemId")?;
        let ctx = |field: &str| format!("order item {order_item_id}: {field}");

        Ok(OrderItem {
            asin: lookup
                .text(node, "ASIN")
                .ok_or_else(|| OrdersError::Decode(format!("{} is missing", ctx("ASIN"))))?,
            seller_sku: lookup.text(node, "SellerSKU"),
            title: lookup.text(node, "Title"),
            quantity_ordered: count(lookup, node, "QuantityOrdered", &ctx)?,
            quantity_shipped: count(lookup, node, "QuantityShipped", &ctx)?,
            item_price: Money::parse(lookup, node, "ItemPrice"),
            shipping_price: Money::parse(lookup, node, "ShippingPrice"),
            item_tax: Money::parse(lookup, node, "ItemTax"),
            promotion_discount: Money::parse(lookup, node, "PromotionDiscount"),
            cod_fee: CodFeeInfo::parse(lookup, node),
            order_item_id,
        })
    }
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

fn required(
    lookup: Lookup<'_>,
    node: Node<'_, '_>,
    record: &str,
    field: &str,
) -> Result<String, OrdersError> {
    lookup
        .text(node, field)
        .ok_or_else(|| OrdersError::Decode(format!("{record} without {field}")))
}

fn required_date(
    lookup: Lookup<'_>,
    node: Node<'_, '_>,
    field: &str,
    ctx: &dyn Fn(&str) -> String,
) -> Result<DateTime<Utc>, OrdersError> {
    let raw = lookup
        .text(node, field)
        .ok_or_else(|| OrdersError::Decode(format!("{} is missing", ctx(field))))?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| OrdersError::Decode(format!("{} '{raw}' is not a timestamp: {e}", ctx(field))))
}

/// Absent counts are zero; present ones must parse.
fn count(
    lookup: Lookup<'_>,
    node: Node<'_, '_>,
    field: &str,
    ctx: &dyn Fn(&str) -> String,
) -> Result<u32, OrdersError> {
    match lookup.text(node, field) {
        None => Ok(0),
        Some(raw) => raw.parse::<u32>().map_err(|_| {
            OrdersError::Decode(format!("{} '{raw}' is not a count", ctx(field)))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_document;

    fn first_record<R: PageRecord>(xml: &str) -> Result<R, OrdersError> {
        let doc = parse_document(xml).unwrap();
        R::from_node(Lookup::Unqualified, doc.root_element())
    }

    const ORDER: &str = r#"<Order>
  <AmazonOrderId>058-1233752-8214740</AmazonOrderId>
  <PurchaseDate>2014-03-09T10:00:00.000Z</PurchaseDate>
  <LastUpdateDate>2014-03-10T08:30:00Z</LastUpdateDate>
  <OrderStatus>Unshipped</OrderStatus>
  <FulfillmentChannel>MFN</FulfillmentChannel>
  <OrderTotal><CurrencyCode>USD</CurrencyCode><Amount>25.00</Amount></OrderTotal>
  <NumberOfItemsShipped>0</NumberOfItemsShipped>
  <NumberOfItemsUnshipped>2</NumberOfItemsUnshipped>
  <BuyerName>  </BuyerName>
  <ShippingAddress><Name>Jane</Name><City>Seattle</City><CountryCode>US</CountryCode></ShippingAddress>
</Order>"#;

    #[test]
    fn order_fields_are_decoded() {
        let o: OrderRecord = first_record(ORDER).unwrap();
        assert_eq!(o.amazon_order_id, "058-1233752-8214740");
        assert_eq!(o.order_status, "Unshipped");
        assert_eq!(o.purchase_date.to_rfc3339(), "2014-03-09T10:00:00+00:00");
        assert_eq!(
            o.order_total,
            Some(Money {
                currency_code: "USD".into(),
                amount: "25.00".into()
            })
        );
        assert_eq!(o.number_of_items_unshipped, 2);
        assert_eq!(o.buyer_name, None);
        assert_eq!(o.sales_channel, None);
        let addr = o.shipping_address.unwrap();
        assert_eq!(addr.city.as_deref(), Some("Seattle"));
        assert_eq!(addr.phone, None);
    }

    #[test]
    fn order_without_status_fails_loudly() {
        let xml = ORDER.replace("<OrderStatus>Unshipped</OrderStatus>", "");
        let err = first_record::<OrderRecord>(&xml).unwrap_err();
        assert!(matches!(err, OrdersError::Decode(ref m) if m.contains("OrderStatus")));
    }

    #[test]
    fn order_with_bad_date_fails_loudly() {
        let xml = ORDER.replace("2014-03-10T08:30:00Z", "yesterday");
        let err = first_record::<OrderRecord>(&xml).unwrap_err();
        assert!(matches!(err, OrdersError::Decode(ref m) if m.contains("LastUpdateDate")));
    }

    #[test]
    fn order_without_id_fails_loudly() {
        let xml = ORDER.replace("<AmazonOrderId>058-1233752-8214740</AmazonOrderId>", "");
        assert_eq!(
            first_record::<OrderRecord>(&xml).unwrap_err(),
            OrdersError::Decode("Order without AmazonOrderId".into())
        );
    }

    #[test]
    fn cod_fee_blank_amounts_become_none() {
        let fee = CodFeeInfo::new(
            Some("JPY".into()),
            Some("".into()),
            Some("JPY".into()),
            Some("   ".into()),
        );
        assert_eq!(fee.currency_id(), Some("JPY"));
        assert_eq!(fee.amount(), None);
        assert_eq!(fee.discount_currency_id(), Some("JPY"));
        assert_eq!(fee.discount_amount(), None);
    }

    #[test]
    fn cod_fee_zero_amount_is_kept() {
        let fee = CodFeeInfo::new(None, Some("0".into()), None, Some("0.00".into()));
        assert_eq!(fee.amount(), Some("0"));
        assert_eq!(fee.discount_amount(), Some("0.00"));
    }

    #[test]
    fn order_item_with_cod_fee() {
        let xml = r#"<OrderItem>
  <ASIN>B00EXAMPLE</ASIN>
  <OrderItemId>68828574383266</OrderItemId>
  <SellerSKU>SKU-1</SellerSKU>
  <QuantityOrdered>1</QuantityOrdered>
  <QuantityShipped>0</QuantityShipped>
  <ItemPrice><CurrencyCode>JPY</CurrencyCode><Amount>2500</Amount></ItemPrice>
  <CODFee><CurrencyCode>JPY</CurrencyCode><Amount></Amount></CODFee>
  <CODFeeDiscount><CurrencyCode>JPY</CurrencyCode><Amount>100</Amount></CODFeeDiscount>
</OrderItem>"#;
        let item: OrderItem = first_record(xml).unwrap();
        assert_eq!(item.asin, "B00EXAMPLE");
        assert_eq!(item.quantity_ordered, 1);
        let fee = item.cod_fee.unwrap();
        assert_eq!(fee.currency_id(), Some("JPY"));
        assert_eq!(fee.amount(), None);
        assert_eq!(fee.discount_amount(), Some("100"));
    }

    #[test]
    fn order_item_without_cod_elements_has_no_fee() {
        let xml = r#"<OrderItem><ASIN>A</ASIN><OrderItemId>1</OrderItemId></OrderItem>"#;
        let item: OrderItem = first_record(xml).unwrap();
        assert_eq!(item.cod_fee, None);
        assert_eq!(item.quantity_ordered, 0);
    }

    #[test]
    fn bad_quantity_is_a_decode_error() {
        let xml = r#"<OrderItem><ASIN>A</ASIN><OrderItemId>1</OrderItemId><QuantityOrdered>many</QuantityOrdered></OrderItem>"#;
        assert!(matches!(
            first_record::<OrderItem>(xml),
            Err(OrdersError::Decode(_))
        ));
    }

    #[test]
    fn cod_fee_serializes_absent_amount_as_null() {
        let fee = CodFeeInfo::new(Some("JPY".into()), Some(String::new()), None, None);
        let json = serde_json::to_value(&fee).unwrap();
        assert!(json["amount"].is_null());
    }

    #[test]
    fn cod_fee_deserialize_applies_the_blank_rule() {
        let fee: CodFeeInfo = serde_json::from_str(
            r#"{"currency_id":"JPY","amount":"  ","discount_currency_id":null,"discount_amount":"0"}"#,
        )
        .unwrap();
        assert_eq!(fee.amount(), None);
        assert_eq!(fee.discount_amount(), Some("0"));
        assert_eq!(
            fee,
            CodFeeInfo::new(Some("JPY".into()), None, None, Some("0".into()))
        );
    }
}
