//! Proptest generators for property-based testing.
//!
//! Generated receipts always carry a merchant. A receipt without one is
//! stored as `"Unknown"` but compared as `""`, so it never matches itself.

use proptest::prelude::*;

use receipt_ledger_core::{LineItem, ReceiptRecord};

/// Generate a merchant name.
pub fn merchant() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 &'.-]{0,23}".prop_map(String::from)
}

/// Generate an ISO date.
pub fn iso_date() -> impl Strategy<Value = String> {
    (2000u32..=2030, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| format!("{:04}-{:02}-{:02}", y, m, d))
}

/// Generate a two-decimal amount.
pub fn amount() -> impl Strategy<Value = String> {
    (0u64..100_000, 0u64..100).prop_map(|(whole, cents)| format!("{}.{:02}", whole, cents))
}

/// Generate a three-letter currency code.
pub fn currency() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("USD".to_string()),
        Just("EUR".to_string()),
        Just("GBP".to_string()),
        "[A-Z]{3}".prop_map(String::from),
    ]
}

/// Generate a line item.
pub fn line_item() -> impl Strategy<Value = LineItem> {
    ("[A-Za-z][A-Za-z ]{0,15}", 1u32..=20, amount())
        .prop_map(|(description, quantity, price)| {
            LineItem::new(description, quantity.to_string(), price)
        })
}

/// Generate surrounding whitespace for padding tests.
pub fn padding() -> impl Strategy<Value = String> {
    "[ \t]{0,3}".prop_map(String::from)
}

/// Parameters for generating a receipt.
#[derive(Debug, Clone)]
pub struct ReceiptParams {
    pub merchant: String,
    pub date: String,
    pub time: Option<String>,
    pub total: String,
    pub currency: Option<String>,
    pub items: Vec<LineItem>,
}

impl Arbitrary for ReceiptParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            merchant(),
            iso_date(),
            proptest::option::of("[0-2][0-9]:[0-5][0-9]".prop_map(String::from)),
            amount(),
            proptest::option::of(currency()),
            prop::collection::vec(line_item(), 0..5),
        )
            .prop_map(|(merchant, date, time, total, currency, items)| Self {
                merchant,
                date,
                time,
                total,
                currency,
                items,
            })
            .boxed()
    }
}

impl ReceiptParams {
    /// Build the receipt these parameters describe.
    pub fn to_record(&self) -> ReceiptRecord {
        let mut record = ReceiptRecord::new()
            .merchant(self.merchant.clone())
            .date(self.date.clone())
            .total(self.total.clone());
        if let Some(time) = &self.time {
            record = record.time(time.clone());
        }
        if let Some(currency) = &self.currency {
            record = record.currency(currency.clone());
        }
        for item in &self.items {
            record = record.item(item.clone());
        }
        record
    }
}

/// Generate a receipt.
pub fn receipt() -> impl Strategy<Value = ReceiptRecord> {
    any::<ReceiptParams>().prop_map(|params| params.to_record())
}
