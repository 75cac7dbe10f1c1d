//! ReceiptRecord: a receipt as submitted by a client.
//!
//! Every field is optional. Text fields accept JSON numbers too, converted to
//! their JSON text form, because clients are inconsistent about quoting
//! amounts. Nothing in here parses a value; the raw text is kept as sent.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ParseError;

/// Merchant stored when the record has none.
pub const DEFAULT_MERCHANT: &str = "Unknown";
/// Currency stored when the record has none.
pub const DEFAULT_CURRENCY: &str = "USD";
/// Amount stored for an absent total or tax.
pub const DEFAULT_AMOUNT: &str = "0.00";

/// Description stored for an item without one.
pub const DEFAULT_ITEM_DESCRIPTION: &str = "Item";
/// Quantity stored for an item without one.
pub const DEFAULT_ITEM_QUANTITY: &str = "1";

/// An incoming receipt. Untrusted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptRecord {
    #[serde(default, deserialize_with = "text_or_number", skip_serializing_if = "Option::is_none")]
    pub merchant_name: Option<String>,

    /// Raw date text, never parsed.
    #[serde(default, deserialize_with = "text_or_number", skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(default, deserialize_with = "text_or_number", skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,

    /// Raw total text, never parsed for storage in the raw column.
    #[serde(default, deserialize_with = "text_or_number", skip_serializing_if = "Option::is_none")]
    pub total: Option<String>,

    #[serde(default, deserialize_with = "text_or_number", skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    #[serde(default, deserialize_with = "text_or_number", skip_serializing_if = "Option::is_none")]
    pub tax: Option<String>,

    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<LineItem>,

    /// Bypass duplicate checking entirely.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub force: bool,
}

/// One purchased item on a receipt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default, deserialize_with = "text_or_number", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "text_or_number", skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,

    #[serde(default, deserialize_with = "text_or_number", skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
}

impl LineItem {
    /// Create an item with all three fields set.
    pub fn new(
        description: impl Into<String>,
        quantity: impl Into<String>,
        price: impl Into<String>,
    ) -> Self {
        Self {
            description: Some(description.into()),
            quantity: Some(quantity.into()),
            price: Some(price.into()),
        }
    }

    pub fn description_or_default(&self) -> &str {
        self.description.as_deref().unwrap_or(DEFAULT_ITEM_DESCRIPTION)
    }

    pub fn quantity_or_default(&self) -> &str {
        self.quantity.as_deref().unwrap_or(DEFAULT_ITEM_QUANTITY)
    }

    pub fn price_or_default(&self) -> &str {
        self.price.as_deref().unwrap_or(DEFAULT_AMOUNT)
    }
}

impl ReceiptRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merchant(mut self, merchant: impl Into<String>) -> Self {
        self.merchant_name = Some(merchant.into());
        self
    }

    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    pub fn total(mut self, total: impl Into<String>) -> Self {
        self.total = Some(total.into());
        self
    }

    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    pub fn tax(mut self, tax: impl Into<String>) -> Self {
        self.tax = Some(tax.into());
        self
    }

    pub fn item(mut self, item: LineItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Matching views: trimmed text, "" when absent. Never a wildcard.
    // ─────────────────────────────────────────────────────────────────────────

    pub fn merchant_key(&self) -> &str {
        self.merchant_name.as_deref().unwrap_or("").trim()
    }

    pub fn date_key(&self) -> &str {
        self.date.as_deref().unwrap_or("").trim()
    }

    pub fn total_key(&self) -> &str {
        self.total.as_deref().unwrap_or("").trim()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Storage views: defaults applied.
    // ─────────────────────────────────────────────────────────────────────────

    pub fn merchant_or_default(&self) -> &str {
        self.merchant_name.as_deref().unwrap_or(DEFAULT_MERCHANT)
    }

    pub fn currency_or_default(&self) -> &str {
        self.currency.as_deref().unwrap_or(DEFAULT_CURRENCY)
    }

    pub fn tax_or_default(&self) -> &str {
        self.tax.as_deref().unwrap_or(DEFAULT_AMOUNT)
    }
}

/// Decode a receipt record from a JSON request body.
pub fn parse_record(bytes: &[u8]) -> Result<ReceiptRecord, ParseError> {
    let value: Value = serde_json::from_slice(bytes)?;
    if value.is_object() {
        return Ok(serde_json::from_value(value)?);
    }

    let kind = match value {
        Value::Object(_) => "an object",
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
    };
    Err(ParseError::NotAnObject(kind))
}

fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrNumber {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(
        Option::<TextOrNumber>::deserialize(deserializer)?.map(|value| match value {
            TextOrNumber::Text(text) => text,
            TextOrNumber::Number(number) => number.to_string(),
        }),
    )
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_record() {
        let body = br#"{
            "merchantName": "Acme",
            "date": "2024-01-01",
            "time": "12:30",
            "total": "10.00",
            "currency": "EUR",
            "tax": "0.80",
            "items": [{"description": "Coffee", "quantity": 1, "price": "3.50"}],
            "force": true
        }"#;

        let record = parse_record(body).unwrap();
        assert_eq!(record.merchant_name.as_deref(), Some("Acme"));
        assert_eq!(record.total.as_deref(), Some("10.00"));
        assert_eq!(record.currency_or_default(), "EUR");
        assert_eq!(record.items.len(), 1);
        assert_eq!(record.items[0].quantity.as_deref(), Some("1"));
        assert!(record.force);
    }

    #[test]
    fn test_parse_empty_object_uses_defaults() {
        let record = parse_record(b"{}").unwrap();
        assert_eq!(record, ReceiptRecord::default());
        assert_eq!(record.merchant_or_default(), "Unknown");
        assert_eq!(record.currency_or_default(), "USD");
        assert_eq!(record.tax_or_default(), "0.00");
        assert!(!record.force);
    }

    #[test]
    fn test_numbers_keep_their_json_text() {
        let record = parse_record(br#"{"total": 10.5, "tax": 0}"#).unwrap();
        assert_eq!(record.total.as_deref(), Some("10.5"));
        assert_eq!(record.tax.as_deref(), Some("0"));
    }

    #[test]
    fn test_null_fields_are_absent() {
        let record = parse_record(br#"{"merchantName": null, "items": null}"#).unwrap();
        assert!(record.merchant_name.is_none());
        assert!(record.items.is_empty());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let record = parse_record(br#"{"merchantName": "Acme", "imageUrl": "x"}"#).unwrap();
        assert_eq!(record.merchant_key(), "Acme");
    }

    #[test]
    fn test_rejects_non_objects() {
        assert!(matches!(
            parse_record(b"[1, 2]"),
            Err(ParseError::NotAnObject("an array"))
        ));
        assert!(matches!(parse_record(b"null"), Err(ParseError::NotAnObject("null"))));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(parse_record(b"{\"total\": "), Err(ParseError::Json(_))));
    }

    #[test]
    fn test_rejects_wrong_types() {
        assert!(matches!(
            parse_record(br#"{"force": "yes"}"#),
            Err(ParseError::Json(_))
        ));
        assert!(matches!(
            parse_record(br#"{"total": {"amount": 1}}"#),
            Err(ParseError::Json(_))
        ));
    }

    #[test]
    fn test_match_keys_trim_and_default_to_empty() {
        let record = ReceiptRecord::new().merchant("  Acme ").total(" 10.00");
        assert_eq!(record.merchant_key(), "Acme");
        assert_eq!(record.total_key(), "10.00");
        assert_eq!(record.date_key(), "");
    }

    #[test]
    fn test_serialize_omits_absent_fields() {
        let record = ReceiptRecord::new().merchant("Acme");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, serde_json::json!({"merchantName": "Acme"}));
    }
}
