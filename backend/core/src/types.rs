use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::StockError;

/// Fallback for descriptive fields the label did not yield.
pub const FALLBACK: &str = "N/A";
pub const FALLBACK_BRAND: &str = "GENERIC";
pub const FALLBACK_NAME: &str = "UNNAMED PRODUCT";
pub const FALLBACK_PRICE: &str = "0.00 EUR";
pub const DEFAULT_QUANTITY: u32 = 1;

/// Current time as epoch milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// A stored inventory record. Every field is populated; see [`Item::normalize`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    #[serde(default)]
    pub barcode: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub season: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub product_type: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub price: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Creation time, epoch milliseconds.
    pub timestamp: i64,
}

fn default_quantity() -> u32 {
    DEFAULT_QUANTITY
}

impl Item {
    /// Generate a fresh opaque id.
    pub fn new_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Replace blank fields with their fallbacks and clamp quantity to at least 1.
    pub fn normalize(self) -> Self {
        let draft = ItemDraft::from(&self);
        let timestamp = self.timestamp;
        draft.into_item(timestamp)
    }

    /// Value of a descriptive field as text.
    pub fn field(&self, field: ItemField) -> String {
        match field {
            ItemField::Barcode => self.barcode.clone(),
            ItemField::Name => self.name.clone(),
            ItemField::Brand => self.brand.clone(),
            ItemField::Season => self.season.clone(),
            ItemField::Model => self.model.clone(),
            ItemField::ProductType => self.product_type.clone(),
            ItemField::Color => self.color.clone(),
            ItemField::Size => self.size.clone(),
            ItemField::Price => self.price.clone(),
            ItemField::Quantity => self.quantity.to_string(),
        }
    }
}

/// The user-editable fields of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemField {
    Barcode,
    Name,
    Brand,
    Season,
    Model,
    ProductType,
    Color,
    Size,
    Price,
    Quantity,
}

impl ItemField {
    pub const ALL: [ItemField; 10] = [
        ItemField::Barcode,
        ItemField::Brand,
        ItemField::Season,
        ItemField::Model,
        ItemField::Name,
        ItemField::ProductType,
        ItemField::Color,
        ItemField::Size,
        ItemField::Quantity,
        ItemField::Price,
    ];

    /// Fields the extraction service is asked to fill.
    pub const EXTRACTED: [ItemField; 9] = [
        ItemField::Barcode,
        ItemField::Brand,
        ItemField::Model,
        ItemField::Name,
        ItemField::Size,
        ItemField::Price,
        ItemField::Color,
        ItemField::Season,
        ItemField::ProductType,
    ];

    /// Snapshot key of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemField::Barcode => "barcode",
            ItemField::Name => "name",
            ItemField::Brand => "brand",
            ItemField::Season => "season",
            ItemField::Model => "model",
            ItemField::ProductType => "productType",
            ItemField::Color => "color",
            ItemField::Size => "size",
            ItemField::Price => "price",
            ItemField::Quantity => "quantity",
        }
    }

    pub fn fallback(&self) -> &'static str {
        match self {
            ItemField::Brand => FALLBACK_BRAND,
            ItemField::Name => FALLBACK_NAME,
            ItemField::Price => FALLBACK_PRICE,
            ItemField::Quantity => "1",
            _ => FALLBACK,
        }
    }
}

impl fmt::Display for ItemField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemField {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let field = match s.trim().to_ascii_lowercase().as_str() {
            "barcode" | "ean" => ItemField::Barcode,
            "name" => ItemField::Name,
            "brand" => ItemField::Brand,
            "season" => ItemField::Season,
            "model" | "sku" => ItemField::Model,
            "producttype" | "product_type" | "type" | "category" => ItemField::ProductType,
            "color" | "colour" => ItemField::Color,
            "size" => ItemField::Size,
            "price" => ItemField::Price,
            "quantity" | "qty" => ItemField::Quantity,
            other => return Err(StockError::UnknownField(other.to_string())),
        };
        Ok(field)
    }
}

/// A partially filled candidate awaiting confirmation.
///
/// Produced by extraction (best effort, any field may be missing) or opened
/// from an existing [`Item`] for editing. Value types coming from a model are
/// not trusted: numbers and booleans are accepted as text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDraft {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_string")]
    pub barcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_string")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_string")]
    pub season: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_string")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_string")]
    pub product_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_string")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_string")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_string")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_quantity")]
    pub quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_timestamp")]
    pub timestamp: Option<i64>,
}

impl ItemDraft {
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// Current value of a field, if any.
    pub fn get(&self, field: ItemField) -> Option<String> {
        match field {
            ItemField::Quantity => self.quantity.map(|q| q.to_string()),
            other => self.slot(other).and_then(|v| v.clone()),
        }
    }

    /// Set a field from user input. Blank input clears the field; quantity
    /// input that is not a positive integer becomes 1.
    pub fn set(&mut self, field: ItemField, value: &str) {
        if field == ItemField::Quantity {
            self.quantity = Some(parse_quantity(value));
            return;
        }
        let value = value.trim();
        if let Some(slot) = self.slot_mut(field) {
            *slot = if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            };
        }
    }

    /// Fill every missing field with its fallback and build the final item.
    /// A draft without id or timestamp gets a fresh id and `now_ms`.
    pub fn into_item(self, now_ms: i64) -> Item {
        Item {
            id: self
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(Item::new_id),
            barcode: or_fallback(self.barcode, ItemField::Barcode),
            name: or_fallback(self.name, ItemField::Name),
            brand: or_fallback(self.brand, ItemField::Brand),
            season: or_fallback(self.season, ItemField::Season),
            model: or_fallback(self.model, ItemField::Model),
            product_type: or_fallback(self.product_type, ItemField::ProductType),
            color: or_fallback(self.color, ItemField::Color),
            size: or_fallback(self.size, ItemField::Size),
            price: or_fallback(self.price, ItemField::Price),
            quantity: self.quantity.filter(|q| *q > 0).unwrap_or(DEFAULT_QUANTITY),
            timestamp: self.timestamp.unwrap_or(now_ms),
        }
    }

    fn slot(&self, field: ItemField) -> Option<&Option<String>> {
        match field {
            ItemField::Barcode => Some(&self.barcode),
            ItemField::Name => Some(&self.name),
            ItemField::Brand => Some(&self.brand),
            ItemField::Season => Some(&self.season),
            ItemField::Model => Some(&self.model),
            ItemField::ProductType => Some(&self.product_type),
            ItemField::Color => Some(&self.color),
            ItemField::Size => Some(&self.size),
            ItemField::Price => Some(&self.price),
            ItemField::Quantity => None,
        }
    }

    fn slot_mut(&mut self, field: ItemField) -> Option<&mut Option<String>> {
        match field {
            ItemField::Barcode => Some(&mut self.barcode),
            ItemField::Name => Some(&mut self.name),
            ItemField::Brand => Some(&mut self.brand),
            ItemField::Season => Some(&mut self.season),
            ItemField::Model => Some(&mut self.model),
            ItemField::ProductType => Some(&mut self.product_type),
            ItemField::Color => Some(&mut self.color),
            ItemField::Size => Some(&mut self.size),
            ItemField::Price => Some(&mut self.price),
            ItemField::Quantity => None,
        }
    }
}

impl From<&Item> for ItemDraft {
    fn from(item: &Item) -> Self {
        let keep = |v: &String| Some(v.clone());
        Self {
            id: keep(&item.id),
            barcode: keep(&item.barcode),
            name: keep(&item.name),
            brand: keep(&item.brand),
            season: keep(&item.season),
            model: keep(&item.model),
            product_type: keep(&item.product_type),
            color: keep(&item.color),
            size: keep(&item.size),
            price: keep(&item.price),
            quantity: Some(item.quantity),
            timestamp: Some(item.timestamp),
        }
    }
}

fn or_fallback(value: Option<String>, field: ItemField) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => field.fallback().to_string(),
    }
}

/// Parse user or model supplied quantity text; anything unusable is 1.
pub fn parse_quantity(value: &str) -> u32 {
    value
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|q| *q > 0)
        .unwrap_or(DEFAULT_QUANTITY)
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_quantity<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .and_then(|q| u32::try_from(q).ok())
            .filter(|q| *q > 0),
        serde_json::Value::String(s) => s.trim().parse::<u32>().ok().filter(|q| *q > 0),
        _ => None,
    })
}

/// Whole milliseconds only; anything else is treated as absent.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_fills_fallbacks() {
        let draft = ItemDraft {
            brand: Some("ACME".into()),
            barcode: Some("123".into()),
            price: Some("10 EUR".into()),
            quantity: Some(2),
            ..Default::default()
        };
        let before = now_millis();
        let item = draft.into_item(now_millis());

        assert_eq!(item.brand, "ACME");
        assert_eq!(item.barcode, "123");
        assert_eq!(item.price, "10 EUR");
        assert_eq!(item.model, "N/A");
        assert_eq!(item.name, FALLBACK_NAME);
        assert_eq!(item.quantity, 2);
        assert!(!item.id.is_empty());
        assert!(item.timestamp >= before && item.timestamp <= now_millis());
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let draft = ItemDraft {
            color: Some("   ".into()),
            quantity: Some(0),
            ..Default::default()
        };
        let item = draft.into_item(42);
        assert_eq!(item.color, FALLBACK);
        assert_eq!(item.quantity, 1);
        assert_eq!(item.timestamp, 42);
    }

    #[test]
    fn test_edit_draft_keeps_identity() {
        let item = ItemDraft::default().into_item(1_000);
        let mut draft = ItemDraft::from(&item);
        draft.set(ItemField::Size, "32 32");
        let edited = draft.into_item(9_999);
        assert_eq!(edited.id, item.id);
        assert_eq!(edited.timestamp, 1_000);
        assert_eq!(edited.size, "32 32");
    }

    #[test]
    fn test_set_quantity_is_lenient() {
        let mut draft = ItemDraft::default();
        draft.set(ItemField::Quantity, "abc");
        assert_eq!(draft.quantity, Some(1));
        draft.set(ItemField::Quantity, " 5 ");
        assert_eq!(draft.quantity, Some(5));
        draft.set(ItemField::Brand, "");
        assert_eq!(draft.brand, None);
    }

    #[test]
    fn test_draft_accepts_loose_types() {
        let draft: ItemDraft = serde_json::from_str(
            r#"{"barcode": 8721222061311, "brand": "TOMMY", "size": null, "quantity": "3", "extra": [1]}"#,
        )
        .unwrap();
        assert_eq!(draft.barcode.as_deref(), Some("8721222061311"));
        assert_eq!(draft.brand.as_deref(), Some("TOMMY"));
        assert_eq!(draft.size, None);
        assert_eq!(draft.quantity, Some(3));

        let draft: ItemDraft =
            serde_json::from_str(r#"{"name": "Tee", "timestamp": "2024-06-01"}"#).unwrap();
        assert_eq!(draft.name.as_deref(), Some("Tee"));
        assert_eq!(draft.timestamp, None);
        let draft: ItemDraft = serde_json::from_str(r#"{"timestamp": 1717200000000}"#).unwrap();
        assert_eq!(draft.timestamp, Some(1_717_200_000_000));
    }

    #[test]
    fn test_item_snapshot_shape() {
        let item = ItemDraft {
            product_type: Some("Jeans".into()),
            ..Default::default()
        }
        .into_item(5);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["productType"], "Jeans");
        assert_eq!(json["timestamp"], 5);
        assert_eq!(json["quantity"], 1);
    }

    #[test]
    fn test_normalize_repairs_partial_item() {
        let item: Item =
            serde_json::from_str(r#"{"id":"abc123xyz","brand":"","timestamp":7}"#).unwrap();
        let item = item.normalize();
        assert_eq!(item.id, "abc123xyz");
        assert_eq!(item.brand, FALLBACK_BRAND);
        assert_eq!(item.quantity, 1);
        assert_eq!(item.timestamp, 7);
    }

    #[test]
    fn test_field_parsing() {
        assert_eq!("productType".parse::<ItemField>().unwrap(), ItemField::ProductType);
        assert_eq!("qty".parse::<ItemField>().unwrap(), ItemField::Quantity);
        assert!(matches!(
            "weight".parse::<ItemField>(),
            Err(StockError::UnknownField(_))
        ));
    }
}
