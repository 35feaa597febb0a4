//! Instructions and response schema sent with every label photo.

use serde_json::{json, Map, Value};
use stockscan_core::ItemField;

pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are a logistics assistant specialised in \
streetwear and fashion. Analyse photos of clothing or footwear labels and extract their \
metadata. Answer with pure JSON only.";

pub const DEFAULT_PROMPT: &str = "Extract the product information from this label or barcode: \
barcode (EAN), brand, model/SKU, product name, size, estimated price in EUR, dominant colour, \
season (e.g. FW24), product type.";

/// Object schema with one string property per extracted field, in the
/// OpenAPI subset accepted by Gemini's `responseSchema`.
pub fn response_schema() -> Value {
    let properties: Map<String, Value> = ItemField::EXTRACTED
        .iter()
        .map(|f| (f.as_str().to_string(), json!({ "type": "STRING" })))
        .collect();
    json!({
        "type": "OBJECT",
        "properties": properties,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_lists_extracted_fields_only() {
        let schema = response_schema();
        let props = schema["properties"].as_object().unwrap();
        assert_eq!(props.len(), 9);
        assert_eq!(props["productType"]["type"], "STRING");
        assert!(!props.contains_key("quantity"));
        assert!(!props.contains_key("id"));
    }
}
