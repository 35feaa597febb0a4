//! CSV export of the inventory.

use std::io::Write;

use chrono::{Local, TimeZone};
use stockscan_core::{Item, StockError};

pub const CSV_HEADER: [&str; 12] = [
    "id",
    "brand",
    "name",
    "barcode",
    "quantity",
    "season",
    "model",
    "productType",
    "color",
    "size",
    "price",
    "date",
];

/// Render an epoch-millisecond timestamp as `dd/mm/yyyy` in local time.
pub fn format_date(timestamp_ms: i64) -> String {
    match Local.timestamp_millis_opt(timestamp_ms).single() {
        Some(dt) => dt.format("%d/%m/%Y").to_string(),
        None => String::new(),
    }
}

/// Write `items` as CSV with a header row, in the given order.
pub fn write_csv<W: Write>(items: &[Item], writer: W) -> Result<(), StockError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(CSV_HEADER).map_err(csv_error)?;
    for item in items {
        let quantity = item.quantity.to_string();
        let date = format_date(item.timestamp);
        csv.write_record([
            item.id.as_str(),
            item.brand.as_str(),
            item.name.as_str(),
            item.barcode.as_str(),
            quantity.as_str(),
            item.season.as_str(),
            item.model.as_str(),
            item.product_type.as_str(),
            item.color.as_str(),
            item.size.as_str(),
            item.price.as_str(),
            date.as_str(),
        ])
        .map_err(csv_error)?;
    }
    csv.flush()
        .map_err(|e| StockError::Storage(format!("CSV write failed: {e}")))
}

pub fn to_csv_string(items: &[Item]) -> Result<String, StockError> {
    let mut buf = Vec::new();
    write_csv(items, &mut buf)?;
    String::from_utf8(buf).map_err(|e| StockError::Other(e.into()))
}

fn csv_error(e: csv::Error) -> StockError {
    StockError::Storage(format!("CSV write failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockscan_core::ItemDraft;

    #[test]
    fn test_csv_has_header_and_quotes_commas() {
        let ts = Local
            .with_ymd_and_hms(2024, 3, 7, 12, 0, 0)
            .single()
            .unwrap()
            .timestamp_millis();
        let item = ItemDraft {
            id: Some("a1".into()),
            brand: Some("ACME".into()),
            name: Some("Shirt, blue".into()),
            quantity: Some(3),
            timestamp: Some(ts),
            ..Default::default()
        }
        .into_item(0);

        let csv = to_csv_string(&[item]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next().unwrap(), CSV_HEADER.join(","));
        assert_eq!(
            lines.next().unwrap(),
            "a1,ACME,\"Shirt, blue\",N/A,3,N/A,N/A,N/A,N/A,N/A,0.00 EUR,07/03/2024"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_empty_inventory_is_header_only() {
        let csv = to_csv_string(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }
}
