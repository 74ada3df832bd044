//! Flattening of raw product records into silver rows
//!
//! The transform is pure: a raw record plus its category names and the site
//! root always produce the same `FlatProduct`.

mod product;

pub use product::FlatProduct;

use crate::storage::{list_bronze_files, StorageResult};
use serde_json::Value;
use std::path::Path;

/// Object holding the nested label/value lists
const META_FIELD: &str = "custom_field_data_meta_info";

/// Flattens one raw record
///
/// Relative `prod_url`, `profile_url` and `trust_stamp_url` values are prefixed
/// with `site_root`. The trust stamp URL stays empty when the record has none.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use trade_harvest::flatten::flatten_product;
///
/// let raw = json!({"product_id": 7, "prod_url": "/p/7.html"});
/// let row = flatten_product(&raw, "acids", "chemicals", "https://www.example.com");
/// assert_eq!(row.product_id.as_deref(), Some("7"));
/// assert_eq!(row.prod_url, "https://www.example.com/p/7.html");
/// ```
pub fn flatten_product(
    raw: &Value,
    sub_category: &str,
    main_category: &str,
    site_root: &str,
) -> FlatProduct {
    let meta = raw.get(META_FIELD).filter(|m| m.is_object());
    let trade_info = meta.and_then(|m| m.get("Trade_Information"));
    let price_info = meta.and_then(|m| m.get("Price_And_Quantity"));

    let field = |name: &str| raw.get(name).and_then(cell);
    let labelled = |list: Option<&Value>, label: &str| labelled_value(list, label).and_then(cell);
    let absolute = |name: &str| {
        let path = raw.get(name).and_then(cell).unwrap_or_default();
        format!("{}{}", site_root, path)
    };

    FlatProduct {
        product_id: field("product_id"),
        profile_id: field("profile_id"),
        userid: field("userid"),
        product_name: field("product_name"),
        co_name: field("co_name"),
        prod_url: absolute("prod_url"),
        profile_url: absolute("profile_url"),
        main_category: main_category.to_string(),
        sub_category: sub_category.to_string(),
        member_since: field("member_since"),
        year_established: field("estd"),
        has_trust_stamp: field("has_trust_stamp"),
        trust_stamp_url: field("trust_stamp_url")
            .filter(|u| !u.is_empty())
            .map(|u| format!("{}{}", site_root, u)),
        certifications: field("std_cert"),
        last_verified: field("last_verified"),
        city: field("city"),
        state: field("state"),
        country_name: field("country_name"),
        is_manufacturer: field("ifmanu"),
        is_distributor: field("ifdistributor"),
        is_supplier: field("ifsupplier"),
        is_exporter: field("ifexporter"),
        is_trader: field("iftrader"),
        is_service_provider: field("ifservice"),
        supply_ability: labelled(trade_info, "supply ability"),
        delivery_time: labelled(trade_info, "delivery time"),
        price_string: field("price"),
        price_numeric: field("price_es"),
        price_range: field("price_range"),
        min_price_range: field("min_price_range"),
        max_price_range: field("max_price_range"),
        product_description: field("product_description"),
        keywords: field("keywords"),
        price_from_sub_json: labelled(price_info, "price"),
        minimum_order_quantity: labelled(price_info, "minimum order quantity"),
        payment_terms: labelled(trade_info, "payment terms"),
        buyer_feedback_score: field("ua_buyer_feedback"),
        in_stock: field("in_stock"),
        made_in_india: field("made_in_india"),
    }
}

/// Returns true for records flagged `is_product_record == 1`
pub fn is_product_record(raw: &Value) -> bool {
    match raw.get("is_product_record") {
        Some(Value::Number(n)) => n.as_f64() == Some(1.0),
        Some(Value::Bool(b)) => *b,
        _ => false,
    }
}

/// Finds the `value` of the first entry whose `label_name` contains `label`
///
/// Matching is case-insensitive and ignores surrounding whitespace.
fn labelled_value<'a>(list: Option<&'a Value>, label: &str) -> Option<&'a Value> {
    let needle = label.to_lowercase();
    list?.as_array()?.iter().find_map(|entry| {
        let name = entry.get("label_name")?.as_str()?;
        if name.trim().to_lowercase().contains(&needle) {
            entry.get("value")
        } else {
            None
        }
    })
}

/// Renders a JSON value as CSV cell text; null becomes an empty cell
fn cell(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

/// Flattens every product record in a category's bronze directory
///
/// Files are visited in name order and the file stem is the sub-category.
/// Files that cannot be read or decoded are logged and skipped.
pub fn extract_category(
    bronze_dir: &Path,
    main_category: &str,
    site_root: &str,
) -> StorageResult<Vec<FlatProduct>> {
    let mut rows = Vec::new();

    for (sub_category, path) in list_bronze_files(bronze_dir)? {
        tracing::debug!(file = %path.display(), "Processing bronze file");

        let records: Vec<Value> = match std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|content| serde_json::from_str(&content).map_err(|e| e.to_string()))
        {
            Ok(records) => records,
            Err(e) => {
                tracing::error!(file = %path.display(), error = %e, "Could not decode bronze file");
                continue;
            }
        };

        rows.extend(
            records
                .iter()
                .filter(|raw| is_product_record(raw))
                .map(|raw| flatten_product(raw, &sub_category, main_category, site_root)),
        );
    }

    Ok(rows)
}
