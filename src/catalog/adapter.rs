// Normalization of raw upstream entries into canonical `CatalogItem`s.

use serde_json::Value;
use tracing::debug;

use super::decode::RawCatalogItem;
use super::traits::{CatalogItem, CatalogLevel};

fn id_fields(level: CatalogLevel) -> &'static [&'static str] {
    match level {
        CatalogLevel::Brand => &["id", "brand_id", "manufacturer_id"],
        CatalogLevel::Model => &["id", "model_id", "main_model_id"],
        CatalogLevel::Engine => &["id", "sub_model_id", "suit_sub_models_id"],
    }
}

fn name_fields(level: CatalogLevel) -> &'static [&'static str] {
    match level {
        CatalogLevel::Brand => &["name", "brand_name", "manufacturer_name", "title"],
        CatalogLevel::Model => &["name", "model_name", "title"],
        CatalogLevel::Engine => &["name", "sub_model_name", "engine_name", "sub_model", "title"],
    }
}

/// Render an upstream identifier as a string. Ids arrive as strings or numbers.
pub fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Non-empty text value.
pub fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn year(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn first<T>(raw: &RawCatalogItem, keys: &[&str], f: impl Fn(&Value) -> Option<T>) -> Option<T> {
    keys.iter().find_map(|k| raw.get(k).and_then(&f))
}

/// Map one raw entry. Entries without a usable id are dropped.
pub fn normalize_item(level: CatalogLevel, raw: &RawCatalogItem) -> Option<CatalogItem> {
    let id = first(raw, id_fields(level), id_string)?;
    let name = first(raw, name_fields(level), text).unwrap_or_else(|| id.clone());
    let year_from = first(raw, &["year", "year_from", "year_start"], year);
    let year_to = first(raw, &["year_2", "year_to", "year_end"], year);
    Some(CatalogItem::new(id, name).with_years(year_from, year_to))
}

pub fn normalize(level: CatalogLevel, raw: &[RawCatalogItem]) -> Vec<CatalogItem> {
    let items: Vec<CatalogItem> = raw.iter().filter_map(|r| normalize_item(level, r)).collect();
    if items.len() != raw.len() {
        debug!(
            "dropped {} {} entries without id",
            raw.len() - items.len(),
            level.as_str()
        );
    }
    items
}
