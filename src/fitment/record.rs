// Normalizes a product's untyped fitment payload into structured
// suitability entries or a single free-text compatibility string.

use serde_json::Value;

use crate::catalog::adapter::{id_string, text};
use crate::config::COMPATIBILITY_FIELDS;

const SUITABILITY_FIELDS: &[&str] = &["suitability_models", "suitabilities", "suitability"];
const SUB_SUITABILITY_FIELDS: &[&str] = &["sub_suitability_models", "sub_suitabilities"];
const MODEL_ID_FIELDS: &[&str] = &["main_model_id", "model_id"];
const ENGINE_ID_FIELDS: &[&str] = &["suit_sub_models_id", "id"];

/// A model/engine combination under a suitability entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubSuitability {
    pub descriptor: String,
    pub model_ids: Vec<String>,
    pub engine_ids: Vec<String>,
}

/// One brand-level fitment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Suitability {
    pub brand_id: Option<String>,
    pub descriptor: String,
    pub sub_models: Vec<SubSuitability>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FitmentRecord {
    Structured(Vec<Suitability>),
    /// Lower-cased compatibility text; empty when the product has none.
    FreeText(String),
}

/// Some endpoints nest the product under `part`.
pub fn unwrap_part(product: &Value) -> &Value {
    match product.get("part") {
        Some(part @ Value::Object(_)) => part,
        _ => product,
    }
}

fn array<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Vec<Value>> {
    keys.iter()
        .find_map(|k| value.get(k).and_then(Value::as_array).filter(|a| !a.is_empty()))
}

fn ids(value: &Value, keys: &[&str]) -> Vec<String> {
    keys.iter()
        .filter_map(|k| value.get(k).and_then(id_string))
        .collect()
}

fn descriptor(value: &Value, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|k| value.get(k).and_then(text))
        .unwrap_or_default()
}

fn sub_suitability(value: &Value) -> Option<SubSuitability> {
    if !value.is_object() {
        return None;
    }
    Some(SubSuitability {
        descriptor: descriptor(value, &["sub_model", "sub_model_name"]),
        model_ids: ids(value, MODEL_ID_FIELDS),
        engine_ids: ids(value, ENGINE_ID_FIELDS),
    })
}

fn suitability(value: &Value) -> Option<Suitability> {
    if !value.is_object() {
        return None;
    }
    let sub_models = array(value, SUB_SUITABILITY_FIELDS)
        .map(|subs| subs.iter().filter_map(sub_suitability).collect())
        .unwrap_or_default();
    Some(Suitability {
        brand_id: value.get("brand_id").and_then(id_string),
        descriptor: descriptor(value, &["model", "model_name"]),
        sub_models,
    })
}

fn compatibility_text(value: &Value) -> String {
    for key in COMPATIBILITY_FIELDS {
        let found = match value.get(*key) {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(text)
                .collect::<Vec<_>>()
                .join("; "),
            _ => String::new(),
        };
        if !found.is_empty() {
            return found.to_lowercase();
        }
    }
    String::new()
}

impl FitmentRecord {
    pub fn from_product(product: &Value) -> Self {
        let product = unwrap_part(product);
        let entries: Vec<Suitability> = array(product, SUITABILITY_FIELDS)
            .map(|list| list.iter().filter_map(suitability).collect())
            .unwrap_or_default();
        if entries.is_empty() {
            FitmentRecord::FreeText(compatibility_text(product))
        } else {
            FitmentRecord::Structured(entries)
        }
    }
}
