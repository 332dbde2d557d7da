// Typed decoding of catalog list responses. Upstream endpoints wrap their
// arrays inconsistently; this is the only place that knows about it.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::error::CatalogError;

/// One upstream list entry, before normalization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct RawCatalogItem(pub Map<String, Value>);

impl RawCatalogItem {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope {
    Bare(Vec<RawCatalogItem>),
    Data { data: Vec<RawCatalogItem> },
    Result { result: Vec<RawCatalogItem> },
    Keyed(Map<String, Value>),
}

/// Nesting depth searched for an array inside a keyed envelope.
const MAX_ENVELOPE_DEPTH: usize = 2;

/// Decode a response body into its list of entries.
pub fn decode_list(body: &[u8]) -> Result<Vec<RawCatalogItem>, CatalogError> {
    let envelope: Envelope =
        serde_json::from_slice(body).map_err(|e| CatalogError::Decode(e.to_string()))?;
    match envelope {
        Envelope::Bare(items) | Envelope::Data { data: items } | Envelope::Result { result: items } => {
            Ok(items)
        }
        Envelope::Keyed(map) => find_list(&map, MAX_ENVELOPE_DEPTH)
            .ok_or_else(|| CatalogError::Decode("no list found in response".to_string())),
    }
}

fn find_list(map: &Map<String, Value>, depth: usize) -> Option<Vec<RawCatalogItem>> {
    for value in map.values() {
        if let Value::Array(items) = value {
            if let Ok(list) = serde_json::from_value(Value::Array(items.clone())) {
                return Some(list);
            }
        }
    }
    if depth == 0 {
        return None;
    }
    map.values().find_map(|value| match value {
        Value::Object(inner) => find_list(inner, depth - 1),
        _ => None,
    })
}
