use std::collections::HashMap;

use anyhow::{anyhow, Result};
use serde::Deserialize;

/// Fixed key under which the single selection record is persisted.
pub const SELECTION_STORAGE_KEY: &str = "vehicle_selection";

/// Delay before a quick-filter change is published.
pub const QUICK_FILTER_DEBOUNCE_MS: u64 = 200;

/// Lifetime of the cached manufacturer (brand) list.
pub const MANUFACTURER_CACHE_TTL_SECS: u64 = 600;

/// Product fields that may carry free-text compatibility, in lookup order.
pub const COMPATIBILITY_FIELDS: &[&str] = &[
    "compatibility",
    "compatibilities",
    "vehicle_compatibility",
    "compatible_vehicles",
    "fitment",
    "fitments",
    "fits",
];

/// Markers that make a free-text compatibility string match any vehicle.
pub const UNIVERSAL_MARKERS: &[&str] = &["universal", "all vehicles", "all cars", "fits all"];

/// Initial brand alias groups. Every name in a group is accepted for the others.
pub fn default_brand_aliases() -> Vec<Vec<String>> {
    vec![
        vec!["vw".to_string(), "volkswagen".to_string()],
        vec![
            "mercedes".to_string(),
            "mb".to_string(),
            "mercedes-benz".to_string(),
        ],
    ]
}

/// Upstream catalog endpoint layout. `{id}` is replaced by the parent id.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: String,
    pub brands_path: String,
    pub models_path: String,
    pub engines_path: String,
    /// Extra request headers (auth tokens, locale).
    pub headers: HashMap<String, String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            brands_path: "/brands".to_string(),
            models_path: "/brands/{id}/models".to_string(),
            engines_path: "/models/{id}/sub-models".to_string(),
            headers: HashMap::new(),
        }
    }
}

/// Top-level configuration for the fitment subsystem.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FitmentConfig {
    pub catalog: CatalogConfig,
    /// Directory holding the persisted selection file.
    pub store_dir: String,
    pub manufacturer_ttl_secs: u64,
    pub quick_filter_debounce_ms: u64,
    pub brand_aliases: Vec<Vec<String>>,
}

impl Default for FitmentConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig::default(),
            store_dir: String::new(),
            manufacturer_ttl_secs: MANUFACTURER_CACHE_TTL_SECS,
            quick_filter_debounce_ms: QUICK_FILTER_DEBOUNCE_MS,
            brand_aliases: default_brand_aliases(),
        }
    }
}

impl FitmentConfig {
    /// Parse a JSON document; missing fields keep their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| anyhow!("invalid fitment config: {}", e))
    }
}
