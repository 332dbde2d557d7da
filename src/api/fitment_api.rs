use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc;

use crate::cascade::controller::SelectionController;
use crate::cascade::quick_filter::{QuickFilter, QuickFilterPublisher};
use crate::cascade::selection::VehicleSelection;
use crate::catalog::http_catalog::HttpCatalog;
use crate::catalog::manufacturer_cache::ManufacturerCache;
use crate::catalog::traits::VehicleCatalog;
use crate::config::FitmentConfig;
use crate::fitment::heuristics::BrandAliases;
use crate::fitment::matcher::{self, FitmentMatcher};
use crate::fitment::stats::FilterStats;
use crate::store::file_store::FileStore;
use crate::store::memory_store::MemoryStore;
use crate::store::traits::SelectionStore;

/// HTTP catalog behind the manufacturer cache, as configured.
pub fn create_catalog(config: &FitmentConfig) -> Arc<ManufacturerCache> {
    let http: Arc<dyn VehicleCatalog> = Arc::new(HttpCatalog::new(&config.catalog));
    Arc::new(ManufacturerCache::new(
        http,
        Duration::from_secs(config.manufacturer_ttl_secs),
    ))
}

/// Controller wired to the configured catalog and store. An empty
/// `store_dir` keeps the selection in memory only.
pub fn create_controller(config: &FitmentConfig) -> SelectionController {
    let store: Arc<dyn SelectionStore> = if config.store_dir.is_empty() {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(FileStore::new(Path::new(&config.store_dir)))
    };
    SelectionController::new(create_catalog(config), store)
}

pub fn create_matcher(config: &FitmentConfig) -> FitmentMatcher {
    FitmentMatcher::new(BrandAliases::new(config.brand_aliases.clone()))
}

pub fn create_quick_filter(
    config: &FitmentConfig,
) -> (QuickFilterPublisher, mpsc::UnboundedReceiver<QuickFilter>) {
    QuickFilterPublisher::new(Duration::from_millis(config.quick_filter_debounce_ms))
}

/// Products that fit `selection`, in input order.
pub fn filter_products(products: &[Value], selection: &VehicleSelection) -> Vec<Value> {
    products
        .iter()
        .filter(|p| matcher::matches(p, selection))
        .cloned()
        .collect()
}

/// Like `filter_products`, recording each decision into `stats`.
pub fn filter_products_with_stats(
    matcher: &FitmentMatcher,
    products: &[Value],
    selection: &VehicleSelection,
    stats: &FilterStats,
) -> Vec<Value> {
    products
        .iter()
        .filter(|p| {
            let outcome = matcher.evaluate(p, selection);
            stats.record(outcome);
            outcome.matched
        })
        .cloned()
        .collect()
}
