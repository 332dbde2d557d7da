// Selection cascade behavior against an in-memory catalog.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::Mutex;

use parts_fitment::cascade::level::LevelState;
use parts_fitment::catalog::traits::{CatalogItem, VehicleCatalog};
use parts_fitment::store::memory_store::MemoryStore;
use parts_fitment::store::traits::SelectionStore;
use parts_fitment::{SelectionController, VehicleSelection};

#[derive(Default)]
struct FakeCatalog {
    brands: Vec<CatalogItem>,
    models: HashMap<String, Vec<CatalogItem>>,
    engines: HashMap<String, Vec<CatalogItem>>,
    /// Response delay per parent id.
    delays: HashMap<String, Duration>,
    failing: HashSet<String>,
    calls: AtomicUsize,
}

impl FakeCatalog {
    fn standard() -> Self {
        let mut models = HashMap::new();
        models.insert(
            "5".to_string(),
            vec![CatalogItem::new("9", "Golf"), CatalogItem::new("10", "Passat")],
        );
        models.insert("6".to_string(), vec![CatalogItem::new("20", "A4")]);
        let mut engines = HashMap::new();
        engines.insert(
            "9".to_string(),
            vec![CatalogItem::new("2", "2.0 TDI"), CatalogItem::new("3", "1.4 TSI")],
        );
        engines.insert("10".to_string(), vec![CatalogItem::new("4", "1.6 TDI")]);
        engines.insert("20".to_string(), vec![CatalogItem::new("7", "2.0 TFSI")]);
        Self {
            brands: vec![CatalogItem::new("5", "VW"), CatalogItem::new("6", "Audi")],
            models,
            engines,
            ..Default::default()
        }
    }

    fn delay(mut self, parent: &str, ms: u64) -> Self {
        self.delays
            .insert(parent.to_string(), Duration::from_millis(ms));
        self
    }

    fn fail(mut self, parent: &str) -> Self {
        self.failing.insert(parent.to_string());
        self
    }

    async fn respond(
        &self,
        parent: &str,
        table: &HashMap<String, Vec<CatalogItem>>,
    ) -> Result<Vec<CatalogItem>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(parent) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(parent) {
            return Err(anyhow!("catalog unavailable for {}", parent));
        }
        Ok(table.get(parent).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl VehicleCatalog for FakeCatalog {
    async fn list_brands(&self) -> Result<Vec<CatalogItem>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.brands.clone())
    }

    async fn list_models(&self, brand_id: &str) -> Result<Vec<CatalogItem>> {
        self.respond(brand_id, &self.models).await
    }

    async fn list_engines(&self, model_id: &str) -> Result<Vec<CatalogItem>> {
        self.respond(model_id, &self.engines).await
    }
}

fn full_selection() -> VehicleSelection {
    VehicleSelection {
        brand_id: Some("5".into()),
        brand_name: Some("VW".into()),
        model_id: Some("9".into()),
        model_name: Some("Golf".into()),
        engine_id: Some("2".into()),
        engine_name: Some("2.0 TDI".into()),
    }
}

fn record(ctrl: &SelectionController) -> Arc<Mutex<Vec<VehicleSelection>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    ctrl.on_change(move |sel| sink.lock().push(sel.clone()));
    seen
}

#[tokio::test(start_paused = true)]
async fn test_stale_model_list_is_discarded() {
    let catalog = Arc::new(FakeCatalog::standard().delay("5", 100));
    let ctrl = SelectionController::new(catalog, Arc::new(MemoryStore::new()));
    ctrl.hydrate().await;
    let seen = record(&ctrl);

    let slow = {
        let ctrl = ctrl.clone();
        tokio::spawn(async move { ctrl.select_brand("5").await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(ctrl.models().is_loading());

    ctrl.select_brand("6").await;
    slow.await.unwrap();

    let state = ctrl.get_state();
    assert_eq!(state.brand_id(), Some("6"));
    assert_eq!(state.brand_name(), Some("Audi"));
    assert_eq!(state.model_id(), None);
    assert_eq!(ctrl.models(), LevelState::Loaded(vec![CatalogItem::new("20", "A4")]));
    assert!(seen.lock().iter().all(|s| s.model_id().is_none()));
}

#[tokio::test(start_paused = true)]
async fn test_stale_engine_list_is_discarded() {
    let catalog = Arc::new(FakeCatalog::standard().delay("9", 100));
    let ctrl = SelectionController::new(catalog, Arc::new(MemoryStore::new()));
    ctrl.hydrate().await;
    ctrl.select_brand("5").await;

    let slow = {
        let ctrl = ctrl.clone();
        tokio::spawn(async move { ctrl.select_model("9").await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    ctrl.select_model("10").await;
    slow.await.unwrap();

    assert_eq!(ctrl.get_state().model_name(), Some("Passat"));
    assert_eq!(ctrl.engines(), LevelState::Loaded(vec![CatalogItem::new("4", "1.6 TDI")]));
}

#[tokio::test(start_paused = true)]
async fn test_hydration_keeps_levels_then_user_change_cascades() {
    let store = Arc::new(MemoryStore::with_selection(&full_selection()));
    let ctrl = SelectionController::new(Arc::new(FakeCatalog::standard()), store.clone());
    ctrl.hydrate().await;

    assert_eq!(ctrl.get_state(), full_selection());
    assert!(ctrl.brands().is_settled());
    assert!(ctrl.models().is_settled());
    assert!(ctrl.engines().is_settled());

    ctrl.select_brand("6").await;
    let state = ctrl.get_state();
    assert_eq!(state.brand_id(), Some("6"));
    assert_eq!(state.model_id(), None);
    assert_eq!(state.model_name(), None);
    assert_eq!(state.engine_id(), None);
    assert_eq!(state.engine_name(), None);
    assert_eq!(ctrl.engines(), LevelState::Idle);
    assert_eq!(store.read().unwrap(), state);
}

#[tokio::test(start_paused = true)]
async fn test_invalid_engine_keeps_name() {
    let mut stored = full_selection();
    stored.engine_id = Some("99".into());
    let store = Arc::new(MemoryStore::with_selection(&stored));
    let ctrl = SelectionController::new(Arc::new(FakeCatalog::standard()), store);
    ctrl.hydrate().await;

    let state = ctrl.get_state();
    assert_eq!(state.model_id(), Some("9"));
    assert_eq!(state.engine_id(), None);
    assert_eq!(state.engine_name(), Some("2.0 TDI"));
}

#[tokio::test(start_paused = true)]
async fn test_invalid_model_clears_model_and_engine() {
    let mut stored = full_selection();
    stored.model_id = Some("77".into());
    let store = Arc::new(MemoryStore::with_selection(&stored));
    let ctrl = SelectionController::new(Arc::new(FakeCatalog::standard()), store);
    ctrl.hydrate().await;

    let state = ctrl.get_state();
    assert_eq!(state.brand_id(), Some("5"));
    assert_eq!(state.model_id(), None);
    assert_eq!(state.model_name(), None);
    assert!(!state.has_engine());
    assert_eq!(ctrl.engines(), LevelState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_labels_resolved_from_loaded_lists() {
    let ctrl = SelectionController::new(
        Arc::new(FakeCatalog::standard()),
        Arc::new(MemoryStore::new()),
    );
    ctrl.hydrate().await;
    ctrl.select_brand("5").await;
    ctrl.select_model("10").await;
    ctrl.select_engine("4").await;

    let state = ctrl.get_state();
    assert_eq!(state.brand_name(), Some("VW"));
    assert_eq!(state.model_name(), Some("Passat"));
    assert_eq!(state.engine_name(), Some("1.6 TDI"));
}

#[tokio::test(start_paused = true)]
async fn test_label_deferred_until_list_loads() {
    let catalog = Arc::new(FakeCatalog::standard().delay("5", 100));
    let ctrl = SelectionController::new(catalog, Arc::new(MemoryStore::new()));
    ctrl.hydrate().await;

    let brand = {
        let ctrl = ctrl.clone();
        tokio::spawn(async move { ctrl.select_brand("5").await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    ctrl.select_model("9").await;
    assert_eq!(ctrl.get_state().model_id(), Some("9"));
    assert_eq!(ctrl.get_state().model_name(), None);

    brand.await.unwrap();
    assert_eq!(ctrl.get_state().model_name(), Some("Golf"));
}

#[tokio::test(start_paused = true)]
async fn test_fetch_failure_degrades_to_empty() {
    let catalog = Arc::new(FakeCatalog::standard().fail("6"));
    let ctrl = SelectionController::new(catalog, Arc::new(MemoryStore::new()));
    ctrl.hydrate().await;
    ctrl.select_brand("6").await;

    assert_eq!(ctrl.models(), LevelState::Error);
    assert_eq!(ctrl.models().items(), Some(&[][..]));
    assert_eq!(ctrl.get_state().brand_id(), Some("6"));
}

#[tokio::test(start_paused = true)]
async fn test_model_requires_brand() {
    let ctrl = SelectionController::new(
        Arc::new(FakeCatalog::standard()),
        Arc::new(MemoryStore::new()),
    );
    ctrl.hydrate().await;
    ctrl.select_model("9").await;
    ctrl.select_engine("2").await;
    assert!(ctrl.get_state().is_empty());
    assert_eq!(ctrl.engines(), LevelState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_every_change_is_persisted_and_write_failures_ignored() {
    let store = Arc::new(MemoryStore::new());
    let ctrl = SelectionController::new(Arc::new(FakeCatalog::standard()), store.clone());
    ctrl.hydrate().await;
    ctrl.select_brand("5").await;
    ctrl.select_model("9").await;
    ctrl.select_engine("2").await;
    assert_eq!(store.read().unwrap(), full_selection());
    assert_eq!(store.write_count(), 3);

    let ctrl = SelectionController::new(
        Arc::new(FakeCatalog::standard()),
        Arc::new(MemoryStore::failing()),
    );
    ctrl.hydrate().await;
    ctrl.select_brand("5").await;
    assert_eq!(ctrl.get_state().brand_id(), Some("5"));
}

#[tokio::test(start_paused = true)]
async fn test_corrupt_store_hydrates_empty() {
    let store = Arc::new(MemoryStore::new());
    store.set_raw("{not json");
    let ctrl = SelectionController::new(Arc::new(FakeCatalog::standard()), store);
    ctrl.hydrate().await;
    assert!(ctrl.get_state().is_empty());
    assert!(ctrl.brands().is_settled());
}

#[tokio::test(start_paused = true)]
async fn test_emissions_are_deduplicated() {
    let ctrl = SelectionController::new(
        Arc::new(FakeCatalog::standard()),
        Arc::new(MemoryStore::with_selection(&full_selection())),
    );
    let seen = record(&ctrl);
    ctrl.hydrate().await;
    assert_eq!(seen.lock().len(), 1);

    // A consumer echoing the selection back must not trigger another emission.
    ctrl.sync_from(full_selection()).await;
    ctrl.select_brand("5").await;
    assert_eq!(seen.lock().len(), 1);

    ctrl.select_engine("3").await;
    assert_eq!(seen.lock().len(), 2);
    assert_eq!(seen.lock()[1].engine_name(), Some("1.4 TSI"));
}

#[tokio::test(start_paused = true)]
async fn test_sync_from_restores_without_cascade() {
    let ctrl = SelectionController::new(
        Arc::new(FakeCatalog::standard()),
        Arc::new(MemoryStore::new()),
    );
    ctrl.hydrate().await;
    ctrl.select_brand("6").await;

    ctrl.sync_from(full_selection()).await;
    assert_eq!(ctrl.get_state(), full_selection());
    assert!(ctrl.engines().is_settled());
}

#[tokio::test(start_paused = true)]
async fn test_reset_clears_everything() {
    let store = Arc::new(MemoryStore::with_selection(&full_selection()));
    let ctrl = SelectionController::new(Arc::new(FakeCatalog::standard()), store.clone());
    ctrl.hydrate().await;
    let seen = record(&ctrl);

    ctrl.reset();
    assert!(ctrl.get_state().is_empty());
    assert_eq!(ctrl.models(), LevelState::Idle);
    assert_eq!(ctrl.engines(), LevelState::Idle);
    assert!(ctrl.brands().is_settled());
    assert!(store.read().unwrap().is_empty());
    assert_eq!(seen.lock().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_reset_discards_in_flight_models() {
    let catalog = Arc::new(FakeCatalog::standard().delay("5", 100));
    let ctrl = SelectionController::new(catalog, Arc::new(MemoryStore::new()));
    ctrl.hydrate().await;

    let slow = {
        let ctrl = ctrl.clone();
        tokio::spawn(async move { ctrl.select_brand("5").await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    ctrl.reset();
    slow.await.unwrap();

    assert_eq!(ctrl.models(), LevelState::Idle);
    assert!(ctrl.get_state().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_observers_end_on_latest_selection_across_threads() {
    let catalog = Arc::new(FakeCatalog::standard().delay("5", 100));
    let ctrl = SelectionController::new(catalog, Arc::new(MemoryStore::new()));
    let last = Arc::new(Mutex::new(None::<VehicleSelection>));
    let sink = last.clone();
    ctrl.on_change(move |sel| {
        if sel.brand_id() == Some("5") {
            // Slow observer holding up the older emission.
            std::thread::sleep(Duration::from_millis(200));
        }
        *sink.lock() = Some(sel.clone());
    });

    let slow = {
        let ctrl = ctrl.clone();
        tokio::spawn(async move { ctrl.select_brand("5").await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    ctrl.reset();
    slow.await.unwrap();

    let state = ctrl.get_state();
    assert!(state.is_empty());
    assert_eq!(last.lock().clone(), Some(state));
}
