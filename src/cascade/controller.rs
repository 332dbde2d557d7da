// Selection cascade controller: drives brand → model → engine selection,
// loads each level's options and discards responses from superseded requests.

use std::sync::Arc;

use anyhow::Result;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::level::LevelState;
use super::publisher::{Emission, SelectionObserver, SelectionPublisher};
use super::selection::VehicleSelection;
use super::transitions;
use crate::catalog::traits::{CatalogItem, CatalogLevel, VehicleCatalog};
use crate::store::traits::SelectionStore;

struct Level {
    state: LevelState,
    /// Bumped whenever the parent id changes; a fetch applies only if its
    /// generation is still current.
    generation: u64,
}

impl Level {
    fn new() -> Self {
        Self {
            state: LevelState::Idle,
            generation: 0,
        }
    }

    fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.state = LevelState::Loading;
        self.generation
    }

    fn idle(&mut self) {
        self.generation += 1;
        self.state = LevelState::Idle;
    }
}

struct CascadeState {
    selection: VehicleSelection,
    brands: Level,
    models: Level,
    engines: Level,
}

impl CascadeState {
    fn level_mut(&mut self, level: CatalogLevel) -> &mut Level {
        match level {
            CatalogLevel::Brand => &mut self.brands,
            CatalogLevel::Model => &mut self.models,
            CatalogLevel::Engine => &mut self.engines,
        }
    }
}

/// A fetch scheduled under the state lock, run after it is released.
struct PendingLoad {
    level: CatalogLevel,
    parent: Option<String>,
    generation: u64,
}

struct Inner {
    catalog: Arc<dyn VehicleCatalog>,
    store: Arc<dyn SelectionStore>,
    state: Mutex<CascadeState>,
    publisher: SelectionPublisher,
}

/// Cheap to clone; clones share state, so an action can be spawned while
/// another is still awaiting its fetch.
#[derive(Clone)]
pub struct SelectionController {
    inner: Arc<Inner>,
}

impl SelectionController {
    pub fn new(catalog: Arc<dyn VehicleCatalog>, store: Arc<dyn SelectionStore>) -> Self {
        Self {
            inner: Arc::new(Inner {
                catalog,
                store,
                state: Mutex::new(CascadeState {
                    selection: VehicleSelection::default(),
                    brands: Level::new(),
                    models: Level::new(),
                    engines: Level::new(),
                }),
                publisher: SelectionPublisher::new(),
            }),
        }
    }

    /// Register an observer for de-duplicated selection changes.
    pub fn on_change<F>(&self, observer: F)
    where
        F: Fn(&VehicleSelection) + Send + Sync + 'static,
    {
        let observer: SelectionObserver = Arc::new(observer);
        self.inner.publisher.subscribe(observer);
    }

    pub fn get_state(&self) -> VehicleSelection {
        self.inner.state.lock().selection.clone()
    }

    pub fn brands(&self) -> LevelState {
        self.inner.state.lock().brands.state.clone()
    }

    pub fn models(&self) -> LevelState {
        self.inner.state.lock().models.state.clone()
    }

    pub fn engines(&self) -> LevelState {
        self.inner.state.lock().engines.state.clone()
    }

    /// Restore the persisted selection and load every level it needs.
    pub async fn hydrate(&self) {
        let stored = match self.inner.store.read() {
            Ok(sel) => sel,
            Err(e) => {
                warn!("selection store read failed, starting empty: {}", e);
                VehicleSelection::default()
            }
        };
        info!("hydrating selection {}", stored.to_json());
        self.restore(stored, true).await;
    }

    /// Accept a selection fed back by a downstream consumer. Identical input
    /// is ignored; anything else is restored like a hydration.
    pub async fn sync_from(&self, selection: VehicleSelection) {
        let selection = selection.normalized();
        if selection == self.get_state() {
            debug!("sync_from ignored: selection unchanged");
            return;
        }
        self.restore(selection, false).await;
    }

    async fn restore(&self, stored: VehicleSelection, load_brands: bool) {
        let (emission, loads) = {
            let mut st = self.inner.state.lock();
            let next = transitions::hydrate(stored);
            let mut loads = Vec::new();

            if load_brands || !st.brands.state.is_settled() {
                loads.push(PendingLoad {
                    level: CatalogLevel::Brand,
                    parent: None,
                    generation: st.brands.begin(),
                });
            }
            match next.brand_id() {
                Some(brand) => loads.push(PendingLoad {
                    level: CatalogLevel::Model,
                    parent: Some(brand.to_string()),
                    generation: st.models.begin(),
                }),
                None => st.models.idle(),
            }
            match next.model_id() {
                Some(model) => loads.push(PendingLoad {
                    level: CatalogLevel::Engine,
                    parent: Some(model.to_string()),
                    generation: st.engines.begin(),
                }),
                None => st.engines.idle(),
            }

            (self.commit(&mut st, next), loads)
        };
        if let Some(emission) = emission {
            emission.deliver();
        }

        let mut tasks = Vec::with_capacity(loads.len());
        for load in loads {
            let this = self.clone();
            tasks.push(tokio::spawn(async move { this.run_load(load).await }));
        }
        for task in tasks {
            if let Err(e) = task.await {
                warn!("level load task failed: {}", e);
            }
        }
    }

    pub async fn select_brand(&self, id: &str) {
        let (emission, load) = {
            let mut st = self.inner.state.lock();
            let next = transitions::select_brand(&st.selection, Some(id), st.brands.state.items());
            if next == st.selection {
                return;
            }
            if next.model_id().is_none() {
                st.engines.idle();
            }
            let load = match next.brand_id() {
                Some(brand) => Some(PendingLoad {
                    level: CatalogLevel::Model,
                    parent: Some(brand.to_string()),
                    generation: st.models.begin(),
                }),
                None => {
                    st.models.idle();
                    None
                }
            };
            (self.commit(&mut st, next), load)
        };
        if let Some(emission) = emission {
            emission.deliver();
        }
        if let Some(load) = load {
            self.run_load(load).await;
        }
    }

    /// No effect until a brand is selected.
    pub async fn select_model(&self, id: &str) {
        let (emission, load) = {
            let mut st = self.inner.state.lock();
            let next = transitions::select_model(&st.selection, Some(id), st.models.state.items());
            if next == st.selection {
                return;
            }
            let load = match next.model_id() {
                Some(model) => Some(PendingLoad {
                    level: CatalogLevel::Engine,
                    parent: Some(model.to_string()),
                    generation: st.engines.begin(),
                }),
                None => {
                    st.engines.idle();
                    None
                }
            };
            (self.commit(&mut st, next), load)
        };
        if let Some(emission) = emission {
            emission.deliver();
        }
        if let Some(load) = load {
            self.run_load(load).await;
        }
    }

    /// No effect until a model is selected.
    pub async fn select_engine(&self, id: &str) {
        let emission = {
            let mut st = self.inner.state.lock();
            let next = transitions::select_engine(&st.selection, Some(id), st.engines.state.items());
            if next == st.selection {
                return;
            }
            self.commit(&mut st, next)
        };
        if let Some(emission) = emission {
            emission.deliver();
        }
    }

    /// Clear every level. Loaded brands are kept; in-flight model and engine
    /// fetches become stale.
    pub fn reset(&self) {
        let emission = {
            let mut st = self.inner.state.lock();
            st.models.idle();
            st.engines.idle();
            self.commit(&mut st, transitions::reset())
        };
        if let Some(emission) = emission {
            emission.deliver();
        }
    }

    async fn fetch(&self, level: CatalogLevel, parent: Option<&str>) -> Result<Vec<CatalogItem>> {
        let catalog = &self.inner.catalog;
        match (level, parent) {
            (CatalogLevel::Brand, _) => catalog.list_brands().await,
            (CatalogLevel::Model, Some(brand)) => catalog.list_models(brand).await,
            (CatalogLevel::Engine, Some(model)) => catalog.list_engines(model).await,
            (_, None) => Ok(Vec::new()),
        }
    }

    async fn run_load(&self, load: PendingLoad) {
        let parent = load.parent.as_deref().unwrap_or("-");
        let state = match self.fetch(load.level, load.parent.as_deref()).await {
            Ok(items) => {
                debug!(
                    "{} list fetched parent={} count={}",
                    load.level.as_str(),
                    parent,
                    items.len()
                );
                LevelState::Loaded(items)
            }
            Err(e) => {
                warn!("{} list fetch failed parent={}: {}", load.level.as_str(), parent, e);
                LevelState::Error
            }
        };

        let emission = {
            let mut st = self.inner.state.lock();
            if st.level_mut(load.level).generation != load.generation {
                debug!(
                    "discarding stale {} list parent={} generation={}",
                    load.level.as_str(),
                    parent,
                    load.generation
                );
                return;
            }
            let items = state.items().map(<[CatalogItem]>::to_vec).unwrap_or_default();
            st.level_mut(load.level).state = state;

            let next = match load.level {
                CatalogLevel::Brand => transitions::brands_loaded(&st.selection, &items),
                CatalogLevel::Model => transitions::models_loaded(&st.selection, &items),
                CatalogLevel::Engine => transitions::engines_loaded(&st.selection, &items),
            };
            if load.level == CatalogLevel::Model && next.model_id().is_none() {
                if let Some(model) = st.selection.model_id() {
                    info!("model {} not offered for brand {}, cleared", model, parent);
                    st.engines.idle();
                }
            }
            if next == st.selection {
                None
            } else {
                self.commit(&mut st, next)
            }
        };
        if let Some(emission) = emission {
            emission.deliver();
        }
    }

    /// Install `next`, persist it and decide whether to publish. Called with
    /// the state lock held; the returned emission is delivered after release.
    fn commit(&self, st: &mut CascadeState, next: VehicleSelection) -> Option<Emission> {
        if next != st.selection {
            st.selection = next;
            if let Err(e) = self.inner.store.write(&st.selection) {
                debug!("selection persist failed (ignored): {}", e);
            }
        }
        self.inner.publisher.prepare(&st.selection)
    }
}
