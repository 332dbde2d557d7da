// Shared manufacturer (brand) list cache with a fixed TTL and a single
// in-flight request shared by concurrent callers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::traits::{CatalogItem, VehicleCatalog};

type SharedFetch = Shared<BoxFuture<'static, Result<Arc<Vec<CatalogItem>>, Arc<anyhow::Error>>>>;

struct Inflight {
    id: u64,
    epoch: u64,
    request: SharedFetch,
}

/// Holds the single outstanding upstream request and the invalidation epoch.
/// Clones share both, so caches built on one guard share requests and
/// invalidations (or a test can swap in a fresh guard).
#[derive(Clone, Default)]
pub struct InflightGuard {
    epoch: Arc<AtomicU64>,
    next_id: Arc<AtomicU64>,
    slot: Arc<Mutex<Option<Inflight>>>,
}

impl InflightGuard {
    pub fn new() -> Self {
        Self::default()
    }

    fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    /// Clear the slot if it still holds request `id`.
    fn release(&self, id: u64) {
        let mut slot = self.slot.lock();
        if slot.as_ref().is_some_and(|inflight| inflight.id == id) {
            *slot = None;
        }
    }
}

struct CachedBrands {
    items: Vec<CatalogItem>,
    fetched_at: Instant,
    epoch: u64,
}

pub struct ManufacturerCache {
    inner: Arc<dyn VehicleCatalog>,
    ttl: Duration,
    guard: InflightGuard,
    entry: RwLock<Option<CachedBrands>>,
}

impl ManufacturerCache {
    pub fn new(inner: Arc<dyn VehicleCatalog>, ttl: Duration) -> Self {
        Self::with_guard(inner, ttl, InflightGuard::new())
    }

    pub fn with_guard(inner: Arc<dyn VehicleCatalog>, ttl: Duration, guard: InflightGuard) -> Self {
        Self {
            inner,
            ttl,
            guard,
            entry: RwLock::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn fresh(&self) -> Option<Vec<CatalogItem>> {
        let entry = self.entry.read();
        let cached = entry.as_ref()?;
        if cached.epoch != self.guard.epoch() {
            return None;
        }
        if cached.fetched_at.elapsed() >= self.ttl {
            return None;
        }
        Some(cached.items.clone())
    }

    fn start_fetch(&self) -> SharedFetch {
        let inner = self.inner.clone();
        async move {
            match inner.list_brands().await {
                Ok(items) => {
                    info!("manufacturer list fetched count={}", items.len());
                    Ok(Arc::new(items))
                }
                Err(e) => {
                    warn!("manufacturer list fetch failed: {}", e);
                    Err(Arc::new(e))
                }
            }
        }
        .boxed()
        .shared()
    }

    /// Return the cached list, fetching it if absent, expired or invalidated.
    /// Concurrent callers all resolve from the same upstream request, whether
    /// it succeeds or fails.
    pub async fn get(&self) -> Result<Vec<CatalogItem>> {
        if let Some(items) = self.fresh() {
            return Ok(items);
        }

        let (id, epoch, request) = {
            let mut slot = self.guard.slot.lock();
            // The entry is written before the slot is released.
            if let Some(items) = self.fresh() {
                return Ok(items);
            }
            let epoch = self.guard.epoch();
            match slot.as_ref() {
                Some(inflight) if inflight.epoch == epoch => {
                    debug!("joining in-flight manufacturer request id={}", inflight.id);
                    (inflight.id, epoch, inflight.request.clone())
                }
                _ => {
                    let id = self.guard.next_id.fetch_add(1, Ordering::Relaxed);
                    let request = self.start_fetch();
                    *slot = Some(Inflight {
                        id,
                        epoch,
                        request: request.clone(),
                    });
                    (id, epoch, request)
                }
            }
        };

        let result = request.await;
        if let Ok(items) = &result {
            if self.guard.epoch() == epoch {
                *self.entry.write() = Some(CachedBrands {
                    items: items.as_ref().clone(),
                    fetched_at: Instant::now(),
                    epoch,
                });
            }
        }
        self.guard.release(id);

        match result {
            Ok(items) => Ok(items.as_ref().clone()),
            Err(e) => Err(anyhow!("{:#}", e)),
        }
    }

    /// Drop the cached list. Requests already in flight are not joined or
    /// stored afterwards.
    pub fn invalidate(&self) {
        self.guard.epoch.fetch_add(1, Ordering::AcqRel);
        *self.entry.write() = None;
    }

    /// Invalidate, then fetch again.
    pub async fn refresh(&self) -> Result<Vec<CatalogItem>> {
        self.invalidate();
        self.get().await
    }
}

#[async_trait]
impl VehicleCatalog for ManufacturerCache {
    async fn list_brands(&self) -> Result<Vec<CatalogItem>> {
        self.get().await
    }

    async fn list_models(&self, brand_id: &str) -> Result<Vec<CatalogItem>> {
        self.inner.list_models(brand_id).await
    }

    async fn list_engines(&self, model_id: &str) -> Result<Vec<CatalogItem>> {
        self.inner.list_engines(model_id).await
    }
}
