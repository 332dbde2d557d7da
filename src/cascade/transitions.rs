//! Pure state transitions for the selection cascade.
//!
//! Each user action and each list arrival maps the current selection to a
//! complete new one. The controller owns sequencing and I/O; everything that
//! decides which fields survive lives here.
//!
//! Reset rule: a level whose id changes away from a previous non-empty value
//! clears every dependent level (ids and names). A level set from empty does
//! not cascade, so a hydrated selection survives its own restoration.
//!
//! Validation rule: when a dependent list arrives and the selected id is not
//! in it, the id is cleared. Model names go with their id; engine names are
//! kept as a placeholder label.

use crate::catalog::traits::{label_for, CatalogItem};

use super::selection::VehicleSelection;

fn clean(id: Option<&str>) -> Option<String> {
    id.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

fn resolve(items: Option<&[CatalogItem]>, id: Option<&str>) -> Option<String> {
    let id = id?;
    items.and_then(|items| label_for(items, id)).map(str::to_string)
}

fn clear_model(sel: &mut VehicleSelection) {
    sel.model_id = None;
    sel.model_name = None;
    clear_engine(sel);
}

fn clear_engine(sel: &mut VehicleSelection) {
    sel.engine_id = None;
    sel.engine_name = None;
}

/// Restore a whole selection at once. Never cascades.
pub fn hydrate(stored: VehicleSelection) -> VehicleSelection {
    stored.normalized()
}

pub fn reset() -> VehicleSelection {
    VehicleSelection::default()
}

/// `brands` is the loaded brand list, if any; it supplies the label.
pub fn select_brand(
    current: &VehicleSelection,
    id: Option<&str>,
    brands: Option<&[CatalogItem]>,
) -> VehicleSelection {
    let id = clean(id);
    if id.as_deref() == current.brand_id() {
        return current.clone();
    }
    let mut next = current.clone();
    if current.brand_id().is_some() {
        clear_model(&mut next);
    }
    next.brand_name = resolve(brands, id.as_deref());
    next.brand_id = id;
    next
}

/// Ignored while no brand is selected.
pub fn select_model(
    current: &VehicleSelection,
    id: Option<&str>,
    models: Option<&[CatalogItem]>,
) -> VehicleSelection {
    let id = clean(id);
    if id.as_deref() == current.model_id() || (id.is_some() && current.brand_id().is_none()) {
        return current.clone();
    }
    let mut next = current.clone();
    if current.model_id().is_some() {
        clear_engine(&mut next);
    }
    next.model_name = resolve(models, id.as_deref());
    next.model_id = id;
    next
}

/// Ignored while no model is selected.
pub fn select_engine(
    current: &VehicleSelection,
    id: Option<&str>,
    engines: Option<&[CatalogItem]>,
) -> VehicleSelection {
    let id = clean(id);
    if id.as_deref() == current.engine_id() || (id.is_some() && current.model_id().is_none()) {
        return current.clone();
    }
    let mut next = current.clone();
    next.engine_name = resolve(engines, id.as_deref());
    next.engine_id = id;
    next
}

/// Fill a deferred brand label. The brand level has no parent, so its id is
/// never pruned.
pub fn brands_loaded(current: &VehicleSelection, brands: &[CatalogItem]) -> VehicleSelection {
    let mut next = current.clone();
    if next.brand_name().is_none() {
        if let Some(name) = resolve(Some(brands), current.brand_id()) {
            next.brand_name = Some(name);
        }
    }
    next
}

pub fn models_loaded(current: &VehicleSelection, models: &[CatalogItem]) -> VehicleSelection {
    let mut next = current.clone();
    let Some(id) = current.model_id() else {
        return next;
    };
    match label_for(models, id) {
        Some(name) => {
            if next.model_name().is_none() {
                next.model_name = Some(name.to_string());
            }
        }
        None => clear_model(&mut next),
    }
    next
}

pub fn engines_loaded(current: &VehicleSelection, engines: &[CatalogItem]) -> VehicleSelection {
    let mut next = current.clone();
    let Some(id) = current.engine_id() else {
        return next;
    };
    match label_for(engines, id) {
        Some(name) => {
            if next.engine_name().is_none() {
                next.engine_name = Some(name.to_string());
            }
        }
        None => next.engine_id = None,
    }
    next
}
