//! Product/vehicle fitment predicate.
//!
//! Structured suitability entries are preferred; a product without any falls
//! back to its free-text compatibility string. Missing or malformed data
//! never excludes a product: the matcher is total and permissive.

use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::Value;

use super::heuristics::{
    contains_ci, contains_token, has_universal_marker, is_generic_engine_range, BrandAliases,
};
use super::record::{FitmentRecord, SubSuitability, Suitability};
use crate::cascade::selection::VehicleSelection;

static DEFAULT_MATCHER: Lazy<FitmentMatcher> = Lazy::new(FitmentMatcher::default);

/// Which branch decided a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPath {
    EmptySelection,
    Structured,
    FreeText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOutcome {
    pub matched: bool,
    pub path: MatchPath,
}

#[derive(Debug, Clone, Default)]
pub struct FitmentMatcher {
    aliases: BrandAliases,
}

impl FitmentMatcher {
    pub fn new(aliases: BrandAliases) -> Self {
        Self { aliases }
    }

    pub fn matches(&self, product: &Value, selection: &VehicleSelection) -> bool {
        self.evaluate(product, selection).matched
    }

    pub fn evaluate(&self, product: &Value, selection: &VehicleSelection) -> MatchOutcome {
        if selection.is_empty() {
            return MatchOutcome {
                matched: true,
                path: MatchPath::EmptySelection,
            };
        }
        match FitmentRecord::from_product(product) {
            FitmentRecord::Structured(entries) => MatchOutcome {
                matched: entries.iter().any(|e| self.entry_matches(e, selection)),
                path: MatchPath::Structured,
            },
            FitmentRecord::FreeText(text) => MatchOutcome {
                matched: self.text_matches(&text, selection),
                path: MatchPath::FreeText,
            },
        }
    }

    fn brand_matches(&self, entry: &Suitability, sel: &VehicleSelection) -> bool {
        if let (Some(selected), Some(entry_brand)) = (sel.brand_id(), entry.brand_id.as_deref()) {
            return selected == entry_brand;
        }
        match sel.brand_name() {
            Some(name) => self.aliases.brand_in(&entry.descriptor, name),
            None => true,
        }
    }

    fn entry_matches(&self, entry: &Suitability, sel: &VehicleSelection) -> bool {
        if !self.brand_matches(entry, sel) {
            return false;
        }
        if !sel.has_model() {
            return true;
        }
        entry.sub_models.iter().any(|sub| sub_matches(sub, sel))
    }

    fn text_matches(&self, text: &str, sel: &VehicleSelection) -> bool {
        if text.is_empty() || has_universal_marker(text) {
            return true;
        }
        let brand_ok = sel
            .brand_name()
            .map_or(true, |brand| self.aliases.brand_in(text, brand));
        let model_ok = sel.model_name().map_or(true, |model| contains_ci(text, model));
        let engine_ok = sel
            .engine_name()
            .map_or(true, |engine| contains_token(text, &engine.to_lowercase()));
        brand_ok && model_ok && engine_ok
    }
}

fn sub_matches(sub: &SubSuitability, sel: &VehicleSelection) -> bool {
    let model_ok = sel
        .model_id()
        .is_some_and(|id| sub.model_ids.iter().any(|m| m == id))
        || sel
            .model_name()
            .is_some_and(|name| contains_ci(&sub.descriptor, name));
    if !model_ok {
        return false;
    }
    if !sel.has_engine() {
        return true;
    }
    sel.engine_id()
        .is_some_and(|id| sub.engine_ids.iter().any(|e| e == id))
        || sel
            .engine_name()
            .is_some_and(|name| contains_ci(&sub.descriptor, name))
        || is_generic_engine_range(&sub.descriptor)
}

/// Match with the default brand alias table.
pub fn matches(product: &Value, selection: &VehicleSelection) -> bool {
    DEFAULT_MATCHER.matches(product, selection)
}
