// Text tests used by the matcher. All inputs are expected lower-cased.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::UNIVERSAL_MARKERS;

/// An engine descriptor that covers every engine variant: a power range with
/// a unit (`95 - 340 PS`, `66-110 kW`) or an explicit universal marker.
static GENERIC_ENGINE_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:\d+(?:[.,]\d+)?\s*(?:-|–|—|to)\s*\d+(?:[.,]\d+)?\s*(?:ps|kw|hp|cv)\b|\ball engines\b|\buniversal\b)",
    )
    .expect("generic engine range pattern")
});

pub fn is_generic_engine_range(descriptor: &str) -> bool {
    GENERIC_ENGINE_RANGE.is_match(descriptor)
}

pub fn has_universal_marker(text: &str) -> bool {
    UNIVERSAL_MARKERS.iter().any(|m| text.contains(m))
}

/// Case-insensitive substring test.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    !needle.is_empty() && haystack.to_lowercase().contains(&needle)
}

/// `needle` occurs bounded by non-alphanumerics or the string edges.
pub fn contains_token(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Groups of interchangeable brand names.
#[derive(Debug, Clone)]
pub struct BrandAliases {
    groups: Vec<Vec<String>>,
}

impl BrandAliases {
    pub fn new(groups: Vec<Vec<String>>) -> Self {
        let groups = groups
            .into_iter()
            .map(|g| {
                g.into_iter()
                    .map(|name| name.trim().to_lowercase())
                    .filter(|name| !name.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|g| g.len() > 1)
            .collect();
        Self { groups }
    }

    /// Other names for `brand` (lower-cased), excluding itself.
    pub fn alternatives<'a>(&'a self, brand: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.groups
            .iter()
            .filter(move |g| g.iter().any(|name| name == brand))
            .flat_map(|g| g.iter())
            .map(String::as_str)
            .filter(move |name| *name != brand)
    }

    /// Brand name or one of its aliases appears in `text`.
    pub fn brand_in(&self, text: &str, brand: &str) -> bool {
        let brand = brand.trim().to_lowercase();
        if brand.is_empty() {
            return false;
        }
        let text = text.to_lowercase();
        text.contains(&brand) || self.alternatives(&brand).any(|alias| text.contains(alias))
    }
}

impl Default for BrandAliases {
    fn default() -> Self {
        Self::new(crate::config::default_brand_aliases())
    }
}
