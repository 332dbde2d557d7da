use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The three dependent selection levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogLevel {
    Brand,
    Model,
    Engine,
}

impl CatalogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogLevel::Brand => "brand",
            CatalogLevel::Model => "model",
            CatalogLevel::Engine => "engine",
        }
    }
}

/// Canonical brand, model or engine (sub-model) record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_2: Option<i32>,
}

impl CatalogItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            year: None,
            year_2: None,
        }
    }

    pub fn with_years(mut self, year: Option<i32>, year_2: Option<i32>) -> Self {
        self.year = year;
        self.year_2 = year_2;
        self
    }

    /// Model-year range, e.g. `2012` or `2012–2019`.
    pub fn year_range(&self) -> Option<String> {
        match (self.year, self.year_2) {
            (Some(a), Some(b)) if a == b => Some(a.to_string()),
            (Some(a), Some(b)) => Some(format!("{}–{}", a, b)),
            (Some(a), None) | (None, Some(a)) => Some(a.to_string()),
            (None, None) => None,
        }
    }

    /// Option label shown to the shopper.
    pub fn display_label(&self) -> String {
        match self.year_range() {
            Some(range) => format!("{} ({})", self.name, range),
            None => self.name.clone(),
        }
    }
}

/// Find the display name for `id` in a loaded list.
pub fn label_for<'a>(items: &'a [CatalogItem], id: &str) -> Option<&'a str> {
    items
        .iter()
        .find(|item| item.id == id)
        .map(|item| item.name.as_str())
}

#[async_trait]
pub trait VehicleCatalog: Send + Sync {
    async fn list_brands(&self) -> Result<Vec<CatalogItem>>;
    async fn list_models(&self, brand_id: &str) -> Result<Vec<CatalogItem>>;
    async fn list_engines(&self, model_id: &str) -> Result<Vec<CatalogItem>>;
}
