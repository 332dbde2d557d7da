use serde::{Deserialize, Serialize};

/// The published and persisted vehicle selection. Every field is optional and
/// independently settable; the cascade keeps ids consistent across levels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleSelection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_name: Option<String>,
}

fn present(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl VehicleSelection {
    pub fn brand_id(&self) -> Option<&str> {
        present(&self.brand_id)
    }

    pub fn brand_name(&self) -> Option<&str> {
        present(&self.brand_name)
    }

    pub fn model_id(&self) -> Option<&str> {
        present(&self.model_id)
    }

    pub fn model_name(&self) -> Option<&str> {
        present(&self.model_name)
    }

    pub fn engine_id(&self) -> Option<&str> {
        present(&self.engine_id)
    }

    pub fn engine_name(&self) -> Option<&str> {
        present(&self.engine_name)
    }

    pub fn has_brand(&self) -> bool {
        self.brand_id().is_some() || self.brand_name().is_some()
    }

    pub fn has_model(&self) -> bool {
        self.model_id().is_some() || self.model_name().is_some()
    }

    pub fn has_engine(&self) -> bool {
        self.engine_id().is_some() || self.engine_name().is_some()
    }

    /// No level is selected, by id or by name.
    pub fn is_empty(&self) -> bool {
        !self.has_brand() && !self.has_model() && !self.has_engine()
    }

    /// Blank strings become `None` so that `""` and absent compare equal.
    pub fn normalized(mut self) -> Self {
        for field in [
            &mut self.brand_id,
            &mut self.brand_name,
            &mut self.model_id,
            &mut self.model_name,
            &mut self.engine_id,
            &mut self.engine_name,
        ] {
            *field = field
                .take()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());
        }
        self
    }

    /// Stable serialized form used for change detection and persistence.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
