use crate::catalog::traits::CatalogItem;

/// Load state of one selection level's option list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LevelState {
    /// No parent selected, or not applicable.
    #[default]
    Idle,
    Loading,
    Loaded(Vec<CatalogItem>),
    /// The fetch failed. Behaves as an empty list.
    Error,
}

impl LevelState {
    /// Loaded options, or `None` while idle or loading.
    pub fn items(&self) -> Option<&[CatalogItem]> {
        match self {
            LevelState::Loaded(items) => Some(items),
            LevelState::Error => Some(&[]),
            LevelState::Idle | LevelState::Loading => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LevelState::Loading)
    }

    pub fn is_settled(&self) -> bool {
        self.items().is_some()
    }
}
