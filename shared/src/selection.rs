use serde::{Deserialize, Serialize};

/// Which single collection, if any, is focused.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    picked: Option<String>,
}

impl Selection {
    pub fn pick(&mut self, country: impl Into<String>) {
        self.picked = Some(country.into());
    }

    pub fn clear(&mut self) {
        self.picked = None;
    }

    pub fn picked(&self) -> Option<&str> {
        self.picked.as_deref()
    }

    pub fn is_dimmed(&self, candidate: &str) -> bool {
        is_dimmed(candidate, self.picked())
    }
}

/// A card is dimmed iff something else is picked.
pub fn is_dimmed(candidate: &str, picked: Option<&str>) -> bool {
    picked.is_some_and(|p| p != candidate)
}
