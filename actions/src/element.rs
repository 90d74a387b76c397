//! UI element handles and the index-addressed element cache that element
//! actions resolve against.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::warn;

/// Handle to a live element in the UI tree.
///
/// The dispatcher never inspects it; it is looked up by index in an
/// [`ElementCache`] and handed to the capability provider unchanged.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UIElement {
    #[serde(skip_serializing_if = "is_empty_string")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub role: String,
    #[serde(skip_serializing_if = "is_empty_string")]
    pub name: Option<String>,
}

fn is_empty_string(opt: &Option<String>) -> bool {
    match opt {
        Some(s) => s.is_empty(),
        None => true,
    }
}

impl UIElement {
    pub fn new(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl fmt::Debug for UIElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("UIElement");
        debug.field("role", &self.role);
        if let Some(name) = &self.name {
            debug.field("name", name);
        }
        if let Some(id) = &self.id {
            debug.field("id", id);
        }
        debug.finish()
    }
}

impl fmt::Display for UIElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name.as_deref().filter(|n| !n.is_empty()) {
            Some(name) => write!(f, "[{}] {}", self.role, name),
            None => write!(f, "[{}]", self.role),
        }
    }
}

/// Index-addressable source of live UI elements.
///
/// Implementations are shared and read-mostly; actions only ever call
/// [`ElementCache::get`].
pub trait ElementCache: Send + Sync {
    fn get(&self, index: usize) -> Option<UIElement>;
}

/// Shared handle to the context source threaded through dispatch calls.
pub type ElementContext = Arc<dyn ElementCache>;

/// In-memory element cache keyed by the index shown to the planner.
#[derive(Default)]
pub struct UITreeCache {
    elements: RwLock<HashMap<usize, UIElement>>,
}

impl UITreeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cached elements with a freshly built tree snapshot.
    pub fn replace(&self, elements: impl IntoIterator<Item = (usize, UIElement)>) {
        match self.elements.write() {
            Ok(mut guard) => {
                guard.clear();
                guard.extend(elements);
            }
            Err(e) => warn!("UI tree cache lock poisoned, snapshot dropped: {}", e),
        }
    }

    pub fn insert(&self, index: usize, element: UIElement) {
        if let Ok(mut guard) = self.elements.write() {
            guard.insert(index, element);
        }
    }

    pub fn len(&self) -> usize {
        self.elements.read().map(|g| g.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ElementCache for UITreeCache {
    fn get(&self, index: usize) -> Option<UIElement> {
        self.elements.read().ok()?.get(&index).cloned()
    }
}

impl FromIterator<(usize, UIElement)> for UITreeCache {
    fn from_iter<T: IntoIterator<Item = (usize, UIElement)>>(iter: T) -> Self {
        Self {
            elements: RwLock::new(iter.into_iter().collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_lookup_by_index() {
        let cache: UITreeCache = [
            (0, UIElement::new("AXButton").with_name("OK")),
            (3, UIElement::new("AXTextField")),
        ]
        .into_iter()
        .collect();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(0).and_then(|e| e.name), Some("OK".to_string()));
        assert!(cache.get(1).is_none());
        assert_eq!(cache.get(3).map(|e| e.role), Some("AXTextField".to_string()));
    }

    #[test]
    fn test_replace_drops_stale_indices() {
        let cache = UITreeCache::new();
        cache.insert(7, UIElement::new("AXButton"));
        cache.replace([(1, UIElement::new("AXCheckBox"))]);

        assert!(cache.get(7).is_none());
        assert!(cache.get(1).is_some());
        assert!(!cache.is_empty());
    }

    #[test]
    fn test_display_uses_role_and_name() {
        let element = UIElement::new("AXButton").with_name("Submit");
        assert_eq!(element.to_string(), "[AXButton] Submit");
        assert_eq!(UIElement::new("AXGroup").to_string(), "[AXGroup]");
    }
}
