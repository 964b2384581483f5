//! Translation catalog trait.

use std::collections::HashMap;

/// Trait for message translation catalogs.
pub trait Translator: Send + Sync + 'static {
    /// Whether a translation exists for `key`.
    fn has(&self, key: &str) -> bool;

    /// The translation for `key`. Callers check [`Translator::has`] first;
    /// implementations return the key unchanged when no entry exists.
    fn translate(&self, key: &str) -> String;
}

/// HashMap-backed translation catalog.
///
/// An empty catalog behaves as a no-op translator, which is the default
/// for applications that do not localize messages.
#[derive(Debug, Clone, Default)]
pub struct MapTranslator {
    entries: HashMap<String, String>,
}

impl MapTranslator {
    /// Create a catalog from existing entries.
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }

    /// Register a translation.
    pub fn insert(&mut self, key: impl Into<String>, translation: impl Into<String>) {
        self.entries.insert(key.into(), translation.into());
    }
}

impl Translator for MapTranslator {
    fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn translate(&self, key: &str) -> String {
        self.entries
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_catalog_is_noop() {
        let translator = MapTranslator::default();
        assert!(!translator.has("greeting"));
        assert_eq!(translator.translate("greeting"), "greeting");
    }

    #[test]
    fn registered_entries_translate() {
        let mut translator = MapTranslator::default();
        translator.insert("greeting", "Hallo");
        assert!(translator.has("greeting"));
        assert_eq!(translator.translate("greeting"), "Hallo");
    }
}
