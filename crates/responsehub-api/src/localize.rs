//! Message localization over a translation catalog.

use std::sync::Arc;

use responsehub_core::traits::translator::Translator;

/// Localizes response messages when a translation exists.
#[derive(Clone)]
pub struct LocalizationHelper {
    translator: Arc<dyn Translator>,
}

impl LocalizationHelper {
    /// Create a helper over the given catalog.
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self { translator }
    }

    /// Return the translation for `message` when the catalog has one,
    /// otherwise the message unchanged.
    pub fn localize(&self, message: &str) -> String {
        if self.translator.has(message) {
            self.translator.translate(message)
        } else {
            message.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use responsehub_core::traits::translator::MapTranslator;

    #[test]
    fn translates_known_messages() {
        let mut catalog = MapTranslator::default();
        catalog.insert("responses.created", "Resource created");
        let helper = LocalizationHelper::new(Arc::new(catalog));
        assert_eq!(helper.localize("responses.created"), "Resource created");
    }

    #[test]
    fn passes_unknown_messages_through() {
        let helper = LocalizationHelper::new(Arc::new(MapTranslator::default()));
        assert_eq!(helper.localize("Plain message"), "Plain message");
    }
}
