//! Locale-aware translation store

use crate::config::{OverlayConfig, PersistConfig};
use crate::error::{StoreError, StoreResult};
use crate::overlay::{OverlayContext, OverlayStore};
use crate::store::PersistentStore;
use arbor_collection::Value;
use arbor_path::ParsedIndex;
use arbor_store::{coerce, NestedStore, PathStore};

/// Translation files with per-locale directories
///
/// Candidates, in order: the locale requested on this store, the one active
/// in the shared context, the manifest locale, and the base directory.
#[derive(Debug)]
pub struct Localization {
    inner: OverlayStore,
    requested: Option<String>,
    settings: OverlayConfig,
}

impl Localization {
    /// Create localization store over `config.path`
    ///
    /// # Errors
    /// Same as [`PersistentStore::new`]
    pub fn new(
        config: PersistConfig,
        settings: OverlayConfig,
        context: OverlayContext,
    ) -> StoreResult<Self> {
        Ok(Self::from_store(
            PersistentStore::new(config)?,
            settings,
            context,
        ))
    }

    #[must_use]
    pub fn from_store(store: PersistentStore, settings: OverlayConfig, context: OverlayContext) -> Self {
        Self {
            inner: OverlayStore::new(store, context),
            requested: None,
            settings,
        }
    }

    /// Prefer `name` over the context locale (`None` to follow the context)
    pub fn request_locale(&mut self, name: Option<&str>) {
        self.requested = name.map(str::to_owned);
    }

    /// Resolve the active locale, clearing stale data on a change
    pub fn select(&mut self) -> String {
        let requested = self.requested.clone().unwrap_or_default();
        let shared = self.inner.context().locale();
        let manifest = self.settings.manifest_locale.clone().unwrap_or_default();
        self.inner
            .select([requested.as_str(), shared.as_str(), manifest.as_str(), ""])
    }

    /// Active locale after re-selection
    pub fn locale(&mut self) -> String {
        self.select()
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &OverlayConfig {
        &self.settings
    }

    #[inline]
    #[must_use]
    pub fn store(&self) -> &PersistentStore {
        self.inner.store()
    }

    #[inline]
    #[must_use]
    pub fn last_error(&self) -> Option<&StoreError> {
        self.inner.store().last_error()
    }

    pub fn load(&mut self, namespace: &str) -> bool {
        self.select();
        self.inner.scoped(|store| store.load(Some(namespace)))
    }

    pub fn save(&mut self, namespace: &str, format: Option<&str>) -> bool {
        self.select();
        self.inner.scoped(|store| store.save(Some(namespace), format))
    }

    /// Delete the namespace file in the active locale directory
    pub fn remove(&mut self, namespace: &str) -> bool {
        self.select();
        self.inner.scoped(|store| store.remove(Some(namespace)))
    }

    /// Translated text at `address` with `{name}` placeholders filled
    ///
    /// Missing or non-text translations yield the address itself. Parameters
    /// without a text form leave their placeholder untouched.
    pub fn translate(&mut self, address: &str, params: &[(&str, Value)]) -> String {
        let Some(mut text) = self.get_string(address) else {
            tracing::debug!(address, "missing translation");
            return address.to_owned();
        };
        for (name, value) in params {
            if let Some(replacement) = coerce::to_string(value) {
                text = text.replace(&format!("{{{name}}}"), &replacement);
            }
        }
        text
    }
}

impl PathStore for Localization {
    #[inline]
    fn nested(&self) -> &NestedStore {
        self.inner.store().nested()
    }

    #[inline]
    fn nested_mut(&mut self) -> &mut NestedStore {
        self.inner.store_mut().nested_mut()
    }

    fn prepare(&mut self, index: &ParsedIndex) {
        self.select();
        self.inner.scoped(|store| store.autoload(index));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn layout() -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join("messages.json"),
            br#"{"greeting": "Hello, {name}!", "bye": "Bye"}"#,
        )
        .unwrap();
        fs::create_dir(tmp.path().join("fr")).unwrap();
        fs::write(
            tmp.path().join("fr/messages.json"),
            "{\"greeting\": \"Bonjour, {name} !\"}".as_bytes(),
        )
        .unwrap();
        fs::create_dir(tmp.path().join("de")).unwrap();
        fs::write(tmp.path().join("de/messages.json"), br#"{"greeting": "Hallo, {name}!"}"#)
            .unwrap();
        tmp
    }

    fn localization(tmp: &tempfile::TempDir, settings: OverlayConfig, context: OverlayContext) -> Localization {
        Localization::new(PersistConfig::new(tmp.path()), settings, context).unwrap()
    }

    #[test]
    fn translate_fills_placeholders() {
        let tmp = layout();
        let mut l10n = localization(&tmp, OverlayConfig::new(), OverlayContext::new());
        let text = l10n.translate("messages:greeting", &[("name", Value::from("Ada"))]);
        assert_eq!(text, "Hello, Ada!");
    }

    #[test]
    fn missing_translation_returns_address() {
        let tmp = layout();
        let mut l10n = localization(&tmp, OverlayConfig::new(), OverlayContext::new());
        assert_eq!(l10n.translate("messages:nope", &[]), "messages:nope");
    }

    #[test]
    fn manifest_locale_applies_without_context() {
        let tmp = layout();
        let settings = OverlayConfig::new().with_manifest_locale("de");
        let mut l10n = localization(&tmp, settings, OverlayContext::new());
        assert_eq!(
            l10n.translate("messages:greeting", &[("name", Value::from(7))]),
            "Hallo, 7!"
        );
        assert_eq!(l10n.locale(), "de");
    }

    #[test]
    fn context_locale_beats_manifest() {
        let tmp = layout();
        let context = OverlayContext::new();
        context.set_locale("fr");
        let settings = OverlayConfig::new().with_manifest_locale("de");
        let mut l10n = localization(&tmp, settings, context);
        assert_eq!(
            l10n.translate("messages:greeting", &[("name", Value::from("Ada"))]),
            "Bonjour, Ada !"
        );
    }

    #[test]
    fn requested_locale_switch_clears_previous() {
        let tmp = layout();
        let context = OverlayContext::new();
        context.set_locale("fr");
        let mut l10n = localization(&tmp, OverlayConfig::new(), context);
        assert_eq!(l10n.get_string("messages:greeting").as_deref(), Some("Bonjour, {name} !"));

        l10n.request_locale(Some("de"));
        assert_eq!(l10n.get_string("messages:greeting").as_deref(), Some("Hallo, {name}!"));
        assert_eq!(l10n.get_string("messages:bye"), None);
    }

    #[test]
    fn remove_deletes_locale_file_only() {
        let tmp = layout();
        let context = OverlayContext::new();
        context.set_locale("fr");
        let mut l10n = localization(&tmp, OverlayConfig::new(), context);
        assert!(l10n.exist("messages:greeting"));

        assert!(l10n.remove("messages"));
        assert!(l10n.last_error().is_none());
        assert!(!tmp.path().join("fr/messages.json").exists());
        assert!(tmp.path().join("messages.json").is_file());
        assert!(tmp.path().join("de/messages.json").is_file());
    }
}
