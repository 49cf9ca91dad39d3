use crate::core::notify::Notifier;
use crate::core::page::Page;
use crate::domain::model::{Language, Theme, LANGUAGE_KEY, THEME_KEY};
use crate::domain::ports::{ContentSource, KeyValueStore};
use crate::utils::error::Result;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Persists theme and language and applies them to the page.
///
/// Values are stored as bare strings (`dark`, `ru`), the same shape the
/// browser site leaves in local storage.
pub struct PreferenceStore<S: KeyValueStore> {
    store: S,
    source: Arc<dyn ContentSource>,
    notifier: Notifier,
    translations_dir: String,
}

impl<S: KeyValueStore> PreferenceStore<S> {
    pub fn new(
        store: S,
        source: Arc<dyn ContentSource>,
        notifier: Notifier,
        translations_dir: impl Into<String>,
    ) -> Self {
        Self {
            store,
            source,
            notifier,
            translations_dir: translations_dir.into(),
        }
    }

    pub fn saved_theme(&self) -> Theme {
        self.read(THEME_KEY)
            .and_then(|raw| Theme::parse(&raw))
            .unwrap_or_default()
    }

    pub fn saved_language(&self) -> Language {
        self.read(LANGUAGE_KEY)
            .and_then(|raw| Language::parse(&raw))
            .unwrap_or_default()
    }

    pub fn set_theme(&self, page: &mut Page, theme: Theme) -> Result<()> {
        self.store.set(THEME_KEY, theme.as_str())?;
        page.theme = theme;
        tracing::info!("🎨 Theme set to {}", theme.as_str());
        self.notifier
            .info(format!("Тема ауыстырылды: {}", theme.display_name()));
        Ok(())
    }

    pub fn toggle_theme(&self, page: &mut Page) -> Result<Theme> {
        let next = page.theme.toggled();
        self.set_theme(page, next)?;
        Ok(next)
    }

    /// Persists the choice, then fetches the locale and re-labels the page.
    /// A failed fetch is logged and leaves the current text in place; the
    /// return value says whether the translations were applied.
    pub async fn set_language(&self, page: &mut Page, language: Language) -> Result<bool> {
        self.store.set(LANGUAGE_KEY, language.code())?;
        page.language = language;
        Ok(self.apply_language(page, language).await)
    }

    /// Startup: theme silently, language with its usual confirmation.
    pub async fn restore(&self, page: &mut Page) -> bool {
        page.theme = self.saved_theme();
        let language = self.saved_language();
        page.language = language;
        tracing::debug!(
            "Restored preferences: theme={}, language={}",
            page.theme.as_str(),
            language
        );
        self.apply_language(page, language).await
    }

    pub async fn fetch_translations(&self, language: Language) -> Result<BTreeMap<String, String>> {
        let path = format!(
            "{}/{}.json",
            self.translations_dir.trim_end_matches('/'),
            language.code()
        );
        let value = self.source.fetch_json(&path).await?;
        let entries: BTreeMap<String, serde_json::Value> = serde_json::from_value(value)?;

        Ok(entries
            .into_iter()
            .filter_map(|(key, value)| match value {
                serde_json::Value::String(text) => Some((key, text)),
                _ => None,
            })
            .collect())
    }

    async fn apply_language(&self, page: &mut Page, language: Language) -> bool {
        match self.fetch_translations(language).await {
            Ok(dictionary) => {
                let updated = page.apply_translations(&dictionary);
                tracing::info!("🌐 Language {} applied to {} elements", language, updated);
                self.notifier
                    .info(format!("Тіл ауыстырылды: {}", language.display_name()));
                true
            }
            Err(e) => {
                tracing::error!("❌ Language loading failed: {}", e);
                false
            }
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("⚠️ Could not read '{}', using default: {}", key, e);
                None
            }
        }
    }
}
