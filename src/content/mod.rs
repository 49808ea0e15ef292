/*!
 * Content Documents
 * Singleton page/settings documents stored as sparse overlays on compiled-in defaults
 */
pub mod overlay;
pub mod page;
pub mod settings;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::store::{ContentStore, StoreError};

pub use overlay::overlay;
pub use page::{load_page, save_page, PageContent, PageKey};
pub use settings::{load_settings, save_settings, GlobalSettings, ThemeMode};

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("Unknown section: {0}")]
    UnknownSection(String),

    #[error("Unknown field {field} in section {section}")]
    UnknownField { section: String, field: String },

    #[error("Invalid content: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A singleton document whose stored form may omit whole sections or fields.
pub trait SparseDocument: Serialize + DeserializeOwned + Default {
    /// Top-level keys that are merged field by field.
    const SECTIONS: &'static [&'static str];

    fn merge_with_defaults(stored: &Value) -> Result<Self, serde_json::Error> {
        let defaults = serde_json::to_value(Self::default())?;
        serde_json::from_value(overlay(&defaults, stored, Self::SECTIONS))
    }

    /// Like `merge_with_defaults`, but never fails: a stored field that does
    /// not decode is replaced by its default while every other stored field
    /// is kept.
    fn recover_with_defaults(stored: &Value) -> Self {
        if let Ok(document) = Self::merge_with_defaults(stored) {
            return document;
        }
        let Ok(defaults) = serde_json::to_value(Self::default()) else {
            return Self::default();
        };
        let Value::Object(merged) = overlay(&defaults, stored, Self::SECTIONS) else {
            return Self::default();
        };

        // Grow from the defaults one stored value at a time, keeping each
        // value only if the document still decodes with it.
        let mut accepted = defaults;
        for (key, value) in merged {
            match value {
                Value::Object(fields) if Self::SECTIONS.contains(&key.as_str()) => {
                    for (field, value) in fields {
                        let mut candidate = accepted.clone();
                        if let Some(section) = candidate.get_mut(&key).and_then(Value::as_object_mut) {
                            section.insert(field.clone(), value);
                        }
                        if Self::deserialize(&candidate).is_ok() {
                            accepted = candidate;
                        } else {
                            tracing::warn!(section = %key, field = %field, "stored field does not decode, using default");
                        }
                    }
                }
                value => {
                    let mut candidate = accepted.clone();
                    if let Some(fields) = candidate.as_object_mut() {
                        fields.insert(key.clone(), value);
                    }
                    if Self::deserialize(&candidate).is_ok() {
                        accepted = candidate;
                    } else {
                        tracing::warn!(field = %key, "stored field does not decode, using default");
                    }
                }
            }
        }

        Self::deserialize(&accepted).unwrap_or_default()
    }

    /// Draft edit of one string field inside a known section.
    fn set_field(&mut self, section: &str, field: &str, value: &str) -> Result<(), ContentError> {
        if !Self::SECTIONS.contains(&section) {
            return Err(ContentError::UnknownSection(section.to_string()));
        }
        let mut current = serde_json::to_value(&*self)?;
        let slot = current
            .get_mut(section)
            .and_then(Value::as_object_mut)
            .and_then(|fields| fields.get_mut(field))
            .ok_or_else(|| ContentError::UnknownField {
                section: section.to_string(),
                field: field.to_string(),
            })?;
        *slot = Value::String(value.to_string());
        *self = serde_json::from_value(current)?;
        Ok(())
    }
}

/// Reads a singleton document and overlays it on the defaults.
///
/// Never fails: a missing store or a store error yields the defaults (logged),
/// and stored fields that do not decode fall back one by one. A document that
/// does not exist yet is written back as the full default so later reads
/// always find one.
pub async fn load_or_init<T: SparseDocument>(
    store: Option<&dyn ContentStore>,
    collection: &str,
    id: &str,
) -> T {
    let Some(store) = store else {
        tracing::warn!(collection = %collection, id = %id, "no content store, rendering defaults");
        return T::default();
    };

    match store.get(collection, id).await {
        Ok(Some(doc)) => T::recover_with_defaults(&doc.data),
        Ok(None) => {
            let defaults = T::default();
            match serde_json::to_value(&defaults) {
                Ok(value) => {
                    if let Err(e) = store.set(collection, id, value).await {
                        tracing::error!(collection = %collection, id = %id, error = %e, "failed to initialise document");
                    } else {
                        tracing::info!(collection = %collection, id = %id, "initialised document with defaults");
                    }
                }
                Err(e) => tracing::error!(error = %e, "failed to encode default document"),
            }
            defaults
        }
        Err(e) => {
            tracing::error!(collection = %collection, id = %id, error = %e, "failed to load document");
            T::default()
        }
    }
}

/// Persists the whole document, replacing whatever is stored.
pub async fn save_document<T: SparseDocument>(
    store: &dyn ContentStore,
    collection: &str,
    id: &str,
    document: &T,
) -> Result<(), StoreError> {
    let value = serde_json::to_value(document)?;
    store.set(collection, id, value).await
}
