use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{load_or_init, save_document, SparseDocument};
use crate::store::{ContentStore, StoreError, SETTINGS};

/// Id of the single settings document.
pub const GLOBAL_SETTINGS_ID: &str = "global";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinks {
    pub instagram: String,
    pub linkedin: String,
    pub twitter: String,
    pub github: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeSettings {
    pub default_mode: ThemeMode,
}

/// Site-wide settings edited from the admin dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSettings {
    pub site_name: String,
    pub contact_email: String,
    pub social: SocialLinks,
    pub theme: ThemeSettings,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            site_name: "Jean Rendy Portfolio".to_string(),
            contact_email: "hello@jeanrendy.com".to_string(),
            social: SocialLinks::default(),
            theme: ThemeSettings::default(),
            extra: Map::new(),
        }
    }
}

impl SparseDocument for GlobalSettings {
    const SECTIONS: &'static [&'static str] = &["social", "theme"];
}

pub async fn load_settings(store: Option<&dyn ContentStore>) -> GlobalSettings {
    load_or_init(store, SETTINGS, GLOBAL_SETTINGS_ID).await
}

pub async fn save_settings(store: &dyn ContentStore, settings: &GlobalSettings) -> Result<(), StoreError> {
    save_document(store, SETTINGS, GLOBAL_SETTINGS_ID, settings).await
}
