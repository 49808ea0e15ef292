use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

use super::{load_or_init, save_document, SparseDocument};
use crate::store::{ContentStore, StoreError, PAGES};

/// Pages with editable content. Only the landing page exists today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKey {
    Home,
}

impl PageKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageKey::Home => "home",
        }
    }
}

impl FromStr for PageKey {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "home" => Ok(PageKey::Home),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroSection {
    pub availability_text: String,
    pub title_line1: String,
    pub title_line2: String,
    pub title_line3_part1: String,
    pub title_line3_part2: String,
    pub description: String,
    pub profile_image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSection {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSection {
    pub title: String,
    pub description: String,
    pub email: String,
    pub phone: String,
}

/// Landing page copy, keyed by section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContent {
    pub hero: HeroSection,
    pub digital_playground: TextSection,
    pub blog: TextSection,
    pub portfolio: TextSection,
    pub contact: ContactSection,
    /// Stored top-level keys this version does not know about.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for PageContent {
    fn default() -> Self {
        Self {
            hero: HeroSection {
                availability_text: "Limited Availability".to_string(),
                title_line1: "Hey There!".to_string(),
                title_line2: "Let's Make".to_string(),
                title_line3_part1: "Something".to_string(),
                title_line3_part2: "Awesome".to_string(),
                description: "I'm Jean, your digital design sidekick. Got a crazy idea? Let's bring it to life! I'm a full-stack designer, which means I can handle almost everything.".to_string(),
                profile_image: "/assets/prof2.png".to_string(),
            },
            digital_playground: TextSection {
                title: "My Digital Playground".to_string(),
                description: "This is where curiosity meets craft. Whether I'm building with AI, sculpting in 3D, or refining a brand's visual identity.".to_string(),
            },
            blog: TextSection {
                title: "Recent Writing.".to_string(),
                description: "Thoughts on design, creative coding, and the future of web.".to_string(),
            },
            portfolio: TextSection {
                title: "Selected Works".to_string(),
                description: "A showcase of my recent brand designs and visual projects.".to_string(),
            },
            contact: ContactSection {
                title: "Let's Connect.".to_string(),
                description: "Have a project in mind? Looking for a partner to build your next big thing? Reach out.".to_string(),
                email: "jeanrendy@example.com".to_string(),
                phone: "+1 (555) 123-4567".to_string(),
            },
            extra: Map::new(),
        }
    }
}

impl SparseDocument for PageContent {
    const SECTIONS: &'static [&'static str] =
        &["hero", "digitalPlayground", "blog", "portfolio", "contact"];
}

impl PageContent {
    /// Points the hero at a freshly uploaded profile image.
    pub fn set_profile_image(&mut self, url: impl Into<String>) {
        self.hero.profile_image = url.into();
    }
}

pub async fn load_page(store: Option<&dyn ContentStore>, key: PageKey) -> PageContent {
    load_or_init(store, PAGES, key.as_str()).await
}

pub async fn save_page(
    store: &dyn ContentStore,
    key: PageKey,
    content: &PageContent,
) -> Result<(), StoreError> {
    save_document(store, PAGES, key.as_str(), content).await?;
    tracing::info!(page = %key.as_str(), "page content saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentError;
    use crate::store::MemoryStore;
    use serde_json::json;

    #[test]
    fn page_key_parses_home_only() {
        assert_eq!("home".parse::<PageKey>(), Ok(PageKey::Home));
        assert!("about".parse::<PageKey>().is_err());
    }

    #[test]
    fn every_missing_section_equals_its_default() {
        let defaults = PageContent::default();
        let merged = PageContent::merge_with_defaults(&json!({})).unwrap();
        assert_eq!(merged, defaults);

        let merged = PageContent::merge_with_defaults(&json!({
            "hero": { "titleLine1": "Hi" }
        }))
        .unwrap();
        assert_eq!(merged.contact, defaults.contact);
        assert_eq!(merged.portfolio, defaults.portfolio);
        assert_eq!(merged.digital_playground, defaults.digital_playground);
    }

    #[test]
    fn partial_section_merges_field_by_field() {
        let merged = PageContent::merge_with_defaults(&json!({
            "hero": { "titleLine1": "Hello!", "profileImage": "https://cdn/x.png" },
            "blog": { "description": "Notes." }
        }))
        .unwrap();

        assert_eq!(merged.hero.title_line1, "Hello!");
        assert_eq!(merged.hero.profile_image, "https://cdn/x.png");
        assert_eq!(merged.hero.title_line2, "Let's Make");
        assert_eq!(merged.blog.title, "Recent Writing.");
        assert_eq!(merged.blog.description, "Notes.");
    }

    #[test]
    fn unknown_keys_round_trip_through_extra() {
        let merged = PageContent::merge_with_defaults(&json!({ "footer": { "note": "x" } })).unwrap();
        assert_eq!(merged.extra.get("footer"), Some(&json!({ "note": "x" })));
        let value = serde_json::to_value(&merged).unwrap();
        assert_eq!(value["footer"]["note"], "x");
    }

    #[test]
    fn set_field_edits_known_fields_only() {
        let mut page = PageContent::default();
        page.set_field("digitalPlayground", "title", "Lab").unwrap();
        assert_eq!(page.digital_playground.title, "Lab");

        assert!(matches!(
            page.set_field("footer", "title", "x"),
            Err(ContentError::UnknownSection(_))
        ));
        assert!(matches!(
            page.set_field("hero", "subtitle", "x"),
            Err(ContentError::UnknownField { .. })
        ));
    }

    #[tokio::test]
    async fn first_load_writes_defaults_back() {
        let store = MemoryStore::new();
        let page = load_page(Some(&store), PageKey::Home).await;
        assert_eq!(page, PageContent::default());

        let stored = store.get(PAGES, "home").await.unwrap().unwrap();
        assert_eq!(stored.data["hero"]["titleLine1"], "Hey There!");
        assert_eq!(store.write_count(), 1);

        // Second load finds the document and writes nothing.
        let _ = load_page(Some(&store), PageKey::Home).await;
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn unavailable_store_renders_defaults() {
        let store = MemoryStore::new();
        store.set_online(false);
        let page = load_page(Some(&store), PageKey::Home).await;
        assert_eq!(page, PageContent::default());

        let page = load_page(None, PageKey::Home).await;
        assert_eq!(page, PageContent::default());
    }

    #[tokio::test]
    async fn mistyped_field_keeps_the_rest_of_the_stored_page() {
        let store = MemoryStore::new();
        store
            .set(
                PAGES,
                "home",
                json!({
                    "hero": { "description": 42, "titleLine1": "Hi" },
                    "blog": { "title": "Notes" },
                    "footer": { "note": "x" }
                }),
            )
            .await
            .unwrap();

        let page = load_page(Some(&store), PageKey::Home).await;
        assert_eq!(page.blog.title, "Notes");
        assert_eq!(page.hero.title_line1, "Hi");
        assert_eq!(page.hero.description, PageContent::default().hero.description);
        assert_eq!(page.extra.get("footer"), Some(&json!({ "note": "x" })));
    }

    #[tokio::test]
    async fn save_then_load_returns_the_edit() {
        let store = MemoryStore::new();
        let mut page = PageContent::default();
        page.set_profile_image("https://cdn/profile/1_me.png");
        save_page(&store, PageKey::Home, &page).await.unwrap();

        let loaded = load_page(Some(&store), PageKey::Home).await;
        assert_eq!(loaded.hero.profile_image, "https://cdn/profile/1_me.png");
    }
}
