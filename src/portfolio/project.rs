use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::MediaType;
use crate::media::Gallery;

/// Written on every save so later readers can tell new-schema documents
/// from ones that only carry `code`/`category`/`src`.
pub const SCHEMA_VERSION: u32 = 2;

pub fn current_year() -> String {
    Utc::now().year().to_string()
}

/// Timestamps are stored as fixed-width RFC 3339 strings with millisecond
/// precision, so lexical order equals time order in every backend.
pub mod timestamp {
    use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn format(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Accepts an RFC 3339 string, epoch milliseconds, or a
    /// `{seconds, nanoseconds}` object as written by older clients.
    pub fn parse(value: &Value) -> Option<DateTime<Utc>> {
        match value {
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            Value::Number(n) => n.as_i64().and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
            Value::Object(map) => {
                let seconds = map.get("seconds").or_else(|| map.get("_seconds"))?.as_i64()?;
                let nanos = map
                    .get("nanoseconds")
                    .or_else(|| map.get("_nanoseconds"))
                    .and_then(Value::as_u64)
                    .unwrap_or(0);
                Utc.timestamp_opt(seconds, nanos as u32).single()
            }
            _ => None,
        }
    }

    pub fn serialize<S: Serializer>(ts: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error> {
        match ts {
            Some(ts) => serializer.serialize_str(&format(ts)),
            None => serializer.serialize_none(),
        }
    }

    /// Unreadable timestamps decode as `None` rather than failing the document.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().and_then(parse))
    }
}

/// A portfolio item as the editor and the public site see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    pub id: String,
    pub title: String,
    pub year: String,
    pub brand_categories: Vec<String>,
    pub insight: String,
    pub services: Vec<String>,
    pub tools: Vec<String>,
    pub case_study_url: String,
    pub live_website_url: String,
    pub thumbnail_url: String,
    pub gallery_urls: Vec<String>,
    pub description: String,
    pub content: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub alt: String,
    #[serde(with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for Project {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            year: current_year(),
            brand_categories: Vec::new(),
            insight: String::new(),
            services: Vec::new(),
            tools: Vec::new(),
            case_study_url: String::new(),
            live_website_url: String::new(),
            thumbnail_url: String::new(),
            gallery_urls: Vec::new(),
            description: String::new(),
            content: String::new(),
            media_type: MediaType::Image,
            alt: String::new(),
            created_at: None,
            updated_at: None,
        }
    }
}

impl Project {
    pub fn gallery(&self) -> Gallery {
        Gallery::new(self.thumbnail_url.clone(), self.gallery_urls.clone())
    }

    pub fn set_gallery(&mut self, gallery: Gallery) {
        self.thumbnail_url = gallery.thumbnail_url;
        self.gallery_urls = gallery.gallery_urls;
    }

    /// Stored form: the current fields, the legacy mirrors older views still
    /// read, and the schema marker. The id lives outside the document.
    pub fn to_document(&self) -> Result<Value, serde_json::Error> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut value {
            map.remove("id");
            map.insert("code".to_string(), Value::String(self.title.clone()));
            map.insert(
                "category".to_string(),
                Value::String(self.brand_categories.first().cloned().unwrap_or_default()),
            );
            map.insert("src".to_string(), Value::String(self.thumbnail_url.clone()));
            map.insert("schemaVersion".to_string(), Value::from(SCHEMA_VERSION));
        }
        Ok(value)
    }

    /// Decodes a stored document of either schema.
    pub fn from_document(id: &str, data: &Value) -> Result<Self, serde_json::Error> {
        let raw: ProjectDocument = serde_json::from_value(data.clone())?;
        Ok(raw.into_project(id))
    }
}

/// Decoders for hand-edited or foreign documents: a value of the wrong
/// shape reads as absent instead of failing the whole document.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use crate::portfolio::MediaType;

    pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::String(s)) => Some(s),
            _ => None,
        })
    }

    /// A list keeps its string entries; a lone string is a one-item list.
    pub fn strings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<String>>, D::Error> {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::Array(items)) => Some(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
            ),
            Some(Value::String(s)) => Some(vec![s]),
            _ => None,
        })
    }

    /// Only `"video"` is a video; anything else is shown as an image.
    pub fn media_type<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<MediaType>, D::Error> {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::String(s)) if s == "video" => Some(MediaType::Video),
            Some(_) => Some(MediaType::Image),
            None => None,
        })
    }
}

/// Raw stored shape. Every field is optional because documents written by the
/// quick-add form or the static import only carry `code`, `category`, `src`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectDocument {
    #[serde(deserialize_with = "lenient::string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub code: Option<String>,
    pub year: Option<Value>,
    #[serde(deserialize_with = "lenient::strings")]
    pub brand_categories: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient::strings")]
    pub category: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient::string")]
    pub insight: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient::strings")]
    pub services: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient::strings")]
    pub tools: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient::string")]
    pub case_study_url: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub live_website_url: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub thumbnail_url: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub src: Option<String>,
    #[serde(deserialize_with = "lenient::strings")]
    pub gallery_urls: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient::string")]
    pub content: Option<String>,
    #[serde(rename = "type", deserialize_with = "lenient::media_type")]
    pub media_type: Option<MediaType>,
    #[serde(deserialize_with = "lenient::string")]
    pub alt: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(with = "timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn year_string(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl ProjectDocument {
    /// Empty strings fall through to the legacy field, then to the default.
    pub fn into_project(self, id: &str) -> Project {
        let brand_categories = match self.brand_categories {
            Some(categories) => categories,
            None => self
                .category
                .unwrap_or_default()
                .into_iter()
                .filter(|c| !c.is_empty())
                .collect(),
        };
        let description = self.description.unwrap_or_default();
        let insight = non_empty(self.insight).unwrap_or_else(|| description.clone());

        Project {
            id: id.to_string(),
            title: non_empty(self.title).or(non_empty(self.code)).unwrap_or_default(),
            year: year_string(self.year).unwrap_or_else(current_year),
            brand_categories,
            insight,
            services: self.services.unwrap_or_default(),
            tools: self.tools.unwrap_or_default(),
            case_study_url: self.case_study_url.unwrap_or_default(),
            live_website_url: self.live_website_url.unwrap_or_default(),
            thumbnail_url: non_empty(self.thumbnail_url)
                .or(non_empty(self.src))
                .unwrap_or_default(),
            gallery_urls: self.gallery_urls.unwrap_or_default(),
            description,
            content: self.content.unwrap_or_default(),
            media_type: self.media_type.unwrap_or_default(),
            alt: self.alt.unwrap_or_default(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
