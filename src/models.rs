use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::catalog::{Catalog, ANY};

/// A recipe record as returned by the service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recipe {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub diet_type: Option<String>,
    #[serde(default)]
    pub prep_time: Option<String>,
    #[serde(default)]
    pub cook_time: Option<String>,
    #[serde(default)]
    pub servings: Option<u32>,
    #[serde(default)]
    pub image_base64: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// RFC 3339 or naive ISO-8601 (read as UTC). Anything else becomes `None`
/// so a bad timestamp never rejects the whole recipe.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(serde_json::Value::as_str).and_then(parse_timestamp))
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

impl Recipe {
    pub const fn has_image(&self) -> bool {
        self.image_base64.is_some()
    }

    /// Decoded size of the attached image, estimated from the base64 length
    pub fn image_size_bytes(&self) -> Option<usize> {
        self.image_base64.as_ref().map(|b64| {
            let padding = b64.bytes().rev().take_while(|&b| b == b'=').count();
            ((b64.len() / 4) * 3).saturating_sub(padding.min(2))
        })
    }
}

/// A diet or cuisine constraint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Preference {
    #[default]
    Any,
    Only(String),
}

impl Preference {
    pub const fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Any => ANY,
            Self::Only(value) => value,
        }
    }

    /// The value sent to the service; `Any` is sent as `null`
    pub fn as_request_value(&self) -> Option<String> {
        match self {
            Self::Any => None,
            Self::Only(value) => Some(value.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Which message path produced a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    EmptySelection,
    GenerateFailed,
    SurpriseFailed,
    BillingRequired,
    ImageFailed,
    Cancelled,
    RecipeReady,
    ImageReady,
}

/// A user-visible message, shown in the status line until replaced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn new(kind: NoticeKind) -> Self {
        let (level, text) = match kind {
            NoticeKind::EmptySelection => {
                (NoticeLevel::Warning, "Please add at least one ingredient!")
            }
            NoticeKind::GenerateFailed => {
                (NoticeLevel::Error, "Failed to generate recipe. Please try again!")
            }
            NoticeKind::SurpriseFailed => {
                (NoticeLevel::Error, "Failed to get surprise recipe. Please try again!")
            }
            NoticeKind::BillingRequired => (
                NoticeLevel::Warning,
                "Image generation requires a Google Cloud billing account. \
                 Set up billing at https://console.cloud.google.com/billing \
                 and make sure your API key has image generation permissions.",
            ),
            NoticeKind::ImageFailed => {
                (NoticeLevel::Error, "Failed to generate recipe image. Please try again!")
            }
            NoticeKind::Cancelled => (NoticeLevel::Info, "Request cancelled"),
            NoticeKind::RecipeReady => (NoticeLevel::Info, "Recipe ready"),
            NoticeKind::ImageReady => (NoticeLevel::Info, "Image attached to recipe"),
        };
        Self {
            kind,
            level,
            text: text.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub service_url: String,
    #[serde(default = "default_timeout")]
    pub request_timeout: u64,
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Diet preselected at startup, "Any" when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_diet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_cuisine: Option<String>,
    #[serde(default)]
    pub catalog: Catalog,
}

const fn default_timeout() -> u64 {
    120
}

const fn default_recent_limit() -> usize {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_url: "http://localhost:8001".to_string(),
            request_timeout: default_timeout(),
            recent_limit: default_recent_limit(),
            log_level: default_log_level(),
            default_diet: None,
            default_cuisine: None,
            catalog: Catalog::default(),
        }
    }
}
