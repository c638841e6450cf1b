use crate::domain::Record;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Editorial mood classification of a GIF.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Funny,
    Professional,
    Sarcastic,
    Motivational,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Funny => "funny",
            Tone::Professional => "professional",
            Tone::Sarcastic => "sarcastic",
            Tone::Motivational => "motivational",
        }
    }
}

impl FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "funny" => Ok(Tone::Funny),
            "professional" => Ok(Tone::Professional),
            "sarcastic" => Ok(Tone::Sarcastic),
            "motivational" => Ok(Tone::Motivational),
            other => Err(format!("unknown tone: {other}")),
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Technical/presentational classification of a GIF.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
    Loop,
    ShortClip,
    Meme,
    Transparent,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Loop => "loop",
            Format::ShortClip => "short-clip",
            Format::Meme => "meme",
            Format::Transparent => "transparent",
        }
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "loop" => Ok(Format::Loop),
            "short-clip" => Ok(Format::ShortClip),
            "meme" => Ok(Format::Meme),
            "transparent" => Ok(Format::Transparent),
            other => Err(format!("unknown format: {other}")),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A GIF record: display fields, asset locations, classification,
/// engagement counters and the two independent promotion flags.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Gif {
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub category: String,
    pub subcategory: Option<String>,
    pub tags: Vec<String>,
    pub tone: Tone,
    pub format: Format,
    pub use_cases: Vec<String>,
    pub file_size: u64,
    pub width: u32,
    pub height: u32,
    pub duration: f64,
    pub views: u64,
    pub downloads: u64,
    pub likes: u64,
    pub is_trending: bool,
    pub is_featured: bool,
    pub uploaded_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Gif {
    const COLLECTION: &'static str = "gifs";

    fn id(&self) -> &str {
        &self.id
    }
}

/// A browsable category. `gif_count` is a cached derived value and can
/// drift from the true number of GIFs referencing the category.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub icon: String,
    pub color: String,
    pub subcategories: Vec<String>,
    pub gif_count: u64,
    pub created_at: DateTime<Utc>,
}

impl Record for Category {
    const COLLECTION: &'static str = "categories";

    fn id(&self) -> &str {
        &self.id
    }
}

/// A (user, gif) like link. Existence is the payload; uniqueness per pair
/// is maintained by the toggle operation, not by the store.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Favorite {
    pub id: String,
    pub user_id: String,
    pub gif_id: String,
    pub created_at: DateTime<Utc>,
}

impl Favorite {
    pub fn new(user_id: &str, gif_id: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            gif_id: gif_id.to_string(),
            created_at: Utc::now(),
        }
    }
}

impl Record for Favorite {
    const COLLECTION: &'static str = "favorites";

    fn id(&self) -> &str {
        &self.id
    }
}

/// A user-owned, ordered set of GIF ids.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Collection {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: String,
    pub gif_ids: Vec<String>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Collection {
    const COLLECTION: &'static str = "collections";

    fn id(&self) -> &str {
        &self.id
    }
}

/// A newsletter signup. Repeated signups with the same email create
/// separate records; there is no deduplication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NewsletterSubscriber {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub interests: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Record for NewsletterSubscriber {
    const COLLECTION: &'static str = "newsletter_subscribers";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Identity as exposed by the authentication collaborator. Credential
/// handling lives entirely behind `auth::AuthClient`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub avatar: Option<String>,
}
