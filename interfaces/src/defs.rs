use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Technology,
    World,
    Sports,
    Business,
    Health,
    Entertainment,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Technology,
        Category::World,
        Category::Sports,
        Category::Business,
        Category::Health,
        Category::Entertainment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Technology => "Technology",
            Category::World => "World",
            Category::Sports => "Sports",
            Category::Business => "Business",
            Category::Health => "Health",
            Category::Entertainment => "Entertainment",
        }
    }

    /// Lowercase name, as used by the news APIs' `category` parameter.
    pub fn slug(&self) -> &'static str {
        match self {
            Category::Technology => "technology",
            Category::World => "world",
            Category::Sports => "sports",
            Category::Business => "business",
            Category::Health => "health",
            Category::Entertainment => "entertainment",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category: {}", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownCategory(wanted.to_string()))
    }
}

/// Which ranked provider produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    Feed,
    PrimaryApi,
    SecondaryApi,
}

/// Structured image metadata, captured once at fetch time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageRef {
    /// A media attachment (`media:content`, enclosure). Used verbatim.
    Media(String),
    /// A small thumbnail whose URL carries a dimension token that can be swapped.
    Thumbnail(String),
    /// An image URL reported by a news API.
    Api(String),
}

/// A single news item, not yet confirmed new or turned into a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub title: String,
    pub link: String,
    pub image: Option<ImageRef>,
    pub author: Option<String>,
    pub summary: Option<String>,
    pub origin: SourceKind,
}

/// Structured output of the generation step. The model must return exactly these keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratedArticle {
    pub title: String,
    pub slug: String,
    pub content: String,
}

/// A post row as written by the pipeline. `id` and `created_at` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub source_url: String,
    pub category: Category,
    pub author: String,
    pub image_url: String,
    pub is_published: bool,
    pub views_count: i64,
    pub likes_count: i64,
    pub ad_image: Option<String>,
    pub ad_link: Option<String>,
}

/// A post row as read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    #[serde(flatten)]
    pub fields: NewPost,
    pub created_at: DateTime<Utc>,
}

// Object style note:
// The pipeline and the sweeper run as short lived, one-shot processes.
// Nothing here carries state between runs; the remote `posts` table is the
// only shared state, and `source_url` is its logical key.
