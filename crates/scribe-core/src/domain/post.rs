use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Closed set of post categories, transmitted as their literal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Technology,
    Economy,
    Business,
    Sports,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Technology => "Technology",
            Category::Economy => "Economy",
            Category::Business => "Business",
            Category::Sports => "Sports",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized category string.
#[derive(Debug, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Technology" => Ok(Category::Technology),
            "Economy" => Ok(Category::Economy),
            "Business" => Ok(Category::Business),
            "Sports" => Ok(Category::Sports),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}

/// Post entity - a blog entry, draft or published.
///
/// `slug` is system-derived (see [`crate::slugging`]); `author_id` is nullable
/// because deleting an account orphans its posts rather than removing them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub category: Option<Category>,
    pub image: Option<String>,
    pub author_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub publish_date: Option<DateTime<Utc>>,
    pub is_draft: bool,
}

impl Post {
    /// Create a new post owned by `author_id`. The slug starts empty and must
    /// be assigned before the first persist.
    pub fn new(
        author_id: Uuid,
        title: String,
        content: String,
        category: Option<Category>,
        image: Option<String>,
        is_draft: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            slug: String::new(),
            content,
            category,
            image,
            author_id: Some(author_id),
            created_at: now,
            updated_at: now,
            publish_date: None,
            is_draft,
        }
    }

    /// Stamp the publish date on the first non-draft save.
    ///
    /// An already-stamped post keeps its original publish date no matter how
    /// often it is edited afterwards.
    pub fn stamp_publish_date(&mut self, now: DateTime<Utc>) {
        if !self.is_draft && self.publish_date.is_none() {
            self.publish_date = Some(now);
        }
    }

    /// Check whether `account_id` owns this post.
    pub fn is_owned_by(&self, account_id: Uuid) -> bool {
        self.author_id == Some(account_id)
    }

    /// Refresh the modification timestamp.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}
