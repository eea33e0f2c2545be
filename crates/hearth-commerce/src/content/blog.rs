//! Blog posts.

use crate::ids::BlogPostId;
use crate::CommerceError;
use serde::{Deserialize, Serialize};

/// A storefront blog post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlogPost {
    pub id: BlogPostId,
    pub title: String,
    /// URL-friendly slug, unique across posts.
    pub slug: String,
    /// Short teaser for listings.
    pub excerpt: Option<String>,
    /// Post body.
    pub content: String,
    pub cover_image: Option<String>,
    pub author: Option<String>,
    pub tags: Vec<String>,
    /// Only published posts are visible on the storefront.
    pub is_published: bool,
    /// Set the first time the post is published, cleared when unpublished.
    pub published_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl BlogPost {
    /// Build a post from validated input.
    pub fn from_input(input: BlogPostInput, slug: String) -> Result<Self, CommerceError> {
        input.validate()?;
        let now = current_timestamp();
        Ok(Self {
            id: BlogPostId::generate(),
            title: input.title.trim().to_string(),
            slug,
            excerpt: input.excerpt,
            content: input.content,
            cover_image: input.cover_image,
            author: input.author,
            tags: normalize_tags(input.tags),
            is_published: input.is_published,
            published_at: input.is_published.then_some(now),
            created_at: now,
            updated_at: now,
        })
    }

    /// Overwrite editable fields.
    pub fn apply(&mut self, input: BlogPostInput, slug: String) -> Result<(), CommerceError> {
        input.validate()?;
        let now = current_timestamp();
        self.title = input.title.trim().to_string();
        self.slug = slug;
        self.excerpt = input.excerpt;
        self.content = input.content;
        self.cover_image = input.cover_image;
        self.author = input.author;
        self.tags = normalize_tags(input.tags);
        self.published_at = match (input.is_published, self.published_at) {
            (false, _) => None,
            (true, Some(at)) => Some(at),
            (true, None) => Some(now),
        };
        self.is_published = input.is_published;
        self.updated_at = now;
        Ok(())
    }
}

/// Create/update payload for a blog post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogPostInput {
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    pub content: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_published: bool,
}

impl BlogPostInput {
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.title.trim().is_empty() {
            return Err(CommerceError::validation("Blog title cannot be empty"));
        }
        if self.content.trim().is_empty() {
            return Err(CommerceError::validation("Blog content cannot be empty"));
        }
        Ok(())
    }
}

/// Trim, drop empties and de-duplicate tags ignoring case.
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            out.push(tag.to_string());
        }
    }
    out
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}
