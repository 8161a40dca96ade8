//! Article model
//!
//! This module provides:
//! - `Article` entity and the `ArticleTheme` lookup entity
//! - `Visibility` enum for publication states
//! - Input types for creating and updating articles
//! - Pagination types shared by all list endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Article entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// Unique identifier
    pub id: i64,
    /// Article title
    pub title: String,
    /// Short description shown in listings
    pub description: String,
    /// Body content (HTML from the editor)
    pub content: String,
    /// Byline: the author's user profile (nullable, survives profile removal)
    pub author_profile_id: Option<i64>,
    /// Optional theme
    pub theme_id: Option<i64>,
    /// Publication timestamp
    pub publication_date: DateTime<Utc>,
    /// Estimated reading time, minimum 1
    pub reading_time_minutes: i64,
    /// Publication visibility
    pub visibility: Visibility,
    /// View counter, incremented on every detail fetch
    pub views_count: i64,
    /// Like counter, maintained by the interaction service
    pub like_count: i64,
    /// Revision counter, bumped on update
    pub version: i64,
    /// URL-friendly slug (unique, generated from title when absent)
    pub slug: Option<String>,
}

impl Article {
    /// Create a new article with defaults matching the database schema.
    pub fn new(title: String, content: String) -> Self {
        Self {
            id: 0, // Set by the database
            title,
            description: String::new(),
            content,
            author_profile_id: None,
            theme_id: None,
            publication_date: Utc::now(),
            reading_time_minutes: 5,
            visibility: Visibility::Published,
            views_count: 0,
            like_count: 0,
            version: 1,
            slug: None,
        }
    }
}

/// Theme lookup entity for grouping articles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleTheme {
    pub id: i64,
    pub name: String,
}

/// Article publication visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Draft - not publicly listed
    Draft,
    /// Published - visible to everyone
    #[default]
    Published,
}

impl Visibility {
    /// Database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Draft => "draft",
            Visibility::Published => "published",
        }
    }

    /// Parse from the database string representation
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Visibility::Draft),
            "published" => Some(Visibility::Published),
            _ => None,
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Input for creating a new article.
///
/// Related records are referenced by name: the theme, tags and categories are
/// created on first use, and the author is resolved through the username of a
/// user whose profile has the author flag.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateArticleInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub content: String,
    /// Username of the authoring user (optional byline)
    pub author: Option<String>,
    /// Theme name, created if missing
    pub theme: Option<String>,
    /// Tag names, created if missing
    #[serde(default)]
    pub tags: Vec<String>,
    /// Category names, created if missing
    #[serde(default)]
    pub categories: Vec<String>,
    pub reading_time_minutes: Option<i64>,
    pub visibility: Option<Visibility>,
    /// Explicit slug; generated from the title when omitted
    pub slug: Option<String>,
}

/// Input for updating an existing article. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateArticleInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub theme: Option<String>,
    pub tags: Option<Vec<String>>,
    pub categories: Option<Vec<String>>,
    pub reading_time_minutes: Option<i64>,
    pub visibility: Option<Visibility>,
    pub slug: Option<String>,
}

impl UpdateArticleInput {
    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.content.is_some()
            || self.author.is_some()
            || self.theme.is_some()
            || self.tags.is_some()
            || self.categories.is_some()
            || self.reading_time_minutes.is_some()
            || self.visibility.is_some()
            || self.slug.is_some()
    }
}

/// Pagination parameters for list queries
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ListParams {
    /// Page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub page_size: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
        }
    }
}

impl ListParams {
    /// Create new pagination parameters, clamping out-of-range values.
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, 100),
        }
    }

    /// Clamp the page to the last page for the given total, so an
    /// out-of-range request returns the final page instead of nothing.
    pub fn clamped_to(&self, total: i64) -> Self {
        let last = last_page(total, self.page_size);
        Self {
            page: self.page.min(last),
            page_size: self.page_size,
        }
    }

    /// Offset for database queries
    pub fn offset(&self) -> i64 {
        ((self.page.saturating_sub(1)) * self.page_size) as i64
    }

    /// Limit for database queries
    pub fn limit(&self) -> i64 {
        self.page_size as i64
    }
}

fn last_page(total: i64, page_size: u32) -> u32 {
    if total <= 0 {
        return 1;
    }
    ((total as u64).div_ceil(page_size as u64)) as u32
}

/// Paginated result container.
///
/// Serialized by the API layer into the `{count, next, previous, results}`
/// envelope, where `next`/`previous` are page numbers or null.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedResult<T> {
    /// Items in the current page
    pub items: Vec<T>,
    /// Total number of items across all pages
    pub total: i64,
    /// Current page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub page_size: u32,
}

impl<T> PagedResult<T> {
    /// Create a new paginated result
    pub fn new(items: Vec<T>, total: i64, params: &ListParams) -> Self {
        Self {
            items,
            total,
            page: params.page,
            page_size: params.page_size,
        }
    }

    /// Total number of pages (at least 1, mirroring the page clamping)
    pub fn total_pages(&self) -> u32 {
        last_page(self.total, self.page_size)
    }

    /// The next page number, if there is one
    pub fn next_page(&self) -> Option<u32> {
        if self.page < self.total_pages() {
            Some(self.page + 1)
        } else {
            None
        }
    }

    /// The previous page number, if there is one.
    ///
    /// An out-of-range current page has no neighbours; both directions
    /// report null so clients never receive a pointer past the end.
    pub fn previous_page(&self) -> Option<u32> {
        if self.page > 1 && self.page <= self.total_pages() {
            Some(self.page - 1)
        } else {
            None
        }
    }

    /// Map the items, keeping the pagination metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PagedResult<U> {
        PagedResult {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_params_clamps_zero_page() {
        let params = ListParams::new(0, 0);
        assert_eq!(params.page, 1);
        assert_eq!(params.page_size, 1);
    }

    #[test]
    fn test_list_params_offset() {
        let params = ListParams::new(3, 10);
        assert_eq!(params.offset(), 20);
        assert_eq!(params.limit(), 10);
    }

    #[test]
    fn test_clamped_to_last_page() {
        let params = ListParams::new(99, 10);
        let clamped = params.clamped_to(25);
        assert_eq!(clamped.page, 3);
    }

    #[test]
    fn test_clamped_to_empty_total() {
        let params = ListParams::new(5, 10);
        assert_eq!(params.clamped_to(0).page, 1);
    }

    #[test]
    fn test_paged_result_navigation() {
        let params = ListParams::new(2, 10);
        let result: PagedResult<i32> = PagedResult::new(vec![1, 2, 3], 25, &params);
        assert_eq!(result.total_pages(), 3);
        assert_eq!(result.next_page(), Some(3));
        assert_eq!(result.previous_page(), Some(1));
    }

    #[test]
    fn test_paged_result_boundaries() {
        let params = ListParams::new(1, 10);
        let result: PagedResult<i32> = PagedResult::new(vec![], 5, &params);
        assert_eq!(result.next_page(), None);
        assert_eq!(result.previous_page(), None);
    }

    #[test]
    fn test_page_past_end_has_no_neighbours() {
        let params = ListParams::new(5, 10);
        let result: PagedResult<i32> = PagedResult::new(vec![], 1, &params);
        assert_eq!(result.next_page(), None);
        assert_eq!(result.previous_page(), None);
    }

    #[test]
    fn test_visibility_round_trip() {
        assert_eq!(Visibility::from_str("draft"), Some(Visibility::Draft));
        assert_eq!(Visibility::from_str("Published"), Some(Visibility::Published));
        assert_eq!(Visibility::from_str("hidden"), None);
    }
}
