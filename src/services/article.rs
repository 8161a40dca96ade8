//! Article service
//!
//! Business logic for articles:
//! - Create/update with related records resolved by name (theme, tags,
//!   categories get-or-create; the byline through the username of a user
//!   whose profile carries the author flag)
//! - Slug generation from the title with uniqueness handling
//! - Detail assembly (tags, categories, theme, byline, neighboring posts)
//!   with an atomic view-counter increment
//! - Search, trending and aggregate statistics

use crate::db::repositories::{
    ArticleFilter, ArticleRepository, ArticleSort, ArticleStatistics, CategoryRepository,
    ProfileRepository, SortOrder, TagRepository, ThemeRepository, UserRepository,
};
use crate::models::{
    Article, ArticleTheme, Category, CreateArticleInput, ListParams, PagedResult, Tag,
    UpdateArticleInput,
};
use anyhow::Context;
use serde::Serialize;
use std::sync::Arc;

/// Error types for article service operations
#[derive(Debug, thiserror::Error)]
pub enum ArticleServiceError {
    /// Article (or referenced record) not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Slug conflict
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Compact article reference used for previous/next navigation
#[derive(Debug, Clone, Serialize)]
pub struct ArticleSummary {
    pub id: i64,
    pub title: String,
    pub slug: Option<String>,
}

impl From<Article> for ArticleSummary {
    fn from(article: Article) -> Self {
        Self {
            id: article.id,
            title: article.title,
            slug: article.slug,
        }
    }
}

/// Full article detail response
#[derive(Debug, Clone, Serialize)]
pub struct ArticleDetail {
    #[serde(flatten)]
    pub article: Article,
    /// Username of the authoring user, when a byline is set
    pub author: Option<String>,
    /// Theme name
    pub theme: Option<String>,
    pub tags: Vec<Tag>,
    pub categories: Vec<Category>,
    /// First category name, for breadcrumb-style display
    pub category: Option<String>,
    pub previous_article: Option<ArticleSummary>,
    pub next_article: Option<ArticleSummary>,
}

/// Article service
pub struct ArticleService {
    article_repo: Arc<dyn ArticleRepository>,
    theme_repo: Arc<dyn ThemeRepository>,
    tag_repo: Arc<dyn TagRepository>,
    category_repo: Arc<dyn CategoryRepository>,
    profile_repo: Arc<dyn ProfileRepository>,
    user_repo: Arc<dyn UserRepository>,
}

impl ArticleService {
    pub fn new(
        article_repo: Arc<dyn ArticleRepository>,
        theme_repo: Arc<dyn ThemeRepository>,
        tag_repo: Arc<dyn TagRepository>,
        category_repo: Arc<dyn CategoryRepository>,
        profile_repo: Arc<dyn ProfileRepository>,
        user_repo: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            article_repo,
            theme_repo,
            tag_repo,
            category_repo,
            profile_repo,
            user_repo,
        }
    }

    /// List published articles, paginated, newest first
    pub async fn list(
        &self,
        params: ListParams,
    ) -> Result<PagedResult<Article>, ArticleServiceError> {
        let total = self
            .article_repo
            .count()
            .await
            .context("Failed to count articles")?;
        let params = params.clamped_to(total);
        let articles = self
            .article_repo
            .list(params.offset(), params.limit())
            .await
            .context("Failed to list articles")?;

        Ok(PagedResult::new(articles, total, &params))
    }

    /// Fetch an article by ID and record the view.
    pub async fn detail_by_id(&self, id: i64) -> Result<ArticleDetail, ArticleServiceError> {
        let article = self
            .article_repo
            .get_by_id(id)
            .await
            .context("Failed to get article")?
            .ok_or_else(|| ArticleServiceError::NotFound("Article not found".to_string()))?;

        self.assemble_detail(article).await
    }

    /// Fetch an article by slug and record the view.
    pub async fn detail_by_slug(&self, slug: &str) -> Result<ArticleDetail, ArticleServiceError> {
        let article = self
            .article_repo
            .get_by_slug(slug)
            .await
            .context("Failed to get article")?
            .ok_or_else(|| ArticleServiceError::NotFound("Article not found".to_string()))?;

        self.assemble_detail(article).await
    }

    async fn assemble_detail(
        &self,
        mut article: Article,
    ) -> Result<ArticleDetail, ArticleServiceError> {
        self.article_repo
            .increment_views(article.id)
            .await
            .context("Failed to increment views")?;
        article.views_count += 1;

        let tags = self
            .tag_repo
            .get_by_article_id(article.id)
            .await
            .context("Failed to get article tags")?;
        let categories = self
            .category_repo
            .get_by_article_id(article.id)
            .await
            .context("Failed to get article categories")?;
        let category = categories.first().map(|c| c.name.clone());

        let theme = match article.theme_id {
            Some(theme_id) => self
                .theme_repo
                .get_by_id(theme_id)
                .await
                .context("Failed to get theme")?
                .map(|t| t.name),
            None => None,
        };

        let author = self.byline_username(article.author_profile_id).await?;

        let previous_article = self
            .article_repo
            .previous_by_date(article.publication_date)
            .await
            .context("Failed to get previous article")?
            .map(ArticleSummary::from);
        let next_article = self
            .article_repo
            .next_by_date(article.publication_date)
            .await
            .context("Failed to get next article")?
            .map(ArticleSummary::from);

        Ok(ArticleDetail {
            article,
            author,
            theme,
            tags,
            categories,
            category,
            previous_article,
            next_article,
        })
    }

    async fn byline_username(
        &self,
        profile_id: Option<i64>,
    ) -> Result<Option<String>, ArticleServiceError> {
        let Some(profile_id) = profile_id else {
            return Ok(None);
        };
        let Some(profile) = self
            .profile_repo
            .get_by_id(profile_id)
            .await
            .context("Failed to get author profile")?
        else {
            return Ok(None);
        };
        let user = self
            .user_repo
            .get_by_id(profile.user_id)
            .await
            .context("Failed to get author user")?;
        Ok(user.map(|u| u.username))
    }

    /// Create an article.
    ///
    /// The theme, tags and categories are created on first use. The author
    /// username must belong to a user whose profile has the author flag.
    pub async fn create(
        &self,
        input: CreateArticleInput,
    ) -> Result<Article, ArticleServiceError> {
        if input.title.trim().is_empty() {
            return Err(ArticleServiceError::ValidationError(
                "Title cannot be empty".to_string(),
            ));
        }
        if input.content.trim().is_empty() {
            return Err(ArticleServiceError::ValidationError(
                "Content cannot be empty".to_string(),
            ));
        }
        if let Some(minutes) = input.reading_time_minutes {
            if minutes < 1 {
                return Err(ArticleServiceError::ValidationError(
                    "Reading time must be at least 1 minute".to_string(),
                ));
            }
        }

        let author_profile_id = match &input.author {
            Some(username) => Some(self.resolve_author(username).await?),
            None => None,
        };
        let theme_id = match &input.theme {
            Some(name) => Some(
                self.theme_repo
                    .get_or_create(name)
                    .await
                    .context("Failed to resolve theme")?
                    .id,
            ),
            None => None,
        };

        let slug = match input.slug {
            Some(slug) => {
                if self
                    .article_repo
                    .get_by_slug(&slug)
                    .await
                    .context("Failed to check slug")?
                    .is_some()
                {
                    return Err(ArticleServiceError::Conflict(format!(
                        "Slug '{}' is already in use",
                        slug
                    )));
                }
                slug
            }
            None => self.unique_slug(&input.title).await?,
        };

        let mut article = Article::new(input.title, input.content);
        article.description = input.description;
        article.author_profile_id = author_profile_id;
        article.theme_id = theme_id;
        article.slug = Some(slug);
        if let Some(minutes) = input.reading_time_minutes {
            article.reading_time_minutes = minutes;
        }
        if let Some(visibility) = input.visibility {
            article.visibility = visibility;
        }

        let created = self
            .article_repo
            .create(&article)
            .await
            .context("Failed to create article")?;

        self.attach_tags(created.id, &input.tags).await?;
        self.attach_categories(created.id, &input.categories).await?;

        tracing::info!(article_id = created.id, title = %created.title, "article created");
        Ok(created)
    }

    /// Apply a partial update to an article; any change bumps the version.
    pub async fn update(
        &self,
        id: i64,
        input: UpdateArticleInput,
    ) -> Result<Article, ArticleServiceError> {
        let mut article = self
            .article_repo
            .get_by_id(id)
            .await
            .context("Failed to get article")?
            .ok_or_else(|| ArticleServiceError::NotFound("Article not found".to_string()))?;

        if !input.has_changes() {
            return Ok(article);
        }

        if let Some(title) = input.title {
            if title.trim().is_empty() {
                return Err(ArticleServiceError::ValidationError(
                    "Title cannot be empty".to_string(),
                ));
            }
            article.title = title;
        }
        if let Some(description) = input.description {
            article.description = description;
        }
        if let Some(content) = input.content {
            if content.trim().is_empty() {
                return Err(ArticleServiceError::ValidationError(
                    "Content cannot be empty".to_string(),
                ));
            }
            article.content = content;
        }
        if let Some(username) = input.author {
            article.author_profile_id = Some(self.resolve_author(&username).await?);
        }
        if let Some(name) = input.theme {
            article.theme_id = Some(
                self.theme_repo
                    .get_or_create(&name)
                    .await
                    .context("Failed to resolve theme")?
                    .id,
            );
        }
        if let Some(minutes) = input.reading_time_minutes {
            if minutes < 1 {
                return Err(ArticleServiceError::ValidationError(
                    "Reading time must be at least 1 minute".to_string(),
                ));
            }
            article.reading_time_minutes = minutes;
        }
        if let Some(visibility) = input.visibility {
            article.visibility = visibility;
        }
        if let Some(slug) = input.slug {
            if let Some(existing) = self
                .article_repo
                .get_by_slug(&slug)
                .await
                .context("Failed to check slug")?
            {
                if existing.id != id {
                    return Err(ArticleServiceError::Conflict(format!(
                        "Slug '{}' is already in use",
                        slug
                    )));
                }
            }
            article.slug = Some(slug);
        }

        article.version += 1;
        self.article_repo
            .update(&article)
            .await
            .context("Failed to update article")?;

        if let Some(tags) = input.tags {
            self.attach_tags(id, &tags).await?;
        }
        if let Some(categories) = input.categories {
            self.attach_categories(id, &categories).await?;
        }

        Ok(article)
    }

    /// Replace an article's tag set with get-or-create by name.
    ///
    /// The list must be non-empty; names are trimmed and blank entries
    /// rejected.
    pub async fn replace_tags(
        &self,
        id: i64,
        tag_names: &[String],
    ) -> Result<Vec<Tag>, ArticleServiceError> {
        if tag_names.is_empty() {
            return Err(ArticleServiceError::ValidationError(
                "Tag list cannot be empty".to_string(),
            ));
        }
        if tag_names.iter().any(|name| name.trim().is_empty()) {
            return Err(ArticleServiceError::ValidationError(
                "Tag names cannot be blank".to_string(),
            ));
        }

        if self
            .article_repo
            .get_by_id(id)
            .await
            .context("Failed to get article")?
            .is_none()
        {
            return Err(ArticleServiceError::NotFound(
                "Article not found".to_string(),
            ));
        }

        self.attach_tags(id, tag_names).await?;
        self.tag_repo
            .get_by_article_id(id)
            .await
            .context("Failed to get article tags")
            .map_err(Into::into)
    }

    /// Search published articles, paginated.
    pub async fn search(
        &self,
        filter: ArticleFilter,
        sort: ArticleSort,
        order: SortOrder,
        params: ListParams,
    ) -> Result<PagedResult<Article>, ArticleServiceError> {
        let total = self
            .article_repo
            .count_matching(&filter)
            .await
            .context("Failed to count matching articles")?;
        let params = params.clamped_to(total);
        let articles = self
            .article_repo
            .search(&filter, sort, order, params.offset(), params.limit())
            .await
            .context("Failed to search articles")?;

        Ok(PagedResult::new(articles, total, &params))
    }

    /// Most viewed published articles
    pub async fn trending(&self, limit: i64) -> Result<Vec<Article>, ArticleServiceError> {
        if limit < 1 {
            return Err(ArticleServiceError::ValidationError(
                "Limit must be a positive integer".to_string(),
            ));
        }
        self.article_repo
            .trending(limit)
            .await
            .context("Failed to list trending articles")
            .map_err(Into::into)
    }

    /// Aggregate statistics over all articles
    pub async fn statistics(&self) -> Result<ArticleStatistics, ArticleServiceError> {
        self.article_repo
            .statistics()
            .await
            .context("Failed to compute article statistics")
            .map_err(Into::into)
    }

    /// Published articles by an author profile, paginated.
    ///
    /// Errors with NotFound when the profile does not exist.
    pub async fn list_by_author(
        &self,
        profile_id: i64,
        params: ListParams,
    ) -> Result<PagedResult<Article>, ArticleServiceError> {
        if self
            .profile_repo
            .get_by_id(profile_id)
            .await
            .context("Failed to get author profile")?
            .is_none()
        {
            return Err(ArticleServiceError::NotFound(
                "Author profile not found".to_string(),
            ));
        }

        let total = self
            .article_repo
            .count_by_author(profile_id)
            .await
            .context("Failed to count author articles")?;
        let params = params.clamped_to(total);
        let articles = self
            .article_repo
            .list_by_author(profile_id, params.offset(), params.limit())
            .await
            .context("Failed to list author articles")?;

        Ok(PagedResult::new(articles, total, &params))
    }

    /// List themes, paginated
    pub async fn themes(
        &self,
        params: ListParams,
    ) -> Result<PagedResult<ArticleTheme>, ArticleServiceError> {
        let total = self
            .theme_repo
            .count()
            .await
            .context("Failed to count themes")?;
        let params = params.clamped_to(total);
        let themes = self
            .theme_repo
            .list(params.offset(), params.limit())
            .await
            .context("Failed to list themes")?;

        Ok(PagedResult::new(themes, total, &params))
    }

    async fn resolve_author(&self, username: &str) -> Result<i64, ArticleServiceError> {
        let profile = self
            .profile_repo
            .get_by_username(username)
            .await
            .context("Failed to get author profile")?
            .ok_or_else(|| {
                ArticleServiceError::ValidationError(format!(
                    "No profile found for user '{}'",
                    username
                ))
            })?;

        if !profile.is_author {
            return Err(ArticleServiceError::ValidationError(format!(
                "User '{}' is not an author",
                username
            )));
        }

        Ok(profile.id)
    }

    async fn attach_tags(&self, article_id: i64, names: &[String]) -> Result<(), ArticleServiceError> {
        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            let tag = self
                .tag_repo
                .get_or_create(name.trim())
                .await
                .context("Failed to resolve tag")?;
            if !ids.contains(&tag.id) {
                ids.push(tag.id);
            }
        }
        self.tag_repo
            .set_article_tags(article_id, &ids)
            .await
            .context("Failed to set article tags")
            .map_err(Into::into)
    }

    async fn attach_categories(
        &self,
        article_id: i64,
        names: &[String],
    ) -> Result<(), ArticleServiceError> {
        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            let category = self
                .category_repo
                .get_or_create(name.trim())
                .await
                .context("Failed to resolve category")?;
            if !ids.contains(&category.id) {
                ids.push(category.id);
            }
        }
        self.category_repo
            .set_article_categories(article_id, &ids)
            .await
            .context("Failed to set article categories")
            .map_err(Into::into)
    }

    async fn unique_slug(&self, title: &str) -> Result<String, ArticleServiceError> {
        let base = generate_slug(title);
        let base = if base.is_empty() {
            "article".to_string()
        } else {
            base
        };

        if self
            .article_repo
            .get_by_slug(&base)
            .await
            .context("Failed to check slug")?
            .is_none()
        {
            return Ok(base);
        }

        for n in 2.. {
            let candidate = format!("{}-{}", base, n);
            if self
                .article_repo
                .get_by_slug(&candidate)
                .await
                .context("Failed to check slug")?
                .is_none()
            {
                return Ok(candidate);
            }
        }
        unreachable!()
    }
}

/// Generate a URL-friendly slug from a title.
///
/// Lowercases, maps spaces and ASCII punctuation to hyphens, keeps non-ASCII
/// characters, and collapses consecutive hyphens.
pub fn generate_slug(title: &str) -> String {
    let slug: String = title
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || !c.is_ascii() {
                c
            } else {
                '-'
            }
        })
        .collect();

    let mut result = String::new();
    let mut prev_hyphen = false;
    for c in slug.chars() {
        if c == '-' {
            if !prev_hyphen && !result.is_empty() {
                result.push(c);
                prev_hyphen = true;
            }
        } else {
            result.push(c);
            prev_hyphen = false;
        }
    }

    result.trim_end_matches('-').to_string()
}
