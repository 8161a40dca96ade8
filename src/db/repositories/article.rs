//! Article repository
//!
//! Database operations for articles: CRUD, pagination, keyword search with
//! optional filters, allowlisted sorting, trending and aggregate statistics.

use crate::models::{Article, CategoryWithCount, Visibility};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{query::Query, Row, Sqlite, SqlitePool};
use std::sync::Arc;

/// Filter for article search queries. Unset fields do not constrain the
/// result; only published articles are ever matched.
#[derive(Debug, Clone, Default)]
pub struct ArticleFilter {
    /// Substring match against the title (and the description when
    /// `match_description` is set)
    pub keyword: Option<String>,
    /// Theme name (exact)
    pub theme: Option<String>,
    /// Category name (exact)
    pub category: Option<String>,
    /// Tag name (exact)
    pub tag: Option<String>,
    /// Username of the authoring user (exact)
    pub author: Option<String>,
    /// Extend the keyword match to the description column
    pub match_description: bool,
}

/// Sortable article columns. A closed set, so the ORDER BY clause can never
/// be built from caller input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArticleSort {
    #[default]
    PublicationDate,
    ViewsCount,
    ReadingTime,
}

impl ArticleSort {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "publication_date" => Some(ArticleSort::PublicationDate),
            "views_count" => Some(ArticleSort::ViewsCount),
            "reading_time_minutes" => Some(ArticleSort::ReadingTime),
            _ => None,
        }
    }

    fn column(&self) -> &'static str {
        match self {
            ArticleSort::PublicationDate => "a.publication_date",
            ArticleSort::ViewsCount => "a.views_count",
            ArticleSort::ReadingTime => "a.reading_time_minutes",
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Aggregate article statistics
#[derive(Debug, Clone, serde::Serialize)]
pub struct ArticleStatistics {
    pub total_articles: i64,
    pub total_views: i64,
    /// Average reading time in minutes, integer-truncated
    pub average_reading_time: i64,
    pub articles_per_category: Vec<CategoryWithCount>,
}

/// Article repository trait
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Create a new article
    async fn create(&self, article: &Article) -> Result<Article>;

    /// Get article by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Article>>;

    /// Get article by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Article>>;

    /// Persist mutable article fields
    async fn update(&self, article: &Article) -> Result<()>;

    /// Delete an article
    async fn delete(&self, id: i64) -> Result<()>;

    /// List published articles, newest first
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Article>>;

    /// Count published articles
    async fn count(&self) -> Result<i64>;

    /// Search published articles with the given filter and ordering
    async fn search(
        &self,
        filter: &ArticleFilter,
        sort: ArticleSort,
        order: SortOrder,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Article>>;

    /// Count published articles matching the filter
    async fn count_matching(&self, filter: &ArticleFilter) -> Result<i64>;

    /// Most viewed published articles
    async fn trending(&self, limit: i64) -> Result<Vec<Article>>;

    /// Aggregate statistics over all articles
    async fn statistics(&self) -> Result<ArticleStatistics>;

    /// Published articles by author profile, newest first
    async fn list_by_author(&self, profile_id: i64, offset: i64, limit: i64)
        -> Result<Vec<Article>>;

    /// Count published articles by author profile
    async fn count_by_author(&self, profile_id: i64) -> Result<i64>;

    /// Published articles carrying a tag, newest first
    async fn list_by_tag(&self, tag_id: i64, offset: i64, limit: i64) -> Result<Vec<Article>>;

    /// Count published articles carrying a tag
    async fn count_by_tag(&self, tag_id: i64) -> Result<i64>;

    /// Published articles in a category, newest first
    async fn list_by_category(
        &self,
        category_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Article>>;

    /// Count published articles in a category
    async fn count_by_category(&self, category_id: i64) -> Result<i64>;

    /// Increment the view counter in a single UPDATE
    async fn increment_views(&self, id: i64) -> Result<()>;

    /// Adjust the like counter by `delta` (may be negative)
    async fn adjust_like_count(&self, id: i64, delta: i64) -> Result<()>;

    /// The published article immediately before the given publication date
    async fn previous_by_date(&self, date: DateTime<Utc>) -> Result<Option<Article>>;

    /// The published article immediately after the given publication date
    async fn next_by_date(&self, date: DateTime<Utc>) -> Result<Option<Article>>;
}

/// SQLx-based article repository implementation
pub struct SqlxArticleRepository {
    pool: SqlitePool,
}

impl SqlxArticleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn ArticleRepository> {
        Arc::new(Self::new(pool))
    }
}

const ARTICLE_COLUMNS: &str = "a.id, a.title, a.description, a.content, a.author_profile_id, a.theme_id, a.publication_date, a.reading_time_minutes, a.visibility, a.views_count, a.like_count, a.version, a.slug";

fn row_to_article(row: &SqliteRow) -> Result<Article> {
    let visibility: String = row.get("visibility");
    Ok(Article {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        content: row.get("content"),
        author_profile_id: row.get("author_profile_id"),
        theme_id: row.get("theme_id"),
        publication_date: row.get("publication_date"),
        reading_time_minutes: row.get("reading_time_minutes"),
        visibility: Visibility::from_str(&visibility).unwrap_or_default(),
        views_count: row.get("views_count"),
        like_count: row.get("like_count"),
        version: row.get("version"),
        slug: row.get("slug"),
    })
}

// Every optional filter is expressed as `(? IS NULL OR ...)` so the SQL text
// stays static; each value is bound once per placeholder it appears in.
const FILTER_CLAUSE: &str = r#"
    a.visibility = 'published'
    AND (? IS NULL OR a.title LIKE ? OR a.description LIKE ?)
    AND (? IS NULL OR a.theme_id IN (SELECT id FROM article_themes WHERE name = ?))
    AND (? IS NULL OR EXISTS (
        SELECT 1 FROM article_categories ac
        JOIN categories c ON c.id = ac.category_id
        WHERE ac.article_id = a.id AND c.name = ?))
    AND (? IS NULL OR EXISTS (
        SELECT 1 FROM article_tags at
        JOIN tags t ON t.id = at.tag_id
        WHERE at.article_id = a.id AND t.name = ?))
    AND (? IS NULL OR a.author_profile_id IN (
        SELECT p.id FROM user_profiles p
        JOIN users u ON u.id = p.user_id
        WHERE u.username = ?))
"#;

/// Filter values pre-formatted for binding. The keyword becomes a LIKE
/// pattern; the description pattern is absent unless the filter extends the
/// match to the description column (`x LIKE NULL` is never true).
struct FilterBinds {
    keyword: Option<String>,
    description: Option<String>,
    theme: Option<String>,
    category: Option<String>,
    tag: Option<String>,
    author: Option<String>,
}

impl FilterBinds {
    fn from(filter: &ArticleFilter) -> Self {
        let keyword = filter.keyword.as_ref().map(|kw| format!("%{}%", kw));
        let description = if filter.match_description {
            keyword.clone()
        } else {
            None
        };
        Self {
            keyword,
            description,
            theme: filter.theme.clone(),
            category: filter.category.clone(),
            tag: filter.tag.clone(),
            author: filter.author.clone(),
        }
    }

    fn apply<'q>(
        &'q self,
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> Query<'q, Sqlite, SqliteArguments<'q>> {
        query
            .bind(&self.keyword)
            .bind(&self.keyword)
            .bind(&self.description)
            .bind(&self.theme)
            .bind(&self.theme)
            .bind(&self.category)
            .bind(&self.category)
            .bind(&self.tag)
            .bind(&self.tag)
            .bind(&self.author)
            .bind(&self.author)
    }
}

#[async_trait]
impl ArticleRepository for SqlxArticleRepository {
    async fn create(&self, article: &Article) -> Result<Article> {
        let result = sqlx::query(
            r#"
            INSERT INTO articles (title, description, content, author_profile_id, theme_id,
                                  publication_date, reading_time_minutes, visibility,
                                  views_count, like_count, version, slug)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&article.title)
        .bind(&article.description)
        .bind(&article.content)
        .bind(article.author_profile_id)
        .bind(article.theme_id)
        .bind(article.publication_date)
        .bind(article.reading_time_minutes)
        .bind(article.visibility.as_str())
        .bind(article.views_count)
        .bind(article.like_count)
        .bind(article.version)
        .bind(&article.slug)
        .execute(&self.pool)
        .await
        .context("Failed to create article")?;

        let mut created = article.clone();
        created.id = result.last_insert_rowid();
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Article>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM articles a WHERE a.id = ?",
            ARTICLE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get article by ID")?;

        row.as_ref().map(row_to_article).transpose()
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Article>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM articles a WHERE a.slug = ?",
            ARTICLE_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get article by slug")?;

        row.as_ref().map(row_to_article).transpose()
    }

    async fn update(&self, article: &Article) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE articles
            SET title = ?, description = ?, content = ?, author_profile_id = ?, theme_id = ?,
                publication_date = ?, reading_time_minutes = ?, visibility = ?,
                version = ?, slug = ?
            WHERE id = ?
            "#,
        )
        .bind(&article.title)
        .bind(&article.description)
        .bind(&article.content)
        .bind(article.author_profile_id)
        .bind(article.theme_id)
        .bind(article.publication_date)
        .bind(article.reading_time_minutes)
        .bind(article.visibility.as_str())
        .bind(article.version)
        .bind(&article.slug)
        .bind(article.id)
        .execute(&self.pool)
        .await
        .context("Failed to update article")?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM articles WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete article")?;
        Ok(())
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Article>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM articles a WHERE a.visibility = 'published' ORDER BY a.publication_date DESC LIMIT ? OFFSET ?",
            ARTICLE_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list articles")?;

        rows.iter().map(row_to_article).collect()
    }

    async fn count(&self) -> Result<i64> {
        let row =
            sqlx::query("SELECT COUNT(*) AS count FROM articles WHERE visibility = 'published'")
                .fetch_one(&self.pool)
                .await
                .context("Failed to count articles")?;
        Ok(row.get("count"))
    }

    async fn search(
        &self,
        filter: &ArticleFilter,
        sort: ArticleSort,
        order: SortOrder,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Article>> {
        let sql = format!(
            "SELECT {} FROM articles a WHERE {} ORDER BY {} {} LIMIT ? OFFSET ?",
            ARTICLE_COLUMNS,
            FILTER_CLAUSE,
            sort.column(),
            order.keyword()
        );
        let binds = FilterBinds::from(filter);
        let rows = binds
            .apply(sqlx::query(&sql))
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .context("Failed to search articles")?;

        rows.iter().map(row_to_article).collect()
    }

    async fn count_matching(&self, filter: &ArticleFilter) -> Result<i64> {
        let sql = format!(
            "SELECT COUNT(*) AS count FROM articles a WHERE {}",
            FILTER_CLAUSE
        );
        let binds = FilterBinds::from(filter);
        let row = binds
            .apply(sqlx::query(&sql))
            .fetch_one(&self.pool)
            .await
            .context("Failed to count matching articles")?;
        Ok(row.get("count"))
    }

    async fn trending(&self, limit: i64) -> Result<Vec<Article>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM articles a WHERE a.visibility = 'published' ORDER BY a.views_count DESC LIMIT ?",
            ARTICLE_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list trending articles")?;

        rows.iter().map(row_to_article).collect()
    }

    async fn statistics(&self) -> Result<ArticleStatistics> {
        let totals = sqlx::query(
            r#"
            SELECT COUNT(*) AS total,
                   COALESCE(SUM(views_count), 0) AS views,
                   CAST(COALESCE(AVG(reading_time_minutes), 0) AS INTEGER) AS avg_reading
            FROM articles
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .context("Failed to aggregate article statistics")?;

        let per_category = sqlx::query(
            r#"
            SELECT c.id, c.name, COUNT(ac.article_id) AS post_count
            FROM categories c
            LEFT JOIN article_categories ac ON ac.category_id = c.id
            GROUP BY c.id, c.name
            ORDER BY c.name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to count articles per category")?;

        Ok(ArticleStatistics {
            total_articles: totals.get("total"),
            total_views: totals.get("views"),
            average_reading_time: totals.get("avg_reading"),
            articles_per_category: per_category
                .iter()
                .map(|row| CategoryWithCount {
                    id: row.get("id"),
                    name: row.get("name"),
                    post_count: row.get("post_count"),
                })
                .collect(),
        })
    }

    async fn list_by_author(
        &self,
        profile_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Article>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM articles a WHERE a.visibility = 'published' AND a.author_profile_id = ? ORDER BY a.publication_date DESC LIMIT ? OFFSET ?",
            ARTICLE_COLUMNS
        ))
        .bind(profile_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list articles by author")?;

        rows.iter().map(row_to_article).collect()
    }

    async fn count_by_author(&self, profile_id: i64) -> Result<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS count FROM articles WHERE visibility = 'published' AND author_profile_id = ?",
        )
        .bind(profile_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to count articles by author")?;
        Ok(row.get("count"))
    }

    async fn list_by_tag(&self, tag_id: i64, offset: i64, limit: i64) -> Result<Vec<Article>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM articles a
            JOIN article_tags at ON at.article_id = a.id
            WHERE a.visibility = 'published' AND at.tag_id = ?
            ORDER BY a.publication_date DESC LIMIT ? OFFSET ?
            "#,
            ARTICLE_COLUMNS
        ))
        .bind(tag_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list articles by tag")?;

        rows.iter().map(row_to_article).collect()
    }

    async fn count_by_tag(&self, tag_id: i64) -> Result<i64> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS count FROM articles a
            JOIN article_tags at ON at.article_id = a.id
            WHERE a.visibility = 'published' AND at.tag_id = ?
            "#,
        )
        .bind(tag_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to count articles by tag")?;
        Ok(row.get("count"))
    }

    async fn list_by_category(
        &self,
        category_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Article>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM articles a
            JOIN article_categories ac ON ac.article_id = a.id
            WHERE a.visibility = 'published' AND ac.category_id = ?
            ORDER BY a.publication_date DESC LIMIT ? OFFSET ?
            "#,
            ARTICLE_COLUMNS
        ))
        .bind(category_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list articles by category")?;

        rows.iter().map(row_to_article).collect()
    }

    async fn count_by_category(&self, category_id: i64) -> Result<i64> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS count FROM articles a
            JOIN article_categories ac ON ac.article_id = a.id
            WHERE a.visibility = 'published' AND ac.category_id = ?
            "#,
        )
        .bind(category_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to count articles by category")?;
        Ok(row.get("count"))
    }

    async fn increment_views(&self, id: i64) -> Result<()> {
        // Single UPDATE expression, safe under concurrent reads
        sqlx::query("UPDATE articles SET views_count = views_count + 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to increment view count")?;
        Ok(())
    }

    async fn adjust_like_count(&self, id: i64, delta: i64) -> Result<()> {
        sqlx::query("UPDATE articles SET like_count = MAX(like_count + ?, 0) WHERE id = ?")
            .bind(delta)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to adjust like count")?;
        Ok(())
    }

    async fn previous_by_date(&self, date: DateTime<Utc>) -> Result<Option<Article>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM articles a WHERE a.visibility = 'published' AND a.publication_date < ? ORDER BY a.publication_date DESC LIMIT 1",
            ARTICLE_COLUMNS
        ))
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get previous article")?;

        row.as_ref().map(row_to_article).transpose()
    }

    async fn next_by_date(&self, date: DateTime<Utc>) -> Result<Option<Article>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM articles a WHERE a.visibility = 'published' AND a.publication_date > ? ORDER BY a.publication_date ASC LIMIT 1",
            ARTICLE_COLUMNS
        ))
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get next article")?;

        row.as_ref().map(row_to_article).transpose()
    }
}
