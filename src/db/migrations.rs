//! Database migrations
//!
//! Code-based migrations for the Escriba blog API. All migrations are embedded
//! directly in the binary as SQL strings, so deployment is a single binary plus
//! a database file.
//!
//! Each migration is a `Migration` struct with a unique version number, a
//! human-readable name and its SQL. Applied versions are tracked in the
//! `schema_migrations` table and never re-run.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

/// A database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Migration version number (must be unique and sequential)
    pub version: i32,
    /// Human-readable migration name
    pub name: &'static str,
    /// SQL statements to apply
    pub up: &'static str,
}

/// Migration record stored in the database
#[derive(Debug, Clone)]
pub struct MigrationRecord {
    pub version: i64,
    pub name: String,
    pub applied_at: DateTime<Utc>,
}

/// All migrations for the Escriba blog API.
pub const MIGRATIONS: &[Migration] = &[
    // Migration 1: users and sessions
    Migration {
        version: 1,
        name: "create_users_and_sessions",
        up: r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username VARCHAR(150) NOT NULL UNIQUE,
                email VARCHAR(255) NOT NULL UNIQUE,
                password_hash VARCHAR(255) NOT NULL,
                first_name VARCHAR(150) NOT NULL DEFAULT '',
                last_name VARCHAR(150) NOT NULL DEFAULT '',
                is_staff BOOLEAN NOT NULL DEFAULT 0,
                is_active BOOLEAN NOT NULL DEFAULT 1,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_users_username ON users(username);
            CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);

            CREATE TABLE IF NOT EXISTS sessions (
                id VARCHAR(64) PRIMARY KEY,
                user_id INTEGER NOT NULL,
                expires_at TIMESTAMP NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id);
            CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions(expires_at);
        "#,
    },
    // Migration 2: user profiles and notification settings
    Migration {
        version: 2,
        name: "create_profiles_and_notification_settings",
        up: r#"
            CREATE TABLE IF NOT EXISTS user_profiles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL UNIQUE,
                bio VARCHAR(500) NOT NULL DEFAULT '',
                location VARCHAR(30) NOT NULL DEFAULT '',
                birth_date DATE,
                avatar VARCHAR(255),
                gender VARCHAR(1) NOT NULL DEFAULT '',
                is_author BOOLEAN NOT NULL DEFAULT 0,
                follow_count INTEGER NOT NULL DEFAULT 0,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_user_profiles_user_id ON user_profiles(user_id);

            CREATE TABLE IF NOT EXISTS notification_settings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                profile_id INTEGER NOT NULL UNIQUE,
                notify_on_like BOOLEAN NOT NULL DEFAULT 1,
                notify_on_comment BOOLEAN NOT NULL DEFAULT 1,
                notify_on_new_follower BOOLEAN NOT NULL DEFAULT 1,
                notify_on_milestone BOOLEAN NOT NULL DEFAULT 1,
                FOREIGN KEY (profile_id) REFERENCES user_profiles(id) ON DELETE CASCADE
            );
        "#,
    },
    // Migration 3: authors, themes, categories, tags
    Migration {
        version: 3,
        name: "create_authors_themes_categories_tags",
        up: r#"
            CREATE TABLE IF NOT EXISTS authors (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(100) NOT NULL,
                biography TEXT,
                profession VARCHAR(100),
                image VARCHAR(255)
            );
            CREATE INDEX IF NOT EXISTS idx_authors_name ON authors(name);

            CREATE TABLE IF NOT EXISTS article_themes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(100) NOT NULL
            );

            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(50) NOT NULL UNIQUE
            );
            CREATE INDEX IF NOT EXISTS idx_categories_name ON categories(name);

            CREATE TABLE IF NOT EXISTS tags (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(100) NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_tags_name ON tags(name);
        "#,
    },
    // Migration 4: articles and join tables
    Migration {
        version: 4,
        name: "create_articles",
        up: r#"
            CREATE TABLE IF NOT EXISTS articles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title VARCHAR(200) NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                content TEXT NOT NULL,
                author_profile_id INTEGER,
                theme_id INTEGER,
                publication_date TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                reading_time_minutes INTEGER NOT NULL DEFAULT 5,
                visibility VARCHAR(10) NOT NULL DEFAULT 'published',
                views_count INTEGER NOT NULL DEFAULT 0,
                like_count INTEGER NOT NULL DEFAULT 0,
                version INTEGER NOT NULL DEFAULT 1,
                slug VARCHAR(255) UNIQUE,
                FOREIGN KEY (author_profile_id) REFERENCES user_profiles(id) ON DELETE SET NULL,
                FOREIGN KEY (theme_id) REFERENCES article_themes(id) ON DELETE SET NULL
            );
            CREATE INDEX IF NOT EXISTS idx_articles_title ON articles(title);
            CREATE INDEX IF NOT EXISTS idx_articles_slug ON articles(slug);
            CREATE INDEX IF NOT EXISTS idx_articles_publication_date ON articles(publication_date);

            CREATE TABLE IF NOT EXISTS article_tags (
                article_id INTEGER NOT NULL,
                tag_id INTEGER NOT NULL,
                PRIMARY KEY (article_id, tag_id),
                FOREIGN KEY (article_id) REFERENCES articles(id) ON DELETE CASCADE,
                FOREIGN KEY (tag_id) REFERENCES tags(id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS article_categories (
                article_id INTEGER NOT NULL,
                category_id INTEGER NOT NULL,
                PRIMARY KEY (article_id, category_id),
                FOREIGN KEY (article_id) REFERENCES articles(id) ON DELETE CASCADE,
                FOREIGN KEY (category_id) REFERENCES categories(id) ON DELETE CASCADE
            );
        "#,
    },
    // Migration 5: interactions and notifications
    Migration {
        version: 5,
        name: "create_interactions_and_notifications",
        up: r#"
            CREATE TABLE IF NOT EXISTS interactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                target_kind VARCHAR(10) NOT NULL,
                target_id INTEGER NOT NULL,
                kind VARCHAR(10) NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                UNIQUE (user_id, target_kind, target_id, kind),
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_interactions_target ON interactions(target_kind, target_id);

            CREATE TABLE IF NOT EXISTS notifications (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                message TEXT NOT NULL,
                interaction_kind VARCHAR(10) NOT NULL,
                read BOOLEAN NOT NULL DEFAULT 0,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_notifications_user_id ON notifications(user_id);
        "#,
    },
];

/// Run all pending migrations.
///
/// Creates the `schema_migrations` tracking table if needed, then applies
/// every migration whose version is not yet recorded, in version order.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    create_migrations_table(pool).await?;

    let applied = applied_versions(pool).await?;

    for migration in MIGRATIONS {
        if applied.contains(&(migration.version as i64)) {
            continue;
        }

        tracing::info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );

        apply_migration(pool, migration)
            .await
            .with_context(|| format!("Failed to apply migration {}: {}", migration.version, migration.name))?;
    }

    Ok(())
}

async fn create_migrations_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create schema_migrations table")?;
    Ok(())
}

async fn applied_versions(pool: &SqlitePool) -> Result<Vec<i64>> {
    let rows = sqlx::query("SELECT version FROM schema_migrations ORDER BY version")
        .fetch_all(pool)
        .await
        .context("Failed to read applied migrations")?;

    Ok(rows.iter().map(|row| row.get::<i64, _>("version")).collect())
}

async fn apply_migration(pool: &SqlitePool, migration: &Migration) -> Result<()> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    // SQLite executes one statement per query call, so split on ';'
    for statement in migration.up.split(';') {
        let statement = statement.trim();
        if statement.is_empty() {
            continue;
        }
        sqlx::query(statement)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed statement in migration {}", migration.version))?;
    }

    sqlx::query("INSERT INTO schema_migrations (version, name) VALUES (?, ?)")
        .bind(migration.version)
        .bind(migration.name)
        .execute(&mut *tx)
        .await
        .context("Failed to record migration")?;

    tx.commit().await.context("Failed to commit migration")?;
    Ok(())
}

/// List the applied migration records, newest last.
pub async fn list_applied(pool: &SqlitePool) -> Result<Vec<MigrationRecord>> {
    let rows = sqlx::query(
        "SELECT version, name, applied_at FROM schema_migrations ORDER BY version",
    )
    .fetch_all(pool)
    .await
    .context("Failed to list applied migrations")?;

    Ok(rows
        .iter()
        .map(|row| MigrationRecord {
            version: row.get("version"),
            name: row.get("name"),
            applied_at: row.get("applied_at"),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    #[tokio::test]
    async fn test_migrations_apply_cleanly() {
        let pool = create_test_pool().await.unwrap();
        run_migrations(&pool).await.expect("Migrations should apply");

        let applied = list_applied(&pool).await.unwrap();
        assert_eq!(applied.len(), MIGRATIONS.len());
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = create_test_pool().await.unwrap();
        run_migrations(&pool).await.unwrap();
        run_migrations(&pool).await.expect("Re-running should be a no-op");

        let applied = list_applied(&pool).await.unwrap();
        assert_eq!(applied.len(), MIGRATIONS.len());
    }

    #[tokio::test]
    async fn test_versions_are_unique_and_ordered() {
        let mut versions: Vec<i32> = MIGRATIONS.iter().map(|m| m.version).collect();
        let original = versions.clone();
        versions.sort();
        versions.dedup();
        assert_eq!(versions.len(), MIGRATIONS.len());
        assert_eq!(versions, original);
    }

    #[tokio::test]
    async fn test_core_tables_exist() {
        let pool = create_test_pool().await.unwrap();
        run_migrations(&pool).await.unwrap();

        for table in [
            "users",
            "sessions",
            "user_profiles",
            "notification_settings",
            "authors",
            "article_themes",
            "categories",
            "tags",
            "articles",
            "article_tags",
            "article_categories",
            "interactions",
            "notifications",
        ] {
            let query = format!("SELECT count(*) FROM {}", table);
            sqlx::query(&query)
                .fetch_one(&pool)
                .await
                .unwrap_or_else(|_| panic!("Table {} should exist", table));
        }
    }

    #[tokio::test]
    async fn test_interaction_uniqueness_constraint() {
        let pool = create_test_pool().await.unwrap();
        run_migrations(&pool).await.unwrap();

        sqlx::query("INSERT INTO users (username, email, password_hash) VALUES ('u', 'u@e.com', 'x')")
            .execute(&pool)
            .await
            .unwrap();

        let insert = "INSERT INTO interactions (user_id, target_kind, target_id, kind) VALUES (1, 'article', 1, 'like')";
        sqlx::query(insert).execute(&pool).await.unwrap();
        assert!(sqlx::query(insert).execute(&pool).await.is_err());
    }
}
