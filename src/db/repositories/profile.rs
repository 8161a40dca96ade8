//! Profile repository
//!
//! Database operations for user profiles, including the follower counter
//! maintained by the interaction service.

use crate::models::{Gender, UserProfile};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Profile repository trait
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Create a new profile
    async fn create(&self, profile: &UserProfile) -> Result<UserProfile>;

    /// Get profile by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<UserProfile>>;

    /// Get profile by owning user ID
    async fn get_by_user_id(&self, user_id: i64) -> Result<Option<UserProfile>>;

    /// Get profile by the owning user's username
    async fn get_by_username(&self, username: &str) -> Result<Option<UserProfile>>;

    /// Persist mutable profile fields
    async fn update(&self, profile: &UserProfile) -> Result<()>;

    /// Adjust the follower counter by `delta` (may be negative)
    async fn adjust_follow_count(&self, id: i64, delta: i64) -> Result<()>;
}

/// SQLx-based profile repository implementation
pub struct SqlxProfileRepository {
    pool: SqlitePool,
}

impl SqlxProfileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn ProfileRepository> {
        Arc::new(Self::new(pool))
    }
}

const PROFILE_COLUMNS: &str = "id, user_id, bio, location, birth_date, avatar, gender, is_author, follow_count, created_at, updated_at";

fn row_to_profile(row: &sqlx::sqlite::SqliteRow) -> Result<UserProfile> {
    let gender: String = row.get("gender");
    Ok(UserProfile {
        id: row.get("id"),
        user_id: row.get("user_id"),
        bio: row.get("bio"),
        location: row.get("location"),
        birth_date: row.get("birth_date"),
        avatar: row.get("avatar"),
        gender: Gender::from_str(&gender).unwrap_or_default(),
        is_author: row.get("is_author"),
        follow_count: row.get("follow_count"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[async_trait]
impl ProfileRepository for SqlxProfileRepository {
    async fn create(&self, profile: &UserProfile) -> Result<UserProfile> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO user_profiles (user_id, bio, location, birth_date, avatar, gender, is_author, follow_count, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(profile.user_id)
        .bind(&profile.bio)
        .bind(&profile.location)
        .bind(profile.birth_date)
        .bind(&profile.avatar)
        .bind(profile.gender.as_str())
        .bind(profile.is_author)
        .bind(profile.follow_count)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create profile")?;

        let mut created = profile.clone();
        created.id = result.last_insert_rowid();
        created.created_at = now;
        created.updated_at = now;
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<UserProfile>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM user_profiles WHERE id = ?",
            PROFILE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get profile by ID")?;

        row.as_ref().map(row_to_profile).transpose()
    }

    async fn get_by_user_id(&self, user_id: i64) -> Result<Option<UserProfile>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM user_profiles WHERE user_id = ?",
            PROFILE_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get profile by user ID")?;

        row.as_ref().map(row_to_profile).transpose()
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<UserProfile>> {
        let row = sqlx::query(
            r#"
            SELECT p.id, p.user_id, p.bio, p.location, p.birth_date, p.avatar, p.gender,
                   p.is_author, p.follow_count, p.created_at, p.updated_at
            FROM user_profiles p
            JOIN users u ON u.id = p.user_id
            WHERE u.username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get profile by username")?;

        row.as_ref().map(row_to_profile).transpose()
    }

    async fn update(&self, profile: &UserProfile) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE user_profiles
            SET bio = ?, location = ?, birth_date = ?, avatar = ?, gender = ?,
                is_author = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&profile.bio)
        .bind(&profile.location)
        .bind(profile.birth_date)
        .bind(&profile.avatar)
        .bind(profile.gender.as_str())
        .bind(profile.is_author)
        .bind(Utc::now())
        .bind(profile.id)
        .execute(&self.pool)
        .await
        .context("Failed to update profile")?;
        Ok(())
    }

    async fn adjust_follow_count(&self, id: i64, delta: i64) -> Result<()> {
        // Single UPDATE expression so concurrent adjustments cannot lose writes
        sqlx::query(
            "UPDATE user_profiles SET follow_count = MAX(follow_count + ?, 0) WHERE id = ?",
        )
        .bind(delta)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to adjust follow count")?;
        Ok(())
    }
}
