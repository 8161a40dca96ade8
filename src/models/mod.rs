//! Data models
//!
//! This module contains all data structures used throughout the Escriba blog
//! API. Models represent:
//! - Database entities (User, UserProfile, Author, Article, Tag, Category,
//!   Interaction, Notification)
//! - Input types for create/update operations
//! - Pagination containers shared by list endpoints

mod article;
mod author;
mod category;
mod interaction;
mod notification;
mod profile;
mod session;
mod tag;
mod user;

pub use article::{
    Article, ArticleTheme, CreateArticleInput, ListParams, PagedResult, UpdateArticleInput,
    Visibility,
};
pub use author::Author;
pub use category::{Category, CategoryWithCount};
pub use interaction::{Interaction, InteractionKind, TargetKind};
pub use notification::{Notification, NotificationSettings, UpdateNotificationSettingsInput};
pub use profile::{Gender, UpdateProfileInput, UserProfile, DEFAULT_AVATAR};
pub use session::Session;
pub use tag::{Tag, TagWithCount};
pub use user::{CreateUserInput, UpdateUserInput, User};
