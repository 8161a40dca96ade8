//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles CRUD operations for a specific entity.

pub mod article;
pub mod author;
pub mod category;
pub mod interaction;
pub mod notification;
pub mod profile;
pub mod session;
pub mod tag;
pub mod theme;
pub mod user;

pub use article::{
    ArticleFilter, ArticleRepository, ArticleSort, ArticleStatistics, SortOrder,
    SqlxArticleRepository,
};
pub use author::{AuthorRepository, SqlxAuthorRepository};
pub use category::{CategoryRepository, SqlxCategoryRepository};
pub use interaction::{InsertOutcome, InteractionRepository, SqlxInteractionRepository};
pub use notification::{NotificationRepository, SqlxNotificationRepository};
pub use profile::{ProfileRepository, SqlxProfileRepository};
pub use session::{SessionRepository, SqlxSessionRepository};
pub use tag::{SqlxTagRepository, TagRepository};
pub use theme::{SqlxThemeRepository, ThemeRepository};
pub use user::{SqlxUserRepository, UserRepository};
