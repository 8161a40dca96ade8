//! Services layer - Business logic
//!
//! Services implement the business rules on top of the repositories:
//! validation, related-record resolution, counters and notifications.
//! Handlers in the API layer translate service errors into HTTP responses.

pub mod article;
pub mod author;
pub mod category;
pub mod interaction;
pub mod notification;
pub mod password;
pub mod profile;
pub mod tag;
pub mod user;

pub use article::{
    generate_slug, ArticleDetail, ArticleService, ArticleServiceError, ArticleSummary,
};
pub use author::{AuthorService, AuthorServiceError};
pub use category::{CategoryService, CategoryServiceError};
pub use interaction::{InteractionService, InteractionServiceError};
pub use notification::{NotificationService, NotificationServiceError};
pub use password::{hash_password, verify_password};
pub use profile::{ProfileService, ProfileServiceError};
pub use tag::{TagService, TagServiceError};
pub use user::{UserService, UserServiceError};
