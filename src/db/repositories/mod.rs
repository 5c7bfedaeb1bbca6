//! Repository layer
//!
//! Each entity gets a trait describing its data access plus a SQLx
//! implementation that dispatches on the configured driver.

mod article;
mod comment;
mod diary;
mod file;
mod message;
mod subset;
mod user;

pub use article::{ArticleRepository, SqlxArticleRepository};
pub use comment::{CommentRepository, SqlxCommentRepository};
pub use diary::{DiaryRepository, SqlxDiaryRepository};
pub use file::{FileRepository, SqlxFileRepository};
pub use message::{MessageRepository, SqlxMessageRepository};
pub use subset::{SubsetRepository, SqlxSubsetRepository};
pub use user::{SqlxUserRepository, UserRepository};
