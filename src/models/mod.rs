//! Data models
//!
//! This module contains all data structures used throughout linlog.
//! Models represent:
//! - Database entities (User, Article, Comment, Message, Subset, StoredFile, Diary)
//! - Input types consumed by the service layer
//! - Pagination primitives shared by every list query

mod article;
mod comment;
mod diary;
mod file;
mod message;
mod pagination;
mod subset;
mod user;

pub use article::{
    Article, ArticleFilter, ArticleState, ArticleWithSubset, Classify, CreateArticleInput,
    UpdateArticleInput, INTRODUCE_MAX_LEN, TITLE_MAX_LEN,
};
pub use comment::{Comment, CommentWithMeta, CreateCommentInput, COMMENT_MAX_LEN};
pub use diary::{
    CreateDiaryInput, Diary, DiaryWithWeather, Mood, UpdateDiaryInput, Weather,
    DIARY_TITLE_MAX_LEN,
};
pub use file::{CreateFileInput, FileFilter, StoredFile};
pub use message::{
    MessageFilter, MessageType, MessageWithUsers, SendMessageInput, MESSAGE_MAX_LEN,
};
pub use pagination::{
    ListParams, PagedResult, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, MESSAGE_PAGE_SIZE,
};
pub use subset::{CreateSubsetInput, Subset, SubsetClassify, UpdateSubsetInput};
pub use user::{RegisterInput, User, UserRole, UserStatus};
