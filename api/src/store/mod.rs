//! Storage behind the posts resource.
//!
//! Handlers only see [`PostStore`]. Production runs on [`MongoPostStore`];
//! [`MemoryPostStore`] backs local runs without a database and the tests.

mod memory;
mod mongo;

pub use memory::MemoryPostStore;
pub use mongo::MongoPostStore;

use crate::models::{NewPost, Post};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::fmt;

/// Name of the collection holding posts.
pub const POSTS_COLLECTION: &str = "posts";

/// The three operations the posts resource needs from a document store.
///
/// Each call is a single store round trip. Implementations must be safe to
/// share across concurrent requests.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Returns the post with the given id, or `None` if there is none.
    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Post>, StoreError>;
    /// Returns every post matching the filter, in the store's natural order.
    async fn find(&self, filter: PostFilter) -> Result<Vec<Post>, StoreError>;
    /// Persists a new post and returns the id the store assigned to it.
    async fn insert_one(&self, post: NewPost) -> Result<ObjectId, StoreError>;
}

/// Either "match everything" (no owner) or exact equality on `owner_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub owner_id: Option<String>,
}

impl PostFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn owner(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: Some(owner_id.into()),
        }
    }

    pub fn matches(&self, post: &Post) -> bool {
        match &self.owner_id {
            Some(owner_id) => post.owner_id == *owner_id,
            None => true,
        }
    }
}

#[derive(Debug)]
pub enum StoreError {
    /// The backend rejected or failed the operation
    Backend(String),
    /// An insert succeeded but did not report an ObjectId
    MissingId,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Backend(msg) => write!(f, "Store error: {}", msg),
            StoreError::MissingId => write!(f, "Store did not return an ObjectId for the insert"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}
