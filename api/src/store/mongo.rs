use super::{POSTS_COLLECTION, PostFilter, PostStore, StoreError};
use crate::models::{NewPost, Post, PostDocument};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    Client, Collection, Database,
    bson::{Document, doc, oid::ObjectId},
};
use tracing::info;

/// Post store over the `posts` collection of a MongoDB database.
///
/// `Collection` is a cheap handle onto the driver's connection pool and is
/// safe to use from many requests at once.
#[derive(Clone)]
pub struct MongoPostStore {
    posts: Collection<PostDocument>,
}

impl MongoPostStore {
    pub fn new(database: &Database) -> Self {
        Self {
            posts: database.collection(POSTS_COLLECTION),
        }
    }

    /// Connects to `uri` and opens the posts collection of `database`.
    pub async fn connect(uri: &str, database: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await?;
        info!("Connected to MongoDB, using database {}", database);
        Ok(Self::new(&client.database(database)))
    }
}

fn filter_document(filter: &PostFilter) -> Document {
    match &filter.owner_id {
        Some(owner_id) => doc! { "owner_id": owner_id.as_str() },
        None => Document::new(),
    }
}

#[async_trait]
impl PostStore for MongoPostStore {
    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Post>, StoreError> {
        let found = self.posts.find_one(doc! { "_id": id }).await?;
        Ok(found.map(Post::from))
    }

    async fn find(&self, filter: PostFilter) -> Result<Vec<Post>, StoreError> {
        let cursor = self.posts.find(filter_document(&filter)).await?;
        let docs: Vec<PostDocument> = cursor.try_collect().await?;
        Ok(docs.into_iter().map(Post::from).collect())
    }

    async fn insert_one(&self, post: NewPost) -> Result<ObjectId, StoreError> {
        let result = self.posts.insert_one(PostDocument::from(post)).await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or(StoreError::MissingId)
    }
}
