use super::{PostFilter, PostStore, StoreError};
use crate::models::{NewPost, Post};
use async_trait::async_trait;
use dashmap::DashMap;
use mongodb::bson::oid::ObjectId;

/// In-process post store.
///
/// `DashMap` handles concurrent readers and writers without an outer lock.
/// Ids are minted the same way the database does, so results come back in
/// id order, which is insertion order.
#[derive(Debug, Default)]
pub struct MemoryPostStore {
    posts: DashMap<ObjectId, Post>,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Post>, StoreError> {
        Ok(self.posts.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find(&self, filter: PostFilter) -> Result<Vec<Post>, StoreError> {
        let mut matched: Vec<(ObjectId, Post)> = self
            .posts
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();

        matched.sort_by_key(|(id, _)| *id);
        Ok(matched.into_iter().map(|(_, post)| post).collect())
    }

    async fn insert_one(&self, post: NewPost) -> Result<ObjectId, StoreError> {
        let id = ObjectId::new();
        self.posts.insert(id, Post::new(id, post));
        Ok(id)
    }
}
