use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A post as it goes over the wire. The id is the hex form of the ObjectId.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    pub owner_id: String,
    pub message: String,
}

/// A post as it is stored in the `posts` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub owner_id: String,
    pub message: String,
}

/// A validated post that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub owner_id: String,
    pub message: String,
}

impl Post {
    pub fn new(id: ObjectId, post: NewPost) -> Self {
        Self {
            id: id.to_hex(),
            owner_id: post.owner_id,
            message: post.message,
        }
    }
}

impl From<NewPost> for PostDocument {
    fn from(post: NewPost) -> Self {
        Self {
            id: None,
            owner_id: post.owner_id,
            message: post.message,
        }
    }
}

impl From<PostDocument> for Post {
    fn from(doc: PostDocument) -> Self {
        Self {
            id: doc.id.map(|id| id.to_hex()).unwrap_or_default(),
            owner_id: doc.owner_id,
            message: doc.message,
        }
    }
}
