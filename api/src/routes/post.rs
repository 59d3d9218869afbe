use crate::{
    AppState,
    dto::{CreatedResponse, ListPostsParams, NewPostRequest},
    errors::ApiError,
    models::Post,
    store::PostFilter,
};
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use mongodb::bson::oid::ObjectId;
use tracing::{debug, info};

/// GET /posts/{id}
pub async fn get_post(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Post>, ApiError> {
    let Path(id) = id.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let id = ObjectId::parse_str(&id).map_err(|_| {
        ApiError::BadRequest("The requested post id wasn't a legal Mongo Object ID.".into())
    })?;

    let post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("The requested post was not found".into()))?;

    debug!("Post fetched: {}", post.id);

    Ok(Json(post))
}

/// GET /posts?owner_id=...
/// Without `owner_id` every post is returned. No paging.
pub async fn get_posts(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Vec<Post>>, ApiError> {
    let Query(pairs) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let params = ListPostsParams::from_pairs(pairs);
    let filter = PostFilter {
        owner_id: params.owner_id,
    };

    let posts = state.posts.find(filter).await?;

    debug!("Listed {} posts", posts.len());

    Ok(Json(posts))
}

/// POST /posts
/// Body: { "message": "...", "owner_id": "..." }
pub async fn create_post(
    State(state): State<AppState>,
    payload: Result<Json<NewPostRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let post = payload.into_new_post().map_err(ApiError::Validation)?;

    let owner_id = post.owner_id.clone();
    let id = state.posts.insert_one(post).await?;

    info!("Post created: {} by owner {}", id, owner_id);

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse { id: id.to_hex() }),
    ))
}
