use serde::Serialize;

/// Body of a successful `POST /posts`.
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: String,
}
