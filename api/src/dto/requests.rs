use crate::{errors::FieldError, models::NewPost};
use serde::Deserialize;
use validator::{Validate, ValidationErrors};

/// Body of `POST /posts`. Both fields are optional here so that a missing or
/// `null` field reaches validation instead of failing deserialization.
#[derive(Debug, Default, Validate, Deserialize)]
pub struct NewPostRequest {
    #[validate(required(message = "post should have a message"))]
    pub message: Option<String>,
    #[validate(required(message = "post should have an owner_id"))]
    pub owner_id: Option<String>,
}

impl NewPostRequest {
    /// Checks the required fields and hands back the post to persist, or every
    /// field that failed.
    pub fn into_new_post(self) -> Result<NewPost, Vec<FieldError>> {
        self.validate().map_err(|e| field_errors(&e))?;

        // validate() has already rejected a missing field
        self.message
            .zip(self.owner_id)
            .map(|(message, owner_id)| NewPost { owner_id, message })
            .ok_or_else(Vec::new)
    }
}

/// Query string of `GET /posts`.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ListPostsParams {
    pub owner_id: Option<String>,
}

impl ListPostsParams {
    /// Picks the parameters out of raw query pairs. A repeated `owner_id`
    /// uses its first value; unknown keys are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let owner_id = pairs
            .into_iter()
            .find(|(key, _)| key == "owner_id")
            .map(|(_, value)| value);

        Self { owner_id }
    }
}

fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = field.to_string();
            errs.iter().map(move |err| FieldError {
                field: field.clone(),
                message: err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string()),
            })
        })
        .collect();

    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}
