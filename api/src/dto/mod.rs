mod requests;
mod responses;

pub use requests::{ListPostsParams, NewPostRequest};
pub use responses::CreatedResponse;
