use crate::db::Store;
use crate::dispatch::Call;
use crate::types::{ApiResult, Envelope, Validate, ValidationError};
use crate::vote::{Ballot, Vote, Votes};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: u64,
    pub body: String,
    pub username: String,
    pub article_id: u64,
    #[serde(flatten)]
    pub votes: Votes,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub body: String,
    pub username: String,
    pub article_id: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDetails {
    #[serde(default)]
    body: String,
    #[serde(default)]
    username: String,
    #[serde(default)]
    article_id: u64,
}

#[derive(Debug, Deserialize)]
pub struct CommentEdit {
    #[serde(default)]
    body: String,
    #[serde(default)]
    username: String,
}

#[derive(Debug, Deserialize)]
pub struct CommentContainer<T> {
    comment: T,
}

impl Validate for CommentContainer<CommentDetails> {
    type Error = ValidationError;
    fn validate(self) -> Result<Self, ValidationError> {
        let mut error = ValidationError::default();
        if self.comment.body.trim().is_empty() {
            error.add_error("body", "empty body");
        }
        if self.comment.username.trim().is_empty() {
            error.add_error("username", "empty username");
        }
        if self.comment.article_id == 0 {
            error.add_error("articleId", "missing article id");
        }
        error.into_result().map(|_| self)
    }
}

impl Validate for CommentContainer<CommentEdit> {
    type Error = ValidationError;
    fn validate(self) -> Result<Self, ValidationError> {
        let mut error = ValidationError::default();
        if self.comment.body.trim().is_empty() {
            error.add_error("body", "empty body");
        }
        if self.comment.username.trim().is_empty() {
            error.add_error("username", "empty username");
        }
        error.into_result().map(|_| self)
    }
}

/// `POST /comments`
pub fn add(store: &mut Store, call: &Call) -> ApiResult {
    let details = call.payload::<CommentContainer<CommentDetails>>()?.comment;
    let new_comment = NewComment {
        body: details.body,
        username: details.username,
        article_id: details.article_id,
    };
    let comment = store.add_comment(new_comment)?;
    Ok(Envelope::created(json!({ "comment": comment })))
}

/// `PUT /comments/:id`
pub fn edit(store: &mut Store, call: &Call) -> ApiResult {
    let edit = call.payload::<CommentContainer<CommentEdit>>()?.comment;
    let id = call.id()?;
    let comment = store.edit_comment(id, &edit.body)?;
    Ok(Envelope::ok(json!({ "comment": comment })))
}

/// `DELETE /comments/:id`
pub fn delete(store: &mut Store, call: &Call) -> ApiResult {
    let id = call.id()?;
    store.delete_comment(id)?;
    Ok(Envelope::no_content())
}

fn vote(store: &mut Store, call: &Call, vote: Vote) -> ApiResult {
    let id = call.id()?;
    let ballot = call.payload::<Ballot>()?;
    let comment = store.vote_comment(id, &ballot.username, vote)?;
    Ok(Envelope::ok(json!({ "comment": comment })))
}

/// `PUT /comments/:id/upvote`
pub fn upvote(store: &mut Store, call: &Call) -> ApiResult {
    vote(store, call, Vote::Up)
}

/// `PUT /comments/:id/downvote`
pub fn downvote(store: &mut Store, call: &Call) -> ApiResult {
    vote(store, call, Vote::Down)
}
