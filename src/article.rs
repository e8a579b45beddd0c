use crate::comment::Comment;
use crate::db::Store;
use crate::dispatch::Call;
use crate::types::*;
use crate::vote::{Ballot, Vote, Votes};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: u64,
    pub title: String,
    pub url: String,
    pub username: String,
    #[serde(default)]
    pub comment_ids: Vec<u64>,
    #[serde(flatten)]
    pub votes: Votes,
}

/// An article with its comment ids resolved to the comments themselves.
#[derive(Debug, Serialize)]
pub struct ArticleView<'a> {
    #[serde(flatten)]
    pub article: &'a Article,
    pub comments: Vec<&'a Comment>,
}

#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub url: String,
    pub username: String,
}

/// Fields left as `None` keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct ArticlePatch {
    pub title: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ArticleDetails {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    username: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateArticle {
    article: ArticleDetails,
}

impl Validate for CreateArticle {
    type Error = ValidationError;
    fn validate(self) -> Result<Self, ValidationError> {
        let mut error = ValidationError::default();
        if self.article.title.trim().is_empty() {
            error.add_error("title", "empty title");
        }

        if self.article.url.trim().is_empty() {
            error.add_error("url", "empty url");
        }

        if self.article.username.trim().is_empty() {
            error.add_error("username", "empty username");
        }

        if error.empty() {
            Ok(self)
        } else {
            Err(error)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateDetails {
    title: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateArticle {
    article: Option<UpdateDetails>,
}

impl Validate for UpdateArticle {
    type Error = ValidationError;
    fn validate(self) -> Result<Self, ValidationError> {
        if self.article.is_none() {
            Err(ValidationError::from("article", "missing article"))
        } else {
            Ok(self)
        }
    }
}

impl From<UpdateDetails> for ArticlePatch {
    fn from(details: UpdateDetails) -> Self {
        let present = |value: Option<String>| value.filter(|v| !v.is_empty());
        ArticlePatch {
            title: present(details.title),
            url: present(details.url),
        }
    }
}

/// `GET /articles`
pub fn list(store: &Store, _call: &Call) -> ApiResult {
    Ok(Envelope::ok(json!({ "articles": store.list_articles() })))
}

/// `GET /articles/:id`
pub fn get(store: &Store, call: &Call) -> ApiResult {
    let id = call.id()?;
    let article = store.get_article(id)?;
    Ok(Envelope::ok(json!({ "article": article })))
}

/// `POST /articles`
pub fn create(store: &mut Store, call: &Call) -> ApiResult {
    let create = call.payload::<CreateArticle>()?;
    let new_article = NewArticle {
        title: create.article.title,
        url: create.article.url,
        username: create.article.username,
    };
    let article = store.create_article(new_article)?;
    Ok(Envelope::created(json!({ "article": article })))
}

/// `PUT /articles/:id`
pub fn update(store: &mut Store, call: &Call) -> ApiResult {
    let id = call.id()?;
    let update = call.payload::<UpdateArticle>()?;
    let patch = update.article.map(ArticlePatch::from).unwrap_or_default();
    let article = store.update_article(id, patch)?;
    Ok(Envelope::ok(json!({ "article": article })))
}

/// `DELETE /articles/:id`
pub fn delete(store: &mut Store, call: &Call) -> ApiResult {
    let id = call.id()?;
    store.delete_article(id)?;
    Ok(Envelope::no_content())
}

fn vote(store: &mut Store, call: &Call, vote: Vote) -> ApiResult {
    let id = call.id()?;
    let ballot = call.payload::<Ballot>()?;
    let article = store.vote_article(id, &ballot.username, vote)?;
    Ok(Envelope::ok(json!({ "article": article })))
}

/// `PUT /articles/:id/upvote`
pub fn upvote(store: &mut Store, call: &Call) -> ApiResult {
    vote(store, call, Vote::Up)
}

/// `PUT /articles/:id/downvote`
pub fn downvote(store: &mut Store, call: &Call) -> ApiResult {
    vote(store, call, Vote::Down)
}
