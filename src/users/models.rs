use crate::article::Article;
use crate::comment::Comment;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    #[serde(default)]
    pub article_ids: Vec<u64>,
    #[serde(default)]
    pub comment_ids: Vec<u64>,
}

impl User {
    pub fn new(username: &str) -> Self {
        User {
            username: username.to_owned(),
            article_ids: Vec::new(),
            comment_ids: Vec::new(),
        }
    }
}

/// A user together with the articles and comments they own, in creation order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile<'a> {
    pub user: &'a User,
    pub user_articles: Vec<&'a Article>,
    pub user_comments: Vec<&'a Comment>,
}
