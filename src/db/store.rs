use std::collections::BTreeMap;

use tracing::debug;

use crate::article::{Article, ArticlePatch, ArticleView, NewArticle};
use crate::comment::{Comment, NewComment};
use crate::types::{ApiError, ValidationError};
use crate::users::models::{User, UserProfile};
use crate::users::validate_username;
use crate::vote::{Vote, Votes};

/// All users, articles and comments plus the id counters.
///
/// Deleted articles and comments stay in their maps as `None` so their ids are
/// never handed out again. Every operation validates before it mutates: an
/// `Err` always means the store is unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Store {
    users: BTreeMap<String, User>,
    articles: BTreeMap<u64, Option<Article>>,
    next_article_id: u64,
    comments: BTreeMap<u64, Option<Comment>>,
    next_comment_id: u64,
}

impl Default for Store {
    fn default() -> Self {
        Store {
            users: BTreeMap::new(),
            articles: BTreeMap::new(),
            next_article_id: 1,
            comments: BTreeMap::new(),
            next_comment_id: 1,
        }
    }
}

fn require_id(id: u64) -> Result<(), ValidationError> {
    if id == 0 {
        Err(ValidationError::from("id", "missing id"))
    } else {
        Ok(())
    }
}

fn insert_live<T>(slots: &mut BTreeMap<u64, Option<T>>, id: u64, value: T) -> &T {
    slots.entry(id).or_insert(None).get_or_insert(value)
}

impl Store {
    pub fn user(&self, username: &str) -> Option<&User> {
        self.users.get(username)
    }

    pub fn article(&self, id: u64) -> Option<&Article> {
        self.articles.get(&id).and_then(Option::as_ref)
    }

    pub fn comment(&self, id: u64) -> Option<&Comment> {
        self.comments.get(&id).and_then(Option::as_ref)
    }

    fn article_mut(&mut self, id: u64) -> Option<&mut Article> {
        self.articles.get_mut(&id).and_then(Option::as_mut)
    }

    fn comment_mut(&mut self, id: u64) -> Option<&mut Comment> {
        self.comments.get_mut(&id).and_then(Option::as_mut)
    }

    pub fn next_article_id(&self) -> u64 {
        self.next_article_id
    }

    pub fn next_comment_id(&self) -> u64 {
        self.next_comment_id
    }

    pub fn get_or_create_user(&mut self, username: &str) -> Result<(&User, bool), ApiError> {
        validate_username(username)?;
        let created = !self.users.contains_key(username);
        if created {
            debug!(username, "creating user");
        }
        let user: &User = self
            .users
            .entry(username.to_owned())
            .or_insert_with(|| User::new(username));
        Ok((user, created))
    }

    pub fn get_user(&self, username: &str) -> Result<UserProfile<'_>, ApiError> {
        if username.trim().is_empty() {
            return Err(ValidationError::from("username", "can't be blank").into());
        }
        let user = self.user(username).ok_or(ApiError::NotFound)?;
        Ok(UserProfile {
            user,
            user_articles: user.article_ids.iter().filter_map(|id| self.article(*id)).collect(),
            user_comments: user.comment_ids.iter().filter_map(|id| self.comment(*id)).collect(),
        })
    }

    /// Live articles, newest first.
    pub fn list_articles(&self) -> Vec<&Article> {
        self.articles.values().rev().filter_map(Option::as_ref).collect()
    }

    pub fn get_article(&self, id: u64) -> Result<ArticleView<'_>, ApiError> {
        require_id(id)?;
        let article = self.article(id).ok_or(ApiError::NotFound)?;
        Ok(ArticleView {
            article,
            comments: article.comment_ids.iter().filter_map(|id| self.comment(*id)).collect(),
        })
    }

    pub fn create_article(&mut self, new: NewArticle) -> Result<&Article, ApiError> {
        let mut error = ValidationError::default();
        if new.title.trim().is_empty() {
            error.add_error("title", "empty title");
        }
        if new.url.trim().is_empty() {
            error.add_error("url", "empty url");
        }
        if !self.users.contains_key(&new.username) {
            error.add_error("username", format!("unknown user: {}", new.username));
        }
        error.into_result()?;

        let id = self.next_article_id;
        self.next_article_id = id
            .checked_add(1)
            .ok_or_else(|| ValidationError::from("id", "article ids exhausted"))?;
        if let Some(owner) = self.users.get_mut(&new.username) {
            owner.article_ids.push(id);
        }
        debug!(id, username = %new.username, "creating article");
        let article = Article {
            id,
            title: new.title,
            url: new.url,
            username: new.username,
            comment_ids: Vec::new(),
            votes: Votes::default(),
        };
        Ok(insert_live(&mut self.articles, id, article))
    }

    pub fn update_article(&mut self, id: u64, patch: ArticlePatch) -> Result<&Article, ApiError> {
        require_id(id)?;
        let article = self.article_mut(id).ok_or(ApiError::NotFound)?;
        if let Some(title) = patch.title.filter(|t| !t.is_empty()) {
            article.title = title;
        }
        if let Some(url) = patch.url.filter(|u| !u.is_empty()) {
            article.url = url;
        }
        Ok(article)
    }

    /// Tombstones the article and every comment on it, and scrubs the ids from
    /// the owners' lists.
    pub fn delete_article(&mut self, id: u64) -> Result<(), ApiError> {
        require_id(id)?;
        let article = self
            .articles
            .get_mut(&id)
            .and_then(Option::take)
            .ok_or(ApiError::NotFound)?;

        for comment_id in &article.comment_ids {
            let comment = match self.comments.get_mut(comment_id).and_then(Option::take) {
                Some(comment) => comment,
                None => continue,
            };
            if let Some(owner) = self.users.get_mut(&comment.username) {
                owner.comment_ids.retain(|c| *c != comment.id);
            }
        }
        if let Some(owner) = self.users.get_mut(&article.username) {
            owner.article_ids.retain(|a| *a != id);
        }
        debug!(id, comments = article.comment_ids.len(), "deleted article");
        Ok(())
    }

    fn require_voter(&self, username: &str) -> Result<(), ValidationError> {
        if username.trim().is_empty() {
            Err(ValidationError::from("username", "can't be blank"))
        } else if !self.users.contains_key(username) {
            Err(ValidationError::from("username", format!("unknown user: {}", username)))
        } else {
            Ok(())
        }
    }

    pub fn vote_article(&mut self, id: u64, username: &str, vote: Vote) -> Result<&Article, ApiError> {
        self.require_voter(username)?;
        let article = self
            .article_mut(id)
            .ok_or_else(|| ValidationError::from("id", format!("unknown article: {}", id)))?;
        article.votes.cast(username, vote);
        Ok(article)
    }

    pub fn add_comment(&mut self, new: NewComment) -> Result<&Comment, ApiError> {
        let mut error = ValidationError::default();
        if new.body.trim().is_empty() {
            error.add_error("body", "empty body");
        }
        if !self.users.contains_key(&new.username) {
            error.add_error("username", format!("unknown user: {}", new.username));
        }
        if self.article(new.article_id).is_none() {
            error.add_error("articleId", format!("unknown article: {}", new.article_id));
        }
        error.into_result()?;

        let id = self.next_comment_id;
        self.next_comment_id = id
            .checked_add(1)
            .ok_or_else(|| ValidationError::from("id", "comment ids exhausted"))?;
        if let Some(article) = self.article_mut(new.article_id) {
            article.comment_ids.push(id);
        }
        if let Some(owner) = self.users.get_mut(&new.username) {
            owner.comment_ids.push(id);
        }
        debug!(id, article_id = new.article_id, username = %new.username, "creating comment");
        let comment = Comment {
            id,
            body: new.body,
            username: new.username,
            article_id: new.article_id,
            votes: Votes::default(),
        };
        Ok(insert_live(&mut self.comments, id, comment))
    }

    pub fn edit_comment(&mut self, id: u64, body: &str) -> Result<&Comment, ApiError> {
        if body.trim().is_empty() {
            return Err(ValidationError::from("body", "empty body").into());
        }
        require_id(id)?;
        let comment = self.comment_mut(id).ok_or(ApiError::NotFound)?;
        comment.body = body.to_owned();
        Ok(comment)
    }

    /// Tombstones the comment and removes its id from its article and owner.
    pub fn delete_comment(&mut self, id: u64) -> Result<(), ApiError> {
        require_id(id)?;
        let comment = self
            .comments
            .get_mut(&id)
            .and_then(Option::take)
            .ok_or(ApiError::NotFound)?;

        if let Some(article) = self.article_mut(comment.article_id) {
            article.comment_ids.retain(|c| *c != id);
        }
        if let Some(owner) = self.users.get_mut(&comment.username) {
            owner.comment_ids.retain(|c| *c != id);
        }
        debug!(id, "deleted comment");
        Ok(())
    }

    pub fn vote_comment(&mut self, id: u64, username: &str, vote: Vote) -> Result<&Comment, ApiError> {
        self.require_voter(username)?;
        let comment = self
            .comment_mut(id)
            .ok_or_else(|| ValidationError::from("id", format!("unknown comment: {}", id)))?;
        comment.votes.cast(username, vote);
        Ok(comment)
    }

    /// Brings a freshly loaded store back in line with the invariants: counters
    /// above every known id and exclusive vote sets. Fails when an id leaves no
    /// room for a successor.
    pub fn restore_invariants(&mut self) -> super::Result<()> {
        let last_article = self.articles.keys().next_back().copied().unwrap_or(0);
        let after_article = last_article
            .checked_add(1)
            .ok_or_else(|| format!("article id {} is out of range", last_article))?;
        let last_comment = self.comments.keys().next_back().copied().unwrap_or(0);
        let after_comment = last_comment
            .checked_add(1)
            .ok_or_else(|| format!("comment id {} is out of range", last_comment))?;
        self.next_article_id = self.next_article_id.max(after_article);
        self.next_comment_id = self.next_comment_id.max(after_comment);

        for article in self.articles.values_mut().filter_map(Option::as_mut) {
            article.votes.repair();
        }
        for comment in self.comments.values_mut().filter_map(Option::as_mut) {
            comment.votes.repair();
        }
        Ok(())
    }
}
