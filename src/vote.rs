use std::collections::BTreeSet;

use crate::types::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    Up,
    Down,
}

/// Upvoter and downvoter sets of an article or comment. A username is in at most one of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Votes {
    #[serde(default)]
    pub upvoted_by: BTreeSet<String>,
    #[serde(default)]
    pub downvoted_by: BTreeSet<String>,
}

impl Votes {
    pub fn cast(&mut self, username: &str, vote: Vote) {
        let (target, opposite) = match vote {
            Vote::Up => (&mut self.upvoted_by, &mut self.downvoted_by),
            Vote::Down => (&mut self.downvoted_by, &mut self.upvoted_by),
        };
        opposite.remove(username);
        if !target.contains(username) {
            target.insert(username.to_owned());
        }
    }

    pub fn is_exclusive(&self) -> bool {
        self.upvoted_by.is_disjoint(&self.downvoted_by)
    }

    /// Restores exclusivity after loading a hand-edited snapshot; the upvote wins.
    pub fn repair(&mut self) {
        if self.is_exclusive() {
            return;
        }
        let upvoted_by = &self.upvoted_by;
        self.downvoted_by.retain(|name| !upvoted_by.contains(name));
    }
}

#[derive(Debug, Deserialize)]
pub struct Ballot {
    #[serde(default)]
    pub username: String,
}

impl Validate for Ballot {
    type Error = ValidationError;
    fn validate(self) -> Result<Self, ValidationError> {
        if self.username.trim().is_empty() {
            Err(ValidationError::from("username", "can't be blank"))
        } else {
            Ok(self)
        }
    }
}
