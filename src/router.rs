//! Maps a raw request path onto one of the fixed endpoint patterns.
//!
//! The path is reduced to its non-empty segments and matched against the
//! rules below in order; the first match wins. The HTTP method plays no part
//! here, it only selects a handler once the pattern is known.

use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub pattern: String,
    pub param: Option<String>,
}

struct Rule {
    shape: Regex,
    pattern: &'static str,
}

impl Rule {
    fn new(shape: &str, pattern: &'static str) -> Rule {
        Rule {
            shape: Regex::new(shape).unwrap(),
            pattern,
        }
    }

    fn apply(&self, path: &str) -> Option<Route> {
        let captures = self.shape.captures(path)?;
        let mut pattern = String::new();
        captures.expand(self.pattern, &mut pattern);
        Some(Route {
            pattern,
            param: captures.name("param").map(|m| m.as_str().to_owned()),
        })
    }
}

lazy_static! {
    static ref RULES: Vec<Rule> = vec![
        Rule::new(r"^(?P<resource>[^/]+)$", "/$resource"),
        Rule::new(
            r"^(?P<resource>[^/]+)/(?P<param>[^/]+)/(?P<action>upvote|downvote)(?:/.*)?$",
            "/$resource/:id/$action",
        ),
        Rule::new(r"^users/(?P<param>[^/]+)$", "/users/:username"),
        Rule::new(r"^(?P<resource>[^/]+)/(?P<param>[^/]+)$", "/$resource/:id"),
    ];
}

/// `None` when the path has a shape no rule accepts.
pub fn resolve(path: &str) -> Option<Route> {
    let path = path.find('?').map_or(path, |query| &path[..query]);
    let segments = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    RULES.iter().find_map(|rule| rule.apply(&segments))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(pattern: &str, param: Option<&str>) -> Option<Route> {
        Some(Route {
            pattern: pattern.to_owned(),
            param: param.map(str::to_owned),
        })
    }

    #[test]
    fn single_segment_is_a_collection() {
        assert_eq!(resolve("/articles"), route("/articles", None));
        assert_eq!(resolve("/users/"), route("/users", None));
        assert_eq!(resolve("//comments//"), route("/comments", None));
    }

    #[test]
    fn vote_action_wins_over_id() {
        assert_eq!(
            resolve("/articles/7/upvote"),
            route("/articles/:id/upvote", Some("7"))
        );
        assert_eq!(
            resolve("/comments/3/downvote"),
            route("/comments/:id/downvote", Some("3"))
        );
        assert_eq!(
            resolve("/users/alice/upvote"),
            route("/users/:id/upvote", Some("alice"))
        );
    }

    #[test]
    fn users_take_a_username() {
        assert_eq!(
            resolve("/users/alice"),
            route("/users/:username", Some("alice"))
        );
    }

    #[test]
    fn other_pairs_take_an_id() {
        assert_eq!(resolve("/articles/12"), route("/articles/:id", Some("12")));
        assert_eq!(resolve("/comments/x"), route("/comments/:id", Some("x")));
    }

    #[test]
    fn query_string_is_ignored() {
        assert_eq!(
            resolve("/articles/1?expand=true"),
            route("/articles/:id", Some("1"))
        );
    }

    #[test]
    fn unknown_shapes_resolve_to_nothing() {
        assert_eq!(resolve("/"), None);
        assert_eq!(resolve(""), None);
        assert_eq!(resolve("/articles/1/share"), None);
        assert_eq!(resolve("/articles/1/share/upvote"), None);
    }

    #[test]
    fn trailing_segments_after_a_vote_are_ignored() {
        assert_eq!(
            resolve("/articles/1/upvote/extra"),
            route("/articles/:id/upvote", Some("1"))
        );
        assert_eq!(
            resolve("/comments/2/downvote/a/b"),
            route("/comments/:id/downvote", Some("2"))
        );
    }
}
