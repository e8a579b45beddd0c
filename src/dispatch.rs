use std::collections::HashMap;

use rocket::http::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::db::{Db, Store};
use crate::router::{self, Route};
use crate::types::{ApiError, ApiResult, Envelope, Validate, ValidationError};
use crate::{article, comment, users};

/// Handlers that only look at the store run under the shared lock, the rest
/// under the exclusive one.
#[derive(Clone, Copy)]
pub enum Handler {
    Read(fn(&Store, &Call) -> ApiResult),
    Write(fn(&mut Store, &Call) -> ApiResult),
}

lazy_static! {
    static ref ENDPOINTS: HashMap<&'static str, HashMap<Method, Handler>> = {
        use self::Handler::{Read, Write};

        let table: [(&'static str, Method, Handler); 14] = [
            ("/users", Method::Post, Write(users::get_or_create)),
            ("/users/:username", Method::Get, Read(users::get)),
            ("/articles", Method::Get, Read(article::list)),
            ("/articles", Method::Post, Write(article::create)),
            ("/articles/:id", Method::Get, Read(article::get)),
            ("/articles/:id", Method::Put, Write(article::update)),
            ("/articles/:id", Method::Delete, Write(article::delete)),
            ("/articles/:id/upvote", Method::Put, Write(article::upvote)),
            ("/articles/:id/downvote", Method::Put, Write(article::downvote)),
            ("/comments", Method::Post, Write(comment::add)),
            ("/comments/:id", Method::Put, Write(comment::edit)),
            ("/comments/:id", Method::Delete, Write(comment::delete)),
            ("/comments/:id/upvote", Method::Put, Write(comment::upvote)),
            ("/comments/:id/downvote", Method::Put, Write(comment::downvote)),
        ];

        let mut endpoints = HashMap::new();
        for (pattern, method, handler) in table.iter() {
            endpoints
                .entry(*pattern)
                .or_insert_with(HashMap::new)
                .insert(*method, *handler);
        }
        endpoints
    };
}

/// What a handler gets to see of the request: the path parameter and the JSON body.
#[derive(Debug)]
pub struct Call {
    pub param: Option<String>,
    pub body: Option<Value>,
}

impl Call {
    pub fn new(param: Option<String>, body: Option<Value>) -> Self {
        Call { param, body }
    }

    pub fn param(&self) -> &str {
        self.param.as_deref().unwrap_or("")
    }

    /// The path parameter as an entity id. Ids start at 1.
    pub fn id(&self) -> Result<u64, ApiError> {
        match self.param().parse::<u64>() {
            Ok(id) if id > 0 => Ok(id),
            _ => Err(ValidationError::from("id", format!("invalid id: {:?}", self.param())).into()),
        }
    }

    pub fn payload<T>(&self) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Validate<Error = ValidationError>,
    {
        let body = self
            .body
            .clone()
            .ok_or_else(|| ValidationError::from("body", "missing request body"))?;
        let payload = serde_json::from_value::<T>(body)
            .map_err(|e| ValidationError::from("body", e.to_string()))?;
        Ok(payload.validate()?)
    }
}

/// Unknown paths and patterns are a 404; a known pattern without a handler
/// for `method` is a 400.
pub fn lookup(method: Method, path: &str) -> Result<(Handler, Route), ApiError> {
    let route = router::resolve(path).ok_or(ApiError::NotFound)?;
    let methods = ENDPOINTS
        .get(route.pattern.as_str())
        .ok_or(ApiError::NotFound)?;
    let handler = methods.get(&method).copied().ok_or_else(|| {
        ValidationError::from(
            "method",
            format!("{} is not supported on {}", method, route.pattern),
        )
    })?;
    Ok((handler, route))
}

pub fn parse_body(raw: &str) -> Result<Option<Value>, ApiError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(raw)
        .map(Some)
        .map_err(|e| ValidationError::from("body", format!("malformed JSON: {}", e)).into())
}

/// Runs one request against the store. The flag is set when a write handler
/// succeeded, which is the cue to persist.
pub fn dispatch(db: &Db, method: Method, path: &str, body: &str) -> (Envelope, bool) {
    let prepared = lookup(method, path).and_then(|(handler, route)| {
        let call = Call::new(route.param, parse_body(body)?);
        Ok((handler, call))
    });

    let (result, mutated) = match prepared {
        Err(e) => (Err(e), false),
        Ok((Handler::Read(read), call)) => (read(&db.read(), &call), false),
        Ok((Handler::Write(write), call)) => {
            let result = write(&mut db.write(), &call);
            let mutated = result.is_ok();
            (result, mutated)
        }
    };

    let envelope = result.unwrap_or_else(Envelope::from);
    debug!(%method, path, status = envelope.status.code, "dispatched");
    (envelope, mutated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_endpoint_resolves() {
        let cases = [
            (Method::Post, "/users"),
            (Method::Get, "/users/alice"),
            (Method::Get, "/articles"),
            (Method::Post, "/articles"),
            (Method::Get, "/articles/1"),
            (Method::Put, "/articles/1"),
            (Method::Delete, "/articles/1"),
            (Method::Put, "/articles/1/upvote"),
            (Method::Put, "/articles/1/downvote"),
            (Method::Post, "/comments"),
            (Method::Put, "/comments/1"),
            (Method::Delete, "/comments/1"),
            (Method::Put, "/comments/1/upvote"),
            (Method::Put, "/comments/1/downvote"),
        ];
        for (method, path) in cases.iter() {
            assert!(lookup(*method, path).is_ok(), "{} {}", method, path);
        }
    }

    #[test]
    fn unknown_pattern_is_not_found() {
        assert_eq!(lookup(Method::Get, "/tags").err(), Some(ApiError::NotFound));
        assert_eq!(lookup(Method::Get, "/").err(), Some(ApiError::NotFound));
        assert_eq!(
            lookup(Method::Put, "/users/alice/upvote").err(),
            Some(ApiError::NotFound)
        );
    }

    #[test]
    fn unsupported_method_is_a_bad_request() {
        match lookup(Method::Delete, "/users/alice") {
            Err(ApiError::Validation(e)) => assert_eq!(e, ValidationError::from(
                "method",
                "DELETE is not supported on /users/:username",
            )),
            other => panic!("unexpected lookup result: {:?}", other.map(|(_, r)| r)),
        }
        assert!(matches!(
            lookup(Method::Get, "/articles/1/upvote"),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn call_ids_must_be_positive_integers() {
        assert_eq!(Call::new(Some("3".to_owned()), None).id(), Ok(3));
        assert!(Call::new(Some("0".to_owned()), None).id().is_err());
        assert!(Call::new(Some("abc".to_owned()), None).id().is_err());
        assert!(Call::new(None, None).id().is_err());
    }

    #[test]
    fn empty_body_is_absent_and_garbage_is_rejected() {
        assert_eq!(parse_body("  "), Ok(None));
        assert_eq!(parse_body(r#"{"a":1}"#), Ok(Some(json!({"a": 1}))));
        assert!(parse_body("{not json").is_err());
    }

    #[test]
    fn failed_writes_do_not_ask_for_persistence() {
        let db = Db::in_memory();
        let (envelope, mutated) = dispatch(&db, Method::Post, "/users", r#"{"username":""}"#);
        assert_eq!(envelope.status.code, 400);
        assert!(!mutated);

        let (envelope, mutated) = dispatch(&db, Method::Post, "/users", r#"{"username":"alice"}"#);
        assert_eq!(envelope.status.code, 201);
        assert!(mutated);

        let (envelope, mutated) = dispatch(&db, Method::Get, "/users/alice", "");
        assert_eq!(envelope.status.code, 200);
        assert!(!mutated);
    }
}
