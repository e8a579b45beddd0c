use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder, Response};
use serde_json::Value;
use std::collections::HashMap;

use crate::utils::try_respond;

pub trait Validate
where
    Self: Sized,
{
    type Error;
    fn validate(self) -> Result<Self, Self::Error>;
}

#[derive(Debug, PartialEq)]
pub enum ApiError {
    Validation(ValidationError),
    NotFound,
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> ApiError {
        ApiError::Validation(err)
    }
}

pub type ApiResult = Result<Envelope, ApiError>;

#[derive(Debug, Serialize, Default, PartialEq)]
pub struct ValidationError(HashMap<String, Vec<String>>);

impl ValidationError {
    pub fn add_error<K: Into<String>, V: Into<String>>(&mut self, key: K, val: V) {
        let entry = self.0.entry(key.into()).or_insert_with(Vec::default);
        entry.push(val.into());
    }

    pub fn from<K: Into<String>, V: Into<String>>(key: K, val: V) -> Self {
        let mut error = ValidationError::default();
        error.add_error(key, val);
        error
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn empty(&self) -> bool {
        self.len() == 0
    }

    /// `Ok(())` when nothing was recorded, so checks can end with `errors.into_result()?`.
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// Transport-independent reply of every handler: a status and an optional JSON body.
#[derive(Debug, PartialEq)]
pub struct Envelope {
    pub status: Status,
    pub body: Option<Value>,
}

impl Envelope {
    pub fn ok(body: Value) -> Self {
        Envelope {
            status: Status::Ok,
            body: Some(body),
        }
    }

    pub fn created(body: Value) -> Self {
        Envelope {
            status: Status::Created,
            body: Some(body),
        }
    }

    pub fn no_content() -> Self {
        Envelope {
            status: Status::NoContent,
            body: None,
        }
    }
}

impl From<ApiError> for Envelope {
    fn from(err: ApiError) -> Envelope {
        match err {
            ApiError::Validation(error) => Envelope {
                status: Status::BadRequest,
                body: Some(json!({ "errors": error })),
            },
            ApiError::NotFound => Envelope {
                status: Status::NotFound,
                body: Some(json!({ "errors": ["entity not found"] })),
            },
        }
    }
}

impl<'r> Responder<'r, 'static> for Envelope {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        match self.body {
            Some(body) => try_respond(req, &body, self.status),
            None => Response::build().status(self.status).ok(),
        }
    }
}
