pub mod models;
mod utils;

use crate::db::Store;
use crate::dispatch::Call;
use crate::types::{ApiResult, Envelope, Validate, ValidationError};

pub use self::utils::validate_username;

#[derive(Debug, Deserialize)]
pub struct Registration {
    #[serde(default)]
    username: String,
}

impl Validate for Registration {
    type Error = ValidationError;
    fn validate(self) -> Result<Self, Self::Error> {
        validate_username(&self.username)?;
        Ok(self)
    }
}

/// `POST /users`
pub fn get_or_create(store: &mut Store, call: &Call) -> ApiResult {
    let registration = call.payload::<Registration>()?;
    let (user, created) = store.get_or_create_user(&registration.username)?;
    let body = json!({ "user": user });
    if created {
        Ok(Envelope::created(body))
    } else {
        Ok(Envelope::ok(body))
    }
}

/// `GET /users/:username`
pub fn get(store: &Store, call: &Call) -> ApiResult {
    let profile = store.get_user(call.param())?;
    Ok(Envelope::ok(json!(profile)))
}
