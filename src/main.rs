#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate rocket;
#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate serde_json;

mod article;
mod comment;
mod config;
mod cors;
mod db;
mod dispatch;
mod router;
mod types;
mod users;
mod utils;
mod vote;


use std::borrow::Cow;
use std::sync::Arc;

use rocket::http::uri::Origin;
use rocket::http::{Method, RawStr, Status};
use rocket::request::Request;
use rocket::{Build, Rocket, State};
use tracing::{error, info};

use crate::config::Config;
use crate::db::Db;
use crate::types::{ApiError, Envelope};

fn decoded_path<'a>(origin: &'a Origin<'_>) -> Cow<'a, str> {
    RawStr::new(origin.path().as_str()).percent_decode_lossy()
}

/// Snapshots are written in the background; the response does not wait for them.
fn respond(db: &State<Arc<Db>>, method: Method, origin: &Origin<'_>, body: &str) -> Envelope {
    let (envelope, mutated) = dispatch::dispatch(db, method, &decoded_path(origin), body);
    if mutated {
        let db = Arc::clone(db.inner());
        rocket::tokio::task::spawn_blocking(move || db.persist());
    }
    envelope
}

#[get("/<_..>")]
async fn get_endpoint(db: &State<Arc<Db>>, origin: &Origin<'_>) -> Envelope {
    respond(db, Method::Get, origin, "")
}

#[delete("/<_..>")]
async fn delete_endpoint(db: &State<Arc<Db>>, origin: &Origin<'_>) -> Envelope {
    respond(db, Method::Delete, origin, "")
}

#[post("/<_..>", data = "<body>")]
async fn post_endpoint(db: &State<Arc<Db>>, origin: &Origin<'_>, body: String) -> Envelope {
    respond(db, Method::Post, origin, &body)
}

#[put("/<_..>", data = "<body>")]
async fn put_endpoint(db: &State<Arc<Db>>, origin: &Origin<'_>, body: String) -> Envelope {
    respond(db, Method::Put, origin, &body)
}

/// Reached for paths no route matched and for verbs without a catch-all
/// route, which still get a 400 when the path names a known pattern.
#[catch(404)]
fn not_found(req: &Request) -> Envelope {
    match dispatch::lookup(req.method(), &decoded_path(req.uri())) {
        Err(e) => e.into(),
        Ok(_) => ApiError::NotFound.into(),
    }
}

#[catch(default)]
fn handle_error(status: Status, _req: &Request) -> Envelope {
    Envelope {
        status,
        body: Some(json!({ "errors": [status.reason_lossy()] })),
    }
}

pub fn build(db: Db, config: &Config) -> Rocket<Build> {
    let figment = rocket::Config::figment()
        .merge(("address", config.address))
        .merge(("port", config.port));

    rocket::custom(figment)
        .manage(Arc::new(db))
        .attach(cors::Cors)
        .mount(
            "/",
            routes![
                get_endpoint,
                post_endpoint,
                put_endpoint,
                delete_endpoint,
                cors::preflight
            ],
        )
        .register("/", catchers![not_found, handle_error])
}

#[rocket::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(config::log_level())
        .init();

    let config = Config::load();
    let db = Db::open(&config);
    info!("Server is listening on {}:{}", config.address, config.port);

    if let Err(e) = build(db, &config).launch().await {
        error!("Server did not start successfully: {}", e);
    }
}
