use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Method, Status};
use rocket::{Request, Response};

pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "CORS headers",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        res.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        res.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "GET, POST, PUT, DELETE, OPTIONS",
        ));

        if req.method() == Method::Options {
            res.set_header(Header::new("Access-Control-Allow-Credentials", "false"));
            res.set_header(Header::new("Access-Control-Max-Age", "86400"));
            res.set_header(Header::new(
                "Access-Control-Allow-Headers",
                "X-Requested-With, X-HTTP-Method-Override, Content-Type, Accept",
            ));
        } else {
            res.set_header(Header::new(
                "Access-Control-Allow-Headers",
                "X-Requested-With, content-type",
            ));
        }
    }
}

/// Preflight requests are answered for every path, known or not.
#[options("/<_..>")]
pub fn preflight() -> Status {
    Status::Ok
}
