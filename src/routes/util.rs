use actix_web::{http::header, HttpRequest, HttpResponse};
use serde::Serialize;

pub fn created(req: HttpRequest, key: &str, body: impl Serialize) -> HttpResponse {
    HttpResponse::Created()
        .append_header((header::LOCATION, req.uri().to_string() + "/" + key))
        .json(body)
}
