use rocket::{http::Status, response::status, serde::json::Json};
use serde_json::Value;

use crate::meltdown::MeltDown;

pub mod admin;
pub mod api;
pub mod comments;
pub mod notifications;
pub mod posts;
pub mod route_group;
pub mod tags;
pub mod users;

pub use route_group::*;

pub type JsonResult = Result<status::Custom<Json<Value>>, MeltDown>;

pub fn ok(body: Value) -> status::Custom<Json<Value>> {
    status::Custom(Status::Ok, Json(body))
}

pub fn created(body: Value) -> status::Custom<Json<Value>> {
    status::Custom(Status::Created, Json(body))
}
