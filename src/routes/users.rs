use rocket::{get, put, routes, serde::json::Json, Route};
use serde_json::json;

use crate::{
    database::deadline,
    middleware::*,
    quill_log,
    routes::{ok, JsonResult},
    structs::*,
};

#[get("/users/<id>")]
pub async fn get_user(id: i32) -> JsonResult {
    let user = deadline(Users::get_by_id(id)).await?;

    Ok(ok(json!({ "user": user })))
}

#[put("/users/<id>", data = "<request>")]
pub async fn update_user(id: i32, caller: SelfOrAdmin, request: Json<UpdateUserRequest>) -> JsonResult {
    let user = deadline(Users::update_by_id(id, request.into_inner())).await?;
    quill_log!(Info, format!("User {} updated user {}", caller.0.id, id));

    Ok(ok(json!({ "user": user, "message": "updated" })))
}

pub fn user_routes() -> Vec<Route> {
    routes![get_user, update_user]
}
