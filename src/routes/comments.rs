use rocket::{delete, put, routes, serde::json::Json, Route};
use serde_json::json;

use crate::{
    database::deadline,
    middleware::*,
    quill_log,
    routes::{ok, JsonResult},
    structs::*,
};

#[put("/comments/<id>", data = "<request>")]
pub async fn update_comment(id: i32, permitted: Permitted<Comments>, request: Json<UpdateCommentRequest>) -> JsonResult {
    let comment = deadline(Comments::update_body(id, request.into_inner().body)).await?;
    quill_log!(Info, format!("User {} updated comment {}", permitted.user.id, id));

    Ok(ok(json!({ "comment": comment, "message": "updated" })))
}

#[delete("/comments/<id>")]
pub async fn delete_comment(id: i32, permitted: Permitted<Comments>) -> JsonResult {
    deadline(Comments::delete_by_id(permitted.record.id)).await?;
    quill_log!(Info, format!("User {} deleted comment {}", permitted.user.id, id));

    Ok(ok(json!({ "message": "deleted" })))
}

pub fn comment_routes() -> Vec<Route> {
    routes![update_comment, delete_comment]
}
