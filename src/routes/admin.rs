use rocket::{delete, post, routes, serde::json::Json, Route};
use serde_json::json;

use crate::{
    database::deadline,
    middleware::*,
    quill_log,
    routes::{created, ok, JsonResult},
    structs::*,
};

#[post("/admin/tags", data = "<request>")]
pub async fn create_tag(admin: AdminGuard, request: Json<CreateTagRequest>) -> JsonResult {
    let tag = deadline(Tags::create(request.into_inner())).await?;
    quill_log!(Info, format!("Admin {} created tag '{}'", admin.0.id, tag.title));

    Ok(created(json!({ "tag": TagSummary::from(tag), "message": "created" })))
}

#[delete("/admin/tags/<id>")]
pub async fn delete_tag(id: i32, admin: AdminGuard) -> JsonResult {
    deadline(Tags::delete_by_id(id)).await?;
    quill_log!(Info, format!("Admin {} deleted tag {}", admin.0.id, id));

    Ok(ok(json!({ "message": "deleted" })))
}

pub fn admin_routes() -> Vec<Route> {
    routes![create_tag, delete_tag]
}
