use rocket::{delete, get, put, routes, Route};
use serde_json::json;

use crate::{
    database::deadline,
    middleware::*,
    routes::{ok, JsonResult},
    structs::*,
};

#[get("/notifications")]
pub async fn get_notifications(user: AuthUser) -> JsonResult {
    let notifications = deadline(Notifications::for_recipient(user.id)).await?;

    Ok(ok(json!({ "count": notifications.len(), "notifications": notifications })))
}

#[put("/notifications/<id>/read")]
pub async fn mark_notification_read(id: i32, permitted: Permitted<Notifications>) -> JsonResult {
    let notification = if permitted.record.read { permitted.record } else { deadline(Notifications::mark_read(id)).await? };

    Ok(ok(json!({ "notification": notification, "message": "updated" })))
}

#[delete("/notifications/<id>")]
pub async fn delete_notification(id: i32, _permitted: Permitted<Notifications>) -> JsonResult {
    deadline(Notifications::delete_by_id(id)).await?;

    Ok(ok(json!({ "message": "deleted" })))
}

pub fn notification_routes() -> Vec<Route> {
    routes![get_notifications, mark_notification_read, delete_notification]
}
