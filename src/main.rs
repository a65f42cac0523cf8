#[macro_use]
extern crate rocket;

mod bootstrap;
mod database;
mod meltdown;
mod middleware;
mod models;
mod routes;
mod services;
mod structs;

use bootstrap::*;
use middleware::*;
use routes::*;

#[launch]
async fn rocket() -> _ {
    bootstrap().await;
    quill_log!(Info, "Starting server...");

    rocket::build()
        .mount("/", posts::post_routes())
        .mount("/", comments::comment_routes())
        .mount("/", notifications::notification_routes())
        .mount("/", users::user_routes())
        .mount("/", tags::tag_routes())
        .mount("/", api::v1::api_v1_routes())
        .attach_admin_guard(admin::admin_routes())
        .register("/", catchers![unauthorized, forbidden, not_found, unprocessable_entity, internal_error])
        .attach(RequestLogFairing)
        .attach(Gzip)
}
