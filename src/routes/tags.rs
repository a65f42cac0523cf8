use rocket::{get, routes, Route};
use serde_json::json;

use crate::{
    database::deadline,
    routes::{ok, JsonResult},
    structs::*,
};

#[get("/tags")]
pub async fn get_tags() -> JsonResult {
    let tags: Vec<TagSummary> = deadline(Tags::all()).await?.into_iter().map(TagSummary::from).collect();

    Ok(ok(json!({ "tags": tags })))
}

pub fn tag_routes() -> Vec<Route> {
    routes![get_tags]
}
