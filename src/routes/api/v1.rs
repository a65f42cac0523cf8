use rocket::{get, routes, serde::json::Json, Route};
use serde_json::{json, Value};

use crate::bootstrap::settings;

#[get("/api/v1/status")]
pub async fn api_status() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "environment": settings().environment,
        }
    }))
}

pub fn api_v1_routes() -> Vec<Route> {
    routes![api_status]
}

#[cfg(test)]
mod tests {
    use rocket::{http::Status, local::asynchronous::Client};

    use super::*;

    #[rocket::async_test]
    async fn status_reports_ok() {
        let client = Client::tracked(rocket::build().mount("/", api_v1_routes())).await.expect("valid rocket instance");
        let response = client.get("/api/v1/status").dispatch().await;

        assert_eq!(response.status(), Status::Ok);
        let body: Value = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(body["data"]["status"], "ok");
        assert_eq!(body["data"]["service"], "quill");
    }
}
