use rocket::{catch, http::Status, response::status, serde::json::Json, Request};

use crate::meltdown::*;

type JsonError = status::Custom<Json<ApiError>>;

/// Renders the error a guard left on the request, or a generic one for `status`.
fn render(req: &Request<'_>, status: Status, melt_type: MeltType, fallback: &str) -> JsonError {
    let detail = match req.local_cache(|| Option::<ApiErrorDetail>::None) {
        Some(detail) => detail.clone(),
        None => ApiErrorDetail::from(&MeltDown::new(melt_type, fallback).with_context("path", req.uri().path().to_string())),
    };

    status::Custom(status, Json(ApiError { error: detail }))
}

#[catch(401)]
pub fn unauthorized(req: &Request<'_>) -> JsonError {
    render(req, Status::Unauthorized, MeltType::Unauthorized, "authentication required")
}

#[catch(403)]
pub fn forbidden(req: &Request<'_>) -> JsonError {
    render(req, Status::Forbidden, MeltType::Forbidden, "access denied")
}

#[catch(404)]
pub fn not_found(req: &Request<'_>) -> JsonError {
    render(req, Status::NotFound, MeltType::NotFound, "Route")
}

#[catch(422)]
pub fn unprocessable_entity(req: &Request<'_>) -> JsonError {
    render(req, Status::UnprocessableEntity, MeltType::ValidationFailed, "request body could not be parsed")
}

#[catch(500)]
pub fn internal_error(req: &Request<'_>) -> JsonError {
    render(req, Status::InternalServerError, MeltType::Unknown, "internal server error")
}

#[cfg(test)]
mod tests {
    use rocket::{catchers, local::asynchronous::Client, post, routes, serde::json::Json};
    use serde::Deserialize;
    use serde_json::Value;

    use super::*;

    #[derive(Deserialize)]
    struct Note {
        body: String,
    }

    #[post("/notes", data = "<note>")]
    fn create_note(note: Json<Note>) -> String {
        note.into_inner().body
    }

    async fn client() -> Client {
        let rocket = rocket::build()
            .mount("/", routes![create_note])
            .register("/", catchers![unauthorized, forbidden, not_found, unprocessable_entity, internal_error]);
        Client::tracked(rocket).await.expect("valid rocket instance")
    }

    async fn body(response: rocket::local::asynchronous::LocalResponse<'_>) -> Value {
        serde_json::from_str(&response.into_string().await.unwrap()).unwrap()
    }

    #[rocket::async_test]
    async fn unknown_route_is_json_404() {
        let client = client().await;
        let response = client.get("/nowhere").dispatch().await;

        assert_eq!(response.status(), Status::NotFound);
        let body = body(response).await;
        assert_eq!(body["error"]["code"], 404);
        assert_eq!(body["error"]["message"], "Route not found.");
    }

    #[rocket::async_test]
    async fn malformed_body_is_json_422() {
        let client = client().await;
        let response = client.post("/notes").header(rocket::http::ContentType::JSON).body(r#"{"title": 1}"#).dispatch().await;

        assert_eq!(response.status(), Status::UnprocessableEntity);
        assert_eq!(body(response).await["error"]["type"], "ValidationFailed");
    }
}
