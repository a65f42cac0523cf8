use std::time::Instant;

use rocket::{
    fairing::{Fairing, Info, Kind},
    http::Header,
    Data, Request, Response,
};
use uuid::Uuid;

use crate::quill_log;

pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

#[derive(Clone)]
struct RequestInfo {
    id: Uuid,
    start_time: Instant,
}

pub struct RequestLogFairing;

#[rocket::async_trait]
impl Fairing for RequestLogFairing {
    fn info(&self) -> Info {
        Info {
            name: "Request/Response Logger",
            kind: Kind::Request | Kind::Response,
        }
    }

    async fn on_request(&self, request: &mut Request<'_>, _: &mut Data<'_>) {
        let info = RequestInfo {
            id: Uuid::new_v4(),
            start_time: Instant::now(),
        };

        quill_log!(Debug, format!("[{}] {} {}", info.id, request.method(), request.uri().path()));
        request.local_cache(|| Some(info));
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        let Some(info) = request.local_cache(|| Option::<RequestInfo>::None) else {
            return;
        };

        let status = response.status();
        let elapsed_ms = info.start_time.elapsed().as_millis();
        let line = format!("[{}] {} {} -> {} ({} ms)", info.id, request.method(), request.uri().path(), status.code, elapsed_ms);

        match status.code {
            500..=599 => quill_log!(Error, line),
            400..=499 => quill_log!(Warning, line),
            _ => quill_log!(Info, line),
        }

        response.set_header(Header::new(REQUEST_ID_HEADER, info.id.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use rocket::{get, local::asynchronous::Client, routes};

    use super::*;

    #[get("/ping")]
    fn ping() -> &'static str {
        "pong"
    }

    #[rocket::async_test]
    async fn tags_responses_with_a_request_id() {
        let rocket = rocket::build().mount("/", routes![ping]).attach(RequestLogFairing);
        let client = Client::tracked(rocket).await.expect("valid rocket instance");

        let first = client.get("/ping").dispatch().await;
        let first_id = first.headers().get_one(REQUEST_ID_HEADER).map(str::to_string).unwrap();
        let second = client.get("/ping").dispatch().await;
        let second_id = second.headers().get_one(REQUEST_ID_HEADER).map(str::to_string).unwrap();

        assert!(Uuid::parse_str(&first_id).is_ok());
        assert_ne!(first_id, second_id);
    }
}
