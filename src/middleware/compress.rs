use std::io::{Cursor, Write};

use flate2::{write::GzEncoder, Compression};
use rocket::{
    fairing::{Fairing, Info, Kind},
    http::{Header, Status},
    Request, Response,
};

use crate::quill_log;

pub struct Gzip;

pub fn accepts_gzip(accept_encoding: Option<&str>) -> bool {
    accept_encoding
        .map(|value| value.split(',').any(|encoding| encoding.split(';').next().map(str::trim) == Some("gzip")))
        .unwrap_or(false)
}

pub fn gzip_bytes(body: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(body)?;
    encoder.finish()
}

#[rocket::async_trait]
impl Fairing for Gzip {
    fn info(&self) -> Info {
        Info {
            name: "Gzip Compression",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        if !accepts_gzip(req.headers().get_one("Accept-Encoding")) || res.headers().contains("Content-Encoding") {
            return;
        }

        let body = match res.body_mut().to_bytes().await {
            Ok(body) => body,
            Err(e) => {
                quill_log!(Error, format!("Failed to read response body for compression: {}", e));
                res.set_status(Status::InternalServerError);
                res.set_sized_body(0, Cursor::new(Vec::new()));
                return;
            }
        };

        if body.is_empty() {
            res.set_sized_body(0, Cursor::new(body));
            return;
        }

        match gzip_bytes(&body) {
            Ok(compressed) => {
                res.set_header(Header::new("Content-Encoding", "gzip"));
                res.set_sized_body(compressed.len(), Cursor::new(compressed));
            }
            Err(e) => {
                quill_log!(Warning, format!("Gzip compression failed: {}", e));
                res.set_sized_body(body.len(), Cursor::new(body));
            }
        }
    }
}
