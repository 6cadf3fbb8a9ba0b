//! HTTP response building module
//!
//! Builders for the status codes the file server produces. Header decoration
//! happens later, in the request handler.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::http::response::Builder;
use hyper::{Response, StatusCode};

pub type HttpResponse = Response<Full<Bytes>>;

/// Build 200 OK for a preflight request: no body, no filesystem access
pub fn build_options_response() -> HttpResponse {
    finish(
        Response::builder()
            .status(StatusCode::OK)
            .header("Content-Length", 0),
        Bytes::new(),
        "OPTIONS",
    )
}

/// Build 200 OK carrying a file's bytes
pub fn build_file_response(
    data: Bytes,
    content_type: &str,
    last_modified: Option<&str>,
    is_head: bool,
) -> HttpResponse {
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", content_type)
        .header("Content-Length", data.len());
    if let Some(date) = last_modified {
        builder = builder.header("Last-Modified", date);
    }

    let body = if is_head { Bytes::new() } else { data };
    finish(builder, body, "200")
}

/// Build generic HTML response
pub fn build_html_response(content: String, is_head: bool) -> HttpResponse {
    let content_length = content.len();
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from(content)
    };

    finish(
        Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "text/html; charset=utf-8")
            .header("Content-Length", content_length),
        body,
        "HTML",
    )
}

/// Build 301 redirect, used to add the trailing slash to directory URLs
pub fn build_redirect_response(location: &str) -> HttpResponse {
    finish(
        Response::builder()
            .status(StatusCode::MOVED_PERMANENTLY)
            .header("Location", location)
            .header("Content-Length", 0),
        Bytes::new(),
        "301",
    )
}

/// Build 304 Not Modified response
pub fn build_304_response(last_modified: &str) -> HttpResponse {
    finish(
        Response::builder()
            .status(StatusCode::NOT_MODIFIED)
            .header("Last-Modified", last_modified),
        Bytes::new(),
        "304",
    )
}

/// Build 400 Bad Request for a request head that could not be parsed
pub fn build_400_response() -> HttpResponse {
    build_error_response(StatusCode::BAD_REQUEST, "Bad request syntax", false)
}

/// Build 404 Not Found response
pub fn build_404_response(is_head: bool) -> HttpResponse {
    build_error_response(StatusCode::NOT_FOUND, "File not found", is_head)
}

/// Build 501 Not Implemented for methods the file server does not handle
pub fn build_501_response(method: &str) -> HttpResponse {
    build_error_response(
        StatusCode::NOT_IMPLEMENTED,
        &format!("Unsupported method ('{method}')"),
        false,
    )
}

fn build_error_response(status: StatusCode, message: &str, is_head: bool) -> HttpResponse {
    let text = format!("{} {message}\n", status.as_u16());
    let content_length = text.len();
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from(text)
    };

    finish(
        Response::builder()
            .status(status)
            .header("Content-Type", "text/plain; charset=utf-8")
            .header("Content-Length", content_length),
        body,
        status.as_str(),
    )
}

fn finish(builder: Builder, body: Bytes, label: &str) -> HttpResponse {
    builder.body(Full::new(body)).unwrap_or_else(|e| {
        crate::logger::log_error(&format!("Failed to build {label} response: {e}"));
        Response::new(Full::new(Bytes::new()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_bytes(resp: HttpResponse) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_options_response_is_empty_200() {
        let resp = build_options_response();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_bytes(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_head_file_response_keeps_length() {
        let resp = build_file_response(Bytes::from_static(b"abcdef"), "text/plain", None, true);
        assert_eq!(resp.headers()["content-length"], "6");
        assert!(body_bytes(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_501_names_method() {
        let resp = build_501_response("POST");
        assert_eq!(resp.status(), StatusCode::NOT_IMPLEMENTED);
        let body = body_bytes(resp).await;
        assert_eq!(&body[..], b"501 Unsupported method ('POST')\n");
    }

    #[test]
    fn test_redirect_location() {
        let resp = build_redirect_response("/assets/");
        assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(resp.headers()["location"], "/assets/");
    }
}
