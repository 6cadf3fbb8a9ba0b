//! Request head validation and raw response encoding
//!
//! hyper answers a request head it cannot parse with its own bare 400, which
//! never reaches the handler. Connections are checked here first so that
//! answer is built and decorated like any other response.

use hyper::http::response::Parts;

/// Largest request head accepted before the request is rejected
pub const MAX_HEAD_BYTES: usize = 16 * 1024;

// Same limit hyper applies
const MAX_HEADERS: usize = 100;

/// Outcome of inspecting the bytes received so far
#[derive(Debug, PartialEq, Eq)]
pub enum HeadStatus {
    /// A full, well-formed head is buffered
    Complete,
    /// More bytes are needed
    Partial,
    /// The head can never become valid
    Invalid(String),
}

/// Check a buffered request head with hyper's own parser
pub fn check_request_head(buf: &[u8]) -> HeadStatus {
    let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut req = httparse::Request::new(&mut headers);

    match req.parse(buf) {
        Ok(httparse::Status::Complete(_)) => {
            let bad_length = req.headers.iter().any(|h| {
                h.name.eq_ignore_ascii_case("content-length") && !is_valid_length(h.value)
            });
            if bad_length {
                HeadStatus::Invalid("invalid Content-Length".to_string())
            } else {
                HeadStatus::Complete
            }
        }
        Ok(httparse::Status::Partial) if buf.len() >= MAX_HEAD_BYTES => {
            HeadStatus::Invalid("request head too large".to_string())
        }
        Ok(httparse::Status::Partial) => HeadStatus::Partial,
        Err(e) => HeadStatus::Invalid(e.to_string()),
    }
}

fn is_valid_length(value: &[u8]) -> bool {
    std::str::from_utf8(value)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .is_some()
}

/// Serialize an HTTP/1.1 response for writing straight to the socket
pub fn encode_response(parts: &Parts, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(256 + body.len());
    out.extend_from_slice(
        format!(
            "HTTP/1.1 {} {}\r\n",
            parts.status.as_u16(),
            parts.status.canonical_reason().unwrap_or("")
        )
        .as_bytes(),
    );
    for (name, value) in &parts.headers {
        out.extend_from_slice(name.as_str().as_bytes());
        out.extend_from_slice(b": ");
        out.extend_from_slice(value.as_bytes());
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(body);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::Response;

    #[test]
    fn test_complete_head() {
        let head = b"GET /index.html HTTP/1.1\r\nHost: localhost\r\n\r\n";
        assert_eq!(check_request_head(head), HeadStatus::Complete);
    }

    #[test]
    fn test_partial_head() {
        assert_eq!(check_request_head(b"GET /index.ht"), HeadStatus::Partial);
        assert_eq!(
            check_request_head(b"GET / HTTP/1.1\r\nHost: local"),
            HeadStatus::Partial
        );
    }

    #[test]
    fn test_garbage_request_line() {
        assert!(matches!(
            check_request_head(b"GARBAGE REQUEST LINE\r\n\r\n"),
            HeadStatus::Invalid(_)
        ));
    }

    #[test]
    fn test_bad_content_length() {
        let head = b"POST / HTTP/1.1\r\nHost: x\r\nContent-Length: ten\r\n\r\n";
        assert!(matches!(check_request_head(head), HeadStatus::Invalid(_)));
    }

    #[test]
    fn test_oversized_partial_head() {
        let mut head = b"GET / HTTP/1.1\r\nX-Filler: ".to_vec();
        head.resize(MAX_HEAD_BYTES, b'a');
        assert!(matches!(check_request_head(&head), HeadStatus::Invalid(_)));
    }

    #[test]
    fn test_encode_response() {
        let resp = Response::builder()
            .status(400)
            .header("Content-Length", 3)
            .body(())
            .unwrap();
        let (parts, ()) = resp.into_parts();
        let bytes = encode_response(&parts, b"bad");
        assert_eq!(
            bytes,
            b"HTTP/1.1 400 Bad Request\r\ncontent-length: 3\r\n\r\nbad".to_vec()
        );
    }
}
