// Connection handling module
// Serves the single request of one TCP connection and writes the access log

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use http_body_util::{BodyExt, Collected};
use hyper::body::{Body, Incoming};
use hyper::header::{HeaderMap, HeaderName, HeaderValue, CONNECTION, DATE, REFERER, USER_AGENT};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Version};
use hyper_util::rt::TokioIo;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::config::AppState;
use crate::handler;
use crate::http::head::{check_request_head, encode_response, HeadStatus, MAX_HEAD_BYTES};
use crate::http::{self, cache, response::HttpResponse};
use crate::logger::{self, AccessLogEntry};

const PEEK_RETRY: Duration = Duration::from_millis(5);

/// Serve one connection to completion.
///
/// Keep-alive is off, so the connection carries a single request and is closed
/// after the response. The request head is validated before hyper sees it so
/// a malformed request still gets the development headers. Serving is bounded
/// by `server.connection_timeout` (0 disables the bound). Errors are logged,
/// never returned.
pub async fn serve_connection(stream: TcpStream, peer_addr: SocketAddr, state: &Arc<AppState>) {
    let timeout_secs = state.config.server.connection_timeout;

    let serve = async move {
        let head = inspect_head(&stream).await;
        match head {
            Ok(HeadStatus::Complete) => serve_http(stream, peer_addr, state).await,
            Ok(HeadStatus::Invalid(reason)) => {
                reject_malformed(stream, peer_addr, state, &reason).await;
            }
            // Closed before a full head arrived
            Ok(HeadStatus::Partial) => {}
            Err(e) => logger::log_connection_error(&e),
        }
    };

    let finished = if timeout_secs == 0 {
        serve.await;
        true
    } else {
        tokio::time::timeout(Duration::from_secs(timeout_secs), serve)
            .await
            .is_ok()
    };

    if !finished {
        logger::log_warning(&format!(
            "Connection from {peer_addr} timed out after {timeout_secs} seconds"
        ));
    }
}

/// Peek at the incoming bytes until the request head is complete or invalid.
///
/// Nothing is consumed, so hyper later reads the same bytes.
async fn inspect_head(stream: &TcpStream) -> std::io::Result<HeadStatus> {
    let mut buf = vec![0u8; MAX_HEAD_BYTES];
    loop {
        let n = stream.peek(&mut buf).await?;
        if n == 0 {
            return Ok(HeadStatus::Partial);
        }
        match check_request_head(&buf[..n]) {
            // peek returns at once while data is pending; wait for more
            HeadStatus::Partial => tokio::time::sleep(PEEK_RETRY).await,
            status => return Ok(status),
        }
    }
}

async fn serve_http(stream: TcpStream, peer_addr: SocketAddr, state: &Arc<AppState>) {
    let io = TokioIo::new(stream);

    let mut builder = http1::Builder::new();
    builder.keep_alive(false);

    let service_state = Arc::clone(state);
    let conn = builder.serve_connection(
        io,
        service_fn(move |req| handle_logged(req, peer_addr, Arc::clone(&service_state))),
    );

    if let Err(err) = conn.await {
        logger::log_connection_error(&err);
    }
}

/// Answer an unparseable request with a decorated 400 and close
async fn reject_malformed(
    mut stream: TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<AppState>,
    reason: &str,
) {
    logger::log_warning(&format!("Malformed request from {peer_addr}: {reason}"));

    let response =
        handler::router::finalize(http::build_400_response(), &state.config.http.server_name);
    let (mut parts, body) = response.into_parts();
    parts.headers.insert(CONNECTION, HeaderValue::from_static("close"));
    if let Ok(date) = HeaderValue::from_str(&cache::format_http_date(SystemTime::now())) {
        parts.headers.insert(DATE, date);
    }
    let body = body
        .collect()
        .await
        .map(Collected::to_bytes)
        .unwrap_or_default();

    // Consume the peeked bytes so closing sends FIN rather than RST
    let mut sink = vec![0u8; MAX_HEAD_BYTES];
    let _ = stream.try_read(&mut sink);

    if let Err(e) = stream.write_all(&encode_response(&parts, &body)).await {
        logger::log_connection_error(&e);
        return;
    }
    let _ = stream.shutdown().await;
}

/// Run the request handler and record the exchange in the access log
async fn handle_logged(
    req: Request<Incoming>,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
) -> Result<HttpResponse, Infallible> {
    if !state.config.logging.access_log {
        return handler::handle_request(req, state).await;
    }

    let started = Instant::now();
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_label(req.version()).to_string();
    entry.referer = header_string(req.headers(), &REFERER);
    entry.user_agent = header_string(req.headers(), &USER_AGENT);

    let response = handler::handle_request(req, Arc::clone(&state)).await?;

    entry.status = response.status().as_u16();
    entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    logger::log_access(&entry, &state.config.logging.access_log_format);

    Ok(response)
}

fn header_string(headers: &HeaderMap, name: &HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_label() {
        assert_eq!(version_label(Version::HTTP_10), "1.0");
        assert_eq!(version_label(Version::HTTP_11), "1.1");
        assert_eq!(version_label(Version::HTTP_2), "2");
    }
}
