//! Request dispatch module
//!
//! Entry point for HTTP request processing: preflight short-circuit, method
//! check, static file dispatch, then header decoration.

use crate::config::AppState;
use crate::handler::static_files;
use crate::http::{self, response::HttpResponse};
use crate::logger;
use hyper::header::{HeaderValue, IF_MODIFIED_SINCE, IF_NONE_MATCH, SERVER};
use hyper::http::request::Parts;
use hyper::{Method, Request};
use std::convert::Infallible;
use std::sync::Arc;

/// Request context encapsulating information needed for file serving
pub struct RequestContext<'a> {
    /// Raw (still percent-encoded) request path
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
    pub if_modified_since: Option<&'a str>,
    pub has_if_none_match: bool,
}

impl<'a> RequestContext<'a> {
    pub fn from_parts(req: &'a Parts) -> Self {
        Self {
            path: req.uri.path(),
            query: req.uri.query(),
            is_head: req.method == Method::HEAD,
            if_modified_since: req
                .headers
                .get(IF_MODIFIED_SINCE)
                .and_then(|v| v.to_str().ok()),
            has_if_none_match: req.headers.contains_key(IF_NONE_MATCH),
        }
    }
}

/// Main entry point for HTTP request handling
///
/// Never fails: every outcome, including errors, is an HTTP response.
/// Request bodies are ignored.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<HttpResponse, Infallible> {
    let (parts, _) = req.into_parts();
    let response = dispatch(&parts, &state).await;
    Ok(finalize(response, &state.config.http.server_name))
}

async fn dispatch(req: &Parts, state: &AppState) -> HttpResponse {
    match &req.method {
        // Preflight never touches the filesystem
        &Method::OPTIONS => http::build_options_response(),
        &Method::GET | &Method::HEAD => {
            let ctx = RequestContext::from_parts(req);
            static_files::serve(&ctx, state).await
        }
        method => {
            logger::log_warning(&format!("Unsupported method: {method}"));
            http::build_501_response(method.as_str())
        }
    }
}

/// Apply the development headers and the `Server` header
pub fn finalize(response: HttpResponse, server_name: &str) -> HttpResponse {
    let mut response = http::decorate(response);
    if let Ok(value) = HeaderValue::from_str(server_name) {
        response.headers_mut().insert(SERVER, value);
    }
    response
}
