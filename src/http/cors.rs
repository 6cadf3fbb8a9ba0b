//! Development header decoration
//!
//! Every response leaving the server passes through [`decorate`], whatever its
//! method, path or status.

use hyper::header::{
    HeaderName, HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, CACHE_CONTROL,
};
use hyper::Response;

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "GET, POST, OPTIONS";
pub const ALLOW_HEADERS: &str = "X-Requested-With, Content-Type";
pub const NO_CACHE: &str = "no-store, no-cache, must-revalidate";

static DEV_HEADERS: [(HeaderName, &str); 4] = [
    (ACCESS_CONTROL_ALLOW_ORIGIN, ALLOW_ORIGIN),
    (ACCESS_CONTROL_ALLOW_METHODS, ALLOW_METHODS),
    (ACCESS_CONTROL_ALLOW_HEADERS, ALLOW_HEADERS),
    (CACHE_CONTROL, NO_CACHE),
];

/// Add the CORS and cache-disabling headers to a response.
///
/// Existing values for these headers are replaced, so a `Cache-Control` set by
/// the file layer never survives.
pub fn decorate<B>(mut response: Response<B>) -> Response<B> {
    let headers = response.headers_mut();
    for (name, value) in &DEV_HEADERS {
        headers.insert(name.clone(), HeaderValue::from_static(*value));
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decorate_adds_all_headers() {
        let resp = decorate(Response::new(()));
        let h = resp.headers();
        assert_eq!(h["access-control-allow-origin"], "*");
        assert_eq!(h["access-control-allow-methods"], "GET, POST, OPTIONS");
        assert_eq!(h["access-control-allow-headers"], "X-Requested-With, Content-Type");
        assert_eq!(h["cache-control"], "no-store, no-cache, must-revalidate");
    }

    #[test]
    fn test_decorate_replaces_cache_control() {
        let resp = Response::builder()
            .status(404)
            .header("Cache-Control", "public, max-age=3600")
            .body(())
            .unwrap();
        let resp = decorate(resp);
        assert_eq!(resp.status(), 404);
        assert_eq!(resp.headers().get_all("cache-control").iter().count(), 1);
        assert_eq!(resp.headers()["cache-control"], NO_CACHE);
    }
}
