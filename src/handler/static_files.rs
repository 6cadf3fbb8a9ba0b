//! Static file serving module
//!
//! Maps request paths onto the root directory and builds file, directory
//! index, listing, redirect and not-found responses.

use crate::config::AppState;
use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime, response::HttpResponse};
use crate::logger;
use hyper::body::Bytes;
use std::fmt::Write as _;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Serve a GET or HEAD request from the root directory
pub async fn serve(ctx: &RequestContext<'_>, state: &AppState) -> HttpResponse {
    let Some(target) = resolve_path(&state.root, ctx.path) else {
        return http::build_404_response(ctx.is_head);
    };

    // File not found is common (404), no need to log it
    let Ok(metadata) = fs::metadata(&target).await else {
        return http::build_404_response(ctx.is_head);
    };

    if metadata.is_dir() {
        return serve_directory(ctx, state, &target).await;
    }

    // A trailing slash names a directory, never a file
    if ctx.path.ends_with('/') {
        return http::build_404_response(ctx.is_head);
    }

    serve_file(ctx, &target, &metadata).await
}

/// Translate a raw request path into a filesystem path under `root`
///
/// The query and fragment are dropped, percent escapes decoded, and the
/// segments normalized lexically: empty and `.` segments vanish, `..` removes
/// the previous segment but never climbs above the root. Segments carrying a
/// backslash or NUL are discarded. Returns `None` if the path is not UTF-8.
pub fn resolve_path(root: &Path, request_path: &str) -> Option<PathBuf> {
    let path = request_path
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    let decoded = urlencoding::decode(path).ok()?;

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s if s.contains(['\\', '\0']) => {}
            s => segments.push(s),
        }
    }

    Some(segments.iter().fold(root.to_path_buf(), |acc, s| acc.join(s)))
}

async fn serve_directory(ctx: &RequestContext<'_>, state: &AppState, dir: &Path) -> HttpResponse {
    // Relative links in the page only resolve correctly under a trailing slash
    if !ctx.path.ends_with('/') {
        let location = match ctx.query {
            Some(q) => format!("{}/?{q}", ctx.path),
            None => format!("{}/", ctx.path),
        };
        return http::build_redirect_response(&location);
    }

    for index in &state.config.http.index_files {
        let candidate = dir.join(index);
        if let Ok(metadata) = fs::metadata(&candidate).await {
            if metadata.is_file() {
                return serve_file(ctx, &candidate, &metadata).await;
            }
        }
    }

    if !state.config.http.directory_listing {
        return http::build_404_response(ctx.is_head);
    }

    match render_listing(dir, ctx.path).await {
        Ok(html) => http::response::build_html_response(html, ctx.is_head),
        Err(e) => {
            logger::log_warning(&format!(
                "No permission to list directory '{}': {e}",
                dir.display()
            ));
            http::build_404_response(ctx.is_head)
        }
    }
}

async fn serve_file(ctx: &RequestContext<'_>, path: &Path, metadata: &Metadata) -> HttpResponse {
    let modified = metadata.modified().ok();
    let last_modified = modified.map(cache::format_http_date);

    // If-None-Match takes precedence; without ETags it can never match
    if !ctx.has_if_none_match {
        if let (Some(mtime), Some(date)) = (modified, last_modified.as_deref()) {
            if cache::is_not_modified(ctx.if_modified_since, mtime) {
                return http::build_304_response(date);
            }
        }
    }

    let content = match fs::read(path).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!("Failed to read file '{}': {e}", path.display()));
            return http::build_404_response(ctx.is_head);
        }
    };

    http::response::build_file_response(
        Bytes::from(content),
        mime::content_type_for(path),
        last_modified.as_deref(),
        ctx.is_head,
    )
}

/// Render the HTML listing of a directory
async fn render_listing(dir: &Path, request_path: &str) -> std::io::Result<String> {
    let mut entries = Vec::new();
    let mut read_dir = fs::read_dir(dir).await?;
    while let Some(entry) = read_dir.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        let full = entry.path();
        let is_dir = fs::metadata(&full).await.is_ok_and(|m| m.is_dir());
        let is_link = fs::symlink_metadata(&full)
            .await
            .is_ok_and(|m| m.file_type().is_symlink());
        entries.push((name, is_dir, is_link));
    }
    entries.sort_by_key(|(name, _, _)| name.to_lowercase());

    let display_path = urlencoding::decode(request_path)
        .map_or_else(|_| request_path.to_string(), std::borrow::Cow::into_owned);
    let title = format!("Directory listing for {}", escape_html(&display_path));

    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE HTML>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n</head>\n<body>\n<h1>{title}</h1>\n<hr>\n<ul>\n"
    );
    for (name, is_dir, is_link) in &entries {
        let mut display = name.clone();
        let mut link = urlencoding::encode(name).into_owned();
        if *is_dir {
            display.push('/');
            link.push('/');
        }
        if *is_link {
            display.push('@');
        }
        let _ = writeln!(
            html,
            "<li><a href=\"{link}\">{}</a></li>",
            escape_html(&display)
        );
    }
    html.push_str("</ul>\n<hr>\n</body>\n</html>\n");

    Ok(html)
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}
