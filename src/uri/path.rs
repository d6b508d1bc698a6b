//! The path-pattern matcher, path normalization, and path sanitation.

use super::encode::url_decode;

/// Collapses leading slashes to one and strips a single trailing slash, unless the
/// result would be empty — the root path normalizes to `/`.
pub fn normalize(path: &str) -> String {
    let trimmed = path.trim_start_matches('/');
    let with_root = format!("/{}", trimmed);
    if with_root == "/" {
        return with_root;
    }
    with_root
        .strip_suffix('/')
        .map(str::to_string)
        .unwrap_or(with_root)
}

/// Matches a route expression (e.g. `/users/:id/*`) against a concrete request path
/// (query string already stripped). Returns the captured `(name, value)` pairs in
/// left-to-right order on success.
///
/// See spec §4.1 for the segment-by-segment semantics this implements, including the
/// fast path for patterns with no `:`/`*` segments and the "a lone trailing `*` matches
/// an empty remainder" rule.
pub fn match_path(expr: &str, path: &str) -> Option<Vec<(String, String)>> {
    let norm_expr = normalize(expr);
    let norm_path = normalize(path);

    if norm_expr == norm_path {
        return Some(Vec::new());
    }

    let expr_segments: Vec<&str> = split_segments(&norm_expr);
    let path_segments: Vec<&str> = split_segments(&norm_path);

    let mut captures = Vec::new();
    let mut e = 0;
    let mut p = 0;

    while e < expr_segments.len() {
        let segment = expr_segments[e];

        if segment == "*" {
            let remainder = if p <= path_segments.len() {
                path_segments[p..].join("/")
            } else {
                String::new()
            };
            captures.push(("*".to_string(), url_decode(&remainder)));
            return Some(captures);
        }

        if p >= path_segments.len() {
            return None;
        }

        if let Some(name) = segment.strip_prefix(':') {
            if path_segments[p].is_empty() {
                return None;
            }
            captures.push((name.to_string(), url_decode(path_segments[p])));
        } else if segment != path_segments[p] {
            return None;
        }

        e += 1;
        p += 1;
    }

    if p == path_segments.len() {
        Some(captures)
    } else {
        None
    }
}

fn split_segments(normalized: &str) -> Vec<&str> {
    if normalized == "/" {
        return Vec::new();
    }
    normalized.trim_start_matches('/').split('/').collect()
}

/// Deletes every occurrence of the literal two-character sequence `..`. Defense in
/// depth only; the server must still resolve and verify containment before opening a
/// file.
pub fn sanitize_path(path: &str) -> String {
    let mut result = path.to_string();
    while let Some(idx) = result.find("..") {
        result.replace_range(idx..idx + 2, "");
    }
    result
}
