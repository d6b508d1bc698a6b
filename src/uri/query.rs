//! Query string parsing.
//!
//! Splitting and trimming only — URL-decoding of values is left to the caller via
//! [`super::encode::url_decode`], matching spec's "the core exposes `url_decode` as a
//! separate primitive" note.

/// Splits `raw` (the portion of a URI after the first `?`, if any) into ordered
/// `(name, value)` pairs. A part with no `=` yields an empty value.
pub fn parse_query(raw: &str) -> Vec<(String, String)> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split('&')
        .filter(|part| !part.is_empty())
        .map(|part| match part.split_once('=') {
            Some((name, value)) => (name.trim().to_string(), value.trim().to_string()),
            None => (part.trim().to_string(), String::new()),
        })
        .collect()
}

/// Splits a full request target into `(path, query)`. `query` is `""` when there is no
/// `?`.
pub fn split_target(target: &str) -> (&str, &str) {
    match target.split_once('?') {
        Some((path, query)) => (path, query),
        None => (target, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ampersand_separated_pairs() {
        assert_eq!(
            parse_query("a=1&b=2"),
            vec![("a".to_string(), "1".to_string()), ("b".to_string(), "2".to_string())]
        );
    }

    #[test]
    fn trims_whitespace_around_name_and_value() {
        assert_eq!(
            parse_query(" a = 1 &b=2"),
            vec![("a".to_string(), "1".to_string()), ("b".to_string(), "2".to_string())]
        );
    }

    #[test]
    fn missing_equals_yields_empty_value() {
        assert_eq!(parse_query("flag"), vec![("flag".to_string(), String::new())]);
    }

    #[test]
    fn split_target_separates_path_and_query() {
        assert_eq!(split_target("/stress/42?full=true"), ("/stress/42", "full=true"));
        assert_eq!(split_target("/stress/42"), ("/stress/42", ""));
    }
}
