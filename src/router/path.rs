//! Dispatch-key construction.
//!
//! A dispatch key is `"<METHOD> /<path>"` with collapsed separators, or just
//! `"/<path>"` when the entry matches any method. [`dispatch_key`] composes
//! one from a method, a router's base path, and relative path segments;
//! [`normalize`] is the cleanup step that makes composition forgiving about
//! leading and trailing slashes in its inputs.

use crate::http::Method;

/// Composes a dispatch key from a method, a base path, and path segments.
///
/// Each segment is prepended with `/` unconditionally, so inputs may carry
/// their own slashes; the doubled separators are collapsed afterwards. A
/// `None` method produces a key with no method prefix, which the dispatch
/// table treats as "match any method".
///
/// Pure function: same inputs, same key, no side effects.
pub(crate) fn dispatch_key(method: Option<&Method>, base: &str, segments: &[&str]) -> String {
    let mut joined = String::new();
    for segment in segments {
        joined.push('/');
        joined.push_str(segment);
    }
    let method = method.map_or("", Method::as_str);
    normalize(&format!("{method} /{base}/{joined}"))
}

/// Collapses every run of consecutive `/` into a single `/` and trims
/// surrounding whitespace. Idempotent: normalizing an already-normalized key
/// is a no-op.
pub(crate) fn normalize(raw: &str) -> String {
    let mut key = raw.trim().to_owned();
    while key.contains("//") {
        key = key.replace("//", "/");
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_prefix_and_single_separator() {
        let key = dispatch_key(Some(&Method::Get), "/v1", &["/user"]);
        assert_eq!(key, "GET /v1/user");
    }

    #[test]
    fn no_method_means_no_prefix() {
        let key = dispatch_key(None, "/v1", &["/api/"]);
        assert_eq!(key, "/v1/api/");
    }

    #[test]
    fn doubled_separators_collapse() {
        let key = dispatch_key(Some(&Method::Get), "/v2/api/", &["/user"]);
        assert_eq!(key, "GET /v2/api/user");
    }

    #[test]
    fn empty_base_and_segments_still_form_a_key() {
        assert_eq!(dispatch_key(Some(&Method::Get), "", &[]), "GET /");
        assert_eq!(dispatch_key(None, "", &[]), "/");
    }

    #[test]
    fn output_never_contains_double_slash() {
        let cases = [
            (Some(Method::Post), "//a//", vec!["//b//", "c"]),
            (None, "", vec!["////"]),
            (None, "/x/", vec!["/y/", "/z/"]),
        ];
        for (method, base, segments) in cases {
            let key = dispatch_key(method.as_ref(), base, &segments);
            assert!(!key.contains("//"), "unexpected // in {key:?}");
        }
    }

    #[test]
    fn normalize_is_idempotent() {
        let raw = "GET ///v1////api//user  ";
        let once = normalize(raw);
        assert_eq!(normalize(&once), once);
    }
}
