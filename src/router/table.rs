//! Keyed dispatch table — pattern storage and request resolution.
//!
//! Patterns are the normalized keys produced by the path builder:
//! `"[METHOD ]/path"`. A path ending in `/` is a *subtree* pattern matching
//! itself and every path below it (`"/"` matches everything); any other path
//! matches exactly. A pattern without a method matches any method.
//!
//! Resolution picks the most specific matching pattern: exact beats subtree,
//! a longer subtree beats a shorter one, and for the same path a
//! method-bound pattern beats an any-method one. When patterns match the
//! path but none allows the method, resolution reports "method not allowed"
//! together with the methods that would have been accepted.

use std::collections::HashMap;

use tracing::warn;

use super::Handler;
use crate::http::Method;

/// The outcome of resolving a request against the table.
pub(crate) enum Resolution {
    /// A pattern matched; dispatch to this handler.
    Matched(Handler),
    /// The path is registered but not for this method. `allow` lists the
    /// accepted methods, comma-separated, for an `Allow` response header.
    MethodNotAllowed { allow: String },
    /// No pattern matched the path.
    NotFound,
}

struct Entry {
    method: Option<Method>,
    path: String,
    handler: Handler,
}

impl Entry {
    fn is_subtree(&self) -> bool {
        self.path.ends_with('/')
    }

    fn matches_path(&self, path: &str) -> bool {
        if self.is_subtree() {
            // A subtree also answers for its own root without the trailing
            // slash, so mounting at "/api/" covers "/api".
            path.starts_with(self.path.as_str()) || path == &self.path[..self.path.len() - 1]
        } else {
            path == self.path
        }
    }

    fn allows(&self, method: &Method) -> bool {
        match &self.method {
            None => true,
            // A GET pattern also serves HEAD requests.
            Some(m) => m == method || (*m == Method::Get && *method == Method::Head),
        }
    }

    // Ordering key for "most specific wins": exact over subtree, longer path
    // over shorter, then how directly the method matched.
    fn specificity(&self, method: &Method) -> (bool, usize, u8) {
        let method_rank = match &self.method {
            Some(m) if m == method => 2,
            Some(_) => 1,
            None => 0,
        };
        (!self.is_subtree(), self.path.len(), method_rank)
    }
}

/// Path-keyed dispatch table owned by a router.
///
/// Entries are keyed by the full normalized pattern string, so registering
/// the same pattern twice replaces the earlier handler (last-write-wins).
#[derive(Default)]
pub(crate) struct DispatchTable {
    entries: HashMap<String, Entry>,
}

impl DispatchTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under the given normalized key, replacing any
    /// prior entry for the identical pattern.
    ///
    /// Keys with an empty path portion are ignored with a warning; they can
    /// only arise from degenerate registrations and must never panic here.
    pub(crate) fn insert(&mut self, key: &str, handler: Handler) {
        let (method, path) = split_key(key);
        if path.is_empty() {
            warn!(key = %key, "ignoring dispatch pattern with empty path");
            return;
        }
        self.entries.insert(
            key.to_owned(),
            Entry {
                method,
                path: path.to_owned(),
                handler,
            },
        );
    }

    /// Returns the number of registered patterns.
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Resolves a request to the most specific matching handler.
    pub(crate) fn resolve(&self, method: &Method, path: &str) -> Resolution {
        let mut best: Option<&Entry> = None;
        let mut allow: Vec<&str> = Vec::new();

        for entry in self.entries.values() {
            if !entry.matches_path(path) {
                continue;
            }
            if entry.allows(method) {
                if best.is_none_or(|b| entry.specificity(method) > b.specificity(method)) {
                    best = Some(entry);
                }
            } else if let Some(m) = &entry.method {
                allow.push(m.as_str());
            }
        }

        match best {
            Some(entry) => Resolution::Matched(entry.handler.clone()),
            None if !allow.is_empty() => {
                allow.sort_unstable();
                allow.dedup();
                Resolution::MethodNotAllowed {
                    allow: allow.join(", "),
                }
            }
            None => Resolution::NotFound,
        }
    }
}

/// Splits a normalized key into its optional method and its path portion.
pub(crate) fn split_key(key: &str) -> (Option<Method>, &str) {
    match key.split_once(' ') {
        Some((method, path)) => (method.parse().ok(), path),
        None => (None, key),
    }
}
