//! Route interception rules
//!
//! A rule pairs a glob-style URL pattern with what to do when a request from
//! the page matches it: answer with a fixed body, or let the request through
//! and patch fields of the real response before the page sees it.
//!
//! The rewrite path is a pure transformation over `serde_json::Value`
//! ([`apply_patches`]); the browser driver serializes the same patch list
//! into the generated route handler, so the transformation is testable
//! without any network plumbing.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{E2eError, E2eResult};

/// A single interception rule, installed for the lifetime of one scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRule {
    /// Glob-style URL pattern: `*` matches within a path segment,
    /// `**` across segments. E.g. `*/**/api/tags`.
    pub pattern: String,
    pub action: RouteAction,
}

/// What to do with a matching request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RouteAction {
    /// Respond immediately with this body, bypassing the network
    Fulfill { body: Value },
    /// Forward to the network, patch the JSON response, return the result
    Rewrite { patches: Vec<FieldPatch> },
}

/// One field replacement, addressed by JSON Pointer (RFC 6901)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldPatch {
    pub pointer: String,
    pub value: Value,
}

impl RouteRule {
    pub fn fulfill(pattern: impl Into<String>, body: Value) -> Self {
        Self {
            pattern: pattern.into(),
            action: RouteAction::Fulfill { body },
        }
    }

    pub fn rewrite(pattern: impl Into<String>, patches: Vec<FieldPatch>) -> Self {
        Self {
            pattern: pattern.into(),
            action: RouteAction::Rewrite { patches },
        }
    }

    /// Whether a URL matches this rule's pattern
    pub fn matches(&self, url: &str) -> bool {
        glob_regex(&self.pattern).is_match(url)
    }
}

/// Compile a glob pattern into an anchored regex
fn glob_regex(pattern: &str) -> Regex {
    let mut regex = String::with_capacity(pattern.len() + 8);
    regex.push('^');

    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    regex.push_str(".*");
                } else {
                    regex.push_str("[^/]*");
                }
            }
            '?' => regex.push_str("[^/]"),
            c if "\\.+()[]{}^$|".contains(c) => {
                regex.push('\\');
                regex.push(c);
            }
            c => regex.push(c),
        }
    }

    regex.push('$');
    // The pattern alphabet is closed over the escapes above, so this cannot fail.
    Regex::new(&regex).expect("glob pattern compiles to a valid regex")
}

/// Apply an ordered list of patches to a JSON body in place.
///
/// A pointer with no existing target is an error: a rewrite rule that stops
/// matching the backend's response shape should fail loudly, not silently
/// leave the body unmodified.
pub fn apply_patches(body: &mut Value, patches: &[FieldPatch]) -> E2eResult<()> {
    for patch in patches {
        match body.pointer_mut(&patch.pointer) {
            Some(target) => *target = patch.value.clone(),
            None => return Err(E2eError::PatchTarget(patch.pointer.clone())),
        }
    }
    Ok(())
}
