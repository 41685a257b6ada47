// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lexical normalization for request paths.
//!
//! Both sides of the protocol speak slash-separated paths relative to the
//! served root. The client normalizes before sending so equivalent
//! spellings share one cache key; the daemon normalizes again so foreign
//! clients cannot traverse out of the root.

/// Normalize a slash-separated relative path.
///
/// Empty and `.` segments are dropped and `..` folds into the previous
/// segment. Absolute paths and traversal above the starting point return
/// `None`. The empty result names the root itself.
pub fn normalize(path: &str) -> Option<String> {
    if path.starts_with('/') {
        return None;
    }
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }
    Some(segments.join("/"))
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
