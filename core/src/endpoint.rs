//! Base URL plus path segment composition.
//!
//! Segments are joined with path-join semantics: one separator between
//! components, empty and `.` elements dropped, `..` pops the previous
//! element. A leading `/` on the base path survives, a trailing one does
//! not. Query and fragment of the base are left untouched.

use url::Url;

use crate::error::Result;

/// Append `segments` to the path of `base`, in order.
pub fn join_url(base: &str, segments: &[&str]) -> Result<String> {
    let mut url = Url::parse(base)?;

    let mut path = url.path().to_string();
    for segment in segments {
        path = join_path(&path, segment);
    }
    url.set_path(&path);

    Ok(url.to_string())
}

fn join_path(left: &str, right: &str) -> String {
    let joined = match (left.is_empty(), right.is_empty()) {
        (true, true) => return String::new(),
        (true, false) => right.to_string(),
        (false, true) => left.to_string(),
        (false, false) => format!("{left}/{right}"),
    };
    clean_path(&joined)
}

fn clean_path(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|p| *p != "..") {
                    parts.pop();
                } else if !rooted {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }

    let body = parts.join("/");
    match (rooted, body.is_empty()) {
        (true, _) => format!("/{body}"),
        (false, true) => ".".to_string(),
        (false, false) => body,
    }
}
