//! Git error interpretation
//!
//! Turns libgit2 errors into short, user-facing reasons. Classification looks
//! at the lower-cased message first and the error class second.

use git2::{Error, ErrorClass};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    RepositoryNotFound,
    AuthenticationFailed,
    PermissionDenied,
    Network,
    Certificate,
    Ssl,
    Other,
}

fn categorize(message: &str, class: ErrorClass) -> Category {
    let contains_any = |needles: &[&str]| needles.iter().any(|n| message.contains(n));

    if contains_any(&["not found", "404", "too many redirects", "authentication replays"]) {
        Category::RepositoryNotFound
    } else if contains_any(&["authentication", "credentials"]) {
        Category::AuthenticationFailed
    } else if contains_any(&["permission denied", "access denied"]) {
        Category::PermissionDenied
    } else if contains_any(&["connection", "network", "timeout", "timed out"]) {
        Category::Network
    } else if class == ErrorClass::Http && message.contains("certificate") {
        Category::Certificate
    } else if class == ErrorClass::Http && message.contains("ssl") {
        Category::Ssl
    } else {
        Category::Other
    }
}

/// Interpret a git2 error and provide a more user-friendly message
pub fn interpret_git_error(err: &Error) -> String {
    let category = categorize(&err.message().to_lowercase(), err.class());

    match category {
        Category::RepositoryNotFound => "Repository not found".to_string(),
        Category::AuthenticationFailed => "Authentication failed".to_string(),
        Category::PermissionDenied => "Permission denied".to_string(),
        Category::Network => "Network error".to_string(),
        Category::Certificate => "Certificate error".to_string(),
        Category::Ssl => "SSL error".to_string(),
        Category::Other => match err.class() {
            ErrorClass::Http => format!("HTTP error: {}", err.message()),
            ErrorClass::Ssh => format!("SSH error: {}", err.message()),
            _ => err.message().to_string(),
        },
    }
}
