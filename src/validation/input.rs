use url::{Host, Url};

use crate::config::{Environment, ExecutionMode};

/// Strips obviously dangerous substrings from free-form input.
///
/// Removes angle brackets, `javascript:`-like schemes and inline event
/// handler prefixes, then trims surrounding whitespace. This is a
/// defense-in-depth cleanup for display contexts, not an HTML sanitizer.
///
/// # Arguments
///
/// * `text` - The raw input.
///
/// # Returns
///
/// The sanitized string.
pub fn sanitize_input(text: &str) -> String {
    let mut cleaned: String = text.chars().filter(|c| *c != '<' && *c != '>').collect();

    // Scheme and handler fragments are matched case-insensitively.
    for pattern in ["javascript:", "vbscript:", "data:text/html"] {
        cleaned = remove_case_insensitive(&cleaned, pattern);
    }

    cleaned = remove_event_handlers(&cleaned);

    cleaned.trim().to_string()
}

/// Removes every occurrence of `pattern`, repeating until no occurrence
/// remains so a removal cannot reassemble the pattern from its halves
/// (`javajavascript:script:` collapses all the way to nothing).
fn remove_case_insensitive(text: &str, pattern: &str) -> String {
    let mut current = text.to_string();
    loop {
        let stripped = strip_case_insensitive(&current, pattern);
        if stripped.len() == current.len() {
            return stripped;
        }
        current = stripped;
    }
}

fn strip_case_insensitive(text: &str, pattern: &str) -> String {
    let lower = text.to_lowercase();
    // Lowercasing can change byte length for non-ASCII input; positional
    // matching is only sound when it did not.
    if lower.len() != text.len() {
        return text.to_string();
    }

    let mut result = String::with_capacity(text.len());
    let mut i = 0;

    while i < text.len() {
        if lower[i..].starts_with(pattern) {
            i += pattern.len();
        } else {
            let ch = text[i..].chars().next().unwrap();
            result.push(ch);
            i += ch.len_utf8();
        }
    }
    result
}

/// Removes `on<word>=` inline handler substrings until none remain.
fn remove_event_handlers(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let stripped = strip_event_handlers(&current);
        if stripped.len() == current.len() {
            return stripped;
        }
        current = stripped;
    }
}

fn strip_event_handlers(text: &str) -> String {
    let lower = text.to_lowercase();
    if lower.len() != text.len() {
        return text.to_string();
    }
    let bytes = lower.as_bytes();
    let mut keep = vec![true; text.len()];
    let mut i = 0;

    while i + 2 < bytes.len() {
        if bytes[i] == b'o' && bytes[i + 1] == b'n' {
            let mut j = i + 2;
            while j < bytes.len() && bytes[j].is_ascii_alphabetic() {
                j += 1;
            }
            if j > i + 2 && j < bytes.len() && bytes[j] == b'=' {
                for k in i..=j {
                    keep[k] = false;
                }
                i = j + 1;
                continue;
            }
        }
        i += 1;
    }

    text.char_indices()
        .filter(|(idx, _)| keep[*idx])
        .map(|(_, c)| c)
        .collect()
}

/// Whether `url` parses as an absolute http/https URL.
pub fn is_valid_url(url: &str) -> bool {
    matches!(
        Url::parse(url),
        Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https"
    )
}

/// Whether `url` is safe to navigate to.
///
/// The scheme must be http/https. In production mode, loopback and
/// private-network hosts are additionally rejected.
///
/// # Arguments
///
/// * `url` - The URL to check.
/// * `environment` - The execution environment.
pub fn is_safe_url(url: &str, environment: &Environment) -> bool {
    let parsed = match Url::parse(url) {
        Ok(p) if p.scheme() == "http" || p.scheme() == "https" => p,
        _ => return false,
    };

    if environment.mode != ExecutionMode::Production {
        return true;
    }

    match parsed.host() {
        Some(Host::Ipv4(ip)) => !(ip.is_loopback() || ip.is_private() || ip.is_link_local()),
        Some(Host::Ipv6(ip)) => {
            // fc00::/7 unique-local
            !(ip.is_loopback() || (ip.segments()[0] & 0xfe00) == 0xfc00)
        }
        Some(Host::Domain(domain)) => {
            domain != "localhost" && !domain.ends_with(".localhost") && !domain.ends_with(".local")
        }
        None => false,
    }
}
