//! `${NAME}` and `${NAME:-fallback}` expansion in raw config text.
//!
//! Lets a deployment point `cache.dir` or `staging.dir` at a mounted volume
//! without editing the file, e.g. `dir = "${TESSERA_HOME:-/var/lib/tessera}/cache"`.

use tracing::warn;

const OPEN: &str = "${";
const FALLBACK_SEP: &str = ":-";

/// Expand placeholders from the process environment.
///
/// A variable that is unset (or empty, when a fallback is given) takes the
/// fallback; without one the placeholder is kept verbatim.
pub fn substitute_env(input: &str) -> String {
    substitute_env_with(input, |name| std::env::var(name).ok())
}

fn substitute_env_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        let after = &rest[start + OPEN.len()..];
        let Some(end) = after.find('}') else {
            // Unterminated, copy the tail untouched.
            out.push_str(&rest[start..]);
            return out;
        };

        let body = &after[..end];
        let (name, fallback) = match body.split_once(FALLBACK_SEP) {
            Some((name, fallback)) => (name, Some(fallback)),
            None => (body, None),
        };

        match (lookup(name), fallback) {
            (Some(value), Some(fallback)) if value.is_empty() => out.push_str(fallback),
            (Some(value), _) => out.push_str(&value),
            (None, Some(fallback)) => out.push_str(fallback),
            (None, None) => {
                if !name.is_empty() {
                    warn!(name, "config references an unset environment variable");
                }
                out.push_str(&rest[start..start + OPEN.len() + end + 1]);
            },
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}
