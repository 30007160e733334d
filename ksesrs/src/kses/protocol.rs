//! URI scheme filtering for URI-bearing attributes.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use super::controls::strip_controls;
use super::entities::decode_entities;
use super::pattern;
use crate::policy::SchemeAllowlist;

/// Upper bound on scheme-unwrapping rounds before a value is given up on.
pub const MAX_PROTOCOL_ROUNDS: usize = 6;

/// Attributes whose values are treated as URIs.
pub const URI_ATTRIBUTES: &[&str] = &[
    "src", "href", "cite", "data", "xmlns", "profile", "classid", "usemap", "codebase",
    "longdesc", "action",
];

// Name-like run (letters, digits, whitespace, entity references) followed by
// a colon written literally or as a character reference.
static SCHEME_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"^((?:&[^;]*;|[\sA-Za-z0-9])*)(?::|&#0*58;|&#[Xx]0*3[Aa];)\s*")
});

const SOFT_HYPHEN: char = '\u{AD}';

/// Returns `true` if `name` is one of [`URI_ATTRIBUTES`] (ASCII case insensitive).
pub fn is_uri_attribute(name: &str) -> bool {
    URI_ATTRIBUTES.iter().any(|uri| uri.eq_ignore_ascii_case(name))
}

fn canonical_scheme(raw: &str) -> String {
    let decoded = decode_entities(raw);
    strip_controls(&decoded)
        .chars()
        .filter(|ch| !ch.is_whitespace() && *ch != SOFT_HYPHEN)
        .flat_map(char::to_lowercase)
        .collect()
}

/// Validates the scheme of a URI value against `schemes`.
///
/// Each round peels one (possibly entity-obfuscated) scheme prefix and
/// rewrites it as a canonical lowercase `scheme:`; the rest of the URI is
/// kept. A prefix naming a scheme outside the allowlist empties the value, as
/// does a value that is still changing after [`MAX_PROTOCOL_ROUNDS`] rounds.
/// Values without a scheme (relative references) pass through.
pub fn sanitize_uri(value: &str, schemes: &SchemeAllowlist) -> String {
    let mut current: String = strip_controls(value)
        .chars()
        .filter(|&ch| ch != SOFT_HYPHEN)
        .collect();

    for _ in 0..MAX_PROTOCOL_ROUNDS {
        let Some(caps) = SCHEME_PREFIX.captures(&current) else {
            return current;
        };
        let consumed = caps.get(0).map_or(0, |m| m.end());
        let scheme = canonical_scheme(caps.get(1).map_or("", |m| m.as_str()));

        if !schemes.contains(&scheme) {
            trace!(scheme = %scheme, "uri scheme not allowed");
            return String::new();
        }

        let next = format!("{scheme}:{}", &current[consumed..]);
        if next == current {
            return current;
        }
        current = next;
    }

    trace!("uri scheme did not settle");
    String::new()
}
