use std::sync::LazyLock;

use regex::Regex;

use super::pattern;

static BACKSLASH_ZERO: LazyLock<Regex> = LazyLock::new(|| pattern(r"\\+0+"));

// Tab, LF and CR survive; every other C0 control is removed.
fn is_stripped_control(ch: char) -> bool {
    matches!(ch, '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}')
}

/// Removes C0 control characters (except tab, LF, CR) and `\0`-style
/// backslash-zero escapes.
pub fn strip_controls(text: &str) -> String {
    let cleaned: String = text.chars().filter(|&ch| !is_stripped_control(ch)).collect();
    BACKSLASH_ZERO.replace_all(&cleaned, "").into_owned()
}

/// Turns `\"` back into `"` inside a markup token, until none is left.
pub fn unescape_quotes(token: &str) -> String {
    let mut current = token.to_string();
    while current.contains("\\\"") {
        current = current.replace("\\\"", "\"");
    }
    current
}
