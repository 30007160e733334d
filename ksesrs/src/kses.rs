pub use self::attributes::{parse_attributes, AttributeList, AttributeParser, ParsedAttribute, Quote};
pub use self::controls::strip_controls;
pub use self::entities::{decode_entities, is_valid_code_point, lookup_entity, normalize_entities, ENTITIES};
pub use self::filter::{Kses, DEFAULT_MAX_COMMENT_DEPTH, DEFAULT_RAW_TEXT_ELEMENTS};
pub use self::protocol::{is_uri_attribute, sanitize_uri, MAX_PROTOCOL_ROUNDS, URI_ATTRIBUTES};
pub use self::style::sanitize_style;
pub use self::tokenizer::{split_tag, TagParts, Token, TokenKind, Tokenizer};

use regex::Regex;

mod attributes;
mod controls;
mod entities;
mod filter;
mod protocol;
mod style;
mod tokenizer;


// Every pattern in this module is a literal checked by the unit tests.
#[allow(clippy::expect_used)]
pub(crate) fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("invalid built-in pattern")
}
