use core::fmt;

use super::protocol::{is_uri_attribute, sanitize_uri};
use crate::policy::SchemeAllowlist;

#[cfg(feature = "smallvec")]
pub type AttributeList = smallvec::SmallVec<[ParsedAttribute; 8]>;
#[cfg(not(feature = "smallvec"))]
pub type AttributeList = Vec<ParsedAttribute>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    Double,
    Single,
}

impl Quote {
    pub fn as_char(self) -> char {
        match self {
            Quote::Double => '"',
            Quote::Single => '\'',
        }
    }
}

/// One attribute as written in the source tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAttribute {
    /// Name as written (not case folded).
    pub name: String,
    /// Unquoted value. URI attributes carry the scheme-filtered value.
    pub value: String,
    /// The original `name=value` text.
    pub whole: String,
    pub valueless: bool,
    pub quote: Option<Quote>,
}

impl ParsedAttribute {
    fn bare(name: &str) -> Self {
        Self {
            name: name.to_string(),
            value: String::new(),
            whole: name.to_string(),
            valueless: true,
            quote: None,
        }
    }

    pub fn lowercase_name(&self) -> String {
        self.name.to_ascii_lowercase()
    }
}

/// Serializes as `name`, `name=value` or `name="value"` with the original quote.
impl fmt::Display for ParsedAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.lowercase_name();
        if self.valueless {
            return write!(f, "{name}");
        }
        match self.quote {
            Some(quote) => {
                let q = quote.as_char();
                write!(f, "{name}={q}{}{q}", self.value)
            }
            None if self.value.is_empty() => write!(f, "{name}=\"\""),
            None => write!(f, "{name}={}", self.value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrState {
    Name,
    Equals,
    Value,
}

/// Tokenizes the attribute part of a tag (`href="x" title=y checked`).
///
/// Malformed input never aborts the parse: the offending run is skipped up to
/// the next whitespace boundary (quoted runs are skipped as a unit) and
/// parsing resumes with the next name. The first occurrence of a name wins.
pub struct AttributeParser<'a> {
    s: &'a [u8],
    text: &'a str,
    pos: usize,
    state: AttrState,
    name_start: usize,
    name_end: usize,
    schemes: &'a SchemeAllowlist,
}

impl<'a> AttributeParser<'a> {
    pub fn new(text: &'a str, schemes: &'a SchemeAllowlist) -> Self {
        AttributeParser {
            s: text.as_bytes(),
            text,
            pos: 0,
            state: AttrState::Name,
            name_start: 0,
            name_end: 0,
            schemes,
        }
    }

    pub fn parse(mut self) -> AttributeList {
        let mut attributes = AttributeList::new();

        while self.pos < self.s.len() {
            let ok = match self.state {
                AttrState::Name => self.state_name(),
                AttrState::Equals => self.state_equals(&mut attributes),
                AttrState::Value => self.state_value(&mut attributes),
            };
            if !ok {
                self.state = AttrState::Name;
                self.skip_to_boundary();
            }
        }

        // A bare name at the very end has no trailing whitespace to end it.
        if self.state == AttrState::Equals {
            let name = self.current_name();
            Self::record(&mut attributes, ParsedAttribute::bare(name));
        }

        attributes
    }

    fn current_name(&self) -> &'a str {
        &self.text[self.name_start..self.name_end]
    }

    fn is_white(ch: u8) -> bool {
        ch.is_ascii_whitespace()
    }

    fn is_name_char(ch: u8) -> bool {
        ch.is_ascii_alphabetic() || ch == b'-' || ch == b':'
    }

    fn skip_white(&mut self) -> usize {
        let start = self.pos;
        while self.pos < self.s.len() && Self::is_white(self.s[self.pos]) {
            self.pos += 1;
        }
        self.pos - start
    }

    fn find_byte(&self, byte: u8, start: usize) -> Option<usize> {
        self.s[start..].iter().position(|&ch| ch == byte).map(|i| start + i)
    }

    fn record(attributes: &mut AttributeList, attribute: ParsedAttribute) {
        let exists = attributes
            .iter()
            .any(|seen| seen.name.eq_ignore_ascii_case(&attribute.name));
        if !exists {
            attributes.push(attribute);
        }
    }

    fn state_name(&mut self) -> bool {
        let start = self.pos;
        while self.pos < self.s.len() && Self::is_name_char(self.s[self.pos]) {
            self.pos += 1;
        }
        if self.pos == start {
            return false;
        }
        self.name_start = start;
        self.name_end = self.pos;
        self.state = AttrState::Equals;
        true
    }

    fn state_equals(&mut self, attributes: &mut AttributeList) -> bool {
        let start = self.pos;
        self.skip_white();
        if self.pos < self.s.len() && self.s[self.pos] == b'=' {
            self.pos += 1;
            self.skip_white();
            self.state = AttrState::Value;
            return true;
        }
        if self.pos > start {
            let name = self.current_name();
            Self::record(attributes, ParsedAttribute::bare(name));
            self.state = AttrState::Name;
            return true;
        }
        false
    }

    fn state_value(&mut self, attributes: &mut AttributeList) -> bool {
        let start = self.pos;
        let (value_start, value_end, end, quote) = match self.s[start] {
            b'"' | b'\'' => {
                let quote_char = self.s[start];
                let Some(close) = self.find_byte(quote_char, start + 1) else {
                    return false;
                };
                let quote = if quote_char == b'"' {
                    Quote::Double
                } else {
                    Quote::Single
                };
                (start + 1, close, close + 1, Some(quote))
            }
            _ => {
                let mut end = start;
                while end < self.s.len()
                    && !matches!(self.s[end], b'"' | b'\'')
                    && !Self::is_white(self.s[end])
                {
                    end += 1;
                }
                if end == start {
                    return false;
                }
                (start, end, end, None)
            }
        };

        // The value must be followed by whitespace or the end of the text.
        if end < self.s.len() && !Self::is_white(self.s[end]) {
            return false;
        }
        self.pos = end;
        self.skip_white();

        let name = self.current_name();
        let raw_value = &self.text[value_start..value_end];
        let value = if is_uri_attribute(name) {
            sanitize_uri(raw_value, self.schemes)
        } else {
            raw_value.to_string()
        };
        Self::record(
            attributes,
            ParsedAttribute {
                name: name.to_string(),
                value,
                whole: format!("{name}={}", &self.text[start..end]),
                valueless: false,
                quote,
            },
        );
        self.state = AttrState::Name;
        true
    }

    // Error recovery: skip quoted runs and non-whitespace, then whitespace.
    fn skip_to_boundary(&mut self) {
        while self.pos < self.s.len() {
            match self.s[self.pos] {
                quote @ (b'"' | b'\'') => {
                    self.pos = self
                        .find_byte(quote, self.pos + 1)
                        .map_or(self.s.len(), |close| close + 1);
                }
                ch if Self::is_white(ch) => break,
                _ => self.pos += 1,
            }
        }
        self.skip_white();
    }
}

/// Parses `text` with [`AttributeParser`].
pub fn parse_attributes(text: &str, schemes: &SchemeAllowlist) -> AttributeList {
    AttributeParser::new(text, schemes).parse()
}
