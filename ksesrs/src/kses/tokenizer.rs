use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Literal text, passed through unchanged.
    Text,
    /// `<!-- ... -->`, or `<!--` up to the end of input.
    Comment,
    /// `<...>`, or `<` up to the end of input.
    Tag,
    /// A `>` with no opening `<`.
    StrayGt,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Text => "TEXT",
            TokenKind::Comment => "COMMENT",
            TokenKind::Tag => "TAG",
            TokenKind::StrayGt => "STRAY_GT",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

/// Splits markup into comment, tag and text runs.
pub struct Tokenizer<'a> {
    s: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Tokenizer { s: input, pos: 0 }
    }

    fn find_from(&self, needle: &str, start: usize) -> Option<usize> {
        self.s[start..].find(needle).map(|i| start + i)
    }

    fn emit(&mut self, kind: TokenKind, end: usize) -> Token<'a> {
        let token = Token {
            kind,
            text: &self.s[self.pos..end],
        };
        self.pos = end;
        token
    }

    pub fn next_token(&mut self) -> Option<Token<'a>> {
        let rest = self.s.get(self.pos..)?;
        if rest.is_empty() {
            return None;
        }

        if rest.starts_with("<!--") {
            let end = self
                .find_from("-->", self.pos + 4)
                .map_or(self.s.len(), |i| i + 3);
            return Some(self.emit(TokenKind::Comment, end));
        }

        match rest.as_bytes()[0] {
            b'<' => {
                let end = self.find_from(">", self.pos + 1).map_or(self.s.len(), |i| i + 1);
                Some(self.emit(TokenKind::Tag, end))
            }
            b'>' => Some(self.emit(TokenKind::StrayGt, self.pos + 1)),
            _ => {
                let end = rest
                    .find(['<', '>'])
                    .map_or(self.s.len(), |i| self.pos + i);
                Some(self.emit(TokenKind::Text, end))
            }
        }
    }

    /// Skips the raw-text content of `element` (as for `<script>`), up to and
    /// including its closing tag, or to the end of input. Returns the number of
    /// bytes skipped.
    pub fn skip_raw_text(&mut self, element: &str) -> usize {
        let start = self.pos;
        let bytes = self.s.as_bytes();
        let name = element.as_bytes();
        let mut i = self.pos;

        while let Some(lt) = bytes[i..].iter().position(|&b| b == b'<').map(|p| i + p) {
            let name_start = lt + 2;
            let name_end = name_start + name.len();
            let is_close = bytes.get(lt + 1) == Some(&b'/')
                && bytes
                    .get(name_start..name_end)
                    .is_some_and(|candidate| candidate.eq_ignore_ascii_case(name))
                && bytes
                    .get(name_end)
                    .map_or(true, |&b| b == b'>' || b == b'/' || b.is_ascii_whitespace());
            if is_close {
                self.pos = self.find_from(">", name_end).map_or(self.s.len(), |gt| gt + 1);
                return self.pos - start;
            }
            i = lt + 1;
        }

        self.pos = self.s.len();
        self.pos - start
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// The structural parts of a tag token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagParts<'a> {
    pub closing: bool,
    pub name: &'a str,
    pub attributes: &'a str,
}

/// Splits `<` `\s*` `(/\s*)?` `name` `attributes` `>?` where the name is ASCII
/// alphanumeric. Returns `None` for anything else.
pub fn split_tag(token: &str) -> Option<TagParts<'_>> {
    let inner = token.strip_prefix('<')?;
    let inner = inner.strip_suffix('>').unwrap_or(inner);
    if inner.contains('>') {
        return None;
    }

    let inner = inner.trim_start_matches(|ch: char| ch.is_ascii_whitespace());
    let (closing, inner) = match inner.strip_prefix('/') {
        Some(after) => (true, after.trim_start_matches(|ch: char| ch.is_ascii_whitespace())),
        None => (false, inner),
    };

    let name_len = inner
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric())
        .count();
    if name_len == 0 {
        return None;
    }

    Some(TagParts {
        closing,
        name: &inner[..name_len],
        attributes: &inner[name_len..],
    })
}
