use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

use super::attributes::{parse_attributes, ParsedAttribute};
use super::controls::{strip_controls, unescape_quotes};
use super::entities::normalize_entities;
use super::pattern;
use super::protocol::{is_uri_attribute, sanitize_uri};
use super::style::sanitize_style;
use super::tokenizer::{split_tag, TokenKind, Tokenizer};
use crate::policy::{Policy, PolicySpec, SchemeAllowlist, StyleAllowlist, TagRules};

/// Comments nested deeper than this are dropped.
pub const DEFAULT_MAX_COMMENT_DEPTH: usize = 8;

/// Elements whose content is dropped together with a dropped opening tag.
pub const DEFAULT_RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

const MAX_SETTLE_ROUNDS: usize = 4;

static SELF_CLOSING: LazyLock<Regex> = LazyLock::new(|| pattern(r"\s*/\s*$"));
static DASH_RUN: LazyLock<Regex> = LazyLock::new(|| pattern(r"--+"));

/// An allowlist filter for HTML fragments.
///
/// The configuration is read-only while filtering, so one `Kses` can be
/// shared between threads and reused for any number of inputs.
#[derive(Debug, Clone)]
pub struct Kses {
    policy: Cow<'static, Policy>,
    schemes: SchemeAllowlist,
    styles: StyleAllowlist,
    raw_text_elements: Vec<String>,
    max_comment_depth: usize,
}

impl Default for Kses {
    fn default() -> Self {
        Self::new(PolicySpec::None, None, None)
    }
}

impl Kses {
    /// Creates a filter. `None` allowlists fall back to
    /// [`DEFAULT_SCHEMES`](crate::policy::DEFAULT_SCHEMES) and
    /// [`DEFAULT_STYLES`](crate::policy::DEFAULT_STYLES).
    pub fn new(
        policy: impl Into<PolicySpec>,
        schemes: Option<SchemeAllowlist>,
        styles: Option<StyleAllowlist>,
    ) -> Self {
        Kses {
            policy: resolve_policy(policy.into()),
            schemes: schemes.unwrap_or_default(),
            styles: styles.unwrap_or_default(),
            raw_text_elements: DEFAULT_RAW_TEXT_ELEMENTS.iter().map(|e| e.to_string()).collect(),
            max_comment_depth: DEFAULT_MAX_COMMENT_DEPTH,
        }
    }

    pub fn with_policy(mut self, policy: impl Into<PolicySpec>) -> Self {
        self.policy = resolve_policy(policy.into());
        self
    }

    pub fn with_schemes(mut self, schemes: SchemeAllowlist) -> Self {
        self.schemes = schemes;
        self
    }

    pub fn with_styles(mut self, styles: StyleAllowlist) -> Self {
        self.styles = styles;
        self
    }

    pub fn with_max_comment_depth(mut self, depth: usize) -> Self {
        self.max_comment_depth = depth;
        self
    }

    /// Replaces the elements whose content is skipped when their opening tag
    /// is dropped.
    pub fn with_raw_text_elements<I, S>(mut self, elements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.raw_text_elements = elements
            .into_iter()
            .map(|element| element.as_ref().to_ascii_lowercase())
            .collect();
        self
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn schemes(&self) -> &SchemeAllowlist {
        &self.schemes
    }

    pub fn styles(&self) -> &StyleAllowlist {
        &self.styles
    }

    pub fn max_comment_depth(&self) -> usize {
        self.max_comment_depth
    }

    /// Filters `input`, keeping only allowed markup.
    pub fn filter(&self, input: &str) -> String {
        self.filter_at_depth(input, 0)
    }

    fn filter_at_depth(&self, input: &str, depth: usize) -> String {
        let text = normalize_entities(&strip_controls(input));
        let mut output = String::with_capacity(text.len());
        // Text runs separated only by dropped markup join up here, so the
        // entities they form are normalized together.
        let mut pending = String::new();
        let mut tokens = Tokenizer::new(&text);

        while let Some(token) = tokens.next_token() {
            let markup = match token.kind {
                TokenKind::Text => {
                    pending.push_str(token.text);
                    continue;
                }
                TokenKind::StrayGt => {
                    pending.push_str("&gt;");
                    continue;
                }
                TokenKind::Comment => self.filter_comment(&unescape_quotes(token.text), depth),
                TokenKind::Tag => self.filter_element(&unescape_quotes(token.text), &mut tokens),
            };
            if !markup.is_empty() {
                flush_text(&mut output, &mut pending);
                output.push_str(&markup);
            }
        }

        flush_text(&mut output, &mut pending);
        output
    }

    fn filter_comment(&self, token: &str, depth: usize) -> String {
        if depth >= self.max_comment_depth {
            debug!(depth, "comment dropped: nested too deep");
            return String::new();
        }

        let mut inner = token.to_string();
        while inner.contains("<!--") || inner.contains("-->") {
            inner = inner.replace("<!--", "").replace("-->", "");
        }

        let filtered = unescape_quotes(&self.filter_at_depth(&inner, depth + 1));
        let collapsed = DASH_RUN.replace_all(&filtered, "-");
        let body = collapsed.trim_matches('-');

        if body.is_empty() {
            debug!("comment dropped: empty after filtering");
            return String::new();
        }
        format!("<!--{body}-->")
    }

    fn filter_element(&self, token: &str, tokens: &mut Tokenizer<'_>) -> String {
        let Some(parts) = split_tag(token) else {
            debug!("element dropped: malformed tag");
            return String::new();
        };
        let element = parts.name.to_ascii_lowercase();

        let Some(rules) = self.policy.rules_for(&element) else {
            debug!(element = %element, closing = parts.closing, "element dropped: not allowed");
            let self_closing = SELF_CLOSING.is_match(parts.attributes);
            if !parts.closing && !self_closing && self.is_raw_text(&element) {
                let skipped = tokens.skip_raw_text(&element);
                debug!(element = %element, skipped, "raw text content dropped");
            }
            return String::new();
        };

        if parts.closing {
            return format!("</{element}>");
        }

        let slash = if SELF_CLOSING.is_match(parts.attributes) {
            " /"
        } else {
            ""
        };

        if rules.is_empty() {
            return format!("<{element}{slash}>");
        }

        let attributes = self.filter_attributes(&element, rules, parts.attributes);
        if attributes.is_empty() {
            format!("<{element}{slash}>")
        } else {
            format!("<{element} {attributes}{slash}>")
        }
    }

    fn filter_attributes(&self, element: &str, rules: &TagRules, text: &str) -> String {
        let kept: Vec<String> = parse_attributes(text, &self.schemes)
            .into_iter()
            .filter_map(|attribute| self.filter_attribute(element, rules, attribute))
            .collect();

        kept.join(" ")
    }

    fn filter_attribute(
        &self,
        element: &str,
        rules: &TagRules,
        mut attribute: ParsedAttribute,
    ) -> Option<String> {
        let name = attribute.lowercase_name();
        let Some(rule) = rules.attribute_rule(&name) else {
            trace!(element, attribute = %name, reason = "not allowed", "attribute dropped");
            return None;
        };

        attribute.value = self.settle_value(&name, attribute.value);

        if name == "style" {
            attribute.value = sanitize_style(&attribute.value, &self.styles);
            if attribute.value.is_empty() {
                trace!(element, attribute = %name, reason = "empty style", "attribute dropped");
                return None;
            }
        }

        if !rule.allows(&attribute) {
            trace!(element, attribute = %name, reason = "constraint failed", "attribute dropped");
            return None;
        }

        Some(attribute.to_string())
    }

    // Repeats the value cleanup until nothing changes.
    fn settle_value(&self, name: &str, value: String) -> String {
        let mut current = value;
        for _ in 0..MAX_SETTLE_ROUNDS {
            let cleaned = clean_value(&current);
            if cleaned == current {
                break;
            }
            current = if is_uri_attribute(name) {
                sanitize_uri(&cleaned, &self.schemes)
            } else {
                cleaned
            };
        }
        current
    }

    fn is_raw_text(&self, element: &str) -> bool {
        self.raw_text_elements.iter().any(|raw| raw == element)
    }
}

// Angle brackets never survive inside an attribute value.
fn clean_value(value: &str) -> String {
    let unbracketed = value.replace(['<', '>'], "");
    normalize_entities(&strip_controls(&unescape_quotes(&unbracketed)))
}

fn flush_text(output: &mut String, pending: &mut String) {
    if !pending.is_empty() {
        output.push_str(&normalize_entities(&strip_controls(pending)));
        pending.clear();
    }
}

fn resolve_policy(spec: PolicySpec) -> Cow<'static, Policy> {
    match spec {
        PolicySpec::None => Cow::Owned(Policy::empty()),
        PolicySpec::Preset(preset) => Cow::Borrowed(preset.policy()),
        PolicySpec::Custom(policy) => Cow::Owned(policy),
    }
}
