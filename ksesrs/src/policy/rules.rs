use core::fmt;
use core::str::FromStr;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use super::presets::{EXCERPT_TAGS, GLOBAL_ATTRIBUTES, POST_TAGS};
use crate::kses::ParsedAttribute;
use crate::Error;

/// A single named check on an attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// At most `n` characters.
    MaxLen(usize),
    /// At least `n` characters.
    MinLen(usize),
    /// A small unsigned integer (up to six digits) no larger than `n`.
    MaxVal(u64),
    /// A small unsigned integer (up to six digits) no smaller than `n`.
    MinVal(u64),
    /// `Valueless(true)` requires a bare attribute; `false` requires nothing.
    Valueless(bool),
}

impl Constraint {
    /// Builds a constraint from its configuration key (`maxlen`, `minlen`,
    /// `maxval`, `minval`, `valueless`) and textual argument.
    pub fn from_pair(key: &str, argument: &str) -> Result<Self, Error> {
        let invalid = |reason: &str| Error::InvalidConstraint {
            constraint: key.to_string(),
            reason: reason.to_string(),
        };
        let argument = argument.trim();

        match key.to_ascii_lowercase().as_str() {
            "maxlen" => argument
                .parse()
                .map(Constraint::MaxLen)
                .map_err(|_| invalid("expected a non-negative integer")),
            "minlen" => argument
                .parse()
                .map(Constraint::MinLen)
                .map_err(|_| invalid("expected a non-negative integer")),
            "maxval" => argument
                .parse()
                .map(Constraint::MaxVal)
                .map_err(|_| invalid("expected a non-negative integer")),
            "minval" => argument
                .parse()
                .map(Constraint::MinVal)
                .map_err(|_| invalid("expected a non-negative integer")),
            "valueless" => match argument.to_ascii_lowercase().as_str() {
                "y" | "yes" | "true" | "1" => Ok(Constraint::Valueless(true)),
                "n" | "no" | "false" | "0" => Ok(Constraint::Valueless(false)),
                _ => Err(invalid("expected y/n or a boolean")),
            },
            _ => Err(invalid("unknown constraint")),
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Constraint::MaxLen(_) => "maxlen",
            Constraint::MinLen(_) => "minlen",
            Constraint::MaxVal(_) => "maxval",
            Constraint::MinVal(_) => "minval",
            Constraint::Valueless(_) => "valueless",
        }
    }

    pub fn check(&self, attribute: &ParsedAttribute) -> bool {
        let value = attribute.value.as_str();
        match *self {
            Constraint::MaxLen(max) => value.chars().count() <= max,
            Constraint::MinLen(min) => value.chars().count() >= min,
            Constraint::MaxVal(max) => small_number(value).is_some_and(|n| n <= max),
            Constraint::MinVal(min) => small_number(value).is_some_and(|n| n >= min),
            Constraint::Valueless(required) => !required || attribute.valueless,
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::MaxLen(n) | Constraint::MinLen(n) => write!(f, "{}({})", self.key(), n),
            Constraint::MaxVal(n) | Constraint::MinVal(n) => write!(f, "{}({})", self.key(), n),
            Constraint::Valueless(b) => write!(f, "{}({})", self.key(), b),
        }
    }
}

// Up to six ASCII whitespace, one to six digits, up to six ASCII whitespace.
fn small_number(value: &str) -> Option<u64> {
    let is_white = |ch: char| ch.is_ascii_whitespace();
    let body = value.trim_start_matches(is_white);
    let leading = value.len() - body.len();
    let digits = body.trim_end_matches(is_white);
    let trailing = body.len() - digits.len();

    if leading > 6 || trailing > 6 || digits.is_empty() || digits.len() > 6 {
        return None;
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// What a tag allows for one attribute name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AttributeRule {
    /// Keep the value as parsed (after URI and style filtering).
    #[default]
    AllowAny,
    /// Keep the attribute only if every constraint holds.
    Constrained(Vec<Constraint>),
}

static ALLOW_ANY: AttributeRule = AttributeRule::AllowAny;

impl AttributeRule {
    pub fn constrained(constraints: impl IntoIterator<Item = Constraint>) -> Self {
        AttributeRule::Constrained(constraints.into_iter().collect())
    }

    pub fn allows(&self, attribute: &ParsedAttribute) -> bool {
        match self {
            AttributeRule::AllowAny => true,
            AttributeRule::Constrained(constraints) => constraints.iter().all(|c| c.check(attribute)),
        }
    }
}

/// Returns `true` for the attributes allowed on any tag with attribute rules.
pub fn is_global_attribute(name: &str) -> bool {
    GLOBAL_ATTRIBUTES.iter().any(|global| global.eq_ignore_ascii_case(name))
}

/// Attribute rules of one allowed tag, keyed by lowercase attribute name.
///
/// An empty rule set allows the tag itself but strips every attribute,
/// including the global ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagRules {
    attributes: BTreeMap<String, AttributeRule>,
}

impl TagRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allows `names` without constraints.
    pub fn allowing<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rules = Self::new();
        for name in names {
            rules.insert(name.as_ref(), AttributeRule::AllowAny);
        }
        rules
    }

    pub fn with(mut self, name: &str, rule: AttributeRule) -> Self {
        self.insert(name, rule);
        self
    }

    pub fn insert(&mut self, name: &str, rule: AttributeRule) {
        self.attributes.insert(name.to_ascii_lowercase(), rule);
    }

    pub fn get(&self, name: &str) -> Option<&AttributeRule> {
        self.attributes.get(name)
    }

    /// Resolves the rule for a lowercase attribute name: the tag's own rule
    /// first, then the global attributes.
    pub fn attribute_rule(&self, name: &str) -> Option<&AttributeRule> {
        self.attributes
            .get(name)
            .or_else(|| is_global_attribute(name).then_some(&ALLOW_ANY))
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeRule)> {
        self.attributes.iter().map(|(name, rule)| (name.as_str(), rule))
    }
}

/// The tag allowlist: lowercase tag name to its attribute rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Policy {
    tags: BTreeMap<String, TagRules>,
}

impl Policy {
    /// A policy allowing no tags at all.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_tag(mut self, name: &str, rules: TagRules) -> Self {
        self.insert_tag(name, rules);
        self
    }

    pub fn insert_tag(&mut self, name: &str, rules: TagRules) {
        self.tags.insert(name.to_ascii_lowercase(), rules);
    }

    /// Rules for a lowercase tag name, `None` if the tag is not allowed.
    pub fn rules_for(&self, name: &str) -> Option<&TagRules> {
        self.tags.get(name)
    }

    pub fn allows_tag(&self, name: &str) -> bool {
        self.tags.contains_key(&name.to_ascii_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagRules)> {
        self.tags.iter().map(|(name, rules)| (name.as_str(), rules))
    }

    fn from_table(table: &[(&str, &[&str])]) -> Self {
        table.iter().fold(Self::empty(), |policy, &(tag, attributes)| {
            policy.with_tag(tag, TagRules::allowing(attributes))
        })
    }
}

impl FromIterator<(String, TagRules)> for Policy {
    fn from_iter<I: IntoIterator<Item = (String, TagRules)>>(iter: I) -> Self {
        let mut policy = Self::empty();
        for (name, rules) in iter {
            policy.insert_tag(&name, rules);
        }
        policy
    }
}

static POST_POLICY: LazyLock<Policy> = LazyLock::new(|| Policy::from_table(POST_TAGS));
static EXCERPT_POLICY: LazyLock<Policy> = LazyLock::new(|| Policy::from_table(EXCERPT_TAGS));

/// The built-in named policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyPreset {
    /// Full article body markup.
    Post,
    /// Minimal inline markup.
    Excerpt,
}

impl PolicyPreset {
    pub fn policy(self) -> &'static Policy {
        match self {
            PolicyPreset::Post => &*POST_POLICY,
            PolicyPreset::Excerpt => &*EXCERPT_POLICY,
        }
    }
}

impl fmt::Display for PolicyPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyPreset::Post => write!(f, "post"),
            PolicyPreset::Excerpt => write!(f, "excerpt"),
        }
    }
}

impl FromStr for PolicyPreset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "post" => Ok(PolicyPreset::Post),
            "excerpt" => Ok(PolicyPreset::Excerpt),
            _ => Err(Error::UnknownPreset(s.to_string())),
        }
    }
}

/// Which policy a filter runs with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PolicySpec {
    /// No tags allowed: all markup is stripped.
    #[default]
    None,
    Preset(PolicyPreset),
    Custom(Policy),
}

impl PolicySpec {
    pub fn into_policy(self) -> Policy {
        match self {
            PolicySpec::None => Policy::empty(),
            PolicySpec::Preset(preset) => preset.policy().clone(),
            PolicySpec::Custom(policy) => policy,
        }
    }
}

impl From<PolicyPreset> for PolicySpec {
    fn from(preset: PolicyPreset) -> Self {
        PolicySpec::Preset(preset)
    }
}

impl From<Policy> for PolicySpec {
    fn from(policy: Policy) -> Self {
        PolicySpec::Custom(policy)
    }
}

impl<T: Into<PolicySpec>> From<Option<T>> for PolicySpec {
    fn from(policy: Option<T>) -> Self {
        policy.map_or(PolicySpec::None, Into::into)
    }
}
