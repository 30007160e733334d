#![doc = include_str!("../README.md")]
//!
//! ## API Guide
//!
//! ### For End Users
//!
//! Most applications need a single call:
//!
//! - [`sanitize`] - Filter a string against a preset or custom policy
//! - [`kses()`] - The same function under its traditional name
//! - [`version`] - Library version information
//!
//! A policy is either one of the [`PolicyPreset`]s, a custom [`Policy`], or
//! nothing at all, in which case every tag is stripped.
//!
//! ### For Repeated Filtering
//!
//! [`Kses`] holds a resolved configuration and can be reused (and shared
//! between threads) for any number of inputs:
//!
//! ```
//! use ksesrs::{Kses, PolicyPreset};
//!
//! let kses = Kses::new(PolicyPreset::Excerpt, None, None).with_max_comment_depth(0);
//! assert_eq!(kses.filter("<em>hi</em><!-- x -->"), "<em>hi</em>");
//! ```
//!
//! ### For Debugging
//!
//! The filter stages are public in [`kses`](mod@kses): the [`Tokenizer`], the
//! [`AttributeParser`], [`normalize_entities`], [`sanitize_uri`] and
//! [`sanitize_style`]. They are useful for understanding why a piece of
//! markup was rewritten or dropped. The library logs its decisions through
//! `tracing` at `debug` and `trace` level.

use thiserror::Error;

pub mod kses;
pub mod policy;


pub use kses::{
    normalize_entities, sanitize_style, sanitize_uri, AttributeParser, Kses, ParsedAttribute,
    TokenKind, Tokenizer,
};
pub use policy::{
    AttributeRule, Constraint, Policy, PolicyPreset, PolicySpec, SchemeAllowlist, StyleAllowlist,
    TagRules,
};

/// Errors raised while building a filter configuration.
///
/// Filtering itself never fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("unknown policy preset `{0}` (expected `post` or `excerpt`)")]
    UnknownPreset(String),
    #[error("invalid constraint `{constraint}`: {reason}")]
    InvalidConstraint { constraint: String, reason: String },
    #[error("invalid policy: {0}")]
    InvalidPolicy(String),
}

pub type Result<T> = core::result::Result<T, Error>;

/// Filters `input` so that only the markup allowed by `policy` survives.
///
/// `schemes` and `styles` default to [`policy::DEFAULT_SCHEMES`] and
/// [`policy::DEFAULT_STYLES`] when `None`. Tags outside the policy are
/// removed, attributes outside the tag's rules are removed, URI values with a
/// disallowed scheme are emptied and style declarations outside the style
/// allowlist are dropped.
///
/// # Examples
///
/// ```
/// use ksesrs::{sanitize, PolicyPreset, PolicySpec};
///
/// assert_eq!(
///     sanitize("<b>ok</b><script>bad()</script>", PolicyPreset::Post, None, None),
///     "<b>ok</b>"
/// );
/// assert_eq!(
///     sanitize(r#"<a href="javascript:alert(1)">x</a>"#, PolicyPreset::Post, None, None),
///     r#"<a href="">x</a>"#
/// );
/// assert_eq!(sanitize("<p>text</p>", PolicySpec::None, None, None), "text");
/// ```
pub fn sanitize(
    input: &str,
    policy: impl Into<PolicySpec>,
    schemes: Option<SchemeAllowlist>,
    styles: Option<StyleAllowlist>,
) -> String {
    Kses::new(policy, schemes, styles).filter(input)
}

/// Alias of [`sanitize`].
pub fn kses(
    input: &str,
    policy: impl Into<PolicySpec>,
    schemes: Option<SchemeAllowlist>,
    styles: Option<StyleAllowlist>,
) -> String {
    sanitize(input, policy, schemes, styles)
}

/// Returns the version of the ksesrs library.
///
/// # Examples
///
/// ```
/// use ksesrs::version;
///
/// println!("ksesrs version: {}", version());
/// ```
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
