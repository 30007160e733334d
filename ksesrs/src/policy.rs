pub use self::allowlists::{SchemeAllowlist, StyleAllowlist};
pub use self::presets::{DEFAULT_SCHEMES, DEFAULT_STYLES, EXCERPT_TAGS, GLOBAL_ATTRIBUTES, POST_TAGS};
pub use self::rules::{
    is_global_attribute, AttributeRule, Constraint, Policy, PolicyPreset, PolicySpec, TagRules,
};

mod allowlists;
#[cfg(feature = "serde")]
mod config;
mod presets;
mod rules;

#[cfg(test)]
mod tests;
