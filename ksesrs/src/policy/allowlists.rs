use std::collections::BTreeSet;

use super::presets::{DEFAULT_SCHEMES, DEFAULT_STYLES};

/// URI schemes allowed in URI-bearing attributes.
///
/// Stored lowercase; [`contains`](Self::contains) ignores ASCII case. Empty
/// names are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "Vec<String>", into = "Vec<String>"))]
pub struct SchemeAllowlist {
    schemes: BTreeSet<String>,
}

impl SchemeAllowlist {
    pub fn new<I, S>(schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let schemes = schemes
            .into_iter()
            .map(|scheme| scheme.as_ref().trim().to_ascii_lowercase())
            .filter(|scheme| !scheme.is_empty())
            .collect();
        Self { schemes }
    }

    pub fn contains(&self, scheme: &str) -> bool {
        !scheme.is_empty() && self.schemes.contains(&scheme.to_ascii_lowercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.schemes.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.schemes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemes.is_empty()
    }
}

impl Default for SchemeAllowlist {
    fn default() -> Self {
        Self::new(DEFAULT_SCHEMES)
    }
}

impl From<Vec<String>> for SchemeAllowlist {
    fn from(schemes: Vec<String>) -> Self {
        Self::new(schemes)
    }
}

impl From<SchemeAllowlist> for Vec<String> {
    fn from(allowlist: SchemeAllowlist) -> Self {
        allowlist.schemes.into_iter().collect()
    }
}

/// CSS property names allowed in `style` attributes.
///
/// Names are lowercased when the list is built; lookups are exact, so a
/// declaration written as `COLOR:red` does not match.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "Vec<String>", into = "Vec<String>"))]
pub struct StyleAllowlist {
    properties: BTreeSet<String>,
}

impl StyleAllowlist {
    pub fn new<I, S>(properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let properties = properties
            .into_iter()
            .map(|property| property.as_ref().trim().to_ascii_lowercase())
            .filter(|property| !property.is_empty())
            .collect();
        Self { properties }
    }

    pub fn contains(&self, property: &str) -> bool {
        self.properties.contains(property)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl Default for StyleAllowlist {
    fn default() -> Self {
        Self::new(DEFAULT_STYLES)
    }
}

impl From<Vec<String>> for StyleAllowlist {
    fn from(properties: Vec<String>) -> Self {
        Self::new(properties)
    }
}

impl From<StyleAllowlist> for Vec<String> {
    fn from(allowlist: StyleAllowlist) -> Self {
        allowlist.properties.into_iter().collect()
    }
}
