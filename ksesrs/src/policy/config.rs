//! JSON policy documents.
//!
//! A policy is written as the nested table it describes:
//!
//! ```json
//! {
//!   "a":   { "href": true, "title": { "maxlen": 60 } },
//!   "img": { "src": true, "width": { "maxval": 800 }, "ismap": { "valueless": "y" } },
//!   "br":  {}
//! }
//! ```
//!
//! `true` allows an attribute as is, `false` leaves it out, and an object
//! lists constraints that must all hold.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::rules::{AttributeRule, Constraint, Policy, TagRules};
use crate::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawValue {
    Flag(bool),
    Number(u64),
    Text(String),
}

impl RawValue {
    fn as_argument(&self) -> String {
        match self {
            RawValue::Flag(flag) => flag.to_string(),
            RawValue::Number(n) => n.to_string(),
            RawValue::Text(text) => text.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawRule {
    Flag(bool),
    Constraints(BTreeMap<String, RawValue>),
}

pub(crate) type RawPolicy = BTreeMap<String, BTreeMap<String, RawRule>>;

impl RawRule {
    // `Ok(None)` for an attribute switched off with `false`.
    fn into_rule(self) -> Result<Option<AttributeRule>> {
        match self {
            RawRule::Flag(true) => Ok(Some(AttributeRule::AllowAny)),
            RawRule::Flag(false) => Ok(None),
            RawRule::Constraints(table) => table
                .iter()
                .map(|(key, value)| Constraint::from_pair(key, &value.as_argument()))
                .collect::<Result<Vec<_>>>()
                .map(|constraints| Some(AttributeRule::Constrained(constraints))),
        }
    }
}

impl From<&AttributeRule> for RawRule {
    fn from(rule: &AttributeRule) -> Self {
        match rule {
            AttributeRule::AllowAny => RawRule::Flag(true),
            AttributeRule::Constrained(constraints) => RawRule::Constraints(
                constraints
                    .iter()
                    .map(|constraint| {
                        let value = match *constraint {
                            Constraint::MaxLen(n) | Constraint::MinLen(n) => {
                                RawValue::Number(n as u64)
                            }
                            Constraint::MaxVal(n) | Constraint::MinVal(n) => RawValue::Number(n),
                            Constraint::Valueless(flag) => RawValue::Flag(flag),
                        };
                        (constraint.key().to_string(), value)
                    })
                    .collect(),
            ),
        }
    }
}

impl TryFrom<BTreeMap<String, RawRule>> for TagRules {
    type Error = Error;

    fn try_from(raw: BTreeMap<String, RawRule>) -> Result<Self> {
        let mut rules = TagRules::new();
        for (name, raw_rule) in raw {
            if let Some(rule) = raw_rule.into_rule()? {
                rules.insert(&name, rule);
            }
        }
        Ok(rules)
    }
}

impl From<&TagRules> for BTreeMap<String, RawRule> {
    fn from(rules: &TagRules) -> Self {
        rules
            .iter()
            .map(|(name, rule)| (name.to_string(), RawRule::from(rule)))
            .collect()
    }
}

impl TryFrom<RawPolicy> for Policy {
    type Error = Error;

    fn try_from(raw: RawPolicy) -> Result<Self> {
        let mut policy = Policy::empty();
        for (tag, attributes) in raw {
            policy.insert_tag(&tag, TagRules::try_from(attributes)?);
        }
        Ok(policy)
    }
}

impl From<Policy> for RawPolicy {
    fn from(policy: Policy) -> Self {
        policy
            .iter()
            .map(|(tag, rules)| (tag.to_string(), rules.into()))
            .collect()
    }
}

impl Policy {
    /// Parses a policy from its JSON table form.
    ///
    /// Syntax errors are reported as [`Error::InvalidPolicy`], unknown or
    /// malformed constraints as [`Error::InvalidConstraint`].
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawPolicy =
            serde_json::from_str(json).map_err(|e| Error::InvalidPolicy(e.to_string()))?;
        Policy::try_from(raw)
    }

    /// Renders the policy in the table form read by [`Policy::from_json`].
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&RawPolicy::from(self.clone()))
            .map_err(|e| Error::InvalidPolicy(e.to_string()))
    }
}
