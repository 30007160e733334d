#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use super::*;
use crate::kses::ParsedAttribute;
use crate::Error;

fn attribute(name: &str, value: &str) -> ParsedAttribute {
    ParsedAttribute {
        name: name.to_string(),
        value: value.to_string(),
        whole: format!("{name}=\"{value}\""),
        valueless: false,
        quote: Some(crate::kses::Quote::Double),
    }
}

fn bare(name: &str) -> ParsedAttribute {
    ParsedAttribute {
        name: name.to_string(),
        value: String::new(),
        whole: name.to_string(),
        valueless: true,
        quote: None,
    }
}

#[test]
fn test_length_constraints_count_characters() {
    assert!(Constraint::MaxLen(3).check(&attribute("title", "\u{e9}\u{e9}\u{e9}")));
    assert!(!Constraint::MaxLen(3).check(&attribute("title", "abcd")));
    assert!(Constraint::MinLen(2).check(&attribute("title", "ab")));
    assert!(!Constraint::MinLen(2).check(&attribute("title", "a")));
}

#[test]
fn test_value_constraints_need_small_numbers() {
    assert!(Constraint::MaxVal(10).check(&attribute("width", "10")));
    assert!(Constraint::MaxVal(10).check(&attribute("width", "  7 ")));
    assert!(!Constraint::MaxVal(10).check(&attribute("width", "20")));
    assert!(!Constraint::MaxVal(10).check(&attribute("width", "5px")));
    assert!(!Constraint::MaxVal(10).check(&attribute("width", "-1")));
    assert!(!Constraint::MaxVal(10).check(&attribute("width", "")));
    assert!(!Constraint::MaxVal(u64::MAX).check(&attribute("width", "1234567")));
    assert!(!Constraint::MaxVal(10).check(&attribute("width", "       1")));
    assert!(Constraint::MinVal(1).check(&attribute("border", "1")));
    assert!(!Constraint::MinVal(1).check(&attribute("border", "0")));
}

#[test]
fn test_valueless_constraint() {
    assert!(Constraint::Valueless(true).check(&bare("checked")));
    assert!(!Constraint::Valueless(true).check(&attribute("checked", "x")));
    assert!(Constraint::Valueless(false).check(&attribute("checked", "x")));
    assert!(Constraint::Valueless(false).check(&bare("checked")));
}

#[test]
fn test_constraint_from_pair() {
    assert_eq!(Constraint::from_pair("maxlen", "10").unwrap(), Constraint::MaxLen(10));
    assert_eq!(Constraint::from_pair("MinVal", " 2 ").unwrap(), Constraint::MinVal(2));
    assert_eq!(Constraint::from_pair("valueless", "y").unwrap(), Constraint::Valueless(true));
    assert_eq!(Constraint::from_pair("valueless", "N").unwrap(), Constraint::Valueless(false));

    match Constraint::from_pair("maxsize", "1") {
        Err(Error::InvalidConstraint { constraint, .. }) => assert_eq!(constraint, "maxsize"),
        other => panic!("unexpected {other:?}"),
    }
    assert!(Constraint::from_pair("maxlen", "ten").is_err());
    assert!(Constraint::from_pair("valueless", "maybe").is_err());
}

#[test]
fn test_constraint_display() {
    assert_eq!(Constraint::MaxLen(10).to_string(), "maxlen(10)");
    assert_eq!(Constraint::Valueless(true).to_string(), "valueless(true)");
}

#[test]
fn test_rule_requires_every_constraint() {
    let rule = AttributeRule::constrained([Constraint::MinLen(2), Constraint::MaxLen(4)]);
    assert!(rule.allows(&attribute("title", "abc")));
    assert!(!rule.allows(&attribute("title", "a")));
    assert!(!rule.allows(&attribute("title", "abcde")));
    assert!(AttributeRule::AllowAny.allows(&bare("x")));
}

#[test]
fn test_tag_rules_fall_back_to_globals() {
    let rules = TagRules::allowing(["HREF"]);
    assert_eq!(rules.attribute_rule("href"), Some(&AttributeRule::AllowAny));
    assert_eq!(rules.attribute_rule("class"), Some(&AttributeRule::AllowAny));
    assert_eq!(rules.attribute_rule("onclick"), None);

    let constrained = TagRules::new().with("id", AttributeRule::constrained([Constraint::MaxLen(2)]));
    assert_eq!(
        constrained.attribute_rule("id"),
        Some(&AttributeRule::Constrained(vec![Constraint::MaxLen(2)]))
    );
}

#[test]
fn test_policy_lookup() {
    let policy = Policy::empty()
        .with_tag("B", TagRules::new())
        .with_tag("a", TagRules::allowing(["href"]));
    assert!(policy.allows_tag("b"));
    assert!(policy.allows_tag("A"));
    assert!(!policy.allows_tag("script"));
    assert_eq!(policy.len(), 2);
    assert!(policy.rules_for("b").is_some_and(TagRules::is_empty));
}

#[test]
fn test_presets() {
    let post = PolicyPreset::Post.policy();
    assert!(post.allows_tag("a"));
    assert!(post.allows_tag("table"));
    assert!(!post.allows_tag("script"));
    assert!(!post.allows_tag("iframe"));
    assert!(post
        .rules_for("a")
        .and_then(|rules| rules.get("href"))
        .is_some());

    let excerpt = PolicyPreset::Excerpt.policy();
    assert!(excerpt.allows_tag("strong"));
    assert!(!excerpt.allows_tag("img"));
    assert!(excerpt.len() < post.len());
}

#[test]
fn test_preset_names() {
    assert_eq!("post".parse::<PolicyPreset>().unwrap(), PolicyPreset::Post);
    assert_eq!("Excerpt".parse::<PolicyPreset>().unwrap(), PolicyPreset::Excerpt);
    assert_eq!(PolicyPreset::Excerpt.to_string(), "excerpt");
    assert!(matches!(
        "comment".parse::<PolicyPreset>(),
        Err(Error::UnknownPreset(name)) if name == "comment"
    ));
}

#[test]
fn test_policy_spec_conversions() {
    assert_eq!(PolicySpec::from(PolicyPreset::Post), PolicySpec::Preset(PolicyPreset::Post));
    assert_eq!(PolicySpec::from(None::<PolicyPreset>), PolicySpec::None);
    assert_eq!(PolicySpec::from(Some(PolicyPreset::Excerpt)), PolicySpec::Preset(PolicyPreset::Excerpt));
    assert!(PolicySpec::None.into_policy().is_empty());
    assert_eq!(PolicySpec::from(PolicyPreset::Post).into_policy(), *PolicyPreset::Post.policy());
}

#[test]
fn test_scheme_allowlist() {
    let schemes = SchemeAllowlist::default();
    assert!(schemes.contains("http"));
    assert!(schemes.contains("HTTPS"));
    assert!(!schemes.contains("javascript"));
    assert!(!schemes.contains(""));

    let custom = SchemeAllowlist::new(["Gopher", " ", ""]);
    assert_eq!(custom.len(), 1);
    assert!(custom.contains("gopher"));
}

#[test]
fn test_style_allowlist() {
    let styles = StyleAllowlist::default();
    assert!(styles.contains("color"));
    assert!(styles.contains("background-attachment"));
    assert!(!styles.contains("COLOR"));
    assert!(!styles.contains("position: fixed"));

    let custom = StyleAllowlist::new(["Opacity"]);
    assert!(custom.contains("opacity"));
    assert!(!custom.contains("Opacity"));
}

#[cfg(feature = "serde")]
mod config {
    use super::*;

    #[test]
    fn test_policy_from_json() {
        let policy = Policy::from_json(
            r#"{
                "A": {"HREF": true, "onclick": false, "title": {"maxlen": 5}},
                "img": {"ismap": {"valueless": "y"}, "width": {"maxval": "800"}},
                "br": {}
            }"#,
        )
        .unwrap();

        assert_eq!(policy.len(), 3);
        let a = policy.rules_for("a").unwrap();
        assert_eq!(a.get("href"), Some(&AttributeRule::AllowAny));
        assert_eq!(a.get("onclick"), None);
        assert_eq!(
            a.get("title"),
            Some(&AttributeRule::Constrained(vec![Constraint::MaxLen(5)]))
        );
        let img = policy.rules_for("img").unwrap();
        assert_eq!(
            img.get("ismap"),
            Some(&AttributeRule::Constrained(vec![Constraint::Valueless(true)]))
        );
        assert_eq!(
            img.get("width"),
            Some(&AttributeRule::Constrained(vec![Constraint::MaxVal(800)]))
        );
        assert!(policy.rules_for("br").unwrap().is_empty());
    }

    #[test]
    fn test_policy_json_errors() {
        assert!(matches!(Policy::from_json("{"), Err(Error::InvalidPolicy(_))));
        assert!(matches!(
            Policy::from_json(r#"{"b": ["title"]}"#),
            Err(Error::InvalidPolicy(_))
        ));
        assert!(matches!(
            Policy::from_json(r#"{"b": {"title": {"pattern": ".*"}}}"#),
            Err(Error::InvalidConstraint { .. })
        ));
    }

    #[test]
    fn test_policy_json_round_trip_of_preset() {
        let json = PolicyPreset::Excerpt.policy().to_json().unwrap();
        assert_eq!(Policy::from_json(&json).unwrap(), *PolicyPreset::Excerpt.policy());
    }

    #[test]
    fn test_allowlists_deserialize_from_lists() {
        let schemes: SchemeAllowlist = serde_json::from_str(r#"["HTTP", "ftp"]"#).unwrap();
        assert!(schemes.contains("http"));
        assert_eq!(schemes.len(), 2);
        let styles: StyleAllowlist = serde_json::from_str(r#"["Color"]"#).unwrap();
        assert!(styles.contains("color"));
    }
}
