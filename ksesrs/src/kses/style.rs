//! Inline `style` attribute filtering.

use tracing::trace;

use super::controls::strip_controls;
use crate::policy::StyleAllowlist;

const FORBIDDEN_CHARS: &[char] = &['\\', '(', '&', '=', '}'];

/// Keeps the `property:value` declarations whose property is allowed.
///
/// Values containing any of `\ ( & = }` or a CSS comment opener are rejected
/// as a whole. Property names are matched exactly. Returns an empty string
/// when nothing survives.
pub fn sanitize_style(value: &str, styles: &StyleAllowlist) -> String {
    let value: String = strip_controls(value)
        .chars()
        .filter(|ch| !matches!(ch, '\n' | '\r' | '\t'))
        .collect();

    if value.is_empty() {
        return String::new();
    }
    if value.contains(FORBIDDEN_CHARS) || value.contains("/*") {
        trace!("style rejected: forbidden token");
        return String::new();
    }

    let declarations: Vec<String> = value
        .split(';')
        .map(str::trim)
        .filter(|declaration| !declaration.is_empty())
        .filter_map(|declaration| {
            let (property, property_value) = declaration.split_once(':')?;
            if property_value.is_empty() || !styles.contains(property) {
                trace!(property, "style declaration dropped");
                return None;
            }
            Some(format!("{property}:{property_value}"))
        })
        .collect();

    if declarations.is_empty() {
        return String::new();
    }

    let mut filtered = declarations.join(";");
    filtered.push(';');
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_declarations_are_kept() {
        let styles = StyleAllowlist::default();
        assert_eq!(sanitize_style("color:red", &styles), "color:red;");
        assert_eq!(
            sanitize_style("color: red; text-align: center", &styles),
            "color: red;text-align: center;"
        );
    }

    #[test]
    fn test_unknown_properties_are_dropped() {
        let styles = StyleAllowlist::default();
        assert_eq!(sanitize_style("color:red;behavior:url", &styles), "color:red;");
        assert_eq!(sanitize_style("position:absolute;z-index:9", &styles), "position:absolute;");
        assert_eq!(sanitize_style("z-index:9", &styles), "");
    }

    #[test]
    fn test_property_names_are_case_sensitive() {
        let styles = StyleAllowlist::default();
        assert_eq!(sanitize_style("COLOR:red", &styles), "");
        assert_eq!(sanitize_style("color :red", &styles), "");
    }

    #[test]
    fn test_dangerous_tokens_reject_everything() {
        let styles = StyleAllowlist::default();
        assert_eq!(sanitize_style("background:url(javascript:alert(1))", &styles), "");
        assert_eq!(sanitize_style("width:expression(alert(1))", &styles), "");
        assert_eq!(sanitize_style("color:red;/* x */", &styles), "");
        assert_eq!(sanitize_style("color:\\72 ed", &styles), "");
        assert_eq!(sanitize_style("color:red}body{color:blue", &styles), "");
        assert_eq!(sanitize_style("font-family:&quot;x&quot;", &styles), "");
    }

    #[test]
    fn test_line_breaks_are_removed() {
        let styles = StyleAllowlist::default();
        assert_eq!(sanitize_style("color:\nred;\r\n\tfloat:left", &styles), "color:red;float:left;");
    }

    #[test]
    fn test_empty_declarations() {
        let styles = StyleAllowlist::default();
        assert_eq!(sanitize_style("", &styles), "");
        assert_eq!(sanitize_style(";;;", &styles), "");
        assert_eq!(sanitize_style("color:", &styles), "");
        assert_eq!(sanitize_style("color", &styles), "");
    }

    #[test]
    fn test_custom_allowlist() {
        let styles = StyleAllowlist::new(["Opacity"]);
        assert_eq!(sanitize_style("opacity:0.5;color:red", &styles), "opacity:0.5;");
    }
}
