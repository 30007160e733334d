//! Built-in allowlist data.
//!
//! Every tag listed in a preset allows the listed attributes without
//! constraints; a tag with an empty list is emitted without attributes.

/// Attributes allowed on every tag that has at least one attribute rule.
pub const GLOBAL_ATTRIBUTES: &[&str] =
    &["class", "dir", "id", "lang", "style", "title", "xml:lang"];

/// URI schemes allowed when none are configured.
pub const DEFAULT_SCHEMES: &[&str] =
    &["http", "https", "ftp", "mailto", "irc", "feed", "svn", "telnet"];

/// CSS properties allowed in `style` attributes when none are configured.
pub const DEFAULT_STYLES: &[&str] = &[
    "clear", "float", "cursor", "display", "position", "direction", "overflow", "box-sizing",
    "border-spacing", "border-collapse", "caption-side", "vertical-align", "list-style",
    "list-style-type", "list-style-image", "list-style-position", "height", "min-height",
    "max-height", "width", "min-width", "max-width", "margin", "margin-top", "margin-left",
    "margin-right", "margin-bottom", "padding", "padding-top", "padding-left", "padding-right",
    "padding-bottom", "background", "background-color", "background-image",
    "background-attachment", "background-position", "background-size", "background-origin",
    "background-repeat", "border", "border-width", "border-color", "border-style", "border-top",
    "border-top-color", "border-top-style", "border-top-width", "border-left", "border-left-color",
    "border-left-style", "border-left-width", "border-right", "border-right-color",
    "border-right-style", "border-right-width", "border-bottom", "border-bottom-color",
    "border-bottom-style", "border-bottom-width", "color", "font", "font-family", "font-size",
    "font-style", "font-variant", "font-weight", "letter-spacing", "line-height",
    "text-decoration", "text-indent", "text-align",
];

/// Full article body markup.
pub const POST_TAGS: &[(&str, &[&str])] = &[
    ("a", &["href", "rel", "rev", "name", "target"]),
    ("abbr", &[]),
    ("acronym", &[]),
    ("address", &[]),
    ("area", &["alt", "coords", "href", "nohref", "shape", "target"]),
    ("article", &["align"]),
    ("aside", &["align"]),
    ("audio", &["autoplay", "controls", "loop", "muted", "preload", "src"]),
    ("b", &[]),
    ("bdo", &[]),
    ("big", &[]),
    ("blockquote", &["cite"]),
    ("br", &[]),
    ("button", &["disabled", "name", "type", "value"]),
    ("caption", &["align"]),
    ("cite", &[]),
    ("code", &[]),
    ("col", &["align", "char", "charoff", "span", "valign", "width"]),
    ("colgroup", &["align", "char", "charoff", "span", "valign", "width"]),
    ("dd", &[]),
    ("del", &["datetime"]),
    ("details", &["align", "open"]),
    ("dfn", &[]),
    ("div", &["align"]),
    ("dl", &[]),
    ("dt", &[]),
    ("em", &[]),
    ("fieldset", &[]),
    ("figcaption", &["align"]),
    ("figure", &["align"]),
    ("font", &["color", "face", "size"]),
    ("footer", &["align"]),
    ("form", &["action", "accept", "accept-charset", "enctype", "method", "name", "target"]),
    ("h1", &["align"]),
    ("h2", &["align"]),
    ("h3", &["align"]),
    ("h4", &["align"]),
    ("h5", &["align"]),
    ("h6", &["align"]),
    ("header", &["align"]),
    ("hgroup", &["align"]),
    ("hr", &["align", "noshade", "size", "width"]),
    ("i", &[]),
    (
        "img",
        &[
            "alt", "align", "border", "height", "hspace", "longdesc", "vspace", "src", "usemap",
            "width",
        ],
    ),
    ("ins", &["datetime", "cite"]),
    ("kbd", &[]),
    ("label", &["for"]),
    ("legend", &["align"]),
    ("li", &["align", "value"]),
    ("map", &["name"]),
    ("mark", &[]),
    ("menu", &["type"]),
    ("nav", &["align"]),
    ("ol", &["start", "type", "reversed"]),
    ("p", &["align"]),
    ("pre", &["width"]),
    ("q", &["cite"]),
    ("s", &[]),
    ("samp", &[]),
    ("section", &["align"]),
    ("small", &[]),
    ("span", &["align"]),
    ("strike", &[]),
    ("strong", &[]),
    ("sub", &[]),
    ("summary", &["align"]),
    ("sup", &[]),
    (
        "table",
        &[
            "align", "bgcolor", "border", "cellpadding", "cellspacing", "rules", "summary",
            "width",
        ],
    ),
    ("tbody", &["align", "char", "charoff", "valign"]),
    (
        "td",
        &[
            "abbr", "align", "axis", "bgcolor", "char", "charoff", "colspan", "headers", "height",
            "nowrap", "rowspan", "scope", "valign", "width",
        ],
    ),
    ("textarea", &["cols", "rows", "disabled", "name", "readonly"]),
    ("tfoot", &["align", "char", "charoff", "valign"]),
    (
        "th",
        &[
            "abbr", "align", "axis", "bgcolor", "char", "charoff", "colspan", "headers", "height",
            "nowrap", "rowspan", "scope", "valign", "width",
        ],
    ),
    ("thead", &["align", "char", "charoff", "valign"]),
    ("title", &[]),
    ("tr", &["align", "bgcolor", "char", "charoff", "valign"]),
    ("track", &["default", "kind", "label", "src", "srclang"]),
    ("tt", &[]),
    ("u", &[]),
    ("ul", &["type"]),
    ("var", &[]),
    (
        "video",
        &[
            "autoplay", "controls", "height", "loop", "muted", "poster", "preload", "src",
            "width",
        ],
    ),
];

/// Inline markup for short excerpts.
pub const EXCERPT_TAGS: &[(&str, &[&str])] = &[
    ("a", &["href", "rel", "rev", "name", "target"]),
    ("abbr", &[]),
    ("acronym", &[]),
    ("b", &[]),
    ("blockquote", &["cite"]),
    ("cite", &[]),
    ("code", &[]),
    ("del", &["datetime"]),
    ("em", &[]),
    ("i", &[]),
    ("q", &["cite"]),
    ("s", &[]),
    ("strike", &[]),
    ("strong", &[]),
];
