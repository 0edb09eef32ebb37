//! Syntax inference — classifying raw value tokens into syntax components.
//! Spec: <https://www.w3.org/TR/css-properties-values-api-1/#supported-names>
//!
//! This is a best-effort heuristic over token text, not a Values & Units
//! parser. Categories overlap, so classification walks a fixed priority
//! chain and the first match wins; the order is load-bearing (`90deg`
//! must hit `<angle>` before `<number>` ever sees it, and a bare `0`
//! lands on `<time>` because time precedes resolution and length).

use crate::pattern::compile;
use once_cell::sync::Lazy;
use regex::Regex;

/// A supported syntax component name.
/// Spec: <https://www.w3.org/TR/css-properties-values-api-1/#supported-names>
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyntaxComponent {
    Color,
    TransformFunction,
    Image,
    Url,
    Angle,
    Time,
    Percentage,
    Resolution,
    Length,
    Integer,
    Number,
    String,
    /// Fallback for any token no other rule recognizes. Treated as
    /// uninformative by the inference caller.
    CustomIdent,
}

impl SyntaxComponent {
    /// The angle-bracketed component name as written in a syntax string.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Color => "<color>",
            Self::TransformFunction => "<transform-function>",
            Self::Image => "<image>",
            Self::Url => "<url>",
            Self::Angle => "<angle>",
            Self::Time => "<time>",
            Self::Percentage => "<percentage>",
            Self::Resolution => "<resolution>",
            Self::Length => "<length>",
            Self::Integer => "<integer>",
            Self::Number => "<number>",
            Self::String => "<string>",
            Self::CustomIdent => "<custom-ident>",
        }
    }
}

impl core::fmt::Display for SyntaxComponent {
    fn fmt(&self, formatter: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Hex colors: 3, 4, 6 or 8 hex digits after `#`.
static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)^#([0-9a-f]{3}|[0-9a-f]{4}|[0-9a-f]{6}|[0-9a-f]{8})$"));

/// Color function calls with a non-empty argument list.
static COLOR_FUNCTION: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)^(color-mod|(hsl|rgb)a?)\(.+\)$"));

/// Any valid <transform-function> value.
static TRANSFORM_FUNCTION: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)^(matrix|translate[xy]?|scale[xyz]?|rotate|skew[xy]?)\(.*\)$"));

/// Any valid <image> value: gradient-like functions, or a `url()` whose
/// path names a known raster/vector image extension.
static IMAGE: Lazy<Regex> = Lazy::new(|| {
    compile(
        r"(?i)^((cross-fade|image-set|(repeating-)?(linear|radial)-gradient)\(.*\)|url\(.*\.(bmp|gif|jpe?g|png|svg|webp).*\))$",
    )
});

/// Any other non-empty `url()` value.
static URL: Lazy<Regex> = Lazy::new(|| compile(r"(?i)^url\(.+\)$"));

/// Any valid <angle> value. Deliberately end-anchored only: a leading
/// garbage prefix still classifies, and callers rely on that leniency.
static ANGLE: Lazy<Regex> = Lazy::new(|| compile(r"(?i)[-+]?[0-9]*\.?[0-9]+(deg|grad|rad|turn)$"));

/// Any valid <time> value, including unitless zero.
static TIME: Lazy<Regex> = Lazy::new(|| compile(r"(?i)^(0|[-+]?[0-9]*\.?[0-9]+m?s)$"));

/// Any valid <percentage> value.
static PERCENTAGE: Lazy<Regex> = Lazy::new(|| compile(r"^([-+]?[0-9]*\.?[0-9]+%)$"));

/// Any valid <resolution> value, including unitless zero.
static RESOLUTION: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)^(0|[-+]?[0-9]*\.?[0-9]+(dpi|dpcm|dppx))$"));

/// Any valid <length> value. Deliberately start-anchored only, so a
/// trailing suffix is tolerated; `%` is listed but `<percentage>` is
/// checked first.
static LENGTH: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?i)^(0|[-+]?[0-9]*\.?[0-9]+(%|ch|cm|em|ex|in|mm|pc|pt|px|q|rem|vh|vmax|vmin|vw))")
});

/// Any valid <integer> value: digits only, no sign, no decimal.
static INTEGER: Lazy<Regex> = Lazy::new(|| compile(r"^[0-9]+$"));

/// Any valid <number> value.
static NUMBER: Lazy<Regex> = Lazy::new(|| compile(r"^([-+]?[0-9]*\.?[0-9]+)$"));

/// Whether the token is a <color>: the color keywords `inherit` /
/// `currentColor`, a color function call, a hex color, or anything
/// `csscolorparser` accepts (named colors and `transparent`).
fn is_color(token: &str) -> bool {
    if token.eq_ignore_ascii_case("inherit") || token.eq_ignore_ascii_case("currentcolor") {
        return true;
    }
    if COLOR_FUNCTION.is_match(token) || HEX_COLOR.is_match(token) {
        return true;
    }
    csscolorparser::parse(token).is_ok()
}

/// Whether the token is a <string>: wrapped in one matching pair of
/// single or double quotes. A char-level check, since the quote kind
/// at the end must match the one at the start.
fn is_quoted_string(token: &str) -> bool {
    let bytes = token.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(open), Some(close)) => {
            bytes.len() >= 2 && open == close && (*open == b'"' || *open == b'\'')
        }
        _ => false,
    }
}

/// The classifier chain. First match wins; order is semantically
/// load-bearing and must not be rearranged.
const CLASSIFIER_CHAIN: &[(fn(&str) -> bool, SyntaxComponent)] = &[
    (is_color, SyntaxComponent::Color),
    (
        |token| TRANSFORM_FUNCTION.is_match(token),
        SyntaxComponent::TransformFunction,
    ),
    (|token| IMAGE.is_match(token), SyntaxComponent::Image),
    (|token| URL.is_match(token), SyntaxComponent::Url),
    (|token| ANGLE.is_match(token), SyntaxComponent::Angle),
    (|token| TIME.is_match(token), SyntaxComponent::Time),
    (
        |token| PERCENTAGE.is_match(token),
        SyntaxComponent::Percentage,
    ),
    (
        |token| RESOLUTION.is_match(token),
        SyntaxComponent::Resolution,
    ),
    (|token| LENGTH.is_match(token), SyntaxComponent::Length),
    (|token| INTEGER.is_match(token), SyntaxComponent::Integer),
    (|token| NUMBER.is_match(token), SyntaxComponent::Number),
    (is_quoted_string, SyntaxComponent::String),
];

/// Classify one raw value token into a syntax component.
///
/// Pure function; unrecognized tokens fall back to
/// [`SyntaxComponent::CustomIdent`].
pub fn classify_token(token: &str) -> SyntaxComponent {
    for (predicate, component) in CLASSIFIER_CHAIN {
        if predicate(token) {
            return *component;
        }
    }
    SyntaxComponent::CustomIdent
}

/// Split a value on top-level whitespace, the way CSS space-separated
/// lists divide: whitespace inside a parenthesized argument list or a
/// quoted string does not end a token, so `rgb(1, 2, 3)` stays whole.
fn split_value_tokens(value: &str) -> Vec<&str> {
    let mut tokens: Vec<&str> = Vec::new();
    let mut depth: usize = 0;
    let mut quote: Option<char> = None;
    let mut token_start: Option<usize> = None;
    for (index, character) in value.char_indices() {
        match quote {
            Some(open_quote) => {
                if character == open_quote {
                    quote = None;
                }
            }
            None => match character {
                '"' | '\'' => quote = Some(character),
                '(' => depth = depth.wrapping_add(1),
                ')' => depth = depth.saturating_sub(1),
                _ if character.is_whitespace() && depth == 0 => {
                    if let Some(start) = token_start.take() {
                        tokens.push(&value[start..index]);
                    }
                    continue;
                }
                _ => {}
            },
        }
        if token_start.is_none() {
            token_start = Some(index);
        }
    }
    if let Some(start) = token_start {
        tokens.push(&value[start..]);
    }
    tokens
}

/// Infer a syntax string from a declaration's raw value text.
///
/// The value is split on top-level whitespace and each token classified
/// independently. Returns the space-joined component names when at
/// least one token is informative (not `<custom-ident>`), and `None`
/// when the value is too unconstrained to say anything.
pub fn infer_value_syntax(value: &str) -> Option<String> {
    let components: Vec<SyntaxComponent> = split_value_tokens(value)
        .into_iter()
        .map(classify_token)
        .collect();
    if components
        .iter()
        .any(|component| *component != SyntaxComponent::CustomIdent)
    {
        let names: Vec<&str> = components
            .iter()
            .map(|component| component.as_str())
            .collect();
        Some(names.join(" "))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The fixed chain order resolves overlapping categories.
    ///
    /// # Panics
    /// Panics if assertions fail.
    #[test]
    fn chain_order_resolves_overlaps() {
        assert_eq!(classify_token("90deg"), SyntaxComponent::Angle);
        assert_eq!(classify_token("50%"), SyntaxComponent::Percentage);
        assert_eq!(classify_token("42"), SyntaxComponent::Integer);
        assert_eq!(classify_token("4px"), SyntaxComponent::Length);
        assert_eq!(classify_token("url(x.png)"), SyntaxComponent::Image);
        assert_eq!(classify_token("url(x.json)"), SyntaxComponent::Url);
        assert_eq!(classify_token("foo"), SyntaxComponent::CustomIdent);
    }

    /// Color recognition: keywords, hex forms, and function calls.
    ///
    /// # Panics
    /// Panics if assertions fail.
    #[test]
    fn recognizes_colors() {
        assert_eq!(classify_token("red"), SyntaxComponent::Color);
        assert_eq!(classify_token("rebeccapurple"), SyntaxComponent::Color);
        assert_eq!(classify_token("currentColor"), SyntaxComponent::Color);
        assert_eq!(classify_token("inherit"), SyntaxComponent::Color);
        assert_eq!(classify_token("transparent"), SyntaxComponent::Color);
        assert_eq!(classify_token("#abc"), SyntaxComponent::Color);
        assert_eq!(classify_token("#aabbccdd"), SyntaxComponent::Color);
        assert_eq!(classify_token("rgb(1,2,3)"), SyntaxComponent::Color);
        assert_eq!(classify_token("hsla(0,0%,0%,.5)"), SyntaxComponent::Color);
        assert_eq!(classify_token("color-mod(red)"), SyntaxComponent::Color);
        assert_eq!(classify_token("#ab"), SyntaxComponent::CustomIdent);
    }

    /// Transform functions are checked before generic functions.
    ///
    /// # Panics
    /// Panics if assertions fail.
    #[test]
    fn recognizes_transform_functions() {
        assert_eq!(
            classify_token("translateX(4px)"),
            SyntaxComponent::TransformFunction
        );
        assert_eq!(
            classify_token("matrix(1,0,0,1,0,0)"),
            SyntaxComponent::TransformFunction
        );
        assert_eq!(classify_token("skewZ(4deg)"), SyntaxComponent::CustomIdent);
    }

    /// Numeric categories: time precedes resolution and length, so the
    /// bare zero token classifies as <time>.
    ///
    /// # Panics
    /// Panics if assertions fail.
    #[test]
    fn numeric_categories() {
        assert_eq!(classify_token("0"), SyntaxComponent::Time);
        assert_eq!(classify_token("200ms"), SyntaxComponent::Time);
        assert_eq!(classify_token("2s"), SyntaxComponent::Time);
        assert_eq!(classify_token("96dpi"), SyntaxComponent::Resolution);
        assert_eq!(classify_token("2dppx"), SyntaxComponent::Resolution);
        assert_eq!(classify_token("-1.5"), SyntaxComponent::Number);
        assert_eq!(classify_token("+.5turn"), SyntaxComponent::Angle);
        assert_eq!(classify_token("1.25rem"), SyntaxComponent::Length);
    }

    /// String tokens need one matching pair of quotes.
    ///
    /// # Panics
    /// Panics if assertions fail.
    #[test]
    fn recognizes_strings() {
        assert_eq!(classify_token("\"hello\""), SyntaxComponent::String);
        assert_eq!(classify_token("'hello'"), SyntaxComponent::String);
        assert_eq!(classify_token("\"hello'"), SyntaxComponent::CustomIdent);
        assert_eq!(classify_token("\""), SyntaxComponent::CustomIdent);
    }

    /// Value splitting keeps parenthesized argument lists and quoted
    /// strings together across internal spaces.
    ///
    /// # Panics
    /// Panics if assertions fail.
    #[test]
    fn splits_on_top_level_whitespace_only() {
        assert_eq!(split_value_tokens("4px solid red"), ["4px", "solid", "red"]);
        assert_eq!(split_value_tokens("rgb(1, 2, 3)"), ["rgb(1, 2, 3)"]);
        assert_eq!(
            split_value_tokens("translate(10px, 20px) rotate(45deg)"),
            ["translate(10px, 20px)", "rotate(45deg)"]
        );
        assert_eq!(
            split_value_tokens("\"hello world\" 'a b'"),
            ["\"hello world\"", "'a b'"]
        );
        assert!(split_value_tokens("   ").is_empty());
    }

    /// Function values with spaced arguments stay one token and reach
    /// their function-shaped category.
    ///
    /// # Panics
    /// Panics if assertions fail.
    #[test]
    fn infers_spaced_function_values() {
        assert_eq!(infer_value_syntax("rgb(1, 2, 3)"), Some("<color>".to_owned()));
        assert_eq!(
            infer_value_syntax("translate(10px, 20px) rotate(45deg)"),
            Some("<transform-function> <transform-function>".to_owned())
        );
        assert_eq!(
            infer_value_syntax("linear-gradient(to right, red, blue)"),
            Some("<image>".to_owned())
        );
        assert_eq!(
            infer_value_syntax("\"hello world\""),
            Some("<string>".to_owned())
        );
    }

    /// Whole-value inference joins per-token components and suppresses
    /// uninformative values.
    ///
    /// # Panics
    /// Panics if assertions fail.
    #[test]
    fn infers_value_syntax() {
        assert_eq!(
            infer_value_syntax("4px solid red"),
            Some("<length> <custom-ident> <color>".to_owned())
        );
        assert_eq!(infer_value_syntax("foo bar"), None);
        assert_eq!(infer_value_syntax(""), None);
    }
}
