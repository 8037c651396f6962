//! Value-level parsing and the CSS safety policy.
//!
//! This module handles the two places the engine looks *inside* a value:
//!
//! - [`parse_preset_ref`]: recognizes `var:preset|<type>|<slug>` references
//! - [`is_safe_css_declaration`]: the declaration-level safety policy
//!
//! ## Safety Policy
//!
//! The policy is detection, not correction: a rejected declaration is
//! dropped, never escaped. A declaration is rejected when:
//!
//! 1. The property or value is empty
//! 2. The value contains a raw angle bracket (covers `</style` breakouts)
//! 3. The value contains `javascript:` or `expression(`
//! 4. A function invoked inside a `calc()` expression is not on the math
//!    allowlist (`calc`, `clamp`, `min`, `max`, `var`, `env`)

use nom::bytes::complete::{tag, take_while1};
use nom::character::complete::char;
use nom::IResult;

/// Functions allowed inside `calc()` expressions.
const ALLOWED_CALC_FUNCTIONS: &[&str] = &["calc", "clamp", "env", "max", "min", "var"];

/// Parses a preset reference of the form `var:preset|<type>|<slug>`.
///
/// Returns the preset type and slug, or `None` if the input is not a
/// well-formed reference.
///
/// # Examples
///
/// ```rust
/// use theme_json::values::parse_preset_ref;
///
/// assert_eq!(
///     parse_preset_ref("var:preset|color|primary"),
///     Some(("color", "primary"))
/// );
/// assert_eq!(parse_preset_ref("var:preset|color"), None);
/// assert_eq!(parse_preset_ref("#fff"), None);
/// ```
pub fn parse_preset_ref(input: &str) -> Option<(&str, &str)> {
    fn preset_ref(input: &str) -> IResult<&str, (&str, &str)> {
        let (input, _) = tag("var:preset|")(input)?;
        let (input, kind) = take_while1(|c| c != '|')(input)?;
        let (input, _) = char('|')(input)?;
        let (input, slug) = take_while1(|c| c != '|')(input)?;
        Ok((input, (kind, slug)))
    }

    match preset_ref(input) {
        Ok(("", reference)) => Some(reference),
        _ => None,
    }
}

/// Checks whether a property/value pair is safe to emit.
pub fn is_safe_css_declaration(property: &str, value: &str) -> bool {
    if property.trim().is_empty() || value.trim().is_empty() {
        return false;
    }
    // Raw angle brackets are never valid in a declaration value; this also
    // rejects any `</style` terminator.
    if value.contains('<') || value.contains('>') {
        return false;
    }
    let lower = value.to_ascii_lowercase();
    if lower.contains("javascript:") || lower.contains("expression(") {
        return false;
    }
    calc_functions_allowed(&lower)
}

/// Verifies that every function invoked inside a `calc()` expression is on
/// the math allowlist.
fn calc_functions_allowed(value: &str) -> bool {
    let mut search = value;
    while let Some(pos) = search.find("calc(") {
        let body = balanced_parens(&search[pos + 4..]);
        for name in function_names(body) {
            if !ALLOWED_CALC_FUNCTIONS.contains(&name) {
                return false;
            }
        }
        search = &search[pos + 5..];
    }
    true
}

/// Returns the content of a balanced parenthesized group. `input` must
/// start at the opening `(`; an unbalanced group yields the rest of the
/// input.
fn balanced_parens(input: &str) -> &str {
    let mut depth = 0usize;
    for (i, c) in input.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return &input[1..i];
                }
            }
            _ => {}
        }
    }
    if input.starts_with('(') {
        &input[1..]
    } else {
        input
    }
}

/// Collects every identifier immediately followed by `(`.
fn function_names(input: &str) -> Vec<&str> {
    fn ident_call(input: &str) -> IResult<&str, &str> {
        let (input, name) =
            take_while1(|c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_')(input)?;
        let (input, _) = char('(')(input)?;
        Ok((input, name))
    }

    let mut names = Vec::new();
    let mut rest = input;
    while !rest.is_empty() {
        match ident_call(rest) {
            Ok((next, name)) => {
                names.push(name);
                rest = next;
            }
            Err(_) => {
                let skip = rest.chars().next().map(char::len_utf8).unwrap_or(1);
                rest = &rest[skip..];
            }
        }
    }
    names
}

/// Checks a layout-definition selector suffix against the strict character
/// allowlist: alphanumerics, spaces, `.`, `-`, `*`, `+`, `>`.
pub(crate) fn is_safe_layout_selector(selector: &str) -> bool {
    selector
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | ' ' | '*' | '+' | '>'))
}

/// Reduces a layout class name to lowercase alphanumerics, `-` and `_`,
/// mapping runs of anything else to a single `-`.
pub(crate) fn sanitize_class_name(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.trim().chars() {
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

/// Converts a slug or settings key to kebab-case: camelCase boundaries and
/// letter/digit boundaries become hyphens, anything non-alphanumeric is a
/// separator.
pub(crate) fn to_kebab_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 4);
    let mut prev: Option<char> = None;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if let Some(p) = prev {
                let boundary = (p.is_ascii_lowercase() && c.is_ascii_uppercase())
                    || (p.is_ascii_alphabetic() && c.is_ascii_digit())
                    || (p.is_ascii_digit() && c.is_ascii_alphabetic());
                if boundary {
                    out.push('-');
                }
            }
            out.push(c.to_ascii_lowercase());
            prev = Some(c);
        } else {
            if prev.is_some() && !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
            prev = None;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}
