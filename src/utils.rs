//! Common utility functions shared across the codebase.

/// Checks if a name looks like a component name (starts with an uppercase letter).
///
/// # Examples
///
/// ```
/// use transmark::utils::is_pascal_case;
///
/// assert!(is_pascal_case("App"));
/// assert!(is_pascal_case("UserCard"));
/// assert!(!is_pascal_case("app"));
/// assert!(!is_pascal_case("_App"));
/// assert!(!is_pascal_case(""));
/// ```
pub fn is_pascal_case(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_uppercase())
}

/// Checks if a name follows the hook convention: `use` followed by an uppercase letter.
///
/// ```
/// use transmark::utils::is_hook_name;
///
/// assert!(is_hook_name("useGreeting"));
/// assert!(!is_hook_name("user"));
/// assert!(!is_hook_name("use"));
/// ```
pub fn is_hook_name(name: &str) -> bool {
    name.strip_prefix("use")
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_uppercase())
}

/// Render a string as a double-quoted JavaScript string literal.
pub fn quote_js_string(value: &str) -> String {
    // JSON string escaping is a valid subset of JS string escaping, except for
    // the two line separators which JS (pre-ES2019) treats as line terminators.
    serde_json::to_string(value)
        .unwrap_or_else(|_| format!("\"{}\"", value))
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}

/// Decode the escape sequences of raw JavaScript string or template text.
///
/// Unknown escapes decode to the escaped character itself, a line
/// continuation (`\` followed by a newline) decodes to nothing and a lone
/// trailing backslash is kept.
pub fn unescape_js(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(next) = chars.next() else {
            out.push('\\');
            break;
        };
        match next {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' if !chars.peek().is_some_and(|c| c.is_ascii_digit()) => out.push('\0'),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            'x' => {
                let hex: String = chars.by_ref().take(2).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) if hex.len() == 2 => out.push(decoded),
                    _ => {
                        out.push('x');
                        out.push_str(&hex);
                    }
                }
            }
            'u' => {
                let hex: String = if chars.peek() == Some(&'{') {
                    chars.next();
                    chars.by_ref().take_while(|c| *c != '}').collect()
                } else {
                    chars.by_ref().take(4).collect()
                };
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push('u');
                        out.push_str(&hex);
                    }
                }
            }
            other => out.push(other),
        }
    }

    out
}

/// Escape raw literal text so it can be placed inside a template literal.
///
/// `raw_backslashes` is true when the text comes from a literal whose
/// backslashes are plain characters (JSX attribute strings); those must be
/// doubled. Otherwise existing escape sequences are kept as they are.
pub fn escape_template_text(text: &str, raw_backslashes: bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if raw_backslashes => out.push_str("\\\\"),
            '\\' => {
                // Keep the escape pair intact so `\${` stays escaped.
                out.push('\\');
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            '`' => out.push_str("\\`"),
            '$' if chars.peek() == Some(&'{') => out.push_str("\\$"),
            other => out.push(other),
        }
    }

    out
}
