use heck::ToLowerCamelCase;

/// Make an identifier usable as a TypeScript binding
pub(crate) fn escape_js_keyword<T>(string: T) -> String
where
    T: ToString,
{
    let string = string.to_string();
    if JS_KEYWORDS.iter().any(|s| s.eq(&string)) {
        format!("{string}Record")
    } else {
        string
    }
}

pub(crate) const JS_KEYWORDS: [&str; 46] = [
    "arguments", "await", "break", "case", "catch", "class", "const", "continue", "debugger",
    "default", "delete", "do", "else", "enum", "eval", "export", "extends", "false", "finally",
    "for", "function", "if", "implements", "import", "in", "instanceof", "interface", "let", "new",
    "null", "package", "private", "protected", "public", "return", "static", "super", "switch",
    "this", "throw", "true", "try", "typeof", "var", "void", "while",
];

/// Single quoted string literal, valid in both PHP and TypeScript
pub(crate) fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Comma separated quoted list, `'a', 'b'`
pub(crate) fn quote_list<'a>(values: impl IntoIterator<Item = &'a str>) -> String {
    values.into_iter().map(quote).collect::<Vec<_>>().join(", ")
}

/// Prefix every non-empty line with `prefix`
pub(crate) fn indent(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `ownerOptions`, the prop or constant holding the options of `name`
pub(crate) fn options_name(name: &str) -> String {
    format!("{}Options", name.to_lower_camel_case())
}

/// `statusLabel`, the helper mapping a stored index to its label
pub(crate) fn label_fn_name(name: &str) -> String {
    format!("{}Label", name.to_lower_camel_case())
}
