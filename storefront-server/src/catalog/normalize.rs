//! Search text normalization
//!
//! Query text and product fields go through the same function so that
//! "W-712/75", "w 712 75" and "W712.75" style variants meet halfway.

/// Characters treated as word separators
const SEPARATORS: &[char] = &[
    '-', '_', '.', ',', ';', ':', '!', '?', '\'', '"', '(', ')', '[', ']', '{', '}', '/', '\\',
];

/// Searchable field value before coercion to text
#[derive(Debug, Clone, Copy)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Int(i64),
    Float(f64),
    Null,
}

impl<'a> From<&'a str> for FieldValue<'a> {
    fn from(s: &'a str) -> Self {
        FieldValue::Text(s)
    }
}

impl<'a> From<Option<&'a str>> for FieldValue<'a> {
    fn from(s: Option<&'a str>) -> Self {
        s.map_or(FieldValue::Null, FieldValue::Text)
    }
}

/// Lowercase, map separators to spaces, collapse whitespace, trim.
///
/// Idempotent: `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_whitespace() || SEPARATORS.contains(&c) {
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(c);
    }

    out
}

/// Coerce a field to text, then normalize. Null becomes "".
pub fn normalize_field(value: FieldValue<'_>) -> String {
    match value {
        FieldValue::Text(s) => normalize(s),
        FieldValue::Int(n) => normalize(&n.to_string()),
        FieldValue::Float(f) => normalize(&f.to_string()),
        FieldValue::Null => String::new(),
    }
}

/// Non-empty words of the normalized query
pub fn search_words(query: &str) -> Vec<String> {
    normalize(query)
        .split(' ')
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}
