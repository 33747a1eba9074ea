//! Quoting of identifiers, labels, relationship types and property names.

const QUOTE: char = '`';

/// Returns true when `name` must be quoted before it is spliced into a
/// statement.
///
/// Plain names (`^[A-Za-z_][A-Za-z0-9_]*$`) and names that are already a
/// well-formed quoted name are left alone.
pub fn needs_escaping(name: &str) -> bool {
    !is_plain(name) && !is_quoted(name)
}

/// Quotes `name` with backticks if needed, doubling embedded backticks.
///
/// Idempotent: `escape_if_needed(&escape_if_needed(x)) == escape_if_needed(x)`.
pub fn escape_if_needed(name: &str) -> String {
    if !needs_escaping(name) {
        return name.to_string();
    }
    let mut out = String::with_capacity(name.len() + 2);
    out.push(QUOTE);
    for c in name.chars() {
        if c == QUOTE {
            out.push(QUOTE);
        }
        out.push(c);
    }
    out.push(QUOTE);
    out
}

/// Escapes every part and joins them with `joiner` (`:` or `|` for labels).
pub fn escape_joined<I, S>(parts: I, joiner: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parts
        .into_iter()
        .map(|part| escape_if_needed(part.as_ref()))
        .collect::<Vec<_>>()
        .join(joiner)
}

fn is_plain(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// Wrapped in backticks with every inner backtick doubled.
fn is_quoted(name: &str) -> bool {
    let Some(inner) = name
        .strip_prefix(QUOTE)
        .and_then(|rest| rest.strip_suffix(QUOTE))
    else {
        return false;
    };
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == QUOTE && chars.next() != Some(QUOTE) {
            return false;
        }
    }
    true
}
