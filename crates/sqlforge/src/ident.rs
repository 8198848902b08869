//! Identifier quoting.
//!
//! Quotes a possibly dotted name (`schema.table`) with a driver-selected
//! quote character, one segment at a time. Identifiers are caller-trusted:
//! user-supplied data belongs in bind values, never in identifiers, so no
//! escaping of embedded quote characters is performed here.

/// Quoting configuration shared by every builder a factory creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quoting {
    /// Character used to delimit identifiers (`` ` `` for MySQL, `"` otherwise).
    pub quote_char: char,
    /// Character splitting a qualified name into segments.
    pub name_sep: char,
}

impl Quoting {
    /// Create a quoting configuration.
    pub const fn new(quote_char: char, name_sep: char) -> Self {
        Self {
            quote_char,
            name_sep,
        }
    }

    /// Quote an identifier; see [`quote_identifier`].
    pub fn quote(&self, label: &str) -> String {
        quote_identifier(label, self.quote_char, self.name_sep)
    }

    /// Quote a projection/grouping expression.
    ///
    /// Anything containing a `(` is taken to be a function call and passed
    /// through verbatim.
    pub(crate) fn quote_expr(&self, expr: &str) -> String {
        if expr.contains('(') {
            expr.to_string()
        } else {
            self.quote(expr)
        }
    }
}

impl Default for Quoting {
    fn default() -> Self {
        Self::new('"', '.')
    }
}

/// Quote a possibly dotted identifier.
///
/// Each segment is wrapped in `quote_char`; the wildcard `*` and segments
/// that are already quoted pass through unchanged, so quoting is idempotent.
///
/// # Example
/// ```
/// use sqlforge::quote_identifier;
///
/// assert_eq!(quote_identifier("foo.bar", '`', '.'), "`foo`.`bar`");
/// assert_eq!(quote_identifier("*", '`', '.'), "*");
/// ```
pub fn quote_identifier(label: &str, quote_char: char, name_sep: char) -> String {
    if label == "*" || is_quoted(label, quote_char) {
        return label.to_string();
    }

    label
        .split(name_sep)
        .map(|part| {
            if part == "*" || is_quoted(part, quote_char) {
                part.to_string()
            } else {
                format!("{quote_char}{part}{quote_char}")
            }
        })
        .collect::<Vec<_>>()
        .join(&name_sep.to_string())
}

fn is_quoted(s: &str, quote_char: char) -> bool {
    s.len() >= 2 && s.starts_with(quote_char) && s.ends_with(quote_char)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_simple() {
        assert_eq!(quote_identifier("foo", '`', '.'), "`foo`");
    }

    #[test]
    fn quote_dotted() {
        assert_eq!(quote_identifier("foo.bar", '`', '.'), "`foo`.`bar`");
    }

    #[test]
    fn quote_three_segments() {
        assert_eq!(
            quote_identifier("db.schema.table", '"', '.'),
            "\"db\".\"schema\".\"table\""
        );
    }

    #[test]
    fn quote_is_idempotent() {
        let once = quote_identifier("foo", '`', '.');
        assert_eq!(quote_identifier(&once, '`', '.'), once);
    }

    #[test]
    fn quote_leaves_wildcard_alone() {
        assert_eq!(quote_identifier("*", '`', '.'), "*");
    }

    #[test]
    fn quote_leaves_qualified_wildcard_segment_alone() {
        assert_eq!(quote_identifier("foo.*", '`', '.'), "`foo`.*");
    }

    #[test]
    fn quote_expr_passes_function_calls_through() {
        let quoting = Quoting::new('`', '.');
        assert_eq!(quoting.quote_expr("COUNT(*)"), "COUNT(*)");
        assert_eq!(quoting.quote_expr("name"), "`name`");
    }
}
