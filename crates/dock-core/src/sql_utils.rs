//! SQL quoting helpers for dynamically constructed statements
//!
//! All SQL that the orchestrator builds at runtime (ledger writes, bulk
//! inserts, row counts) goes through these helpers so identifiers and
//! values are always escaped.

/// Quote a SQL identifier.
///
/// Wraps the identifier in double quotes and escapes embedded double quotes
/// by doubling them, following the SQL standard.
///
/// # Examples
/// ```
/// use dock_core::sql_utils::quote_ident;
/// assert_eq!(quote_ident("users"), r#""users""#);
/// assert_eq!(quote_ident(r#"my"table"#), r#""my""table""#);
/// ```
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote a potentially schema-qualified name (e.g. `schema.table`).
///
/// Splits on `.` and individually quotes each component.
///
/// # Examples
/// ```
/// use dock_core::sql_utils::quote_qualified;
/// assert_eq!(quote_qualified("users"), r#""users""#);
/// assert_eq!(quote_qualified("staging.trips"), r#""staging"."trips""#);
/// ```
pub fn quote_qualified(name: &str) -> String {
    name.split('.')
        .map(quote_ident)
        .collect::<Vec<_>>()
        .join(".")
}

/// Escape a string for use inside a single-quoted SQL literal.
///
/// # Examples
/// ```
/// use dock_core::sql_utils::string_literal;
/// assert_eq!(string_literal("O'Brien"), "'O''Brien'");
/// ```
pub fn string_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Render a JSON value as a SQL literal.
///
/// Strings are single-quoted and escaped, numbers and booleans pass through,
/// null becomes `NULL`. Arrays and objects are serialized to their JSON text
/// and quoted, which matches how they round-trip through the dump format.
pub fn json_literal(value: &serde_json::Value) -> String {
    use serde_json::Value;

    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => {
            if *b {
                "TRUE".to_string()
            } else {
                "FALSE".to_string()
            }
        }
        Value::Number(n) => n.to_string(),
        Value::String(s) => string_literal(s),
        other => string_literal(&other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_quote_ident_plain() {
        assert_eq!(quote_ident("trips"), "\"trips\"");
    }

    #[test]
    fn test_json_literal_scalars() {
        assert_eq!(json_literal(&json!(null)), "NULL");
        assert_eq!(json_literal(&json!(true)), "TRUE");
        assert_eq!(json_literal(&json!(42)), "42");
        assert_eq!(json_literal(&json!(1.5)), "1.5");
        assert_eq!(json_literal(&json!("it's")), "'it''s'");
    }

    #[test]
    fn test_json_literal_nested() {
        assert_eq!(json_literal(&json!(["a", "b"])), "'[\"a\",\"b\"]'");
    }
}
