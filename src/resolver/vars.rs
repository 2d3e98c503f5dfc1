//! The `vars` table of a DEPS file.

use std::collections::BTreeMap;

use crate::parser::{find_first, ExprNode, ManifestError, Pattern};
use crate::resolver::extract::url_field;
use crate::resolver::passes::{resolve, References};

/// Variable name to resolved string value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VarTable {
    vars: BTreeMap<String, String>,
}

impl VarTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for VarTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = VarTable::new();
        for (k, v) in iter {
            table.insert(k, v);
        }
        table
    }
}

/// Build the table from a parsed `vars` region.
///
/// Entries are resolved in order, so a value may concatenate variables defined
/// above it. A value that is a bare identifier (`True`, a forward reference) is
/// skipped; an object contributes its `url` field.
pub fn build_var_table(tree: &ExprNode) -> Result<VarTable, ManifestError> {
    let props = match find_first(&Pattern::object(), tree).and_then(|n| n.as_expr()) {
        Some(ExprNode::Object(props)) => props,
        _ => return Err(ManifestError::not_found("an object in `vars`")),
    };

    let mut table = VarTable::new();

    for prop in props {
        let name = match prop.key.as_literal() {
            Some(lit) => lit.as_text(),
            None => {
                return Err(ManifestError::unsupported(
                    format!("`vars` key must be a string, found {}", prop.key.kind()),
                    &prop.key.to_string(),
                ))
            }
        };

        let value = resolve(prop.value.clone(), &table, References::VarCallsAndIdentifiers)?;

        match value {
            ExprNode::Literal(lit) => table.insert(name, lit.as_text()),
            ExprNode::Identifier(ident) => {
                tracing::debug!("skipping var `{}` bound to identifier `{}`", name, ident);
            }
            ExprNode::Object(ref inner) => {
                if let Some(url) = url_field(inner)? {
                    table.insert(name, url);
                }
            }
            other => {
                return Err(ManifestError::unsupported(
                    format!("unsupported value for var `{}`", name),
                    &other.to_string(),
                ))
            }
        }
    }

    tracing::debug!("resolved {} vars", table.len());
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn test_literals_and_skips() {
        let tree = parse(
            "{ 'git': 'https://chromium.googlesource.com', 'checkout_x': True, \
               'n': 3, 'flag': false, 'obj': { 'url': 'https://o.example' }, 'none': {} }",
        )
        .unwrap();
        let vars = build_var_table(&tree).unwrap();

        assert_eq!(vars.get("git"), Some("https://chromium.googlesource.com"));
        assert_eq!(vars.get("n"), Some("3"));
        assert_eq!(vars.get("flag"), Some("false"));
        assert_eq!(vars.get("obj"), Some("https://o.example"));
        assert!(!vars.contains("checkout_x"));
        assert!(!vars.contains("none"));
        assert_eq!(vars.len(), 4);
    }

    #[test]
    fn test_earlier_vars_feed_later_ones() {
        let tree = parse("{ 'a': 'X', 'b': a + '/Y', 'c': Var('b') + '/Z' + '!' }").unwrap();
        let vars = build_var_table(&tree).unwrap();

        assert_eq!(vars.get("b"), Some("X/Y"));
        assert_eq!(vars.get("c"), Some("X/Y/Z!"));
    }

    #[test]
    fn test_unknown_var_call_fails() {
        let tree = parse("{ 'b': Var('a') + '/Y' }").unwrap();
        assert_eq!(
            build_var_table(&tree).unwrap_err(),
            ManifestError::UnknownVariable {
                name: "a".to_string()
            }
        );
    }

    #[test]
    fn test_unsupported_value_shapes() {
        for src in ["{ 'a': ['x'] }", "{ 'a': Str('x') }", "{ 'a': later + 'x' }", "{ a: 'x' }"] {
            let tree = parse(src).unwrap();
            assert!(
                matches!(build_var_table(&tree), Err(ManifestError::UnsupportedSyntax { .. })),
                "{}",
                src
            );
        }
    }
}
