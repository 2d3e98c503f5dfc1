//! Expression tree for the manifest dialect and partial-pattern search.

use std::fmt;

/// A literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Number(f64),
    Bool(bool),
}

impl Literal {
    /// The literal as a string, the way concatenation sees it.
    pub fn as_text(&self) -> String {
        match self {
            Literal::Str(s) => s.clone(),
            Literal::Bool(b) => b.to_string(),
            Literal::Number(n) => format_number(*n),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Str(s) => write!(f, "{:?}", s),
            other => f.write_str(&other.as_text()),
        }
    }
}

/// Integral values print without a fractional part.
fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// A `key: value` entry of an object literal.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub key: ExprNode,
    pub value: ExprNode,
}

impl Property {
    pub fn new(key: ExprNode, value: ExprNode) -> Self {
        Property { key, value }
    }

    /// The key as written, if it is a string literal or bare identifier.
    pub fn key_name(&self) -> Option<&str> {
        match &self.key {
            ExprNode::Literal(Literal::Str(s)) | ExprNode::Identifier(s) => Some(s),
            _ => None,
        }
    }
}

/// A node of a parsed manifest expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprNode {
    Literal(Literal),
    Identifier(String),
    Object(Vec<Property>),
    Array(Vec<ExprNode>),
    Call { callee: String, args: Vec<ExprNode> },
    /// `left + right`; `+` is the only binary operator in the dialect.
    Binary {
        left: Box<ExprNode>,
        right: Box<ExprNode>,
    },
}

impl ExprNode {
    pub fn string(value: impl Into<String>) -> Self {
        ExprNode::Literal(Literal::Str(value.into()))
    }

    pub fn binary(left: ExprNode, right: ExprNode) -> Self {
        ExprNode::Binary {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Short name of the node kind, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ExprNode::Literal(_) => "literal",
            ExprNode::Identifier(_) => "identifier",
            ExprNode::Object(_) => "object",
            ExprNode::Array(_) => "array",
            ExprNode::Call { .. } => "call",
            ExprNode::Binary { .. } => "binary expression",
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            ExprNode::Literal(lit) => Some(lit),
            _ => None,
        }
    }
}

impl fmt::Display for ExprNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprNode::Literal(lit) => write!(f, "{}", lit),
            ExprNode::Identifier(name) => f.write_str(name),
            ExprNode::Object(props) => {
                f.write_str("{")?;
                for (i, p) in props.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", p.key, p.value)?;
                }
                f.write_str("}")
            }
            ExprNode::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            ExprNode::Call { callee, args } => {
                write!(f, "{}(", callee)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
            ExprNode::Binary { left, right } => write!(f, "{} + {}", left, right),
        }
    }
}

/// A reachable position in a tree: either an expression or an object entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node<'a> {
    Expr(&'a ExprNode),
    Property(&'a Property),
}

impl<'a> Node<'a> {
    pub fn as_expr(self) -> Option<&'a ExprNode> {
        match self {
            Node::Expr(expr) => Some(expr),
            Node::Property(_) => None,
        }
    }

    pub fn as_property(self) -> Option<&'a Property> {
        match self {
            Node::Property(prop) => Some(prop),
            Node::Expr(_) => None,
        }
    }
}

/// A partial node. `None` fields match anything, and a list of element
/// patterns constrains only the leading elements it supplies.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// Any expression (never a property).
    AnyExpr,
    Literal(Option<Literal>),
    Identifier(Option<String>),
    Object(Option<Vec<Pattern>>),
    Array(Option<Vec<Pattern>>),
    Property {
        key: Option<Box<Pattern>>,
        value: Option<Box<Pattern>>,
    },
    Call {
        callee: Option<String>,
        args: Option<Vec<Pattern>>,
    },
    Binary {
        left: Option<Box<Pattern>>,
        right: Option<Box<Pattern>>,
    },
}

impl Pattern {
    /// Any object literal.
    pub fn object() -> Self {
        Pattern::Object(None)
    }

    /// A property whose key is the string literal `key`.
    pub fn property_named(key: &str) -> Self {
        Pattern::Property {
            key: Some(Box::new(Pattern::Literal(Some(Literal::Str(key.to_string()))))),
            value: None,
        }
    }

    /// A call to `callee` with any arguments.
    pub fn call(callee: &str) -> Self {
        Pattern::Call {
            callee: Some(callee.to_string()),
            args: None,
        }
    }

    /// Whether every field present in the pattern equals the node's field.
    pub fn matches(&self, node: Node<'_>) -> bool {
        match (self, node) {
            (Pattern::Property { key, value }, Node::Property(prop)) => {
                field_matches(key.as_deref(), &prop.key) && field_matches(value.as_deref(), &prop.value)
            }
            (Pattern::Property { .. }, Node::Expr(_)) => false,
            (_, Node::Property(_)) => false,
            (pattern, Node::Expr(expr)) => pattern.matches_expr(expr),
        }
    }

    fn matches_expr(&self, expr: &ExprNode) -> bool {
        match (self, expr) {
            (Pattern::AnyExpr, _) => true,
            (Pattern::Literal(want), ExprNode::Literal(lit)) => want.as_ref().is_none_or(|w| w == lit),
            (Pattern::Identifier(want), ExprNode::Identifier(name)) => {
                want.as_ref().is_none_or(|w| w == name)
            }
            (Pattern::Object(want), ExprNode::Object(props)) => want.as_ref().is_none_or(|w| {
                w.len() <= props.len()
                    && w.iter().zip(props).all(|(p, prop)| p.matches(Node::Property(prop)))
            }),
            (Pattern::Array(want), ExprNode::Array(items)) => {
                want.as_ref().is_none_or(|w| all_match(w, items))
            }
            (Pattern::Call { callee, args }, ExprNode::Call { callee: name, args: actual }) => {
                callee.as_ref().is_none_or(|c| c == name)
                    && args.as_ref().is_none_or(|w| all_match(w, actual))
            }
            (Pattern::Binary { left, right }, ExprNode::Binary { left: l, right: r }) => {
                field_matches(left.as_deref(), l) && field_matches(right.as_deref(), r)
            }
            _ => false,
        }
    }
}

fn field_matches(pattern: Option<&Pattern>, expr: &ExprNode) -> bool {
    pattern.is_none_or(|p| p.matches(Node::Expr(expr)))
}

fn all_match(patterns: &[Pattern], exprs: &[ExprNode]) -> bool {
    patterns.len() <= exprs.len()
        && patterns
            .iter()
            .zip(exprs)
            .all(|(p, e)| p.matches(Node::Expr(e)))
}

/// Pre-order search for the first node matching `pattern`.
///
/// Visits array elements, object properties (the property itself, then its
/// key and value), call arguments and both binary operands.
pub fn find_first<'a>(pattern: &Pattern, root: &'a ExprNode) -> Option<Node<'a>> {
    visit(pattern, Node::Expr(root))
}

fn visit<'a>(pattern: &Pattern, node: Node<'a>) -> Option<Node<'a>> {
    if pattern.matches(node) {
        return Some(node);
    }

    match node {
        Node::Property(prop) => visit(pattern, Node::Expr(&prop.key))
            .or_else(|| visit(pattern, Node::Expr(&prop.value))),
        Node::Expr(expr) => match expr {
            ExprNode::Literal(_) | ExprNode::Identifier(_) => None,
            ExprNode::Object(props) => props
                .iter()
                .find_map(|prop| visit(pattern, Node::Property(prop))),
            ExprNode::Array(items) => items
                .iter()
                .find_map(|item| visit(pattern, Node::Expr(item))),
            ExprNode::Call { args, .. } => args
                .iter()
                .find_map(|arg| visit(pattern, Node::Expr(arg))),
            ExprNode::Binary { left, right } => visit(pattern, Node::Expr(left))
                .or_else(|| visit(pattern, Node::Expr(right))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solutions() -> ExprNode {
        ExprNode::Array(vec![ExprNode::Object(vec![
            Property::new(ExprNode::string("name"), ExprNode::string("src")),
            Property::new(ExprNode::string("deps_file"), ExprNode::string("DEPS")),
        ])])
    }

    #[test]
    fn test_find_property_by_key() {
        let tree = solutions();
        let found = find_first(&Pattern::property_named("deps_file"), &tree)
            .and_then(Node::as_property)
            .unwrap();
        assert_eq!(found.value, ExprNode::string("DEPS"));
    }

    #[test]
    fn test_find_first_is_preorder() {
        let tree = solutions();
        let found = find_first(&Pattern::Literal(None), &tree).unwrap();
        assert_eq!(found, Node::Expr(&ExprNode::string("name")));

        let found = find_first(&Pattern::object(), &tree).and_then(Node::as_expr).unwrap();
        assert!(matches!(found, ExprNode::Object(props) if props.len() == 2));
    }

    #[test]
    fn test_find_inside_binary_and_call() {
        let tree = ExprNode::Object(vec![Property::new(
            ExprNode::string("src/a"),
            ExprNode::binary(
                ExprNode::Call {
                    callee: "Var".to_string(),
                    args: vec![ExprNode::string("git")],
                },
                ExprNode::string("/a@1"),
            ),
        )]);

        let found = find_first(&Pattern::call("Var"), &tree).unwrap();
        assert!(matches!(found, Node::Expr(ExprNode::Call { callee, .. }) if callee == "Var"));

        let found = find_first(&Pattern::Literal(Some(Literal::Str("git".into()))), &tree);
        assert!(found.is_some());
    }

    #[test]
    fn test_find_first_not_found() {
        let tree = solutions();
        assert!(find_first(&Pattern::property_named("url"), &tree).is_none());
        assert!(find_first(&Pattern::Identifier(None), &tree).is_none());
    }

    #[test]
    fn test_partial_fields() {
        let prop = Property::new(ExprNode::string("url"), ExprNode::Identifier("x".into()));
        let pattern = Pattern::Property {
            key: None,
            value: Some(Box::new(Pattern::Identifier(None))),
        };
        assert!(pattern.matches(Node::Property(&prop)));
        assert!(!Pattern::AnyExpr.matches(Node::Property(&prop)));
    }

    #[test]
    fn test_list_patterns_match_leading_elements() {
        let array = ExprNode::Array(vec![ExprNode::string("a"), ExprNode::string("b")]);
        let first_is_a = Pattern::Array(Some(vec![Pattern::Literal(Some(Literal::Str("a".into())))]));
        assert!(first_is_a.matches(Node::Expr(&array)));
        assert!(Pattern::Array(Some(Vec::new())).matches(Node::Expr(&array)));

        let first_is_b = Pattern::Array(Some(vec![Pattern::Literal(Some(Literal::Str("b".into())))]));
        assert!(!first_is_b.matches(Node::Expr(&array)));

        let too_long = Pattern::Array(Some(vec![Pattern::AnyExpr; 3]));
        assert!(!too_long.matches(Node::Expr(&array)));

        let call = ExprNode::Call {
            callee: "Var".into(),
            args: vec![ExprNode::string("root"), ExprNode::string("extra")],
        };
        let var_root = Pattern::Call {
            callee: Some("Var".into()),
            args: Some(vec![Pattern::Literal(Some(Literal::Str("root".into())))]),
        };
        assert!(var_root.matches(Node::Expr(&call)));

        let object = ExprNode::Object(vec![
            Property::new(ExprNode::string("url"), ExprNode::string("x")),
            Property::new(ExprNode::string("condition"), ExprNode::Identifier("y".into())),
        ]);
        let url_first = Pattern::Object(Some(vec![Pattern::property_named("url")]));
        assert!(url_first.matches(Node::Expr(&object)));
    }

    #[test]
    fn test_literal_text() {
        assert_eq!(Literal::Number(3.0).as_text(), "3");
        assert_eq!(Literal::Number(1.5).as_text(), "1.5");
        assert_eq!(Literal::Bool(true).as_text(), "true");
    }
}
