//! Tree rewriting passes: reference substitution and constant folding.
//!
//! Each pass consumes a tree and rebuilds it. Folding repeats whole passes
//! until one performs no replacement, since folding a child can make its
//! parent foldable.

use crate::parser::{ExprNode, Literal, ManifestError, Property};
use crate::resolver::vars::VarTable;

/// Callee name of a variable reference, `Var("name")`.
pub const VAR_CALLEE: &str = "Var";

/// Which `+` operands may be replaced by a table value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum References {
    /// Only `Var("name")` calls; an unknown name is an error.
    VarCalls,
    /// `Var("name")` calls, plus bare identifiers naming a known variable.
    VarCallsAndIdentifiers,
}

/// Substitute references, then fold to a fixed point.
pub fn resolve(
    node: ExprNode,
    vars: &VarTable,
    refs: References,
) -> Result<ExprNode, ManifestError> {
    let node = substitute_references(node, vars, refs)?;
    Ok(fold_constants(node))
}

/// Replace variable references appearing as `+` operands with literals.
pub fn substitute_references(
    node: ExprNode,
    vars: &VarTable,
    refs: References,
) -> Result<ExprNode, ManifestError> {
    Ok(match node {
        ExprNode::Binary { left, right } => ExprNode::binary(
            substitute_operand(*left, vars, refs)?,
            substitute_operand(*right, vars, refs)?,
        ),
        ExprNode::Object(props) => ExprNode::Object(
            props
                .into_iter()
                .map(|p| {
                    Ok(Property::new(
                        substitute_references(p.key, vars, refs)?,
                        substitute_references(p.value, vars, refs)?,
                    ))
                })
                .collect::<Result<_, ManifestError>>()?,
        ),
        ExprNode::Array(items) => ExprNode::Array(substitute_all(items, vars, refs)?),
        ExprNode::Call { callee, args } => ExprNode::Call {
            callee,
            args: substitute_all(args, vars, refs)?,
        },
        leaf @ (ExprNode::Literal(_) | ExprNode::Identifier(_)) => leaf,
    })
}

fn substitute_all(
    nodes: Vec<ExprNode>,
    vars: &VarTable,
    refs: References,
) -> Result<Vec<ExprNode>, ManifestError> {
    nodes
        .into_iter()
        .map(|n| substitute_references(n, vars, refs))
        .collect()
}

fn substitute_operand(
    operand: ExprNode,
    vars: &VarTable,
    refs: References,
) -> Result<ExprNode, ManifestError> {
    if let Some(name) = var_reference(&operand) {
        let value = vars
            .get(&name)
            .ok_or_else(|| ManifestError::UnknownVariable { name: name.clone() })?;
        return Ok(ExprNode::string(value));
    }

    if let (References::VarCallsAndIdentifiers, ExprNode::Identifier(name)) = (refs, &operand) {
        if let Some(value) = vars.get(name) {
            return Ok(ExprNode::string(value));
        }
    }

    substitute_references(operand, vars, refs)
}

/// The variable named by a `Var("name")` call.
fn var_reference(node: &ExprNode) -> Option<String> {
    match node {
        ExprNode::Call { callee, args } if callee == VAR_CALLEE => match args.as_slice() {
            [ExprNode::Literal(lit)] => Some(lit.as_text()),
            _ => None,
        },
        _ => None,
    }
}

/// Fold `literal + literal` into one string literal until nothing changes.
pub fn fold_constants(mut node: ExprNode) -> ExprNode {
    loop {
        let mut folds = 0;
        node = fold_pass(node, &mut folds);
        if folds == 0 {
            return node;
        }
    }
}

fn fold_pass(node: ExprNode, folds: &mut usize) -> ExprNode {
    match node {
        ExprNode::Binary { left, right } => match (*left, *right) {
            (ExprNode::Literal(l), ExprNode::Literal(r)) => {
                *folds += 1;
                ExprNode::Literal(Literal::Str(l.as_text() + &r.as_text()))
            }
            (l, r) => ExprNode::binary(fold_pass(l, folds), fold_pass(r, folds)),
        },
        ExprNode::Object(props) => ExprNode::Object(
            props
                .into_iter()
                .map(|p| Property::new(fold_pass(p.key, folds), fold_pass(p.value, folds)))
                .collect(),
        ),
        ExprNode::Array(items) => {
            ExprNode::Array(items.into_iter().map(|n| fold_pass(n, folds)).collect())
        }
        ExprNode::Call { callee, args } => ExprNode::Call {
            callee,
            args: args.into_iter().map(|n| fold_pass(n, folds)).collect(),
        },
        leaf @ (ExprNode::Literal(_) | ExprNode::Identifier(_)) => leaf,
    }
}
