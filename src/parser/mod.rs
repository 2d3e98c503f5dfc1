//! Manifest text parsing.
//!
//! gclient manifests are Python-flavored text, not a data format. Parsing is
//! two-staged: the scanner carves the value of a top-level assignment out of
//! the raw text, then the expression parser turns that region into an
//! [`ExprNode`] tree.

pub mod errors;
pub mod expr;
pub mod parse;
pub mod scanner;
pub mod token;

pub use errors::ManifestError;
pub use expr::{find_first, ExprNode, Literal, Node, Pattern, Property};
pub use parse::parse;
pub use scanner::{find_matching, locate_assignment, normalize_comments, Delimiter};
