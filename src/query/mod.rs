//! Query front-end: compile path expressions and run them over a node tree.
//!
//! The engine is generic over [`TreeNavigator`], so anything that can walk a
//! tree the way [`Navigator`] does can be queried. [`QueryCache`] keeps
//! compiled queries around for callers that repeat expressions.

pub mod ast;
pub mod cache;
pub mod eval;
pub mod parser;

use std::cmp::Ordering;

pub use cache::QueryCache;

use crate::nav::{NavKind, Navigator};
use crate::node::NodeRef;
use crate::num::Scalar;
use crate::{Error, Result};

use ast::Expr;

/// The cursor contract the evaluator walks. Moves that cannot be made
/// return `false` and leave the cursor in place.
pub trait TreeNavigator: Clone {
    fn kind(&self) -> NavKind;
    fn local_name(&self) -> &str;
    fn text_value(&self) -> String;
    fn typed_value(&self) -> Option<&Scalar>;

    fn move_to_root(&mut self);
    fn move_to_parent(&mut self) -> bool;
    fn move_to_first_child(&mut self) -> bool;
    fn move_to_first_sibling(&mut self) -> bool;
    fn move_to_next_sibling(&mut self) -> bool;
    fn move_to_previous_sibling(&mut self) -> bool;

    fn is_same_position(&self, other: &Self) -> bool;
    fn compare_position(&self, other: &Self) -> Ordering;
}

/// A compiled path expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    source: String,
    expr: Expr,
}

impl Query {
    /// Parses `source`. Expressions that cannot yield nodes, such as
    /// `count(//a)`, are rejected.
    pub fn compile(source: &str) -> Result<Self> {
        let expr = parser::parse(source)?;
        if !expr.selects_nodes() {
            return Err(Error::query_syntax(source, "expression does not select nodes"));
        }
        tracing::debug!(query = source, "compiled query");
        Ok(Self {
            source: source.to_string(),
            expr,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Runs the query from `start` over any navigator implementation.
    pub fn select<N: TreeNavigator>(&self, start: &N) -> Vec<N> {
        eval::select(&self.expr, start)
    }

    /// All matches below `root` in document order.
    pub fn find<'a>(&self, root: NodeRef<'a>) -> Vec<NodeRef<'a>> {
        self.select(&Navigator::new(root))
            .iter()
            .map(Navigator::current)
            .collect()
    }

    pub fn find_one<'a>(&self, root: NodeRef<'a>) -> Option<NodeRef<'a>> {
        self.find(root).into_iter().next()
    }
}

/// Compiles `expr` without caching and returns every match.
pub fn find<'a>(root: NodeRef<'a>, expr: &str) -> Result<Vec<NodeRef<'a>>> {
    Ok(Query::compile(expr)?.find(root))
}

/// Compiles `expr` without caching and returns the first match, if any.
pub fn find_one<'a>(root: NodeRef<'a>, expr: &str) -> Result<Option<NodeRef<'a>>> {
    Ok(Query::compile(expr)?.find_one(root))
}
