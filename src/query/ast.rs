//! Path expression AST

use smallvec::SmallVec;
use smol_str::SmolStr;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Path(LocationPath),
    /// `a | b`
    Union(Vec<Expr>),
    Or(Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Compare {
        left: Box<Expr>,
        op: CompareOp,
        right: Box<Expr>,
    },
    Literal(String),
    Number(f64),
    Call {
        function: Function,
        args: Vec<Expr>,
    },
}

impl Expr {
    /// Whether evaluating this expression always yields a node-set.
    pub fn selects_nodes(&self) -> bool {
        match self {
            Expr::Path(_) => true,
            Expr::Union(items) => items.iter().all(Expr::selects_nodes),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationPath {
    pub absolute: bool,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub axis: Axis,
    pub test: NodeTest,
    pub predicates: SmallVec<[Expr; 1]>,
}

impl Step {
    pub fn new(axis: Axis, test: NodeTest) -> Self {
        Self {
            axis,
            test,
            predicates: SmallVec::new(),
        }
    }

    /// The step `//` abbreviates.
    pub fn descendant_or_self() -> Self {
        Self::new(Axis::DescendantOrSelf, NodeTest::AnyNode)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Child,
    Descendant,
    DescendantOrSelf,
    Parent,
    Ancestor,
    AncestorOrSelf,
    SelfAxis,
    FollowingSibling,
    PrecedingSibling,
}

impl Axis {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "child" => Axis::Child,
            "descendant" => Axis::Descendant,
            "descendant-or-self" => Axis::DescendantOrSelf,
            "parent" => Axis::Parent,
            "ancestor" => Axis::Ancestor,
            "ancestor-or-self" => Axis::AncestorOrSelf,
            "self" => Axis::SelfAxis,
            "following-sibling" => Axis::FollowingSibling,
            "preceding-sibling" => Axis::PrecedingSibling,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTest {
    /// Element with this name.
    Name(SmolStr),
    /// `*`
    AnyElement,
    /// `text()`
    Text,
    /// `node()`
    AnyNode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    /// The operator that gives the same result with operands swapped.
    pub fn swapped(self) -> Self {
        match self {
            CompareOp::Lt => CompareOp::Gt,
            CompareOp::Le => CompareOp::Ge,
            CompareOp::Gt => CompareOp::Lt,
            CompareOp::Ge => CompareOp::Le,
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Not,
    Count,
    Contains,
    StartsWith,
    Name,
    String,
    Number,
    Position,
    Last,
    True,
    False,
}

impl Function {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "not" => Function::Not,
            "count" => Function::Count,
            "contains" => Function::Contains,
            "starts-with" => Function::StartsWith,
            "name" | "local-name" => Function::Name,
            "string" => Function::String,
            "number" => Function::Number,
            "position" => Function::Position,
            "last" => Function::Last,
            "true" => Function::True,
            "false" => Function::False,
            _ => return None,
        })
    }

    /// Accepted argument counts, inclusive.
    pub fn arity(self) -> (usize, usize) {
        match self {
            Function::Not | Function::Count => (1, 1),
            Function::Contains | Function::StartsWith => (2, 2),
            Function::Name | Function::String | Function::Number => (0, 1),
            Function::Position | Function::Last | Function::True | Function::False => (0, 0),
        }
    }
}
