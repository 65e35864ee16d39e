//! Path expression evaluator over any [`TreeNavigator`].
//!
//! Node-sets are kept as navigator clones in document order without
//! duplicates. Comparisons follow node-set semantics: a node-set matches when
//! any of its nodes does. Against a number, a node contributes its typed value
//! so `price <= 12.99` compares numerically; against a string, its text value.

use super::ast::{Axis, CompareOp, Expr, Function, LocationPath, NodeTest};
use super::TreeNavigator;
use crate::nav::NavKind;

/// Evaluates `expr` with `start` as the context node and returns the
/// selected nodes; expressions that do not yield nodes select nothing.
pub fn select<N: TreeNavigator>(expr: &Expr, start: &N) -> Vec<N> {
    let ctx = Context {
        node: start,
        position: 1,
        size: 1,
    };
    match evaluate(expr, &ctx) {
        Value::Nodes(nodes) => nodes,
        _ => Vec::new(),
    }
}

enum Value<N> {
    Nodes(Vec<N>),
    Boolean(bool),
    Number(f64),
    String(String),
}

enum Atom {
    Boolean(bool),
    Number(f64),
    String(String),
}

struct Context<'n, N> {
    node: &'n N,
    position: usize,
    size: usize,
}

fn evaluate<N: TreeNavigator>(expr: &Expr, ctx: &Context<'_, N>) -> Value<N> {
    match expr {
        Expr::Path(path) => Value::Nodes(evaluate_path(path, ctx.node)),
        Expr::Union(items) => {
            let mut nodes = Vec::new();
            for item in items {
                if let Value::Nodes(selected) = evaluate(item, ctx) {
                    nodes.extend(selected);
                }
            }
            sort_and_dedup(&mut nodes);
            Value::Nodes(nodes)
        }
        Expr::Or(left, right) => {
            Value::Boolean(to_boolean(&evaluate(left, ctx)) || to_boolean(&evaluate(right, ctx)))
        }
        Expr::And(left, right) => {
            Value::Boolean(to_boolean(&evaluate(left, ctx)) && to_boolean(&evaluate(right, ctx)))
        }
        Expr::Compare { left, op, right } => {
            let left = evaluate(left, ctx);
            let right = evaluate(right, ctx);
            Value::Boolean(compare(&left, *op, &right))
        }
        Expr::Literal(s) => Value::String(s.clone()),
        Expr::Number(n) => Value::Number(*n),
        Expr::Call { function, args } => call(*function, args, ctx),
    }
}

fn evaluate_path<N: TreeNavigator>(path: &LocationPath, start: &N) -> Vec<N> {
    let mut origin = start.clone();
    if path.absolute {
        origin.move_to_root();
    }

    let mut current = vec![origin];
    for step in &path.steps {
        let mut next = Vec::new();
        for node in &current {
            let mut candidates = Vec::new();
            collect_axis(node, step.axis, &mut candidates);
            candidates.retain(|candidate| matches_test(candidate, &step.test));
            for predicate in &step.predicates {
                candidates = filter_by_predicate(candidates, predicate);
            }
            next.extend(candidates);
        }
        sort_and_dedup(&mut next);
        current = next;
    }
    current
}

/// Pushes the nodes of `axis` in axis order: nearest first for reverse axes.
fn collect_axis<N: TreeNavigator>(node: &N, axis: Axis, out: &mut Vec<N>) {
    match axis {
        Axis::Child => {
            let mut cursor = node.clone();
            if cursor.move_to_first_child() {
                loop {
                    out.push(cursor.clone());
                    if !cursor.move_to_next_sibling() {
                        break;
                    }
                }
            }
        }
        Axis::Descendant => collect_descendants(node, out),
        Axis::DescendantOrSelf => {
            out.push(node.clone());
            collect_descendants(node, out);
        }
        Axis::Parent => {
            let mut cursor = node.clone();
            if cursor.move_to_parent() {
                out.push(cursor);
            }
        }
        Axis::Ancestor | Axis::AncestorOrSelf => {
            if axis == Axis::AncestorOrSelf {
                out.push(node.clone());
            }
            let mut cursor = node.clone();
            while cursor.move_to_parent() {
                out.push(cursor.clone());
            }
        }
        Axis::SelfAxis => out.push(node.clone()),
        Axis::FollowingSibling => {
            let mut cursor = node.clone();
            while cursor.move_to_next_sibling() {
                out.push(cursor.clone());
            }
        }
        Axis::PrecedingSibling => {
            let mut cursor = node.clone();
            while cursor.move_to_previous_sibling() {
                out.push(cursor.clone());
            }
        }
    }
}

fn collect_descendants<N: TreeNavigator>(node: &N, out: &mut Vec<N>) {
    let mut cursor = node.clone();
    if !cursor.move_to_first_child() {
        return;
    }
    loop {
        out.push(cursor.clone());
        collect_descendants(&cursor, out);
        if !cursor.move_to_next_sibling() {
            break;
        }
    }
}

fn matches_test<N: TreeNavigator>(node: &N, test: &NodeTest) -> bool {
    match test {
        NodeTest::Name(name) => node.kind() == NavKind::Element && node.local_name() == name.as_str(),
        NodeTest::AnyElement => node.kind() == NavKind::Element,
        NodeTest::Text => node.kind() == NavKind::Text,
        NodeTest::AnyNode => true,
    }
}

fn filter_by_predicate<N: TreeNavigator>(candidates: Vec<N>, predicate: &Expr) -> Vec<N> {
    let size = candidates.len();
    candidates
        .into_iter()
        .enumerate()
        .filter_map(|(index, node)| {
            let ctx = Context {
                node: &node,
                position: index + 1,
                size,
            };
            let keep = match evaluate(predicate, &ctx) {
                Value::Number(n) => n == (index + 1) as f64,
                other => to_boolean(&other),
            };
            keep.then_some(node)
        })
        .collect()
}

fn sort_and_dedup<N: TreeNavigator>(nodes: &mut Vec<N>) {
    nodes.sort_by(|a, b| a.compare_position(b));
    nodes.dedup_by(|a, b| a.is_same_position(b));
}

fn call<N: TreeNavigator>(function: Function, args: &[Expr], ctx: &Context<'_, N>) -> Value<N> {
    let arg = |i: usize| args.get(i).map(|expr| evaluate(expr, ctx));
    match function {
        Function::Not => Value::Boolean(!arg(0).is_some_and(|v| to_boolean(&v))),
        Function::Count => match arg(0) {
            Some(Value::Nodes(nodes)) => Value::Number(nodes.len() as f64),
            _ => Value::Number(f64::NAN),
        },
        Function::Contains | Function::StartsWith => {
            let haystack = arg(0).map(|v| to_string(&v)).unwrap_or_default();
            let needle = arg(1).map(|v| to_string(&v)).unwrap_or_default();
            Value::Boolean(if function == Function::Contains {
                haystack.contains(&needle)
            } else {
                haystack.starts_with(&needle)
            })
        }
        Function::Name => match arg(0) {
            Some(Value::Nodes(nodes)) => Value::String(
                nodes
                    .first()
                    .map(|node| node.local_name().to_string())
                    .unwrap_or_default(),
            ),
            Some(_) => Value::String(String::new()),
            None => Value::String(ctx.node.local_name().to_string()),
        },
        Function::String => Value::String(match arg(0) {
            Some(v) => to_string(&v),
            None => ctx.node.text_value(),
        }),
        Function::Number => Value::Number(match arg(0) {
            Some(v) => to_number(&v),
            None => node_number(ctx.node),
        }),
        Function::Position => Value::Number(ctx.position as f64),
        Function::Last => Value::Number(ctx.size as f64),
        Function::True => Value::Boolean(true),
        Function::False => Value::Boolean(false),
    }
}

fn node_number<N: TreeNavigator>(node: &N) -> f64 {
    match node.typed_value() {
        Some(scalar) => scalar.as_f64(),
        None => node.text_value().trim().parse().unwrap_or(f64::NAN),
    }
}

fn to_boolean<N>(value: &Value<N>) -> bool {
    match value {
        Value::Nodes(nodes) => !nodes.is_empty(),
        Value::Boolean(b) => *b,
        Value::Number(n) => *n != 0.0 && !n.is_nan(),
        Value::String(s) => !s.is_empty(),
    }
}

fn to_number<N: TreeNavigator>(value: &Value<N>) -> f64 {
    match value {
        Value::Nodes(nodes) => nodes.first().map_or(f64::NAN, node_number),
        Value::Boolean(b) => f64::from(u8::from(*b)),
        Value::Number(n) => *n,
        Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
    }
}

fn to_string<N: TreeNavigator>(value: &Value<N>) -> String {
    match value {
        Value::Nodes(nodes) => nodes.first().map(N::text_value).unwrap_or_default(),
        Value::Boolean(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
    }
}

fn compare<N: TreeNavigator>(left: &Value<N>, op: CompareOp, right: &Value<N>) -> bool {
    match (left, right) {
        (Value::Nodes(l), Value::Nodes(r)) => l.iter().any(|a| {
            r.iter().any(|b| match op {
                CompareOp::Eq | CompareOp::Ne => compare_atoms(
                    &Atom::String(a.text_value()),
                    op,
                    &Atom::String(b.text_value()),
                ),
                _ => compare_atoms(
                    &Atom::Number(node_number(a)),
                    op,
                    &Atom::Number(node_number(b)),
                ),
            })
        }),
        (Value::Nodes(nodes), other) => compare_nodes_with(nodes, op, &to_atom(other)),
        (other, Value::Nodes(nodes)) => compare_nodes_with(nodes, op.swapped(), &to_atom(other)),
        (l, r) => compare_atoms(&to_atom(l), op, &to_atom(r)),
    }
}

fn compare_nodes_with<N: TreeNavigator>(nodes: &[N], op: CompareOp, atom: &Atom) -> bool {
    match atom {
        Atom::Boolean(_) => compare_atoms(&Atom::Boolean(!nodes.is_empty()), op, atom),
        Atom::Number(_) => nodes
            .iter()
            .any(|node| compare_atoms(&Atom::Number(node_number(node)), op, atom)),
        Atom::String(_) => nodes
            .iter()
            .any(|node| compare_atoms(&Atom::String(node.text_value()), op, atom)),
    }
}

fn to_atom<N: TreeNavigator>(value: &Value<N>) -> Atom {
    match value {
        Value::Boolean(b) => Atom::Boolean(*b),
        Value::Number(n) => Atom::Number(*n),
        Value::String(s) => Atom::String(s.clone()),
        Value::Nodes(_) => Atom::String(to_string(value)),
    }
}

fn compare_atoms(left: &Atom, op: CompareOp, right: &Atom) -> bool {
    match op {
        CompareOp::Eq | CompareOp::Ne => {
            let equal = match (left, right) {
                (Atom::Boolean(_), _) | (_, Atom::Boolean(_)) => {
                    atom_boolean(left) == atom_boolean(right)
                }
                (Atom::Number(_), _) | (_, Atom::Number(_)) => {
                    atom_number(left) == atom_number(right)
                }
                (Atom::String(l), Atom::String(r)) => l == r,
            };
            equal == (op == CompareOp::Eq)
        }
        CompareOp::Lt => atom_number(left) < atom_number(right),
        CompareOp::Le => atom_number(left) <= atom_number(right),
        CompareOp::Gt => atom_number(left) > atom_number(right),
        CompareOp::Ge => atom_number(left) >= atom_number(right),
    }
}

fn atom_boolean(atom: &Atom) -> bool {
    match atom {
        Atom::Boolean(b) => *b,
        Atom::Number(n) => *n != 0.0 && !n.is_nan(),
        Atom::String(s) => !s.is_empty(),
    }
}

fn atom_number(atom: &Atom) -> f64 {
    match atom {
        Atom::Boolean(b) => f64::from(u8::from(*b)),
        Atom::Number(n) => *n,
        Atom::String(s) => s.trim().parse().unwrap_or(f64::NAN),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::query::parser::parse;
    use crate::{build, Document};

    fn labels(doc: &Document, expr: &str) -> Vec<String> {
        let parsed = parse(expr).unwrap();
        select(&parsed, &doc.navigator())
            .iter()
            .map(|nav| nav.current().label().to_string())
            .collect()
    }

    fn sample() -> Document {
        build(&json!({
            "a": {"x": 1, "y": 2, "z": 3},
            "b": [{"x": 10}, {"x": 20}],
            "c": "text"
        }))
        .unwrap()
    }

    #[rstest]
    fn test_child_and_descendant_axes() {
        let doc = sample();
        assert_eq!(labels(&doc, "/a/*"), vec!["x", "y", "z"]);
        assert_eq!(labels(&doc, "//x"), vec!["x", "x", "x"]);
        assert_eq!(labels(&doc, "/a/descendant::*"), vec!["x", "y", "z"]);
    }

    #[rstest]
    fn test_results_in_document_order_without_duplicates() {
        let doc = sample();
        assert_eq!(labels(&doc, "//x/.. | /a"), vec!["a", "", ""]);
        assert_eq!(labels(&doc, "//x/ancestor::*"), vec!["a", "b", "", ""]);
    }

    #[rstest]
    fn test_sibling_axes() {
        let doc = sample();
        assert_eq!(labels(&doc, "/a/y/following-sibling::*"), vec!["z"]);
        assert_eq!(labels(&doc, "/a/y/preceding-sibling::*"), vec!["x"]);
        // Reverse axes count positions nearest first.
        assert_eq!(labels(&doc, "/a/z/preceding-sibling::*[1]"), vec!["y"]);
    }

    #[rstest]
    fn test_position_predicates() {
        let doc = sample();
        assert_eq!(labels(&doc, "/a/*[2]"), vec!["y"]);
        assert_eq!(labels(&doc, "/a/*[last()]"), vec!["z"]);
        assert_eq!(labels(&doc, "/a/*[position() > 1]"), vec!["y", "z"]);
    }

    #[rstest]
    fn test_numeric_comparison_uses_typed_value() {
        let doc = sample();
        // "10" < "9" lexicographically; numerically it is not.
        assert_eq!(labels(&doc, "/b/*[x > 9]").len(), 2);
        assert_eq!(labels(&doc, "/b/*[x >= 20]").len(), 1);
        assert_eq!(labels(&doc, "/b/*[15 > x]").len(), 1);
    }

    #[rstest]
    fn test_string_comparison_and_functions() {
        let doc = sample();
        assert_eq!(labels(&doc, "/*[text() = 'text']"), vec!["c"]);
        assert_eq!(labels(&doc, "/*[. != 'text']"), vec!["a", "b"]);
        assert_eq!(labels(&doc, "/*[contains(., 'ex')]"), vec!["c"]);
        assert_eq!(labels(&doc, "/*[starts-with(name(), 'b')]"), vec!["b"]);
        assert_eq!(labels(&doc, "/*[count(*) = 3]"), vec!["a"]);
        // A text child is not an element.
        assert_eq!(labels(&doc, "/*[not(*)]"), vec!["c"]);
    }

    #[rstest]
    fn test_boolean_connectives() {
        let doc = sample();
        assert_eq!(labels(&doc, "/a/*[. = 1 or . = 3]"), vec!["x", "z"]);
        assert_eq!(labels(&doc, "/a/*[. > 1 and . < 3]"), vec!["y"]);
    }

    #[rstest]
    fn test_text_nodes_are_selectable() {
        let doc = sample();
        let parsed = parse("/c/text()").unwrap();
        let found = select(&parsed, &doc.navigator());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind(), NavKind::Text);
        assert_eq!(found[0].text_value(), "text");
    }

    #[rstest]
    fn test_relative_path_from_inner_node() {
        let doc = sample();
        let a = doc.root().select_element("a").unwrap();
        let parsed = parse("y").unwrap();
        let found = select(&parsed, &a.navigator());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].current().label(), "y");

        let parsed = parse("/c").unwrap();
        assert_eq!(select(&parsed, &a.navigator()).len(), 1);
    }

    #[rstest]
    fn test_root_only() {
        let doc = sample();
        let parsed = parse("/").unwrap();
        let found = select(&parsed, &doc.navigator());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind(), NavKind::Root);
    }
}
