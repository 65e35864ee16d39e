//! Path expression parser

use smallvec::SmallVec;
use smol_str::SmolStr;

use super::ast::*;
use crate::constants::MAX_QUERY_DEPTH;
use crate::{Error, Result};

/// Parse an expression string into an AST
pub fn parse(input: &str) -> Result<Expr> {
    let mut parser = Parser::new(input);
    let expr = parser.parse_or()?;
    parser.skip_whitespace();
    match parser.peek() {
        None => Ok(expr),
        Some(c) => Err(parser.error(format!("unexpected '{c}' at offset {}", parser.pos))),
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    /// Open `parse_or` activations.
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
        }
    }

    fn error(&self, reason: impl AsRef<str>) -> Error {
        Error::query_syntax(self.input, reason)
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.remaining().chars().nth(1)
    }

    fn advance(&mut self, n: usize) {
        self.pos += n;
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek().filter(|c| c.is_whitespace()) {
            self.advance(c.len_utf8());
        }
    }

    fn expect_char(&mut self, expected: char) -> Result<()> {
        self.skip_whitespace();
        match self.peek() {
            Some(c) if c == expected => {
                self.advance(c.len_utf8());
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected '{expected}', got '{c}'"))),
            None => Err(self.error(format!("expected '{expected}', got end of input"))),
        }
    }

    /// Consumes `keyword` when it stands alone as the next token.
    fn eat_keyword(&mut self, keyword: &str) -> bool {
        self.skip_whitespace();
        let rest = self.remaining();
        if !rest.starts_with(keyword) {
            return false;
        }
        let boundary = rest[keyword.len()..].chars().next();
        if boundary.is_some_and(is_name_char) {
            return false;
        }
        self.advance(keyword.len());
        true
    }

    fn parse_or(&mut self) -> Result<Expr> {
        self.depth += 1;
        if self.depth > MAX_QUERY_DEPTH {
            return Err(self.error("expression nests too deeply"));
        }
        let expr = self.parse_or_operands();
        self.depth -= 1;
        expr
    }

    fn parse_or_operands(&mut self) -> Result<Expr> {
        let mut left = self.parse_and()?;
        while self.eat_keyword("or") {
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut left = self.parse_comparison()?;
        while self.eat_keyword("and") {
            let right = self.parse_comparison()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr> {
        let mut left = self.parse_union()?;
        while let Some(op) = self.parse_compare_op() {
            let right = self.parse_union()?;
            left = Expr::Compare {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_compare_op(&mut self) -> Option<CompareOp> {
        self.skip_whitespace();
        let (op, len) = match (self.peek()?, self.peek_second()) {
            ('=', _) => (CompareOp::Eq, 1),
            ('!', Some('=')) => (CompareOp::Ne, 2),
            ('<', Some('=')) => (CompareOp::Le, 2),
            ('<', _) => (CompareOp::Lt, 1),
            ('>', Some('=')) => (CompareOp::Ge, 2),
            ('>', _) => (CompareOp::Gt, 1),
            _ => return None,
        };
        self.advance(len);
        Some(op)
    }

    fn parse_union(&mut self) -> Result<Expr> {
        let first = self.parse_primary()?;
        self.skip_whitespace();
        if self.peek() != Some('|') {
            return Ok(first);
        }

        let mut items = vec![first];
        while self.peek() == Some('|') {
            self.advance(1);
            items.push(self.parse_primary()?);
            self.skip_whitespace();
        }
        if !items.iter().all(Expr::selects_nodes) {
            return Err(self.error("union operands must select nodes"));
        }
        Ok(Expr::Union(items))
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        self.skip_whitespace();
        match self.peek() {
            Some('\'') | Some('"') => Ok(Expr::Literal(self.parse_string_literal()?)),
            Some(c) if c.is_ascii_digit() => self.parse_number(),
            Some('.') if self.peek_second().is_some_and(|c| c.is_ascii_digit()) => {
                self.parse_number()
            }
            Some('-') if self.peek_second().is_some_and(|c| c.is_ascii_digit() || c == '.') => {
                self.advance(1);
                match self.parse_number()? {
                    Expr::Number(n) => Ok(Expr::Number(-n)),
                    other => Ok(other),
                }
            }
            Some('(') => {
                self.advance(1);
                let expr = self.parse_or()?;
                self.expect_char(')')?;
                Ok(expr)
            }
            Some('/') | Some('.') | Some('*') => Ok(Expr::Path(self.parse_path()?)),
            Some(c) if is_name_start(c) => {
                let start = self.pos;
                let name = self.parse_name()?;
                self.skip_whitespace();
                if self.peek() == Some('(') && !matches!(name, "text" | "node") {
                    self.parse_call(name)
                } else {
                    self.pos = start;
                    Ok(Expr::Path(self.parse_path()?))
                }
            }
            Some(c) => Err(self.error(format!("unexpected '{c}' at offset {}", self.pos))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn parse_call(&mut self, name: &str) -> Result<Expr> {
        let function = Function::from_name(name)
            .ok_or_else(|| self.error(format!("unknown function '{name}'")))?;
        self.expect_char('(')?;

        let mut args = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(')') {
            self.advance(1);
        } else {
            loop {
                args.push(self.parse_or()?);
                self.skip_whitespace();
                match self.peek() {
                    Some(',') => self.advance(1),
                    Some(')') => {
                        self.advance(1);
                        break;
                    }
                    _ => return Err(self.error(format!("unterminated call to '{name}'"))),
                }
            }
        }

        let (min, max) = function.arity();
        if args.len() < min || args.len() > max {
            return Err(self.error(format!(
                "'{name}' takes {min}..={max} arguments, got {}",
                args.len()
            )));
        }
        Ok(Expr::Call { function, args })
    }

    fn parse_path(&mut self) -> Result<LocationPath> {
        self.skip_whitespace();
        let mut steps = Vec::new();
        let absolute = self.peek() == Some('/');

        if absolute {
            self.advance(1);
            if self.peek() == Some('/') {
                self.advance(1);
                steps.push(Step::descendant_or_self());
                steps.push(self.parse_step()?);
            } else if self.at_step_start() {
                steps.push(self.parse_step()?);
            } else {
                // A lone `/` selects the root.
                return Ok(LocationPath { absolute, steps });
            }
        } else {
            steps.push(self.parse_step()?);
        }

        loop {
            self.skip_whitespace();
            if self.peek() != Some('/') {
                break;
            }
            self.advance(1);
            if self.peek() == Some('/') {
                self.advance(1);
                steps.push(Step::descendant_or_self());
            }
            steps.push(self.parse_step()?);
        }

        Ok(LocationPath { absolute, steps })
    }

    fn at_step_start(&mut self) -> bool {
        self.skip_whitespace();
        self.peek()
            .is_some_and(|c| c == '.' || c == '*' || is_name_start(c))
    }

    fn parse_step(&mut self) -> Result<Step> {
        self.skip_whitespace();
        let mut step = if self.remaining().starts_with("..") {
            self.advance(2);
            Step::new(Axis::Parent, NodeTest::AnyNode)
        } else if self.peek() == Some('.') {
            self.advance(1);
            Step::new(Axis::SelfAxis, NodeTest::AnyNode)
        } else {
            let axis = self.parse_axis()?;
            let test = self.parse_node_test()?;
            Step::new(axis, test)
        };
        step.predicates = self.parse_predicates()?;
        Ok(step)
    }

    fn parse_axis(&mut self) -> Result<Axis> {
        let start = self.pos;
        if self.peek().is_some_and(is_name_start) {
            let name = self.parse_name()?;
            self.skip_whitespace();
            if self.remaining().starts_with("::") {
                self.advance(2);
                return Axis::from_name(name)
                    .ok_or_else(|| self.error(format!("unknown axis '{name}'")));
            }
        }
        self.pos = start;
        Ok(Axis::Child)
    }

    fn parse_node_test(&mut self) -> Result<NodeTest> {
        self.skip_whitespace();
        if self.peek() == Some('*') {
            self.advance(1);
            return Ok(NodeTest::AnyElement);
        }

        let name = self.parse_name()?;
        let start = self.pos;
        self.skip_whitespace();
        if self.peek() != Some('(') {
            self.pos = start;
            return Ok(NodeTest::Name(SmolStr::new(name)));
        }
        let test = match name {
            "text" => NodeTest::Text,
            "node" => NodeTest::AnyNode,
            other => return Err(self.error(format!("'{other}()' is not a node test"))),
        };
        self.advance(1);
        self.expect_char(')')?;
        Ok(test)
    }

    fn parse_predicates(&mut self) -> Result<SmallVec<[Expr; 1]>> {
        let mut predicates = SmallVec::new();
        loop {
            self.skip_whitespace();
            if self.peek() != Some('[') {
                return Ok(predicates);
            }
            self.advance(1);
            predicates.push(self.parse_or()?);
            self.expect_char(']')?;
        }
    }

    fn parse_name(&mut self) -> Result<&'a str> {
        let start = self.pos;
        match self.peek() {
            Some(c) if is_name_start(c) => self.advance(c.len_utf8()),
            Some(c) => return Err(self.error(format!("expected name, got '{c}'"))),
            None => return Err(self.error("expected name, got end of input")),
        }
        while let Some(c) = self.peek().filter(|c| is_name_char(*c)) {
            self.advance(c.len_utf8());
        }
        Ok(&self.input[start..self.pos])
    }

    fn parse_string_literal(&mut self) -> Result<String> {
        let quote = match self.peek() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err(self.error("expected string literal")),
        };
        self.advance(1);
        let rest = self.remaining();
        let end = rest
            .find(quote)
            .ok_or_else(|| self.error("unterminated string literal"))?;
        let value = rest[..end].to_string();
        self.advance(end + 1);
        Ok(value)
    }

    fn parse_number(&mut self) -> Result<Expr> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance(1);
        }
        if self.peek() == Some('.') {
            self.advance(1);
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance(1);
            }
        }
        self.input[start..self.pos]
            .parse()
            .map(Expr::Number)
            .map_err(|_| self.error(format!("invalid number '{}'", &self.input[start..self.pos])))
    }
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.')
}
