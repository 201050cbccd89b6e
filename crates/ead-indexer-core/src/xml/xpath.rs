//! XPath 1.0 subset evaluated over [`Document`].
//!
//! Supported: absolute and relative location paths, `//`, `.`, `..`, the
//! axes `child`, `descendant`, `descendant-or-self`, `parent`, `ancestor`,
//! `ancestor-or-self`, `self`, `attribute` (`@`), `following-sibling` and
//! `preceding-sibling`, node tests by name, `*`, `text()` and `node()`,
//! boolean and positional predicates, `|`, `or`, `and`, `=`, `!=`, string
//! and number literals, and the functions `not`, `translate`, `local-name`,
//! `name`, `contains`, `starts-with`, `normalize-space`, `string`, `count`,
//! `true`, `false`, `position` and `last`.
//!
//! Name tests compare local names, so unprefixed queries match elements in
//! the EAD default namespace.

use super::dom::{local_name, Document, NodeKind, NodeRef};
use crate::error::XPathError;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Slash,
    DoubleSlash,
    LBracket,
    RBracket,
    LParen,
    RParen,
    At,
    Comma,
    Pipe,
    Eq,
    NotEq,
    Dot,
    DotDot,
    ColonColon,
    Star,
    Name(String),
    Literal(String),
    Number(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
    DescendantOrSelf,
    Parent,
    Ancestor,
    AncestorOrSelf,
    SelfAxis,
    Attribute,
    FollowingSibling,
    PrecedingSibling,
}

impl Axis {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "child" => Axis::Child,
            "descendant" => Axis::Descendant,
            "descendant-or-self" => Axis::DescendantOrSelf,
            "parent" => Axis::Parent,
            "ancestor" => Axis::Ancestor,
            "ancestor-or-self" => Axis::AncestorOrSelf,
            "self" => Axis::SelfAxis,
            "attribute" => Axis::Attribute,
            "following-sibling" => Axis::FollowingSibling,
            "preceding-sibling" => Axis::PrecedingSibling,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
enum NodeTest {
    Name(String),
    Any,
    Text,
    Node,
}

#[derive(Debug, Clone)]
struct Step {
    axis: Axis,
    test: NodeTest,
    predicates: Vec<Expr>,
}

impl Step {
    fn descendant_or_self() -> Self {
        Step {
            axis: Axis::DescendantOrSelf,
            test: NodeTest::Node,
            predicates: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct LocationPath {
    absolute: bool,
    steps: Vec<Step>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Function {
    Not,
    Translate,
    LocalName,
    Name,
    Contains,
    StartsWith,
    NormalizeSpace,
    String,
    Count,
    True,
    False,
    Position,
    Last,
}

impl Function {
    fn lookup(name: &str) -> Option<Self> {
        Some(match name {
            "not" => Function::Not,
            "translate" => Function::Translate,
            "local-name" => Function::LocalName,
            "name" => Function::Name,
            "contains" => Function::Contains,
            "starts-with" => Function::StartsWith,
            "normalize-space" => Function::NormalizeSpace,
            "string" => Function::String,
            "count" => Function::Count,
            "true" => Function::True,
            "false" => Function::False,
            "position" => Function::Position,
            "last" => Function::Last,
            _ => return None,
        })
    }

    /// Minimum and maximum argument counts, plus a label for errors.
    fn arity(self) -> (usize, usize, &'static str) {
        match self {
            Function::Not | Function::Count => (1, 1, "1"),
            Function::Translate => (3, 3, "3"),
            Function::Contains | Function::StartsWith => (2, 2, "2"),
            Function::LocalName | Function::Name | Function::NormalizeSpace | Function::String => {
                (0, 1, "0 or 1")
            }
            Function::True | Function::False | Function::Position | Function::Last => (0, 0, "0"),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Function::Not => "not",
            Function::Translate => "translate",
            Function::LocalName => "local-name",
            Function::Name => "name",
            Function::Contains => "contains",
            Function::StartsWith => "starts-with",
            Function::NormalizeSpace => "normalize-space",
            Function::String => "string",
            Function::Count => "count",
            Function::True => "true",
            Function::False => "false",
            Function::Position => "position",
            Function::Last => "last",
        }
    }
}

#[derive(Debug, Clone)]
enum Expr {
    Or(Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Equals {
        left: Box<Expr>,
        right: Box<Expr>,
        negate: bool,
    },
    Union(Vec<Expr>),
    Path(LocationPath),
    Literal(String),
    Number(f64),
    Call(Function, Vec<Expr>),
}

/// Result of evaluating an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nodes(Vec<NodeRef>),
    String(String),
    Number(f64),
    Boolean(bool),
}

impl Value {
    /// XPath `string()` conversion.
    pub fn to_string_value(&self, doc: &Document) -> String {
        Evaluator { doc }.to_string(self)
    }
}

/// A compiled XPath expression.
#[derive(Debug, Clone)]
pub struct XPath {
    source: String,
    expr: Expr,
}

impl XPath {
    pub fn compile(source: &str) -> Result<Self, XPathError> {
        let tokens = tokenize(source)?;
        let mut parser = Parser {
            tokens,
            pos: 0,
            source,
        };
        let expr = parser.parse_expr()?;
        if parser.pos != parser.tokens.len() {
            return Err(parser.error("unexpected trailing tokens"));
        }
        Ok(Self {
            source: source.to_string(),
            expr,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate with `context` as the context node.
    pub fn evaluate(&self, doc: &Document, context: NodeRef) -> Result<Value, XPathError> {
        let ctx = Context {
            node: context,
            position: 1,
            size: 1,
        };
        Evaluator { doc }.eval(&self.expr, ctx)
    }

    /// Evaluate and require a node-set, returned in document order.
    pub fn select(&self, doc: &Document, context: NodeRef) -> Result<Vec<NodeRef>, XPathError> {
        match self.evaluate(doc, context)? {
            Value::Nodes(nodes) => Ok(nodes),
            _ => Err(XPathError::NotANodeSet(self.source.clone())),
        }
    }
}

// ─── Lexer ──────────────────────────────────────────────────────────

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.')
}

fn tokenize(source: &str) -> Result<Vec<Token>, XPathError> {
    let chars: Vec<char> = source.chars().collect();
    let syntax = |message: &str| XPathError::Syntax {
        expr: source.to_string(),
        message: message.to_string(),
    };
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match c {
            c if c.is_whitespace() => i += 1,
            '/' if next == Some('/') => {
                tokens.push(Token::DoubleSlash);
                i += 2;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '[' | ']' | '(' | ')' | '@' | ',' | '|' | '*' | '=' => {
                tokens.push(match c {
                    '[' => Token::LBracket,
                    ']' => Token::RBracket,
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    '@' => Token::At,
                    ',' => Token::Comma,
                    '|' => Token::Pipe,
                    '*' => Token::Star,
                    _ => Token::Eq,
                });
                i += 1;
            }
            '!' if next == Some('=') => {
                tokens.push(Token::NotEq);
                i += 2;
            }
            ':' if next == Some(':') => {
                tokens.push(Token::ColonColon);
                i += 2;
            }
            '.' if next == Some('.') => {
                tokens.push(Token::DotDot);
                i += 2;
            }
            '.' if !next.is_some_and(|n| n.is_ascii_digit()) => {
                tokens.push(Token::Dot);
                i += 1;
            }
            '\'' | '"' => {
                let end = chars[i + 1..]
                    .iter()
                    .position(|&q| q == c)
                    .ok_or_else(|| syntax("unterminated string literal"))?;
                tokens.push(Token::Literal(chars[i + 1..i + 1 + end].iter().collect()));
                i += end + 2;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let value = text.parse().map_err(|_| syntax("invalid number"))?;
                tokens.push(Token::Number(value));
            }
            c if is_name_start(c) => {
                let start = i;
                i += 1;
                while i < chars.len() {
                    if is_name_char(chars[i]) {
                        i += 1;
                    } else if chars[i] == ':'
                        && chars.get(i + 1).is_some_and(|&n| is_name_start(n) || n == '*')
                    {
                        // QName prefix separator, not an axis `::`.
                        i += 1;
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Name(chars[start..i].iter().collect()));
            }
            _ => return Err(syntax(&format!("unexpected character '{}'", c))),
        }
    }

    Ok(tokens)
}

// ─── Parser ─────────────────────────────────────────────────────────

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    source: &'a str,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn error(&self, message: &str) -> XPathError {
        XPathError::Syntax {
            expr: self.source.to_string(),
            message: message.to_string(),
        }
    }

    fn expect(&mut self, token: Token) -> Result<(), XPathError> {
        if self.peek() == Some(&token) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected {:?}", token)))
        }
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Name(n)) if n == keyword)
    }

    fn parse_expr(&mut self) -> Result<Expr, XPathError> {
        let mut left = self.parse_and()?;
        while self.peek_keyword("or") {
            self.pos += 1;
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, XPathError> {
        let mut left = self.parse_equality()?;
        while self.peek_keyword("and") {
            self.pos += 1;
            let right = self.parse_equality()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, XPathError> {
        let mut left = self.parse_union()?;
        loop {
            let negate = match self.peek() {
                Some(Token::Eq) => false,
                Some(Token::NotEq) => true,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_union()?;
            left = Expr::Equals {
                left: Box::new(left),
                right: Box::new(right),
                negate,
            };
        }
        Ok(left)
    }

    fn parse_union(&mut self) -> Result<Expr, XPathError> {
        let first = self.parse_path_expr()?;
        if self.peek() != Some(&Token::Pipe) {
            return Ok(first);
        }
        let mut parts = vec![first];
        while self.peek() == Some(&Token::Pipe) {
            self.pos += 1;
            parts.push(self.parse_path_expr()?);
        }
        Ok(Expr::Union(parts))
    }

    fn parse_path_expr(&mut self) -> Result<Expr, XPathError> {
        match self.peek().cloned() {
            Some(Token::Literal(s)) => {
                self.pos += 1;
                Ok(Expr::Literal(s))
            }
            Some(Token::Number(n)) => {
                self.pos += 1;
                Ok(Expr::Number(n))
            }
            Some(Token::LParen) => {
                self.pos += 1;
                let inner = self.parse_expr()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Name(name))
                if self.peek_at(1) == Some(&Token::LParen) && name != "text" && name != "node" =>
            {
                self.parse_call(&name)
            }
            _ => Ok(Expr::Path(self.parse_location_path()?)),
        }
    }

    fn parse_call(&mut self, name: &str) -> Result<Expr, XPathError> {
        let function =
            Function::lookup(name).ok_or_else(|| XPathError::UnknownFunction(name.to_string()))?;
        self.pos += 2;

        let mut args = Vec::new();
        if self.peek() != Some(&Token::RParen) {
            args.push(self.parse_expr()?);
            while self.peek() == Some(&Token::Comma) {
                self.pos += 1;
                args.push(self.parse_expr()?);
            }
        }
        self.expect(Token::RParen)?;

        let (min, max, expected) = function.arity();
        if args.len() < min || args.len() > max {
            return Err(XPathError::Arity {
                name: name.to_string(),
                expected,
                got: args.len(),
            });
        }
        Ok(Expr::Call(function, args))
    }

    fn starts_step(&self) -> bool {
        matches!(
            self.peek(),
            Some(Token::Dot | Token::DotDot | Token::At | Token::Star | Token::Name(_))
        )
    }

    fn parse_location_path(&mut self) -> Result<LocationPath, XPathError> {
        let mut steps = Vec::new();
        let absolute = match self.peek() {
            Some(Token::Slash) => {
                self.pos += 1;
                if !self.starts_step() {
                    return Ok(LocationPath {
                        absolute: true,
                        steps,
                    });
                }
                true
            }
            Some(Token::DoubleSlash) => {
                self.pos += 1;
                steps.push(Step::descendant_or_self());
                true
            }
            _ => false,
        };

        steps.push(self.parse_step()?);
        loop {
            match self.peek() {
                Some(Token::Slash) => {
                    self.pos += 1;
                }
                Some(Token::DoubleSlash) => {
                    self.pos += 1;
                    steps.push(Step::descendant_or_self());
                }
                _ => break,
            }
            steps.push(self.parse_step()?);
        }

        Ok(LocationPath { absolute, steps })
    }

    fn parse_step(&mut self) -> Result<Step, XPathError> {
        match self.peek() {
            Some(Token::Dot) => {
                self.pos += 1;
                return Ok(Step {
                    axis: Axis::SelfAxis,
                    test: NodeTest::Node,
                    predicates: Vec::new(),
                });
            }
            Some(Token::DotDot) => {
                self.pos += 1;
                return Ok(Step {
                    axis: Axis::Parent,
                    test: NodeTest::Node,
                    predicates: Vec::new(),
                });
            }
            _ => {}
        }

        let axis = match (self.peek().cloned(), self.peek_at(1)) {
            (Some(Token::At), _) => {
                self.pos += 1;
                Axis::Attribute
            }
            (Some(Token::Name(name)), Some(Token::ColonColon)) => {
                let axis = Axis::from_name(&name)
                    .ok_or_else(|| self.error(&format!("unknown axis '{}'", name)))?;
                self.pos += 2;
                axis
            }
            _ => Axis::Child,
        };

        let test = match self.peek().cloned() {
            Some(Token::Star) => {
                self.pos += 1;
                NodeTest::Any
            }
            Some(Token::Name(name)) => {
                self.pos += 1;
                if self.peek() == Some(&Token::LParen) {
                    let test = match name.as_str() {
                        "text" => NodeTest::Text,
                        "node" => NodeTest::Node,
                        other => return Err(self.error(&format!("unsupported node test '{}()'", other))),
                    };
                    self.pos += 1;
                    self.expect(Token::RParen)?;
                    test
                } else {
                    NodeTest::Name(local_name(&name).to_string())
                }
            }
            _ => return Err(self.error("expected a node test")),
        };

        let mut predicates = Vec::new();
        while self.peek() == Some(&Token::LBracket) {
            self.pos += 1;
            predicates.push(self.parse_expr()?);
            self.expect(Token::RBracket)?;
        }

        Ok(Step {
            axis,
            test,
            predicates,
        })
    }
}

// ─── Evaluator ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct Context {
    node: NodeRef,
    position: usize,
    size: usize,
}

struct Evaluator<'d> {
    doc: &'d Document,
}

fn translate(value: &str, from: &str, to: &str) -> String {
    let from: Vec<char> = from.chars().collect();
    let to: Vec<char> = to.chars().collect();
    value
        .chars()
        .filter_map(|c| match from.iter().position(|&f| f == c) {
            Some(idx) => to.get(idx).copied(),
            None => Some(c),
        })
        .collect()
}

fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_finite() && n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

fn string_to_number(s: &str) -> f64 {
    s.trim().parse().unwrap_or(f64::NAN)
}

impl Evaluator<'_> {
    fn eval(&self, expr: &Expr, ctx: Context) -> Result<Value, XPathError> {
        match expr {
            Expr::Or(a, b) => Ok(Value::Boolean(self.boolean(a, ctx)? || self.boolean(b, ctx)?)),
            Expr::And(a, b) => Ok(Value::Boolean(self.boolean(a, ctx)? && self.boolean(b, ctx)?)),
            Expr::Equals {
                left,
                right,
                negate,
            } => {
                let l = self.eval(left, ctx)?;
                let r = self.eval(right, ctx)?;
                Ok(Value::Boolean(self.compare(&l, &r, !negate)))
            }
            Expr::Union(parts) => {
                let mut all = Vec::new();
                for part in parts {
                    match self.eval(part, ctx)? {
                        Value::Nodes(nodes) => all.extend(nodes),
                        _ => return Err(XPathError::NotANodeSet("|".to_string())),
                    }
                }
                all.sort();
                all.dedup();
                Ok(Value::Nodes(all))
            }
            Expr::Path(path) => Ok(Value::Nodes(self.eval_path(path, ctx)?)),
            Expr::Literal(s) => Ok(Value::String(s.clone())),
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Call(function, args) => self.call(*function, args, ctx),
        }
    }

    fn boolean(&self, expr: &Expr, ctx: Context) -> Result<bool, XPathError> {
        Ok(self.to_boolean(&self.eval(expr, ctx)?))
    }

    fn string(&self, expr: &Expr, ctx: Context) -> Result<String, XPathError> {
        Ok(self.to_string(&self.eval(expr, ctx)?))
    }

    fn to_boolean(&self, value: &Value) -> bool {
        match value {
            Value::Nodes(nodes) => !nodes.is_empty(),
            Value::String(s) => !s.is_empty(),
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Boolean(b) => *b,
        }
    }

    fn to_string(&self, value: &Value) -> String {
        match value {
            Value::Nodes(nodes) => nodes
                .first()
                .map(|&n| self.doc.string_value(n))
                .unwrap_or_default(),
            Value::String(s) => s.clone(),
            Value::Number(n) => number_to_string(*n),
            Value::Boolean(b) => b.to_string(),
        }
    }

    fn to_number(&self, value: &Value) -> f64 {
        match value {
            Value::Number(n) => *n,
            Value::Boolean(b) => f64::from(u8::from(*b)),
            other => string_to_number(&self.to_string(other)),
        }
    }

    fn compare(&self, left: &Value, right: &Value, equal: bool) -> bool {
        let strings_match = |a: &str, b: &str| (a == b) == equal;
        match (left, right) {
            (Value::Nodes(a), Value::Nodes(b)) => {
                let rights: Vec<String> = b.iter().map(|&n| self.doc.string_value(n)).collect();
                a.iter().any(|&n| {
                    let s = self.doc.string_value(n);
                    rights.iter().any(|r| strings_match(&s, r))
                })
            }
            (Value::Nodes(nodes), other) | (other, Value::Nodes(nodes)) => match other {
                Value::Boolean(b) => (!nodes.is_empty() == *b) == equal,
                Value::Number(num) => nodes
                    .iter()
                    .any(|&n| (string_to_number(&self.doc.string_value(n)) == *num) == equal),
                Value::String(s) => nodes
                    .iter()
                    .any(|&n| strings_match(&self.doc.string_value(n), s)),
                Value::Nodes(_) => false,
            },
            _ => {
                if matches!(left, Value::Boolean(_)) || matches!(right, Value::Boolean(_)) {
                    (self.to_boolean(left) == self.to_boolean(right)) == equal
                } else if matches!(left, Value::Number(_)) || matches!(right, Value::Number(_)) {
                    (self.to_number(left) == self.to_number(right)) == equal
                } else {
                    strings_match(&self.to_string(left), &self.to_string(right))
                }
            }
        }
    }

    fn call(&self, function: Function, args: &[Expr], ctx: Context) -> Result<Value, XPathError> {
        let value = match function {
            Function::Not => Value::Boolean(!self.boolean(&args[0], ctx)?),
            Function::Translate => {
                let value = self.string(&args[0], ctx)?;
                let from = self.string(&args[1], ctx)?;
                let to = self.string(&args[2], ctx)?;
                Value::String(translate(&value, &from, &to))
            }
            Function::LocalName | Function::Name => {
                let node = match args.first() {
                    Some(arg) => match self.eval(arg, ctx)? {
                        Value::Nodes(nodes) => nodes.first().copied(),
                        _ => return Err(XPathError::NotANodeSet(function.name().to_string())),
                    },
                    None => Some(ctx.node),
                };
                let name = node.and_then(|n| {
                    if function == Function::LocalName {
                        self.doc.local_name(n)
                    } else {
                        self.doc.qualified_name(n)
                    }
                });
                Value::String(name.unwrap_or_default().to_string())
            }
            Function::Contains => {
                let haystack = self.string(&args[0], ctx)?;
                Value::Boolean(haystack.contains(&self.string(&args[1], ctx)?))
            }
            Function::StartsWith => {
                let haystack = self.string(&args[0], ctx)?;
                Value::Boolean(haystack.starts_with(&self.string(&args[1], ctx)?))
            }
            Function::NormalizeSpace | Function::String => {
                let s = match args.first() {
                    Some(arg) => self.string(arg, ctx)?,
                    None => self.doc.string_value(ctx.node),
                };
                if function == Function::NormalizeSpace {
                    Value::String(s.split_whitespace().collect::<Vec<_>>().join(" "))
                } else {
                    Value::String(s)
                }
            }
            Function::Count => match self.eval(&args[0], ctx)? {
                Value::Nodes(nodes) => Value::Number(nodes.len() as f64),
                _ => return Err(XPathError::NotANodeSet(function.name().to_string())),
            },
            Function::True => Value::Boolean(true),
            Function::False => Value::Boolean(false),
            Function::Position => Value::Number(ctx.position as f64),
            Function::Last => Value::Number(ctx.size as f64),
        };
        Ok(value)
    }

    fn eval_path(&self, path: &LocationPath, ctx: Context) -> Result<Vec<NodeRef>, XPathError> {
        let mut current = if path.absolute {
            vec![NodeRef::Node(self.doc.root())]
        } else {
            vec![ctx.node]
        };

        for step in &path.steps {
            let mut next = Vec::new();
            for &node in &current {
                let mut selected: Vec<NodeRef> = self
                    .axis(step.axis, node)
                    .into_iter()
                    .filter(|&n| self.matches(step, n))
                    .collect();
                for predicate in &step.predicates {
                    selected = self.filter(selected, predicate)?;
                }
                next.extend(selected);
            }
            next.sort();
            next.dedup();
            current = next;
        }

        Ok(current)
    }

    fn filter(&self, nodes: Vec<NodeRef>, predicate: &Expr) -> Result<Vec<NodeRef>, XPathError> {
        let size = nodes.len();
        let mut kept = Vec::with_capacity(size);
        for (idx, node) in nodes.into_iter().enumerate() {
            let ctx = Context {
                node,
                position: idx + 1,
                size,
            };
            let keep = match self.eval(predicate, ctx)? {
                Value::Number(n) => n == (idx + 1) as f64,
                other => self.to_boolean(&other),
            };
            if keep {
                kept.push(node);
            }
        }
        Ok(kept)
    }

    fn parent_of(&self, node: NodeRef) -> Option<usize> {
        match node {
            NodeRef::Node(id) => self.doc.parent(id),
            NodeRef::Attribute(id, _) => Some(id),
        }
    }

    fn ancestors(&self, node: NodeRef) -> Vec<NodeRef> {
        let mut out = Vec::new();
        let mut current = self.parent_of(node);
        while let Some(id) = current {
            out.push(NodeRef::Node(id));
            current = self.doc.parent(id);
        }
        out
    }

    /// Nodes on `axis` from `node`, in axis order (reverse axes nearest first).
    fn axis(&self, axis: Axis, node: NodeRef) -> Vec<NodeRef> {
        let doc = self.doc;
        match (axis, node) {
            (Axis::SelfAxis, n) => vec![n],
            (Axis::Attribute, NodeRef::Node(id)) => doc
                .attributes(id)
                .iter()
                .enumerate()
                .filter(|(_, a)| !a.is_namespace_declaration())
                .map(|(idx, _)| NodeRef::Attribute(id, idx))
                .collect(),
            (Axis::Child, NodeRef::Node(id)) => {
                doc.children(id).iter().map(|&c| NodeRef::Node(c)).collect()
            }
            (Axis::Descendant, NodeRef::Node(id)) => {
                doc.descendants(id).into_iter().map(NodeRef::Node).collect()
            }
            (Axis::DescendantOrSelf, NodeRef::Node(id)) => std::iter::once(id)
                .chain(doc.descendants(id))
                .map(NodeRef::Node)
                .collect(),
            (Axis::DescendantOrSelf, n) => vec![n],
            (Axis::Parent, n) => self.parent_of(n).map(NodeRef::Node).into_iter().collect(),
            (Axis::Ancestor, n) => self.ancestors(n),
            (Axis::AncestorOrSelf, n) => std::iter::once(n).chain(self.ancestors(n)).collect(),
            (Axis::FollowingSibling, NodeRef::Node(id)) => match doc.parent(id) {
                Some(p) => doc
                    .children(p)
                    .iter()
                    .skip_while(|&&c| c != id)
                    .skip(1)
                    .map(|&c| NodeRef::Node(c))
                    .collect(),
                None => Vec::new(),
            },
            (Axis::PrecedingSibling, NodeRef::Node(id)) => match doc.parent(id) {
                Some(p) => {
                    let siblings = doc.children(p);
                    let pos = siblings.iter().position(|&c| c == id).unwrap_or(0);
                    siblings[..pos].iter().rev().map(|&c| NodeRef::Node(c)).collect()
                }
                None => Vec::new(),
            },
            // Attributes have no children, attributes, or siblings.
            (_, NodeRef::Attribute(..)) => Vec::new(),
        }
    }

    fn is_principal(&self, axis: Axis, node: NodeRef) -> bool {
        match node {
            NodeRef::Attribute(..) => axis == Axis::Attribute,
            NodeRef::Node(id) => axis != Axis::Attribute && self.doc.is_element(id),
        }
    }

    fn matches(&self, step: &Step, node: NodeRef) -> bool {
        match &step.test {
            NodeTest::Node => true,
            NodeTest::Text => matches!(
                node,
                NodeRef::Node(id) if matches!(self.doc.kind(id), NodeKind::Text(_))
            ),
            NodeTest::Any => self.is_principal(step.axis, node),
            NodeTest::Name(name) => {
                self.is_principal(step.axis, node) && self.doc.local_name(node) == Some(name.as_str())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EAD: &str = r#"<ead xmlns="urn:isbn:1-931666-22-9">
  <eadheader><eadid>mos_2021</eadid></eadheader>
  <archdesc level="collection">
    <did>
      <origination label="Creator"><persname>Doe, Jane</persname></origination>
      <origination label="source"><persname>Roe, Rick</persname></origination>
      <langmaterial><language langcode="eng">English</language><language langcode="fre"/></langmaterial>
      <unitdate type="inclusive" normal="1900/1950">1900-1950</unitdate>
      <unitdate>circa 1920</unitdate>
    </did>
    <controlaccess><subject>Labor</subject><function>Organizing</function></controlaccess>
    <dsc>
      <c id="c1"><did><unittitle>One</unittitle></did><controlaccess><subject>Deep</subject></controlaccess></c>
      <c id="c2"><did><unittitle>Two</unittitle></did></c>
    </dsc>
  </archdesc>
</ead>"#;

    fn doc() -> Document {
        Document::parse(EAD).unwrap()
    }

    fn strings(doc: &Document, xpath: &str) -> Vec<String> {
        let xp = XPath::compile(xpath).unwrap();
        xp.select(doc, NodeRef::Node(doc.root()))
            .unwrap()
            .into_iter()
            .map(|n| doc.string_value(n))
            .collect()
    }

    #[test]
    fn test_descendant_and_child_paths() {
        let d = doc();
        assert_eq!(strings(&d, "//eadid"), vec!["mos_2021"]);
        assert_eq!(strings(&d, "/ead/eadheader/eadid"), vec!["mos_2021"]);
        assert_eq!(strings(&d, "//c/did/unittitle"), vec!["One", "Two"]);
    }

    #[test]
    fn test_case_insensitive_creator_label() {
        let d = doc();
        let xpath = "//archdesc[@level='collection']/did/origination[translate(@label, \
                     'ABCDEFGHIJKLMNOPQRSTUVWXYZ', 'abcdefghijklmnopqrstuvwxyz')='creator']/persname";
        assert_eq!(strings(&d, xpath), vec!["Doe, Jane"]);
    }

    #[test]
    fn test_not_in_dsc_predicate() {
        let d = doc();
        assert_eq!(
            strings(&d, "//archdesc//subject[not(ancestor::dsc)]"),
            vec!["Labor"]
        );
        assert_eq!(strings(&d, "//subject"), vec!["Labor", "Deep"]);
    }

    #[test]
    fn test_union_is_document_ordered() {
        let d = doc();
        assert_eq!(
            strings(&d, "//function|//subject"),
            vec!["Labor", "Organizing", "Deep"]
        );
    }

    #[test]
    fn test_attribute_selection_and_type_predicates() {
        let d = doc();
        assert_eq!(strings(&d, "//language/@langcode"), vec!["eng", "fre"]);
        assert_eq!(strings(&d, "//did/unitdate[not(@type)]"), vec!["circa 1920"]);
        assert_eq!(
            strings(&d, "//did/unitdate[@type='inclusive']/@normal"),
            vec!["1900/1950"]
        );
    }

    #[test]
    fn test_text_nodes_and_positions() {
        let d = doc();
        assert_eq!(strings(&d, "//c[2]/did/unittitle/text()"), vec!["Two"]);
        assert_eq!(strings(&d, "//c[last()]/@id"), vec!["c2"]);
        assert_eq!(strings(&d, "(//c/@id)"), vec!["c1", "c2"]);
    }

    #[test]
    fn test_sibling_axes() {
        let d = doc();
        assert_eq!(strings(&d, "//c[@id='c2']/preceding-sibling::c/@id"), vec!["c1"]);
        assert_eq!(strings(&d, "//c[@id='c1']/following-sibling::c/@id"), vec!["c2"]);
        assert!(strings(&d, "//c[@id='c1']/preceding-sibling::c").is_empty());
        assert_eq!(
            strings(&d, "//language[@langcode='fre']/preceding-sibling::language[1]/@langcode"),
            vec!["eng"]
        );
    }

    #[test]
    fn test_relative_paths_from_context() {
        let d = doc();
        let c1 = XPath::compile("//c[@id='c1']")
            .unwrap()
            .select(&d, NodeRef::Node(d.root()))
            .unwrap()[0];
        let xp = XPath::compile("./did/unittitle | ../c[@id='c2']/@id").unwrap();
        let values: Vec<String> = xp
            .select(&d, c1)
            .unwrap()
            .into_iter()
            .map(|n| d.string_value(n))
            .collect();
        assert_eq!(values, vec!["One", "c2"]);
    }

    #[test]
    fn test_scalar_results() {
        let d = doc();
        let root = NodeRef::Node(d.root());
        let count = XPath::compile("count(//c)").unwrap().evaluate(&d, root).unwrap();
        assert_eq!(count, Value::Number(2.0));
        let name = XPath::compile("local-name(//c[1]/..)").unwrap().evaluate(&d, root).unwrap();
        assert_eq!(name, Value::String("dsc".to_string()));
        assert!(XPath::compile("count(//c)").unwrap().select(&d, root).is_err());
    }

    #[test]
    fn test_compile_errors() {
        assert!(matches!(
            XPath::compile("//c["),
            Err(XPathError::Syntax { .. })
        ));
        assert!(matches!(
            XPath::compile("lower-case(//c)"),
            Err(XPathError::UnknownFunction(_))
        ));
        assert!(matches!(
            XPath::compile("not(//a, //b)"),
            Err(XPathError::Arity { .. })
        ));
        assert!(matches!(
            XPath::compile("//c/'x"),
            Err(XPathError::Syntax { .. })
        ));
    }
}
