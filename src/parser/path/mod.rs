//! A path query dialect covering the XPath 1.0 subset that product pages
//! need: location paths with `/` and `//`, name, `*`, `text()` and `@attr`
//! tests, and predicates built from positions, comparisons, `and`/`or` and a
//! handful of string functions.

mod eval;
mod parse;


use super::{Node, QueryScope, SelectorError, Start};

#[derive(Debug, Clone)]
pub struct PathQuery {
    source: String,
    path: LocationPath,
    scope: QueryScope,
}

impl PathQuery {
    pub fn parse(expr: &str) -> Result<Self, SelectorError> {
        let path = parse::parse(expr).map_err(|reason| SelectorError::Path {
            expr: expr.to_string(),
            reason,
        })?;

        Ok(Self {
            source: expr.to_string(),
            path,
            scope: QueryScope::default(),
        })
    }

    pub fn with_scope(mut self, scope: QueryScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn scope(&self) -> QueryScope {
        self.scope
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub(super) fn evaluate<'a>(&self, start: Start<'a>) -> Vec<Node<'a>> {
        eval::evaluate(&self.path, start, self.scope)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LocationPath {
    pub absolute: bool,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Step {
    /// The implicit step behind `//`.
    DescendantOrSelf,
    SelfNode(Vec<Expr>),
    Parent,
    Child(NameTest, Vec<Expr>),
    Text,
    Attribute(NameTest),
}

impl Step {
    /// Steps that select text or attribute values end a path.
    fn is_terminal(&self) -> bool {
        matches!(self, Step::Text | Step::Attribute(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum NameTest {
    Any,
    Name(String),
}

impl NameTest {
    fn matches(&self, name: &str) -> bool {
        match self {
            NameTest::Any => true,
            NameTest::Name(expected) => expected.eq_ignore_ascii_case(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Literal(String),
    Number(f64),
    Attribute(NameTest),
    Child(NameTest),
    Text,
    Context,
    Equals(Box<Expr>, Box<Expr>),
    NotEquals(Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Call(Function, Vec<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Function {
    Contains,
    StartsWith,
    Concat,
    NormalizeSpace,
    Not,
    Last,
    Position,
}

impl Function {
    fn lookup(name: &str) -> Option<Self> {
        Some(match name {
            "contains" => Function::Contains,
            "starts-with" => Function::StartsWith,
            "concat" => Function::Concat,
            "normalize-space" => Function::NormalizeSpace,
            "not" => Function::Not,
            "last" => Function::Last,
            "position" => Function::Position,
            _ => return None,
        })
    }

    fn accepts(&self, arity: usize) -> bool {
        match self {
            Function::Contains | Function::StartsWith => arity == 2,
            Function::Concat => arity >= 2,
            Function::NormalizeSpace => arity <= 1,
            Function::Not => arity == 1,
            Function::Last | Function::Position => arity == 0,
        }
    }
}
