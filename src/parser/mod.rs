mod css;
mod document;
mod path;

pub use css::CssQuery;
pub use document::{Document, Node};
pub use path::PathQuery;

use scraper::{ElementRef, Html};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("document is empty")]
    Empty,

    #[error("document does not contain any markup")]
    NotHtml,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("invalid CSS selector `{expr}`: {reason}")]
    Css { expr: String, reason: String },

    #[error("invalid path expression `{expr}`: {reason}")]
    Path { expr: String, reason: String },
}

/// How an absolute path expression behaves when evaluated from a node
/// rather than from the document.
///
/// `Global` follows XPath: `//a` searches the whole document no matter which
/// node it is evaluated from. `Scoped` confines it to the node's subtree, the
/// way a CSS query on an element does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryScope {
    #[default]
    Global,
    Scoped,
}

/// A compiled query in either dialect.
#[derive(Debug, Clone)]
pub enum Query {
    Css(CssQuery),
    Path(PathQuery),
}

impl Query {
    pub fn css(expr: &str) -> Result<Self, SelectorError> {
        Ok(Query::Css(CssQuery::parse(expr)?))
    }

    pub fn path(expr: &str) -> Result<Self, SelectorError> {
        Ok(Query::Path(PathQuery::parse(expr)?))
    }

    /// Sets the scope of a path query. CSS queries are always scoped.
    pub fn with_scope(self, scope: QueryScope) -> Self {
        match self {
            Query::Path(query) => Query::Path(query.with_scope(scope)),
            css => css,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Query::Css(query) => query.as_str(),
            Query::Path(query) => query.as_str(),
        }
    }

    fn evaluate<'a>(&self, start: Start<'a>) -> Vec<Node<'a>> {
        match self {
            Query::Css(query) => query.evaluate(start),
            Query::Path(query) => query.evaluate(start),
        }
    }
}

/// Where a query starts from.
#[derive(Clone, Copy)]
enum Start<'a> {
    Document(&'a Html),
    Element(ElementRef<'a>),
}

/// The query capability shared by documents and nodes, whatever the dialect.
pub trait Selectable {
    fn query_all<'a>(&'a self, query: &Query) -> Vec<Node<'a>>;

    fn query_first<'a>(&'a self, query: &Query) -> Option<Node<'a>> {
        self.query_all(query).into_iter().next()
    }

    /// Text of the first match.
    fn get(&self, query: &Query) -> Option<String> {
        self.query_first(query).and_then(|node| node.text())
    }

    /// Raw value of the first match; see [`Node::value`].
    fn get_value(&self, query: &Query) -> Option<String> {
        self.query_first(query).and_then(|node| node.value())
    }

    /// Text of every match that has any.
    fn get_all(&self, query: &Query) -> Vec<String> {
        self.query_all(query)
            .iter()
            .filter_map(|node| node.text())
            .collect()
    }
}

impl Selectable for Document {
    fn query_all<'a>(&'a self, query: &Query) -> Vec<Node<'a>> {
        query.evaluate(Start::Document(self.html()))
    }
}

impl Selectable for Node<'_> {
    fn query_all<'a>(&'a self, query: &Query) -> Vec<Node<'a>> {
        match self {
            Node::Element(element) => query.evaluate(Start::Element(*element)),
            Node::Text(_) | Node::Attribute { .. } => Vec::new(),
        }
    }
}
