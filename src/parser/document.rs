use log::trace;
use scraper::{ElementRef, Html};

use super::ParseError;

/// A parsed page. Immutable once built.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses raw response bytes. Broken markup is recovered the way browsers
    /// do; only empty bodies and bodies without any markup are rejected.
    pub fn parse(raw: &[u8]) -> Result<Self, ParseError> {
        let body = String::from_utf8_lossy(raw);
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return Err(ParseError::Empty);
        }
        if !trimmed.contains('<') {
            return Err(ParseError::NotHtml);
        }

        let html = Html::parse_document(&body);
        if !html.errors.is_empty() {
            trace!("Recovered from {} markup errors", html.errors.len());
        }
        Ok(Self { html })
    }

    pub fn root(&self) -> Node<'_> {
        Node::Element(self.html.root_element())
    }

    pub(super) fn html(&self) -> &Html {
        &self.html
    }
}

/// A query result: an element, a text node or an attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node<'a> {
    Element(ElementRef<'a>),
    Text(&'a str),
    Attribute { name: &'a str, value: &'a str },
}

impl<'a> Node<'a> {
    /// The node's own text, trimmed. For an element this is its direct text
    /// children only; `None` when there is nothing but whitespace.
    pub fn text(&self) -> Option<String> {
        let text = match self {
            Node::Element(element) => element
                .children()
                .filter_map(|child| child.value().as_text())
                .map(|text| &**text)
                .collect::<String>(),
            Node::Text(text) => text.to_string(),
            Node::Attribute { value, .. } => value.to_string(),
        };
        let trimmed = text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    /// The node's value as written. Attribute values and text nodes are
    /// returned untrimmed, so `href=""` gives `Some("")`. Elements fall back
    /// to [`Node::text`].
    pub fn value(&self) -> Option<String> {
        match self {
            Node::Element(_) => self.text(),
            Node::Text(text) => Some(text.to_string()),
            Node::Attribute { value, .. } => Some(value.to_string()),
        }
    }

    /// Every non-blank text fragment under this node, trimmed, in document order.
    pub fn all_text(&self) -> Vec<String> {
        match self {
            Node::Element(element) => element
                .text()
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(str::to_string)
                .collect(),
            _ => self.text().into_iter().collect(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        match self {
            Node::Element(element) => element.value().attr(name).map(str::to_string),
            _ => None,
        }
    }

    pub fn as_element(&self) -> Option<ElementRef<'a>> {
        match self {
            Node::Element(element) => Some(*element),
            _ => None,
        }
    }

    pub fn tag_name(&self) -> Option<&'a str> {
        self.as_element().map(|element| element.value().name())
    }
}
