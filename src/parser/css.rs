use scraper::{ElementRef, Selector};

use super::{Node, SelectorError, Start};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Element,
    Text,
    Attribute(String),
}

/// A CSS selector, optionally ending in `::text` or `::attr(name)`.
#[derive(Debug, Clone)]
pub struct CssQuery {
    source: String,
    selector: Selector,
    target: Target,
}

impl CssQuery {
    pub fn parse(expr: &str) -> Result<Self, SelectorError> {
        let invalid = |reason: String| SelectorError::Css {
            expr: expr.to_string(),
            reason,
        };

        let (selector, target) = split_pseudo_element(expr.trim()).map_err(invalid)?;
        let selector = Selector::parse(selector).map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            source: expr.to_string(),
            selector,
            target,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub(super) fn evaluate<'a>(&self, start: Start<'a>) -> Vec<Node<'a>> {
        let elements: Vec<ElementRef<'a>> = match start {
            Start::Document(html) => html.select(&self.selector).collect(),
            Start::Element(element) => element.select(&self.selector).collect(),
        };

        match &self.target {
            Target::Element => elements.into_iter().map(Node::Element).collect(),
            Target::Text => elements
                .into_iter()
                .flat_map(|element| {
                    element
                        .children()
                        .filter_map(|child| child.value().as_text())
                        .map(|text| &**text)
                        .filter(|text| !text.trim().is_empty())
                        .map(Node::Text)
                })
                .collect(),
            Target::Attribute(name) => elements
                .into_iter()
                .filter_map(|element| {
                    element
                        .value()
                        .attrs()
                        .find(|(attr, _)| *attr == name.as_str())
                        .map(|(name, value)| Node::Attribute { name, value })
                })
                .collect(),
        }
    }
}

/// Splits off a trailing `::text` or `::attr(name)`. Anything else, `::`
/// inside attribute values included, is left to the CSS parser.
fn split_pseudo_element(expr: &str) -> Result<(&str, Target), String> {
    let (selector, target) = if let Some(selector) = expr.strip_suffix("::text") {
        (selector, Target::Text)
    } else if let Some(index) = expr
        .strip_suffix(')')
        .and_then(|rest| rest.rfind("::attr("))
    {
        let name = expr[index + "::attr(".len()..expr.len() - 1].trim();
        if name.is_empty() {
            return Err("empty attribute name in ::attr()".to_string());
        }
        (&expr[..index], Target::Attribute(name.to_string()))
    } else {
        return Ok((expr, Target::Element));
    };

    if selector.trim().is_empty() {
        return Err("missing selector before pseudo-element".to_string());
    }
    Ok((selector, target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{Document, Query, Selectable};

    const PAGE: &str = r#"
        <html><body>
            <div class="thumbnail">
                <a class="title" href="/p/1">Item A</a>
                <h4 class="pull-right price">$10</h4>
                <p class="description">red</p>
                <p class="description">small</p>
            </div>
            <div class="thumbnail">
                <a class="title" href="/p/2">Item B</a>
                <h4 class="pull-right price">$20</h4>
            </div>
            <a class="category-link" href="/cat">Category</a>
        </body></html>
    "#;

    fn doc() -> Document {
        Document::parse(PAGE.as_bytes()).unwrap()
    }

    #[test]
    fn test_text_pseudo_element() {
        let query = Query::css("a.title::text").unwrap();
        assert_eq!(doc().get_all(&query), vec!["Item A", "Item B"]);
    }

    #[test]
    fn test_attr_pseudo_element() {
        let query = Query::css("a.category-link::attr(href)").unwrap();
        let doc = doc();
        let nodes = doc.query_all(&query);
        assert_eq!(
            nodes,
            vec![Node::Attribute {
                name: "href",
                value: "/cat"
            }]
        );
        assert_eq!(doc.get(&query).as_deref(), Some("/cat"));
    }

    #[test]
    fn test_attr_skips_elements_without_it() {
        let query = Query::css("a::attr(href)").unwrap();
        let doc = Document::parse(b"<a>no link</a><a href='/x'>x</a>").unwrap();
        assert_eq!(doc.get_all(&query), vec!["/x"]);
    }

    #[test]
    fn test_queries_from_an_element_stay_inside_it() {
        let doc = doc();
        let thumbs = doc.query_all(&Query::css("div.thumbnail").unwrap());
        assert_eq!(thumbs.len(), 2);

        let description = Query::css("p.description::text").unwrap();
        assert_eq!(thumbs[0].get_all(&description), vec!["red", "small"]);
        assert!(thumbs[1].get_all(&description).is_empty());
    }

    #[test]
    fn test_no_match_is_empty_not_error() {
        let query = Query::css("a.subcategory-link::attr(href)").unwrap();
        assert!(doc().query_all(&query).is_empty());
        assert_eq!(doc().get(&query), None);
    }

    #[test]
    fn test_double_colon_inside_attribute_value() {
        let doc = Document::parse(br#"<a href="urn::x">x</a><a href="/y">y</a>"#).unwrap();
        assert_eq!(
            doc.get_all(&Query::css(r#"a[href*="::"]::attr(href)"#).unwrap()),
            vec!["urn::x"]
        );
        assert_eq!(
            doc.get_all(&Query::css(r#"a[href*="::"]::text"#).unwrap()),
            vec!["x"]
        );
        assert_eq!(
            doc.query_all(&Query::css(r#"a[href*="::"]"#).unwrap()).len(),
            1
        );
    }

    #[test]
    fn test_invalid_selectors() {
        assert!(matches!(
            Query::css("div[").unwrap_err(),
            SelectorError::Css { .. }
        ));
        assert!(Query::css("a::bogus").is_err());
        assert!(Query::css("::text").is_err());
        assert!(Query::css("a::attr()").is_err());
    }
}
