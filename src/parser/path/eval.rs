use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use scraper::ElementRef;

use super::{Expr, Function, LocationPath, NameTest, Step};
use crate::parser::{Node, QueryScope, Start};

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("hardcoded regex pattern is valid"));

/// A node a step can continue from. `Root` is the document node, which has
/// the root element as its only child.
#[derive(Debug, Clone, Copy)]
enum Context<'a> {
    Root(ElementRef<'a>),
    Element(ElementRef<'a>),
}

impl<'a> Context<'a> {
    fn child_elements(self) -> Vec<ElementRef<'a>> {
        match self {
            Context::Root(root) => vec![root],
            Context::Element(element) => element.children().filter_map(ElementRef::wrap).collect(),
        }
    }

    fn text_children(self) -> Vec<&'a str> {
        match self {
            Context::Root(_) => Vec::new(),
            Context::Element(element) => element
                .children()
                .filter_map(|child| child.value().as_text())
                .map(|text| &**text)
                .filter(|text| !text.trim().is_empty())
                .collect(),
        }
    }

    fn descendants_or_self(self) -> Vec<Context<'a>> {
        match self {
            Context::Root(root) => std::iter::once(Context::Root(root))
                .chain(root.descendants().filter_map(ElementRef::wrap).map(Context::Element))
                .collect(),
            Context::Element(element) => element
                .descendants()
                .filter_map(ElementRef::wrap)
                .map(Context::Element)
                .collect(),
        }
    }

    fn parent(self) -> Option<Context<'a>> {
        match self {
            Context::Root(_) => None,
            Context::Element(element) => match element.parent() {
                Some(parent) => Some(match ElementRef::wrap(parent) {
                    Some(parent) => Context::Element(parent),
                    None => Context::Root(element),
                }),
                None => None,
            },
        }
    }

    fn attribute(self, name: &str) -> Option<&'a str> {
        match self {
            Context::Root(_) => None,
            Context::Element(element) => element.value().attr(name),
        }
    }

    fn attributes(self, test: &NameTest) -> Vec<(&'a str, &'a str)> {
        match self {
            Context::Root(_) => Vec::new(),
            Context::Element(element) => element
                .value()
                .attrs()
                .filter(|(name, _)| test.matches(name))
                .collect(),
        }
    }

    fn string_value(self) -> String {
        match self {
            Context::Root(element) | Context::Element(element) => element.text().collect(),
        }
    }

    /// The topmost element, used to restore document order.
    fn root_element(self) -> ElementRef<'a> {
        match self {
            Context::Root(root) => root,
            Context::Element(element) => element
                .ancestors()
                .filter_map(ElementRef::wrap)
                .last()
                .unwrap_or(element),
        }
    }

    fn into_node(self) -> Node<'a> {
        match self {
            Context::Root(element) | Context::Element(element) => Node::Element(element),
        }
    }
}

pub(super) fn evaluate<'a>(path: &LocationPath, start: Start<'a>, scope: QueryScope) -> Vec<Node<'a>> {
    let initial = match start {
        Start::Document(html) => Context::Root(html.root_element()),
        Start::Element(element) if path.absolute && scope == QueryScope::Global => {
            Context::Root(Context::Element(element).root_element())
        }
        Start::Element(element) => Context::Element(element),
    };

    let mut contexts = vec![initial];
    for step in &path.steps {
        match step {
            Step::Text => {
                return contexts
                    .into_iter()
                    .flat_map(Context::text_children)
                    .map(Node::Text)
                    .collect();
            }
            Step::Attribute(test) => {
                return contexts
                    .into_iter()
                    .flat_map(|context| context.attributes(test))
                    .map(|(name, value)| Node::Attribute { name, value })
                    .collect();
            }
            _ => contexts = apply_step(contexts, step),
        }
        if contexts.is_empty() {
            return Vec::new();
        }
    }

    contexts.into_iter().map(Context::into_node).collect()
}

fn apply_step<'a>(contexts: Vec<Context<'a>>, step: &Step) -> Vec<Context<'a>> {
    let spread = contexts.len() > 1;
    let selected: Vec<Context<'a>> = contexts
        .into_iter()
        .flat_map(|context| match step {
            Step::DescendantOrSelf => context.descendants_or_self(),
            Step::SelfNode(predicates) => filter(vec![context], predicates),
            Step::Parent => context.parent().into_iter().collect(),
            Step::Child(test, predicates) => {
                let children = context
                    .child_elements()
                    .into_iter()
                    .filter(|element| test.matches(element.value().name()))
                    .map(Context::Element)
                    .collect();
                filter(children, predicates)
            }
            Step::Text | Step::Attribute(_) => Vec::new(),
        })
        .collect();

    if spread || matches!(step, Step::DescendantOrSelf) {
        document_order(selected)
    } else {
        selected
    }
}

fn filter<'a>(mut candidates: Vec<Context<'a>>, predicates: &[Expr]) -> Vec<Context<'a>> {
    for predicate in predicates {
        let size = candidates.len();
        candidates = candidates
            .into_iter()
            .enumerate()
            .filter(|(index, context)| {
                let frame = Frame {
                    context: *context,
                    position: index + 1,
                    size,
                };
                match frame.eval(predicate) {
                    Value::Number(n) => n == (index + 1) as f64,
                    value => value.truthy(),
                }
            })
            .map(|(_, context)| context)
            .collect();
    }
    candidates
}

/// Deduplicates and sorts contexts by their position in the document.
fn document_order(contexts: Vec<Context<'_>>) -> Vec<Context<'_>> {
    if contexts.is_empty() {
        return contexts;
    }
    let root = contexts[0].root_element();
    let order: HashMap<_, usize> = root
        .descendants()
        .enumerate()
        .map(|(index, node)| (node.id(), index + 1))
        .collect();

    let mut seen = HashSet::new();
    let mut unique: Vec<(usize, Context<'_>)> = contexts
        .into_iter()
        .filter_map(|context| {
            let key = match context {
                Context::Root(_) => None,
                Context::Element(element) => Some((*element).id()),
            };
            if !seen.insert(key) {
                return None;
            }
            let rank = key.and_then(|id| order.get(&id).copied()).unwrap_or(0);
            Some((rank, context))
        })
        .collect();
    unique.sort_by_key(|(rank, _)| *rank);
    unique.into_iter().map(|(_, context)| context).collect()
}

#[derive(Debug, Clone)]
enum Value {
    Str(String),
    Number(f64),
    Bool(bool),
    Nodes(Vec<String>),
}

impl Value {
    fn truthy(&self) -> bool {
        match self {
            Value::Str(text) => !text.is_empty(),
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Bool(b) => *b,
            Value::Nodes(nodes) => !nodes.is_empty(),
        }
    }

    fn into_string(self) -> String {
        match self {
            Value::Str(text) => text,
            Value::Number(n) if n.fract() == 0.0 => format!("{}", n as i64),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Nodes(nodes) => nodes.into_iter().next().unwrap_or_default(),
        }
    }

    fn strings(&self) -> Vec<String> {
        match self {
            Value::Nodes(nodes) => nodes.clone(),
            other => vec![other.clone().into_string()],
        }
    }
}

fn compare(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Bool(_), _) | (_, Value::Bool(_)) => left.truthy() == right.truthy(),
        (Value::Number(n), other) | (other, Value::Number(n)) => other
            .strings()
            .iter()
            .any(|text| text.trim().parse::<f64>().is_ok_and(|parsed| parsed == *n)),
        _ => {
            let right = right.strings();
            left.strings().iter().any(|text| right.contains(text))
        }
    }
}

struct Frame<'a> {
    context: Context<'a>,
    position: usize,
    size: usize,
}

impl Frame<'_> {
    fn eval(&self, expr: &Expr) -> Value {
        match expr {
            Expr::Literal(text) => Value::Str(text.clone()),
            Expr::Number(n) => Value::Number(*n),
            Expr::Attribute(NameTest::Name(name)) => Value::Nodes(
                self.context
                    .attribute(name)
                    .map(str::to_string)
                    .into_iter()
                    .collect(),
            ),
            Expr::Attribute(test) => Value::Nodes(
                self.context
                    .attributes(test)
                    .into_iter()
                    .map(|(_, value)| value.to_string())
                    .collect(),
            ),
            Expr::Child(test) => Value::Nodes(
                self.context
                    .child_elements()
                    .into_iter()
                    .filter(|element| test.matches(element.value().name()))
                    .map(|element| element.text().collect())
                    .collect(),
            ),
            Expr::Text => Value::Nodes(
                self.context
                    .text_children()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            ),
            Expr::Context => Value::Nodes(vec![self.context.string_value()]),
            Expr::Equals(left, right) => Value::Bool(compare(&self.eval(left), &self.eval(right))),
            Expr::NotEquals(left, right) => {
                Value::Bool(!compare(&self.eval(left), &self.eval(right)))
            }
            Expr::And(left, right) => {
                Value::Bool(self.eval(left).truthy() && self.eval(right).truthy())
            }
            Expr::Or(left, right) => {
                Value::Bool(self.eval(left).truthy() || self.eval(right).truthy())
            }
            Expr::Call(function, args) => self.call(*function, args),
        }
    }

    fn string_arg(&self, expr: &Expr) -> String {
        self.eval(expr).into_string()
    }

    fn call(&self, function: Function, args: &[Expr]) -> Value {
        match function {
            Function::Contains => {
                Value::Bool(self.string_arg(&args[0]).contains(&self.string_arg(&args[1])))
            }
            Function::StartsWith => {
                Value::Bool(self.string_arg(&args[0]).starts_with(&self.string_arg(&args[1])))
            }
            Function::Concat => {
                Value::Str(args.iter().map(|arg| self.string_arg(arg)).collect())
            }
            Function::NormalizeSpace => {
                let text = match args.first() {
                    Some(arg) => self.string_arg(arg),
                    None => self.context.string_value(),
                };
                Value::Str(WHITESPACE.replace_all(text.trim(), " ").into_owned())
            }
            Function::Not => Value::Bool(!self.eval(&args[0]).truthy()),
            Function::Last => Value::Number(self.size as f64),
            Function::Position => Value::Number(self.position as f64),
        }
    }
}
