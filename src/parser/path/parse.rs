use super::{Expr, Function, LocationPath, NameTest, Step};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Slash,
    DoubleSlash,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Comma,
    At,
    Dot,
    DotDot,
    Star,
    Equals,
    NotEquals,
    Literal(String),
    Number(f64),
    Name(String),
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let chars: Vec<char> = input.chars().collect();
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
            '.' if next == Some('.') => {
                tokens.push(Token::DotDot);
                i += 2;
            }
            '.' if next.is_some_and(|n| n.is_ascii_digit()) => {
                let (number, end) = read_number(&chars, i)?;
                tokens.push(Token::Number(number));
                i = end;
            }
            '.' => {
                tokens.push(Token::Dot);
                i += 1;
            }
            '[' => {
                tokens.push(Token::LBracket);
                i += 1;
            }
            ']' => {
                tokens.push(Token::RBracket);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            '@' => {
                tokens.push(Token::At);
                i += 1;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '=' => {
                tokens.push(Token::Equals);
                i += 1;
            }
            '!' if next == Some('=') => {
                tokens.push(Token::NotEquals);
                i += 2;
            }
            '"' | '\'' => {
                let end = chars[i + 1..]
                    .iter()
                    .position(|&q| q == c)
                    .map(|offset| i + 1 + offset)
                    .ok_or_else(|| format!("unterminated string literal at {}", i))?;
                tokens.push(Token::Literal(chars[i + 1..end].iter().collect()));
                i = end + 1;
            }
            c if c.is_ascii_digit() => {
                let (number, end) = read_number(&chars, i)?;
                tokens.push(Token::Number(number));
                i = end;
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_alphanumeric() || chars[i] == '-' || chars[i] == '_')
                {
                    i += 1;
                }
                tokens.push(Token::Name(chars[start..i].iter().collect()));
            }
            other => return Err(format!("unexpected character `{}` at {}", other, i)),
        }
    }

    Ok(tokens)
}

fn read_number(chars: &[char], start: usize) -> Result<(f64, usize), String> {
    let mut end = start;
    while end < chars.len() && (chars[end].is_ascii_digit() || chars[end] == '.') {
        end += 1;
    }
    let text: String = chars[start..end].iter().collect();
    text.parse()
        .map(|number| (number, end))
        .map_err(|_| format!("invalid number `{}`", text))
}

pub(super) fn parse(input: &str) -> Result<LocationPath, String> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err("empty expression".to_string());
    }

    let mut parser = Parser { tokens, pos: 0 };
    let path = parser.location_path()?;
    if let Some(token) = parser.peek() {
        return Err(format!("unexpected {:?} after end of path", token));
    }
    Ok(path)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expect(&mut self, expected: Token) -> Result<(), String> {
        match self.advance() {
            Some(token) if token == expected => Ok(()),
            Some(token) => Err(format!("expected {:?}, found {:?}", expected, token)),
            None => Err(format!("expected {:?}, found end of expression", expected)),
        }
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn location_path(&mut self) -> Result<LocationPath, String> {
        let mut steps = Vec::new();
        let absolute = match self.peek() {
            Some(Token::Slash) => {
                self.pos += 1;
                true
            }
            Some(Token::DoubleSlash) => {
                self.pos += 1;
                steps.push(Step::DescendantOrSelf);
                true
            }
            _ => false,
        };

        loop {
            if steps.last().is_some_and(Step::is_terminal) {
                return Err("text() and attribute steps must end the path".to_string());
            }
            steps.push(self.step()?);

            if self.eat(&Token::Slash) {
                continue;
            }
            if self.eat(&Token::DoubleSlash) {
                steps.push(Step::DescendantOrSelf);
                continue;
            }
            break;
        }

        Ok(LocationPath { absolute, steps })
    }

    fn step(&mut self) -> Result<Step, String> {
        match self.advance() {
            Some(Token::At) => Ok(Step::Attribute(self.name_test()?)),
            Some(Token::Dot) => Ok(Step::SelfNode(self.predicates()?)),
            Some(Token::DotDot) => Ok(Step::Parent),
            Some(Token::Star) => Ok(Step::Child(NameTest::Any, self.predicates()?)),
            Some(Token::Name(name)) if self.peek() == Some(&Token::LParen) => {
                if name != "text" {
                    return Err(format!("unsupported node test `{}()`", name));
                }
                self.expect(Token::LParen)?;
                self.expect(Token::RParen)?;
                Ok(Step::Text)
            }
            Some(Token::Name(name)) => Ok(Step::Child(NameTest::Name(name), self.predicates()?)),
            Some(token) => Err(format!("expected a step, found {:?}", token)),
            None => Err("expected a step, found end of expression".to_string()),
        }
    }

    fn name_test(&mut self) -> Result<NameTest, String> {
        match self.advance() {
            Some(Token::Star) => Ok(NameTest::Any),
            Some(Token::Name(name)) => Ok(NameTest::Name(name)),
            Some(token) => Err(format!("expected a name, found {:?}", token)),
            None => Err("expected a name, found end of expression".to_string()),
        }
    }

    fn predicates(&mut self) -> Result<Vec<Expr>, String> {
        let mut predicates = Vec::new();
        while self.eat(&Token::LBracket) {
            predicates.push(self.or_expr()?);
            self.expect(Token::RBracket)?;
        }
        Ok(predicates)
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Name(name)) if name == keyword)
    }

    fn or_expr(&mut self) -> Result<Expr, String> {
        let mut left = self.and_expr()?;
        while self.is_keyword("or") {
            self.pos += 1;
            left = Expr::Or(Box::new(left), Box::new(self.and_expr()?));
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Expr, String> {
        let mut left = self.comparison()?;
        while self.is_keyword("and") {
            self.pos += 1;
            left = Expr::And(Box::new(left), Box::new(self.comparison()?));
        }
        Ok(left)
    }

    fn comparison(&mut self) -> Result<Expr, String> {
        let left = self.primary()?;
        if self.eat(&Token::Equals) {
            return Ok(Expr::Equals(Box::new(left), Box::new(self.primary()?)));
        }
        if self.eat(&Token::NotEquals) {
            return Ok(Expr::NotEquals(Box::new(left), Box::new(self.primary()?)));
        }
        Ok(left)
    }

    fn primary(&mut self) -> Result<Expr, String> {
        match self.advance() {
            Some(Token::Literal(text)) => Ok(Expr::Literal(text)),
            Some(Token::Number(number)) => Ok(Expr::Number(number)),
            Some(Token::At) => Ok(Expr::Attribute(self.name_test()?)),
            Some(Token::Dot) => Ok(Expr::Context),
            Some(Token::Star) => Ok(Expr::Child(NameTest::Any)),
            Some(Token::LParen) => {
                let expr = self.or_expr()?;
                self.expect(Token::RParen)?;
                Ok(expr)
            }
            Some(Token::Name(name)) if self.peek() == Some(&Token::LParen) => self.call(&name),
            Some(Token::Name(name)) => Ok(Expr::Child(NameTest::Name(name))),
            Some(token) => Err(format!("expected an expression, found {:?}", token)),
            None => Err("expected an expression, found end of expression".to_string()),
        }
    }

    fn call(&mut self, name: &str) -> Result<Expr, String> {
        self.expect(Token::LParen)?;
        let mut args = Vec::new();
        if !self.eat(&Token::RParen) {
            loop {
                args.push(self.or_expr()?);
                if self.eat(&Token::Comma) {
                    continue;
                }
                self.expect(Token::RParen)?;
                break;
            }
        }

        if name == "text" && args.is_empty() {
            return Ok(Expr::Text);
        }

        let function =
            Function::lookup(name).ok_or_else(|| format!("unsupported function `{}()`", name))?;
        if !function.accepts(args.len()) {
            return Err(format!(
                "`{}()` does not take {} argument(s)",
                name,
                args.len()
            ));
        }
        Ok(Expr::Call(function, args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_descendant_path() {
        let path = parse(r#"//a[@class="title"]/text()"#).unwrap();
        assert!(path.absolute);
        assert_eq!(
            path.steps,
            vec![
                Step::DescendantOrSelf,
                Step::Child(
                    NameTest::Name("a".to_string()),
                    vec![Expr::Equals(
                        Box::new(Expr::Attribute(NameTest::Name("class".to_string()))),
                        Box::new(Expr::Literal("title".to_string())),
                    )]
                ),
                Step::Text,
            ]
        );
    }

    #[test]
    fn test_nested_function_calls() {
        let path = parse(
            r#"//h4[contains(concat(" ",normalize-space(@class)," ")," price ")]/text()"#,
        )
        .unwrap();
        let Step::Child(_, predicates) = &path.steps[1] else {
            panic!("expected a child step");
        };
        assert!(matches!(
            &predicates[0],
            Expr::Call(Function::Contains, args) if matches!(&args[0], Expr::Call(Function::Concat, inner) if inner.len() == 3)
        ));
    }

    #[test]
    fn test_relative_and_self_paths() {
        let path = parse(".//p").unwrap();
        assert!(!path.absolute);
        assert_eq!(path.steps[0], Step::SelfNode(Vec::new()));
        assert_eq!(path.steps[1], Step::DescendantOrSelf);

        let path = parse("div/span[2]").unwrap();
        assert!(!path.absolute);
        assert_eq!(path.steps.len(), 2);
    }

    #[test]
    fn test_rejects_malformed_paths() {
        assert!(parse("").is_err());
        assert!(parse("//a[").is_err());
        assert!(parse("//a/text()/b").is_err());
        assert!(parse("//a/@href/text()").is_err());
        assert!(parse("//a[frobnicate(@x)]").is_err());
        assert!(parse("//a[contains(@x)]").is_err());
        assert!(parse(r#"//a[@x="open]"#).is_err());
        assert!(parse("//a/comment()").is_err());
    }
}
