//! Minimal HCL reader.
//!
//! Understands enough of the HashiCorp configuration language to walk the
//! block structure of a Terraform file and read literal string attributes.
//! Every other expression is recognised only far enough to skip it.

use std::fmt;

/// A syntax error with its 1-based line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ParseError {}

/// The contents of a file or block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Body {
    pub attributes: Vec<Attribute>,
    pub blocks: Vec<Block>,
}

impl Body {
    /// Nested blocks of a given type.
    pub fn blocks_of<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Block> + 'a {
        self.blocks.iter().filter(move |b| b.kind == kind)
    }

    /// First attribute with a given name.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| &a.value)
    }
}

/// `name = value`
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: Value,
}

/// `kind "label" { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub kind: String,
    pub labels: Vec<String>,
    pub body: Body,
}

/// An attribute value, as far as it was understood.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A string with no interpolation.
    Str(String),
    /// An object constructor `{ key = value, ... }`.
    Object(Vec<(String, Value)>),
    /// Anything else.
    Expr,
}

impl Value {
    /// The literal string, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Look up a key of an object value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }
}

/// Parse a whole file.
pub fn parse(src: &str) -> Result<Body, ParseError> {
    let tokens = Lexer::new(src).tokenize()?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        last_line: src.lines().count().max(1),
    };
    parser.body(false)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str { value: String, literal: bool },
    Heredoc,
    Punct(char),
    Newline,
    Other,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Ident(name) => format!("'{}'", name),
            Token::Str { .. } => "string".to_string(),
            Token::Heredoc => "heredoc".to_string(),
            Token::Punct(c) => format!("'{}'", c),
            Token::Newline => "newline".to_string(),
            Token::Other => "expression".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct Spanned {
    token: Token,
    line: usize,
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    tokens: Vec<Spanned>,
}

impl Lexer {
    fn new(src: &str) -> Self {
        Self {
            chars: src.chars().collect(),
            pos: 0,
            line: 1,
            tokens: Vec::new(),
        }
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            line: self.line,
            message: message.into(),
        }
    }

    fn push(&mut self, token: Token, line: usize) {
        self.tokens.push(Spanned { token, line });
    }

    fn tokenize(mut self) -> Result<Vec<Spanned>, ParseError> {
        while let Some(c) = self.peek_at(0) {
            let line = self.line;
            match c {
                '\n' => {
                    self.pos += 1;
                    self.push(Token::Newline, line);
                    self.line += 1;
                }
                c if c.is_whitespace() => self.pos += 1,
                '#' => self.skip_line_comment(),
                '/' if self.peek_at(1) == Some('/') => self.skip_line_comment(),
                '/' if self.peek_at(1) == Some('*') => self.skip_block_comment()?,
                '"' => {
                    self.pos += 1;
                    let token = self.string()?;
                    self.push(token, line);
                }
                '<' if self.peek_at(1) == Some('<') => {
                    self.heredoc()?;
                    self.push(Token::Heredoc, line);
                }
                c if c.is_alphabetic() || c == '_' => {
                    let start = self.pos;
                    while self
                        .peek_at(0)
                        .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '-')
                    {
                        self.pos += 1;
                    }
                    let ident: String = self.chars[start..self.pos].iter().collect();
                    self.push(Token::Ident(ident), line);
                }
                '=' if matches!(self.peek_at(1), Some('=') | Some('>')) => {
                    self.pos += 2;
                    self.push(Token::Other, line);
                }
                '<' | '>' | '!' if self.peek_at(1) == Some('=') => {
                    self.pos += 2;
                    self.push(Token::Other, line);
                }
                '{' | '}' | '[' | ']' | '(' | ')' | '=' | ',' | ':' => {
                    self.pos += 1;
                    self.push(Token::Punct(c), line);
                }
                _ => {
                    self.pos += 1;
                    self.push(Token::Other, line);
                }
            }
        }
        Ok(self.tokens)
    }

    fn skip_line_comment(&mut self) {
        while self.peek_at(0).is_some_and(|c| c != '\n') {
            self.pos += 1;
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), ParseError> {
        let start_line = self.line;
        self.pos += 2;
        loop {
            match self.peek_at(0) {
                None => {
                    return Err(ParseError {
                        line: start_line,
                        message: "unterminated comment".to_string(),
                    })
                }
                Some('*') if self.peek_at(1) == Some('/') => {
                    self.pos += 2;
                    return Ok(());
                }
                Some('\n') => {
                    self.line += 1;
                    self.pos += 1;
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    /// Lex a quoted string; the opening quote is already consumed.
    fn string(&mut self) -> Result<Token, ParseError> {
        let mut value = String::new();
        let mut literal = true;
        loop {
            let c = match self.peek_at(0) {
                None | Some('\n') => return Err(self.error("unterminated string")),
                Some(c) => c,
            };
            match c {
                '"' => {
                    self.pos += 1;
                    return Ok(Token::Str { value, literal });
                }
                '\\' => {
                    let escaped = self
                        .peek_at(1)
                        .ok_or_else(|| self.error("unterminated string"))?;
                    self.pos += 2;
                    match escaped {
                        'n' => value.push('\n'),
                        't' => value.push('\t'),
                        'r' => value.push('\r'),
                        other => value.push(other),
                    }
                }
                '$' | '%' if self.peek_at(1) == Some(c) && self.peek_at(2) == Some('{') => {
                    // `$${` is a literal `${`.
                    value.push(c);
                    value.push('{');
                    self.pos += 3;
                }
                '$' | '%' if self.peek_at(1) == Some('{') => {
                    literal = false;
                    self.pos += 2;
                    self.skip_template()?;
                }
                _ => {
                    value.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    /// Skip the inside of `${ ... }` up to and including its closing brace.
    fn skip_template(&mut self) -> Result<(), ParseError> {
        let mut depth = 1;
        while depth > 0 {
            match self.peek_at(0) {
                None => return Err(self.error("unterminated template interpolation")),
                Some('"') => {
                    // Braces inside a nested string do not count.
                    self.pos += 1;
                    self.string()?;
                    continue;
                }
                Some('{') => depth += 1,
                Some('}') => depth -= 1,
                Some('\n') => self.line += 1,
                Some(_) => {}
            }
            self.pos += 1;
        }
        Ok(())
    }

    /// Skip `<<MARKER` (or `<<-MARKER`) through its closing marker line.
    fn heredoc(&mut self) -> Result<(), ParseError> {
        let start_line = self.line;
        self.pos += 2;
        if self.peek_at(0) == Some('-') {
            self.pos += 1;
        }
        let start = self.pos;
        while self
            .peek_at(0)
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            self.pos += 1;
        }
        let marker: String = self.chars[start..self.pos].iter().collect();
        if marker.is_empty() {
            return Err(self.error("expected heredoc marker after '<<'"));
        }

        // Rest of the opening line.
        self.skip_line_comment();

        loop {
            if self.peek_at(0).is_none() {
                return Err(ParseError {
                    line: start_line,
                    message: format!("unterminated heredoc '{}'", marker),
                });
            }
            // Consume the newline that ends the previous line.
            self.pos += 1;
            self.line += 1;

            let line_start = self.pos;
            while self.peek_at(0).is_some_and(|c| c != '\n') {
                self.pos += 1;
            }
            let text: String = self.chars[line_start..self.pos].iter().collect();
            if text.trim() == marker {
                return Ok(());
            }
        }
    }
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    last_line: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|s| s.line)
            .unwrap_or(self.last_line)
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            line: self.line(),
            message: message.into(),
        }
    }

    fn skip_newlines(&mut self) {
        while matches!(self.peek(), Some(Token::Newline)) {
            self.bump();
        }
    }

    fn is_terminator(&self, pos: usize) -> bool {
        matches!(
            self.tokens.get(pos).map(|s| &s.token),
            None | Some(Token::Newline) | Some(Token::Punct(',')) | Some(Token::Punct('}'))
        )
    }

    fn body(&mut self, nested: bool) -> Result<Body, ParseError> {
        let mut body = Body::default();
        loop {
            self.skip_newlines();
            let name = match self.peek() {
                None if nested => return Err(self.error("unclosed block")),
                None => return Ok(body),
                Some(Token::Punct('}')) if nested => {
                    self.bump();
                    return Ok(body);
                }
                Some(Token::Ident(name)) => name.clone(),
                Some(other) => {
                    return Err(self.error(format!("unexpected {}", other.describe())));
                }
            };
            self.bump();

            if matches!(self.peek(), Some(Token::Punct('='))) {
                self.bump();
                let value = self.value()?;
                body.attributes.push(Attribute { name, value });
                continue;
            }

            let mut labels = Vec::new();
            loop {
                match self.peek() {
                    Some(Token::Str { value, .. }) => labels.push(value.clone()),
                    Some(Token::Ident(label)) => labels.push(label.clone()),
                    _ => break,
                }
                self.bump();
            }
            match self.peek() {
                Some(Token::Punct('{')) => self.bump(),
                Some(other) => {
                    let found = other.describe();
                    return Err(self.error(format!(
                        "expected '{{' or '=' after '{}', found {}",
                        name, found
                    )));
                }
                None => return Err(self.error(format!("unexpected end of file after '{}'", name))),
            }
            let inner = self.body(true)?;
            body.blocks.push(Block {
                kind: name,
                labels,
                body: inner,
            });
        }
    }

    fn value(&mut self) -> Result<Value, ParseError> {
        match self.peek() {
            Some(Token::Str {
                value,
                literal: true,
            }) if self.is_terminator(self.pos + 1) => {
                let value = value.clone();
                self.bump();
                Ok(Value::Str(value))
            }
            Some(Token::Punct('{')) => {
                self.bump();
                let object = self.object()?;
                if self.is_terminator(self.pos) {
                    Ok(object)
                } else {
                    self.skip_expr()?;
                    Ok(Value::Expr)
                }
            }
            _ => {
                self.skip_expr()?;
                Ok(Value::Expr)
            }
        }
    }

    /// Parse an object constructor; the opening brace is already consumed.
    fn object(&mut self) -> Result<Value, ParseError> {
        let mut entries = Vec::new();
        loop {
            while matches!(
                self.peek(),
                Some(Token::Newline) | Some(Token::Punct(','))
            ) {
                self.bump();
            }
            let key = match self.peek() {
                None => return Err(self.error("unclosed object")),
                Some(Token::Punct('}')) => {
                    self.bump();
                    return Ok(Value::Object(entries));
                }
                Some(Token::Ident(key)) => key.clone(),
                Some(Token::Str {
                    value,
                    literal: true,
                }) => value.clone(),
                Some(_) => {
                    self.skip_to_close()?;
                    return Ok(Value::Expr);
                }
            };
            self.bump();
            match self.peek() {
                Some(Token::Punct('=')) | Some(Token::Punct(':')) => self.bump(),
                // Not `key = value`: a `for` expression or similar.
                _ => {
                    self.skip_to_close()?;
                    return Ok(Value::Expr);
                }
            }
            let value = self.value()?;
            entries.push((key, value));
        }
    }

    /// Skip to just past the `}` closing the current brace.
    fn skip_to_close(&mut self) -> Result<(), ParseError> {
        self.skip_balanced(true)
    }

    /// Skip an expression up to (not including) its terminator.
    fn skip_expr(&mut self) -> Result<(), ParseError> {
        if self.is_terminator(self.pos) {
            return Err(self.error("expected expression"));
        }
        self.skip_balanced(false)
    }

    fn skip_balanced(&mut self, inside_brace: bool) -> Result<(), ParseError> {
        let mut stack: Vec<char> = Vec::new();
        loop {
            let Some(token) = self.peek().cloned() else {
                return match stack.last().copied().or(inside_brace.then_some('{')) {
                    Some(open) => Err(self.error(format!("unclosed '{}'", open))),
                    None => Ok(()),
                };
            };
            if stack.is_empty() {
                match token {
                    Token::Punct('}') if inside_brace => {
                        self.bump();
                        return Ok(());
                    }
                    Token::Newline | Token::Punct(',') | Token::Punct('}') if !inside_brace => {
                        return Ok(());
                    }
                    _ => {}
                }
            }
            match token {
                Token::Punct(open @ ('(' | '[' | '{')) => stack.push(open),
                Token::Punct(close @ (')' | ']' | '}')) => {
                    let expected = match close {
                        ')' => '(',
                        ']' => '[',
                        _ => '{',
                    };
                    if stack.pop() != Some(expected) {
                        return Err(self.error(format!("unexpected '{}'", close)));
                    }
                }
                _ => {}
            }
            self.bump();
        }
    }
}
