//! CSS selector subset
//!
//! Supports what page wiring needs: type selectors, `*`, `.class`, `#id`,
//! `[attr]`, `[attr="v"]`, `[attr^="v"]`, `:not(compound)`, the descendant
//! combinator and comma-separated groups.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("Empty selector")]
    Empty,

    #[error("Unexpected character '{ch}' at {pos} in '{selector}'")]
    Unexpected {
        selector: String,
        ch: char,
        pos: usize,
    },

    #[error("Unterminated {what} in '{selector}'")]
    Unterminated {
        selector: String,
        what: &'static str,
    },
}

/// Read access to an element for matching
pub trait SelectorTarget: Copy {
    fn tag(&self) -> Option<&str>;
    fn element_id(&self) -> Option<&str>;
    fn has_class(&self, class: &str) -> bool;
    fn attribute(&self, name: &str) -> Option<&str>;
    fn parent(&self) -> Option<Self>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals(String),
    Prefix(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Simple {
    Class(String),
    Id(String),
    Attr { name: String, op: AttrOp },
    Not(Box<Compound>),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Compound {
    /// `None` for `*` or an omitted type
    tag: Option<String>,
    simple: Vec<Simple>,
}

/// A parsed, comma-separated selector list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorList {
    /// Each entry is a descendant chain, outermost first
    groups: Vec<Vec<Compound>>,
}

impl SelectorList {
    pub fn parse(selector: &str) -> Result<Self, SelectorError> {
        let mut groups = Vec::new();
        for group in selector.split(',') {
            let chain = Parser::new(selector, group).chain()?;
            if chain.is_empty() {
                return Err(SelectorError::Empty);
            }
            groups.push(chain);
        }
        Ok(Self { groups })
    }

    pub fn matches<T: SelectorTarget>(&self, node: T) -> bool {
        self.groups.iter().any(|chain| matches_chain(chain, node))
    }
}

fn matches_chain<T: SelectorTarget>(chain: &[Compound], node: T) -> bool {
    let Some((last, ancestors)) = chain.split_last() else {
        return false;
    };
    if !last.matches(node) {
        return false;
    }
    // Descendant-only chains match greedily against the nearest ancestor
    let mut remaining = ancestors.iter().rev().peekable();
    let mut current = node.parent();
    while let Some(compound) = remaining.peek() {
        let Some(ancestor) = current else {
            return false;
        };
        if compound.matches(ancestor) {
            remaining.next();
        }
        current = ancestor.parent();
    }
    true
}

impl Compound {
    fn matches<T: SelectorTarget>(&self, node: T) -> bool {
        let Some(tag) = node.tag() else {
            return false;
        };
        if let Some(expected) = &self.tag {
            if !expected.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        self.simple.iter().all(|simple| match simple {
            Simple::Class(class) => node.has_class(class),
            Simple::Id(id) => node.element_id() == Some(id.as_str()),
            Simple::Attr { name, op } => match (node.attribute(name), op) {
                (None, _) => false,
                (Some(_), AttrOp::Exists) => true,
                (Some(value), AttrOp::Equals(expected)) => value == expected,
                (Some(value), AttrOp::Prefix(prefix)) => value.starts_with(prefix.as_str()),
            },
            Simple::Not(inner) => !inner.matches(node),
        })
    }
}

struct Parser<'a> {
    full: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(full: &'a str, group: &str) -> Self {
        Self {
            full,
            chars: group.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn unexpected(&self, ch: char) -> SelectorError {
        SelectorError::Unexpected {
            selector: self.full.to_string(),
            ch,
            pos: self.pos,
        }
    }

    fn unterminated(&self, what: &'static str) -> SelectorError {
        SelectorError::Unterminated {
            selector: self.full.to_string(),
            what,
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn chain(&mut self) -> Result<Vec<Compound>, SelectorError> {
        let mut chain = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek().is_none() {
                return Ok(chain);
            }
            chain.push(self.compound()?);
        }
    }

    fn compound(&mut self) -> Result<Compound, SelectorError> {
        let mut compound = Compound::default();
        match self.peek() {
            Some('*') => self.pos += 1,
            Some(c) if is_ident_char(c) => compound.tag = Some(self.ident()),
            _ => {}
        }
        while let Some(c) = self.peek() {
            match c {
                '.' => {
                    self.pos += 1;
                    compound.simple.push(Simple::Class(self.required_ident()?));
                }
                '#' => {
                    self.pos += 1;
                    compound.simple.push(Simple::Id(self.required_ident()?));
                }
                '[' => {
                    self.pos += 1;
                    compound.simple.push(self.attribute()?);
                }
                ':' => {
                    self.pos += 1;
                    compound.simple.push(self.not()?);
                }
                c if c.is_whitespace() => break,
                c => return Err(self.unexpected(c)),
            }
        }
        Ok(compound)
    }

    fn ident(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn required_ident(&mut self) -> Result<String, SelectorError> {
        let ident = self.ident();
        if ident.is_empty() {
            return Err(match self.peek() {
                Some(c) => self.unexpected(c),
                None => SelectorError::Empty,
            });
        }
        Ok(ident)
    }

    fn attribute(&mut self) -> Result<Simple, SelectorError> {
        self.skip_whitespace();
        let name = self.required_ident()?;
        self.skip_whitespace();
        let op = match self.peek() {
            Some(']') => {
                self.pos += 1;
                return Ok(Simple::Attr {
                    name,
                    op: AttrOp::Exists,
                });
            }
            Some('=') => {
                self.pos += 1;
                AttrOp::Equals(self.attribute_value()?)
            }
            Some('^') => {
                self.pos += 1;
                if self.peek() != Some('=') {
                    return Err(self.unexpected(self.peek().unwrap_or('^')));
                }
                self.pos += 1;
                AttrOp::Prefix(self.attribute_value()?)
            }
            Some(c) => return Err(self.unexpected(c)),
            None => return Err(self.unterminated("attribute selector")),
        };
        self.skip_whitespace();
        match self.peek() {
            Some(']') => {
                self.pos += 1;
                Ok(Simple::Attr { name, op })
            }
            Some(c) => Err(self.unexpected(c)),
            None => Err(self.unterminated("attribute selector")),
        }
    }

    fn attribute_value(&mut self) -> Result<String, SelectorError> {
        self.skip_whitespace();
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                let start = self.pos;
                while let Some(c) = self.peek() {
                    if c == quote {
                        let value = self.chars[start..self.pos].iter().collect();
                        self.pos += 1;
                        return Ok(value);
                    }
                    self.pos += 1;
                }
                Err(self.unterminated("string"))
            }
            _ => self.required_ident(),
        }
    }

    fn not(&mut self) -> Result<Simple, SelectorError> {
        let name = self.ident();
        if name != "not" || self.peek() != Some('(') {
            return Err(self.unexpected(':'));
        }
        self.pos += 1;
        self.skip_whitespace();
        let inner = self.compound_until(')')?;
        Ok(Simple::Not(Box::new(inner)))
    }

    fn compound_until(&mut self, end: char) -> Result<Compound, SelectorError> {
        let start = self.pos;
        let close = self.chars[start..]
            .iter()
            .position(|&c| c == end)
            .map(|offset| start + offset)
            .ok_or_else(|| self.unterminated(":not()"))?;
        let inner: String = self.chars[start..close].iter().collect();
        let mut parser = Parser::new(self.full, inner.trim());
        let compound = parser.compound()?;
        if parser.peek().is_some() {
            return Err(self.unexpected(parser.peek().unwrap_or(end)));
        }
        self.pos = close + 1;
        Ok(compound)
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}
