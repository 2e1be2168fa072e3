//! Parser for the selection-path grammar.
//!
//! ```text
//! path      := ('$')? segment*
//! segment   := '.'? NAME
//!            | '..' NAME                     recursive descent
//!            | '[' subscript (',' subscript)* ']'
//!            | '[' expr ']'
//! subscript := QUOTED | INDEX | '*'
//! expr      := '(' <expression> ')'          computed subscript
//!            | '?(' <expression> ')'         filter predicate
//! NAME      := identifier | '*'
//! ```

use super::expr::{self, Program};
use crate::error::{Error, Result};

/// A single subscript inside a bracket list.
#[derive(Debug, Clone)]
pub(crate) enum Subscript {
    /// A quoted name, or a decimal index normalised to its string form.
    Name(String),
    /// `*`
    Wildcard,
    /// `(expr)`: evaluated against the current document, result coerced to a name.
    Computed(Program),
    /// `?(expr)`: evaluated per child, truthy children are kept.
    Filter(Program),
}

/// What a segment selects among the current document's children.
#[derive(Debug, Clone)]
pub(crate) enum SegmentKind {
    Name(String),
    Wildcard,
    Brackets(Vec<Subscript>),
}

/// One step of a parsed path.
#[derive(Debug, Clone)]
pub(crate) struct Segment {
    pub(crate) kind: SegmentKind,
    /// Whether the segment applies recursively at every descendant document.
    pub(crate) recursive: bool,
}

pub(crate) fn parse_path(input: &str) -> Result<Vec<Segment>> {
    PathParser { input, pos: 0 }.parse()
}

struct PathParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> PathParser<'a> {
    fn parse(mut self) -> Result<Vec<Segment>> {
        // leading root markers are consumed
        while matches!(self.peek(), Some('$')) {
            self.advance();
        }

        let mut segments = Vec::new();
        loop {
            // a context-root marker at a segment boundary is consumed
            if self.peek() == Some('@') {
                self.advance();
            }

            let mut recursive = false;
            if self.peek() == Some('.') {
                self.advance();
                if self.peek() == Some('.') {
                    self.advance();
                    recursive = true;
                }
            }

            match self.peek() {
                None => {
                    if recursive {
                        return Err(self.error("expected a name after '..'"));
                    }
                    break;
                }
                Some('[') => {
                    let subscripts = self.parse_brackets()?;
                    segments.push(Segment {
                        kind: SegmentKind::Brackets(subscripts),
                        recursive,
                    });
                }
                Some('*') => {
                    self.advance();
                    segments.push(Segment {
                        kind: SegmentKind::Wildcard,
                        recursive,
                    });
                }
                _ => {
                    let name = self.parse_name()?;
                    let kind = if name == "*" {
                        SegmentKind::Wildcard
                    } else {
                        SegmentKind::Name(name)
                    };
                    segments.push(Segment { kind, recursive });
                }
            }
        }

        Ok(segments)
    }

    fn parse_name(&mut self) -> Result<String> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '.' || c == '[' {
                break;
            }
            self.advance();
        }
        if self.pos == start {
            return Err(self.error("expected a name"));
        }
        Ok(self.input[start..self.pos].to_string())
    }

    fn parse_brackets(&mut self) -> Result<Vec<Subscript>> {
        self.expect('[')?;
        self.skip_whitespace();

        // expression subscripts claim the whole bracket
        if matches!(self.peek(), Some('(') | Some('?')) {
            let subscript = self.parse_expression_subscript()?;
            self.skip_whitespace();
            self.expect(']')?;
            return Ok(vec![subscript]);
        }

        let mut subscripts = Vec::new();
        loop {
            self.skip_whitespace();
            let subscript = match self.peek() {
                Some(q @ ('\'' | '"')) => {
                    self.advance();
                    Subscript::Name(self.parse_quoted(q)?)
                }
                Some('*') => {
                    self.advance();
                    Subscript::Wildcard
                }
                Some(c) if c.is_ascii_digit() => {
                    let start = self.pos;
                    while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                        self.advance();
                    }
                    Subscript::Name(self.input[start..self.pos].to_string())
                }
                Some(c) => return Err(self.error(format!("unexpected character {:?}", c))),
                None => return Err(self.error("unterminated subscript list")),
            };
            subscripts.push(subscript);

            self.skip_whitespace();
            match self.peek() {
                Some(',') => {
                    self.advance();
                }
                Some(']') => {
                    self.advance();
                    break;
                }
                Some(c) => return Err(self.error(format!("unexpected character {:?}", c))),
                None => return Err(self.error("unterminated subscript list")),
            }
        }

        Ok(subscripts)
    }

    fn parse_expression_subscript(&mut self) -> Result<Subscript> {
        let filter = if self.peek() == Some('?') {
            self.advance();
            true
        } else {
            false
        };
        self.expect('(')?;

        let start = self.pos;
        let mut depth = 1usize;
        while let Some(c) = self.peek() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
            self.advance();
        }
        if depth != 0 {
            return Err(self.error("unterminated expression"));
        }

        let source = &self.input[start..self.pos];
        self.advance(); // closing ')'

        let program = expr::compile(source).map_err(|mut e| {
            // report offsets relative to the whole path string
            if let crate::error::ErrorKind::ExpressionParse { ref mut offset, .. } = e.kind {
                *offset += start;
            }
            e
        })?;

        Ok(if filter {
            Subscript::Filter(program)
        } else {
            Subscript::Computed(program)
        })
    }

    fn parse_quoted(&mut self, quote: char) -> Result<String> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == quote {
                let name = self.input[start..self.pos].to_string();
                self.advance();
                return Ok(name);
            }
            self.advance();
        }
        Err(self.error("unterminated quoted name"))
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        if self.peek() == Some(expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!("expected {:?}", expected)))
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    fn error(&self, message: impl ToString) -> Error {
        Error::path_parse(message, self.pos)
    }
}
