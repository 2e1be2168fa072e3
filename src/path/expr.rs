//! The filter-expression language: parsing and compilation to bytecode.
//!
//! Expressions support integer arithmetic, comparisons, logical connectives,
//! unary operators, string/boolean/integer literals, and variables that are
//! paths relative to the current document (`@.price`, `a.b`).

use crate::error::{Error, Result};

/// Maximum evaluation stack depth. Expressions whose literal shape already
/// exceeds it are rejected at compile time; the VM enforces the same limit at
/// evaluation time, which also covers path loads that push one value per
/// match.
pub(crate) const STACK_LIMIT: usize = 32;

/// One instruction of a compiled expression.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Op {
    /// Negate the top stack entry.
    Neg,
    /// No-op on the top stack entry (unary plus).
    Pos,
    /// Boolean-negate the top stack entry.
    Not,
    /// Add the top two stack entries.
    Add,
    /// Subtract the top two stack entries.
    Sub,
    /// Multiply the top two stack entries.
    Mul,
    /// Divide the top two stack entries.
    Div,
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    And,
    Or,
    /// Select a relative path against the current document and push the matches.
    Load(String),
    /// Pop the top stack entry into a variable slot. Present for VM
    /// completeness; no production of this grammar emits it.
    #[allow(dead_code)]
    Store(u8),
    PushInt(i64),
    PushString(String),
    PushTrue,
    PushFalse,
}

/// A compiled expression.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Program {
    pub(crate) ops: Vec<Op>,
}

/// Parses and compiles an expression source string.
pub(crate) fn compile(source: &str) -> Result<Program> {
    let expr = ExprParser::parse(source)?;
    let mut ops = Vec::new();
    compile_expr(&expr, &mut ops);

    // reject expressions whose literal shape alone overflows the stack; a
    // Load is counted as a single push here, but may push one value per path
    // match at runtime, so the VM's own depth guard remains the backstop
    let mut depth = 0usize;
    let mut max_depth = 0usize;
    for op in &ops {
        match op {
            Op::PushInt(..) | Op::PushString(..) | Op::PushTrue | Op::PushFalse | Op::Load(..) => {
                depth += 1;
                max_depth = max_depth.max(depth);
            }
            Op::Neg | Op::Pos | Op::Not => {}
            Op::Store(..) => depth = depth.saturating_sub(1),
            _ => depth = depth.saturating_sub(1),
        }
    }
    if max_depth > STACK_LIMIT {
        return Err(Error::expression_parse("expression too deep", 0));
    }

    Ok(Program { ops })
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Int(i64),
    Str(String),
    Bool(bool),
    Var(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum UnaryOp {
    Neg,
    Pos,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    And,
    Or,
}

fn compile_expr(expr: &Expr, ops: &mut Vec<Op>) {
    match expr {
        Expr::Int(i) => ops.push(Op::PushInt(*i)),
        Expr::Str(s) => ops.push(Op::PushString(s.clone())),
        Expr::Bool(true) => ops.push(Op::PushTrue),
        Expr::Bool(false) => ops.push(Op::PushFalse),
        Expr::Var(path) => ops.push(Op::Load(path.clone())),
        Expr::Unary(op, operand) => {
            compile_expr(operand, ops);
            ops.push(match op {
                UnaryOp::Neg => Op::Neg,
                UnaryOp::Pos => Op::Pos,
                UnaryOp::Not => Op::Not,
            });
        }
        Expr::Binary(op, lhs, rhs) => {
            compile_expr(lhs, ops);
            compile_expr(rhs, ops);
            ops.push(match op {
                BinaryOp::Add => Op::Add,
                BinaryOp::Sub => Op::Sub,
                BinaryOp::Mul => Op::Mul,
                BinaryOp::Div => Op::Div,
                BinaryOp::Eq => Op::Eq,
                BinaryOp::Neq => Op::Neq,
                BinaryOp::Lt => Op::Lt,
                BinaryOp::Lte => Op::Lte,
                BinaryOp::Gt => Op::Gt,
                BinaryOp::Gte => Op::Gte,
                BinaryOp::And => Op::And,
                BinaryOp::Or => Op::Or,
            });
        }
    }
}

struct ExprParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> ExprParser<'a> {
    fn parse(source: &'a str) -> Result<Expr> {
        let mut parser = Self {
            input: source,
            pos: 0,
        };
        let expr = parser.parse_or()?;
        parser.skip_whitespace();
        if parser.pos != parser.input.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(expr)
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_and()?;
        loop {
            self.skip_whitespace();
            if self.eat("||") {
                let rhs = self.parse_and()?;
                lhs = Expr::Binary(BinaryOp::Or, Box::new(lhs), Box::new(rhs));
            } else {
                return Ok(lhs);
            }
        }
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_equality()?;
        loop {
            self.skip_whitespace();
            if self.eat("&&") {
                let rhs = self.parse_equality()?;
                lhs = Expr::Binary(BinaryOp::And, Box::new(lhs), Box::new(rhs));
            } else {
                return Ok(lhs);
            }
        }
    }

    fn parse_equality(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_relational()?;
        loop {
            self.skip_whitespace();
            let op = if self.eat("==") {
                BinaryOp::Eq
            } else if self.eat("!=") {
                BinaryOp::Neq
            } else {
                return Ok(lhs);
            };
            let rhs = self.parse_relational()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn parse_relational(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_additive()?;
        loop {
            self.skip_whitespace();
            let op = if self.eat("<=") {
                BinaryOp::Lte
            } else if self.eat(">=") {
                BinaryOp::Gte
            } else if self.eat("<") {
                BinaryOp::Lt
            } else if self.eat(">") {
                BinaryOp::Gt
            } else {
                return Ok(lhs);
            };
            let rhs = self.parse_additive()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn parse_additive(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            self.skip_whitespace();
            let op = if self.eat("+") {
                BinaryOp::Add
            } else if self.eat("-") {
                BinaryOp::Sub
            } else {
                return Ok(lhs);
            };
            let rhs = self.parse_multiplicative()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            self.skip_whitespace();
            let op = if self.eat("*") {
                BinaryOp::Mul
            } else if self.eat("/") {
                BinaryOp::Div
            } else {
                return Ok(lhs);
            };
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        self.skip_whitespace();
        if self.eat("-") {
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary(UnaryOp::Neg, Box::new(operand)));
        }
        if self.eat("+") {
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary(UnaryOp::Pos, Box::new(operand)));
        }
        if self.eat("!") {
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary(UnaryOp::Not, Box::new(operand)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        self.skip_whitespace();
        match self.peek() {
            Some('(') => {
                self.advance();
                let expr = self.parse_or()?;
                self.skip_whitespace();
                if !self.eat(")") {
                    return Err(self.error("expected ')'"));
                }
                Ok(expr)
            }
            Some('"') => {
                self.advance();
                let start = self.pos;
                while let Some(c) = self.peek() {
                    if c == '"' {
                        let value = self.input[start..self.pos].to_string();
                        self.advance();
                        return Ok(Expr::Str(value));
                    }
                    self.advance();
                }
                Err(self.error("unterminated string literal"))
            }
            Some(c) if c.is_ascii_digit() => {
                let start = self.pos;
                while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                    self.advance();
                }
                let text = &self.input[start..self.pos];
                let value: i64 = text
                    .parse()
                    .map_err(|_| Error::expression_parse("integer literal out of range", start))?;
                Ok(Expr::Int(value))
            }
            Some(c) if c.is_ascii_alphabetic() || c == '@' || c == '_' => {
                let start = self.pos;
                self.advance();
                while matches!(
                    self.peek(),
                    Some(c) if c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '@'
                ) {
                    self.advance();
                }
                let name = &self.input[start..self.pos];
                Ok(match name {
                    "true" => Expr::Bool(true),
                    "false" => Expr::Bool(false),
                    _ => Expr::Var(name.to_string()),
                })
            }
            Some(c) => Err(self.error(format!("unexpected character {:?}", c))),
            None => Err(self.error("unexpected end of expression")),
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    /// Consumes `token` if the input continues with it. Single-character
    /// operators refuse to match when they are a prefix of a longer operator.
    fn eat(&mut self, token: &str) -> bool {
        let rest = &self.input[self.pos..];
        if !rest.starts_with(token) {
            return false;
        }
        if matches!(token, "<" | ">") && rest[token.len()..].starts_with('=') {
            return false;
        }
        if token == "!" && rest[1..].starts_with('=') {
            return false;
        }
        self.pos += token.len();
        true
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    fn error(&self, message: impl ToString) -> Error {
        Error::expression_parse(message, self.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_compile_to_pushes() {
        assert_eq!(compile("1").unwrap().ops, vec![Op::PushInt(1)]);
        assert_eq!(compile("true").unwrap().ops, vec![Op::PushTrue]);
        assert_eq!(compile("false").unwrap().ops, vec![Op::PushFalse]);
        assert_eq!(
            compile("\"hi\"").unwrap().ops,
            vec![Op::PushString("hi".into())]
        );
    }

    #[test]
    fn variables_compile_to_loads() {
        assert_eq!(
            compile("@.price").unwrap().ops,
            vec![Op::Load("@.price".into())]
        );
        assert_eq!(compile("a.b").unwrap().ops, vec![Op::Load("a.b".into())]);
    }

    #[test]
    fn precedence_is_conventional() {
        // 1 + 2 * 3 => 1 2 3 * +
        assert_eq!(
            compile("1 + 2 * 3").unwrap().ops,
            vec![
                Op::PushInt(1),
                Op::PushInt(2),
                Op::PushInt(3),
                Op::Mul,
                Op::Add
            ]
        );
        // comparison binds looser than arithmetic
        assert_eq!(
            compile("1 + 1 == 2").unwrap().ops,
            vec![
                Op::PushInt(1),
                Op::PushInt(1),
                Op::Add,
                Op::PushInt(2),
                Op::Eq
            ]
        );
        // logical connectives bind loosest
        assert_eq!(
            compile("true || false && true").unwrap().ops,
            vec![Op::PushTrue, Op::PushFalse, Op::PushTrue, Op::And, Op::Or]
        );
    }

    #[test]
    fn unary_operators() {
        assert_eq!(compile("-1").unwrap().ops, vec![Op::PushInt(1), Op::Neg]);
        assert_eq!(compile("!true").unwrap().ops, vec![Op::PushTrue, Op::Not]);
        assert_eq!(compile("+2").unwrap().ops, vec![Op::PushInt(2), Op::Pos]);
    }

    #[test]
    fn parenthesised_grouping() {
        assert_eq!(
            compile("(1 + 2) * 3").unwrap().ops,
            vec![
                Op::PushInt(1),
                Op::PushInt(2),
                Op::Add,
                Op::PushInt(3),
                Op::Mul
            ]
        );
    }

    #[test]
    fn malformed_expressions_are_rejected() {
        for bad in ["", "1 +", "(1", "\"unterminated", "1 ^ 2", "== 2"] {
            let err = compile(bad).unwrap_err();
            assert!(
                matches!(err.kind, crate::error::ErrorKind::ExpressionParse { .. }),
                "{:?} should fail",
                bad
            );
        }
    }

    #[test]
    fn deep_expressions_overflow_the_stack_limit() {
        // 33 operands pushed before any reduction
        let mut source = String::from("1");
        for _ in 0..40 {
            source = format!("1 + ({})", source);
        }
        let err = compile(&source).unwrap_err();
        match err.kind {
            crate::error::ErrorKind::ExpressionParse { message, .. } => {
                assert!(message.contains("too deep"))
            }
            other => panic!("expected ExpressionParse, got {:?}", other),
        }
    }

    #[test]
    fn comparison_chain_compiles_left_associative() {
        assert_eq!(
            compile("1 < 2 == true").unwrap().ops,
            vec![
                Op::PushInt(1),
                Op::PushInt(2),
                Op::Lt,
                Op::PushTrue,
                Op::Eq
            ]
        );
    }
}
