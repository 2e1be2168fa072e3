//! Evaluation of compiled filter expressions against a document.

use super::expr::{Op, Program, STACK_LIMIT};
use crate::{
    error::{Error, Result},
    raw::{RawDocument, RawElement},
    spec::ElementType,
};

/// A value on the evaluation stack.
#[derive(Debug, Clone)]
pub(crate) enum Value<'a> {
    Bool(bool),
    Int(i64),
    Str(String),
    Element(RawElement<'a>),
}

/// Runs a compiled expression with `doc` as the context root, returning the
/// value left on top of the stack.
///
/// A path load with zero matches short-circuits the whole expression to
/// `false`.
pub(crate) fn eval<'a>(program: &Program, doc: &'a RawDocument) -> Result<Value<'a>> {
    let mut stack: Vec<Value<'a>> = Vec::with_capacity(STACK_LIMIT);
    let mut slots: Vec<Option<Value<'a>>> = vec![None; STACK_LIMIT];

    for op in &program.ops {
        match op {
            Op::PushInt(i) => push(&mut stack, Value::Int(*i))?,
            Op::PushString(s) => push(&mut stack, Value::Str(s.clone()))?,
            Op::PushTrue => push(&mut stack, Value::Bool(true))?,
            Op::PushFalse => push(&mut stack, Value::Bool(false))?,
            Op::Load(path) => {
                let matches = super::select_in(doc, path)?;
                if matches.is_empty() {
                    return Ok(Value::Bool(false));
                }
                for elem in matches {
                    push(&mut stack, Value::Element(elem))?;
                }
            }
            Op::Store(slot) => {
                let value = pop(&mut stack)?;
                slots[*slot as usize] = Some(value);
            }
            Op::Neg => {
                let value = as_int(pop(&mut stack)?)?;
                push(&mut stack, Value::Int(-value))?;
            }
            Op::Pos => {
                let value = as_int(pop(&mut stack)?)?;
                push(&mut stack, Value::Int(value))?;
            }
            Op::Not => {
                let value = as_bool(pop(&mut stack)?)?;
                push(&mut stack, Value::Bool(!value))?;
            }
            Op::Add | Op::Sub | Op::Mul | Op::Div => {
                let rhs = as_int(pop(&mut stack)?)?;
                let lhs = as_int(pop(&mut stack)?)?;
                let result = match op {
                    Op::Add => lhs.wrapping_add(rhs),
                    Op::Sub => lhs.wrapping_sub(rhs),
                    Op::Mul => lhs.wrapping_mul(rhs),
                    _ => {
                        if rhs == 0 {
                            return Err(Error::expression_evaluation("division by zero"));
                        }
                        lhs.wrapping_div(rhs)
                    }
                };
                push(&mut stack, Value::Int(result))?;
            }
            Op::Eq => {
                let rhs = pop(&mut stack)?;
                let lhs = pop(&mut stack)?;
                push(&mut stack, Value::Bool(values_equal(&lhs, &rhs)))?;
            }
            Op::Neq => {
                let rhs = pop(&mut stack)?;
                let lhs = pop(&mut stack)?;
                push(&mut stack, Value::Bool(!values_equal(&lhs, &rhs)))?;
            }
            Op::Lt | Op::Lte | Op::Gt | Op::Gte => {
                let rhs = pop(&mut stack)?;
                let lhs = pop(&mut stack)?;
                let ordering = values_cmp(&lhs, &rhs)?;
                let result = match op {
                    Op::Lt => ordering.is_lt(),
                    Op::Lte => ordering.is_le(),
                    Op::Gt => ordering.is_gt(),
                    _ => ordering.is_ge(),
                };
                push(&mut stack, Value::Bool(result))?;
            }
            Op::And => {
                let rhs = as_bool(pop(&mut stack)?)?;
                let lhs = as_bool(pop(&mut stack)?)?;
                push(&mut stack, Value::Bool(lhs && rhs))?;
            }
            Op::Or => {
                let rhs = as_bool(pop(&mut stack)?)?;
                let lhs = as_bool(pop(&mut stack)?)?;
                push(&mut stack, Value::Bool(lhs || rhs))?;
            }
        }
    }

    pop(&mut stack)
}

fn push<'a>(stack: &mut Vec<Value<'a>>, value: Value<'a>) -> Result<()> {
    if stack.len() >= STACK_LIMIT {
        return Err(Error::expression_evaluation("evaluation stack overflow"));
    }
    stack.push(value);
    Ok(())
}

fn pop<'a>(stack: &mut Vec<Value<'a>>) -> Result<Value<'a>> {
    stack
        .pop()
        .ok_or_else(|| Error::expression_evaluation("evaluation stack underflow"))
}

/// Coerces a value to an integer; int32/int64 elements decode, everything
/// else is a type error.
fn as_int(value: Value<'_>) -> Result<i64> {
    match value {
        Value::Int(i) => Ok(i),
        Value::Element(e) => element_as_int(&e).ok_or_else(|| {
            Error::expression_evaluation(format!(
                "element \"{}\" is not an integer",
                e.name()
            ))
        }),
        other => Err(Error::expression_evaluation(format!(
            "expected an integer, got {}",
            value_kind(&other)
        ))),
    }
}

fn as_bool(value: Value<'_>) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(b),
        Value::Element(e) => e.as_bool().map_err(|_| {
            Error::expression_evaluation(format!("element \"{}\" is not a boolean", e.name()))
        }),
        other => Err(Error::expression_evaluation(format!(
            "expected a boolean, got {}",
            value_kind(&other)
        ))),
    }
}

fn value_kind(value: &Value<'_>) -> &'static str {
    match value {
        Value::Bool(_) => "a boolean",
        Value::Int(_) => "an integer",
        Value::Str(_) => "a string",
        Value::Element(_) => "an element",
    }
}

fn element_as_int(elem: &RawElement<'_>) -> Option<i64> {
    match elem.element_type() {
        ElementType::Int32 => elem.as_i32().ok().map(i64::from),
        ElementType::Int64 => elem.as_i64().ok(),
        _ => None,
    }
}

/// Equality across value kinds: an element compares to a scalar by decoding
/// to the scalar's kind, and undecodable pairs compare unequal.
fn values_equal(lhs: &Value<'_>, rhs: &Value<'_>) -> bool {
    match (lhs, rhs) {
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Int(a), Value::Int(b)) => a == b,
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::Element(a), Value::Element(b)) => a == b,
        (Value::Element(e), scalar) | (scalar, Value::Element(e)) => match scalar {
            Value::Bool(b) => e.as_bool().map(|v| v == *b).unwrap_or(false),
            Value::Int(i) => element_as_int(e).map(|v| v == *i).unwrap_or(false),
            Value::Str(s) => e.as_str().map(|v| v == s).unwrap_or(false),
            Value::Element(_) => unreachable!("element pairs are handled above"),
        },
        _ => false,
    }
}

/// Ordering across value kinds: elements decode toward the scalar side, then
/// integers order numerically, strings lexicographically by byte order, and
/// booleans with false < true.
fn values_cmp(lhs: &Value<'_>, rhs: &Value<'_>) -> Result<std::cmp::Ordering> {
    use std::cmp::Ordering;

    let mismatch = || {
        Error::expression_evaluation(format!(
            "cannot order {} against {}",
            value_kind(lhs),
            value_kind(rhs)
        ))
    };

    Ok(match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => a.cmp(b),
        (Value::Str(a), Value::Str(b)) => a.as_bytes().cmp(b.as_bytes()),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Element(e), Value::Int(b)) => {
            element_as_int(e).ok_or_else(mismatch)?.cmp(b)
        }
        (Value::Int(a), Value::Element(e)) => {
            a.cmp(&element_as_int(e).ok_or_else(mismatch)?)
        }
        (Value::Element(e), Value::Str(b)) => e
            .as_str()
            .map_err(|_| mismatch())?
            .as_bytes()
            .cmp(b.as_bytes()),
        (Value::Str(a), Value::Element(e)) => a
            .as_bytes()
            .cmp(e.as_str().map_err(|_| mismatch())?.as_bytes()),
        (Value::Element(e), Value::Bool(b)) => e.as_bool().map_err(|_| mismatch())?.cmp(b),
        (Value::Bool(a), Value::Element(e)) => a.cmp(&e.as_bool().map_err(|_| mismatch())?),
        (Value::Element(a), Value::Element(b)) => {
            if let (Some(x), Some(y)) = (element_as_int(a), element_as_int(b)) {
                x.cmp(&y)
            } else if let (Ok(x), Ok(y)) = (a.as_str(), b.as_str()) {
                x.as_bytes().cmp(y.as_bytes())
            } else if let (Ok(x), Ok(y)) = (a.as_bool(), b.as_bool()) {
                x.cmp(&y)
            } else {
                return Err(mismatch());
            }
        }
        _ => return Err(mismatch()),
    })
}
