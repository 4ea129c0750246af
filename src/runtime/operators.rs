//! Arithmetic and comparison over runtime values
//!
//! Both work on the raw scalar behind a value. Unsupported combinations
//! never fail: arithmetic yields `None` and ordering yields `false`.

use std::cmp::Ordering;

use crate::runtime::{Value, ValueCell};

/// Arithmetic operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
}

impl ArithmeticOp {
    /// Parses an operator word
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "+" => Some(ArithmeticOp::Add),
            "-" => Some(ArithmeticOp::Sub),
            "*" => Some(ArithmeticOp::Mul),
            "/" => Some(ArithmeticOp::Div),
            _ => None,
        }
    }
}

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    LtEq,
    /// `>=`
    GtEq,
    /// `=` (loose)
    Eq,
    /// `!=` (loose)
    NotEq,
}

impl ComparisonOp {
    /// Parses an operator word
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "<" => Some(ComparisonOp::Lt),
            ">" => Some(ComparisonOp::Gt),
            "<=" => Some(ComparisonOp::LtEq),
            ">=" => Some(ComparisonOp::GtEq),
            "=" => Some(ComparisonOp::Eq),
            "!=" => Some(ComparisonOp::NotEq),
            _ => None,
        }
    }
}

/// Raw scalar behind a value
#[derive(Debug, Clone, PartialEq)]
enum Scalar {
    /// None and functions
    Undefined,
    Bool(bool),
    Int(i64),
    Str(String),
}

impl Scalar {
    fn of(value: &Value) -> Scalar {
        match value {
            Value::None | Value::Function { .. } => Scalar::Undefined,
            Value::Boolean(b) => Scalar::Bool(*b),
            Value::Integer(n) => Scalar::Int(*n),
            Value::String(s) => Scalar::Str(s.clone()),
            list @ Value::List(_) => Scalar::Str(list.join_text()),
        }
    }

    fn to_number(&self) -> Option<f64> {
        match self {
            Scalar::Undefined => None,
            Scalar::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Scalar::Int(n) => Some(*n as f64),
            Scalar::Str(s) => parse_number(s),
        }
    }

    fn to_integer(&self) -> Option<i64> {
        match self {
            Scalar::Undefined => None,
            Scalar::Bool(b) => Some(i64::from(*b)),
            Scalar::Int(n) => Some(*n),
            Scalar::Str(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    Some(0)
                } else {
                    trimmed.parse().ok()
                }
            }
        }
    }

    fn text(&self) -> String {
        match self {
            Scalar::Undefined => "none".to_string(),
            Scalar::Bool(b) => b.to_string(),
            Scalar::Int(n) => n.to_string(),
            Scalar::Str(s) => s.clone(),
        }
    }
}

/// Numeric reading of string text; blank text reads as zero
fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Applies an arithmetic operator
///
/// `+` concatenates raw text when either side is a string. Everything else
/// is integer arithmetic over coerced operands; overflow, division by zero
/// and non-numeric operands yield `None`.
pub fn arithmetic(op: ArithmeticOp, left: &ValueCell, right: &ValueCell) -> Value {
    let lhs = Scalar::of(&left.borrow());
    let rhs = Scalar::of(&right.borrow());

    if op == ArithmeticOp::Add && (matches!(lhs, Scalar::Str(_)) || matches!(rhs, Scalar::Str(_)))
    {
        return Value::String(format!("{}{}", lhs.text(), rhs.text()));
    }

    let (a, b) = match (lhs.to_integer(), rhs.to_integer()) {
        (Some(a), Some(b)) => (a, b),
        _ => return Value::None,
    };
    let result = match op {
        ArithmeticOp::Add => a.checked_add(b),
        ArithmeticOp::Sub => a.checked_sub(b),
        ArithmeticOp::Mul => a.checked_mul(b),
        ArithmeticOp::Div => a.checked_div(b),
    };
    result.map_or(Value::None, Value::Integer)
}

/// Applies a comparison operator
pub fn compare(op: ComparisonOp, left: &ValueCell, right: &ValueCell) -> bool {
    match op {
        ComparisonOp::Eq => loose_eq(left, right),
        ComparisonOp::NotEq => !loose_eq(left, right),
        ordering => {
            let lhs = Scalar::of(&left.borrow());
            let rhs = Scalar::of(&right.borrow());
            let Some(ord) = order(&lhs, &rhs) else {
                return false;
            };
            match ordering {
                ComparisonOp::Lt => ord == Ordering::Less,
                ComparisonOp::Gt => ord == Ordering::Greater,
                ComparisonOp::LtEq => ord != Ordering::Greater,
                _ => ord != Ordering::Less,
            }
        }
    }
}

fn order(lhs: &Scalar, rhs: &Scalar) -> Option<Ordering> {
    match (lhs, rhs) {
        (Scalar::Str(a), Scalar::Str(b)) => Some(a.cmp(b)),
        (Scalar::Int(a), Scalar::Int(b)) => Some(a.cmp(b)),
        _ => lhs.to_number()?.partial_cmp(&rhs.to_number()?),
    }
}

/// Loose equality between two values
///
/// Two lists are equal only when they are the same object. A list against a
/// scalar compares its joined text. Otherwise scalars are compared with
/// numeric coercion between integers, booleans and numeric strings; `none`
/// equals only `none`.
pub fn loose_eq(left: &ValueCell, right: &ValueCell) -> bool {
    if left.ptr_eq(right) {
        return true;
    }
    let (l, r) = (left.borrow(), right.borrow());
    if matches!((&*l, &*r), (Value::List(_), Value::List(_))) {
        return false;
    }
    scalar_eq(&Scalar::of(&l), &Scalar::of(&r))
}

fn scalar_eq(lhs: &Scalar, rhs: &Scalar) -> bool {
    match (lhs, rhs) {
        (Scalar::Undefined, Scalar::Undefined) => true,
        (Scalar::Undefined, _) | (_, Scalar::Undefined) => false,
        (Scalar::Bool(a), Scalar::Bool(b)) => a == b,
        (Scalar::Int(a), Scalar::Int(b)) => a == b,
        (Scalar::Str(a), Scalar::Str(b)) => a == b,
        (Scalar::Bool(b), other) | (other, Scalar::Bool(b)) => {
            scalar_eq(&Scalar::Int(i64::from(*b)), other)
        }
        (Scalar::Int(n), Scalar::Str(s)) | (Scalar::Str(s), Scalar::Int(n)) => {
            parse_number(s) == Some(*n as f64)
        }
    }
}
