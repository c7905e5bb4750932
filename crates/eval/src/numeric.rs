//! Arithmetic and comparison over runtime values.
//!
//! All arithmetic uses `rust_decimal::Decimal` checked operations with
//! `RoundingStrategy::MidpointNearestEven` for the rounding functions.
//! Amounts only combine with amounts of the same currency; there is no
//! conversion.

use std::cmp::Ordering;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::types::{EvalErrorKind, Value};

/// Comparison operator keywords of the rule language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    NotIn,
}

impl CompareOp {
    pub fn from_token(token: &str) -> Option<CompareOp> {
        match token {
            "EQ" => Some(CompareOp::Eq),
            "NEQ" => Some(CompareOp::Neq),
            "LT" => Some(CompareOp::Lt),
            "LTE" => Some(CompareOp::Lte),
            "GT" => Some(CompareOp::Gt),
            "GTE" => Some(CompareOp::Gte),
            "IN" => Some(CompareOp::In),
            "NIN" => Some(CompareOp::NotIn),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            CompareOp::Eq => "EQ",
            CompareOp::Neq => "NEQ",
            CompareOp::Lt => "LT",
            CompareOp::Lte => "LTE",
            CompareOp::Gt => "GT",
            CompareOp::Gte => "GTE",
            CompareOp::In => "IN",
            CompareOp::NotIn => "NIN",
        }
    }
}

/// Arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithOp {
    pub fn from_token(token: &str) -> Option<ArithOp> {
        match token {
            "+" => Some(ArithOp::Add),
            "-" => Some(ArithOp::Sub),
            "*" => Some(ArithOp::Mul),
            "/" => Some(ArithOp::Div),
            _ => None,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
        }
    }
}

/// Compare two values. Pairings are typed, never coerced:
/// Bool and Text support only `EQ`/`NEQ`; Number, Amount and Date
/// support all six orderings; `IN`/`NIN` test membership of a symbol
/// in a multi-select list.
pub fn compare_values(left: &Value, op: CompareOp, right: &Value) -> Result<bool, EvalErrorKind> {
    match (left, right) {
        (Value::List(items), Value::Text(symbol)) => match op {
            CompareOp::In => Ok(items.contains(symbol)),
            CompareOp::NotIn => Ok(!items.contains(symbol)),
            _ => Err(not_applicable(op, left, right)),
        },
        (Value::Bool(l), Value::Bool(r)) => equality(l == r, op, left, right),
        (Value::Text(l), Value::Text(r)) => equality(l == r, op, left, right),
        (Value::Number(l), Value::Number(r)) => ordering(l.cmp(r), op, left, right),
        (Value::Date(l), Value::Date(r)) => ordering(l.cmp(r), op, left, right),
        (
            Value::Amount {
                amount: la,
                currency: lc,
            },
            Value::Amount {
                amount: ra,
                currency: rc,
            },
        ) => {
            if lc != rc {
                return Err(EvalErrorKind::CurrencyMismatch {
                    left: lc.clone(),
                    right: rc.clone(),
                });
            }
            ordering(la.cmp(ra), op, left, right)
        }
        // A bare number compared with an amount is read in the amount's currency.
        (Value::Amount { amount, .. }, Value::Number(n)) => ordering(amount.cmp(n), op, left, right),
        (Value::Number(n), Value::Amount { amount, .. }) => ordering(n.cmp(amount), op, left, right),
        _ => Err(not_applicable(op, left, right)),
    }
}

fn equality(equal: bool, op: CompareOp, left: &Value, right: &Value) -> Result<bool, EvalErrorKind> {
    match op {
        CompareOp::Eq => Ok(equal),
        CompareOp::Neq => Ok(!equal),
        _ => Err(not_applicable(op, left, right)),
    }
}

fn ordering(
    ord: Ordering,
    op: CompareOp,
    left: &Value,
    right: &Value,
) -> Result<bool, EvalErrorKind> {
    match op {
        CompareOp::Eq => Ok(ord == Ordering::Equal),
        CompareOp::Neq => Ok(ord != Ordering::Equal),
        CompareOp::Lt => Ok(ord == Ordering::Less),
        CompareOp::Lte => Ok(ord != Ordering::Greater),
        CompareOp::Gt => Ok(ord == Ordering::Greater),
        CompareOp::Gte => Ok(ord != Ordering::Less),
        CompareOp::In | CompareOp::NotIn => Err(not_applicable(op, left, right)),
    }
}

fn not_applicable(op: CompareOp, left: &Value, right: &Value) -> EvalErrorKind {
    EvalErrorKind::TypeMismatch(format!(
        "operator {} not defined for {} and {}",
        op.keyword(),
        left.type_name(),
        right.type_name()
    ))
}

/// Apply an arithmetic operator.
///
/// Number op Number is a Number. Amounts add and subtract with amounts
/// of the same currency or with bare numbers, scale by numbers, and
/// divide by numbers (an Amount) or by same-currency amounts (a Number).
pub fn eval_arith(left: &Value, op: ArithOp, right: &Value) -> Result<Value, EvalErrorKind> {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => Ok(Value::Number(checked(*l, op, *r)?)),
        (
            Value::Amount {
                amount: la,
                currency: lc,
            },
            Value::Amount {
                amount: ra,
                currency: rc,
            },
        ) => {
            if lc != rc {
                return Err(EvalErrorKind::CurrencyMismatch {
                    left: lc.clone(),
                    right: rc.clone(),
                });
            }
            let result = checked(*la, op, *ra)?;
            match op {
                ArithOp::Add | ArithOp::Sub => Ok(Value::Amount {
                    amount: result,
                    currency: lc.clone(),
                }),
                ArithOp::Div => Ok(Value::Number(result)),
                ArithOp::Mul => Err(EvalErrorKind::TypeMismatch(
                    "cannot multiply two amounts".to_string(),
                )),
            }
        }
        (Value::Amount { amount, currency }, Value::Number(n)) => Ok(Value::Amount {
            amount: checked(*amount, op, *n)?,
            currency: currency.clone(),
        }),
        (Value::Number(n), Value::Amount { amount, currency }) => match op {
            ArithOp::Div => Err(EvalErrorKind::TypeMismatch(
                "cannot divide a number by an amount".to_string(),
            )),
            _ => Ok(Value::Amount {
                amount: checked(*n, op, *amount)?,
                currency: currency.clone(),
            }),
        },
        _ => Err(EvalErrorKind::TypeMismatch(format!(
            "operator {} not defined for {} and {}",
            op.symbol(),
            left.type_name(),
            right.type_name()
        ))),
    }
}

fn checked(l: Decimal, op: ArithOp, r: Decimal) -> Result<Decimal, EvalErrorKind> {
    let result = match op {
        ArithOp::Add => l.checked_add(r),
        ArithOp::Sub => l.checked_sub(r),
        ArithOp::Mul => l.checked_mul(r),
        ArithOp::Div => {
            if r.is_zero() {
                return Err(EvalErrorKind::DivisionByZero);
            }
            l.checked_div(r)
        }
    };
    result.ok_or_else(|| EvalErrorKind::Overflow(format!("{} {} {}", l, op.symbol(), r)))
}

/// Negate a Number or Amount.
pub fn negate(v: &Value) -> Result<Value, EvalErrorKind> {
    match v {
        Value::Number(d) => Ok(Value::Number(-*d)),
        Value::Amount { amount, currency } => Ok(Value::Amount {
            amount: -*amount,
            currency: currency.clone(),
        }),
        other => Err(EvalErrorKind::TypeMismatch(format!(
            "cannot negate {}",
            other.type_name()
        ))),
    }
}

/// Apply a rounding function (`FLOOR`, `CEIL`, `ROUND`) to a Number or
/// Amount, keeping its currency.
pub fn round_with(v: &Value, f: fn(&Decimal) -> Decimal) -> Result<Value, EvalErrorKind> {
    match v {
        Value::Number(d) => Ok(Value::Number(f(d))),
        Value::Amount { amount, currency } => Ok(Value::Amount {
            amount: f(amount),
            currency: currency.clone(),
        }),
        other => Err(EvalErrorKind::TypeMismatch(format!(
            "cannot round {}",
            other.type_name()
        ))),
    }
}

pub fn round_half_even(d: &Decimal) -> Decimal {
    d.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
}
