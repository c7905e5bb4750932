//! Runtime values and evaluation errors.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use time::Date;

// ──────────────────────────────────────────────
// Runtime values
// ──────────────────────────────────────────────

/// A runtime value bound to a variable or produced by an expression.
/// All numeric values use `rust_decimal::Decimal` -- never `f64`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    /// A symbol from a list input, or an unbound identifier.
    Text(String),
    Number(Decimal),
    Date(Date),
    /// The selected symbols of a multi-select input.
    List(Vec<String>),
    Amount { amount: Decimal, currency: String },
}

/// Variables visible to an expression, keyed by name.
pub type Bindings = BTreeMap<String, Value>;

impl Value {
    /// Returns a human-readable type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "Bool",
            Value::Text(_) => "Text",
            Value::Number(_) => "Number",
            Value::Date(_) => "Date",
            Value::List(_) => "List",
            Value::Amount { .. } => "Amount",
        }
    }

    /// Extracts a boolean or returns a type error.
    pub fn as_bool(&self) -> Result<bool, EvalErrorKind> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(EvalErrorKind::TypeMismatch(format!(
                "expected Bool, got {}",
                other.type_name()
            ))),
        }
    }

    /// Extracts the numeric magnitude of a Number or Amount.
    pub fn as_decimal(&self) -> Result<Decimal, EvalErrorKind> {
        match self {
            Value::Number(d) => Ok(*d),
            Value::Amount { amount, .. } => Ok(*amount),
            other => Err(EvalErrorKind::TypeMismatch(format!(
                "expected Number or Amount, got {}",
                other.type_name()
            ))),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(true) => write!(f, "TRUE"),
            Value::Bool(false) => write!(f, "FALSE"),
            Value::Text(s) => write!(f, "{}", s),
            Value::Number(d) => write!(f, "{}", d.normalize()),
            Value::Date(d) => write!(f, "{}", d),
            Value::List(items) => write!(f, "[{}]", items.join(", ")),
            Value::Amount { amount, currency } => write!(f, "{}<{}>", amount.normalize(), currency),
        }
    }
}

// ──────────────────────────────────────────────
// Errors
// ──────────────────────────────────────────────

/// An evaluation failure, tagged with the fee being evaluated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("fee '{fee}': {kind}")]
pub struct EvalError {
    pub fee: String,
    pub kind: EvalErrorKind,
}

/// What went wrong while evaluating an expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalErrorKind {
    #[error("syntax error: {0}")]
    Syntax(String),
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
    #[error("cannot combine amounts in {left} and {right}")]
    CurrencyMismatch { left: String, right: String },
    #[error("numeric overflow in {0}")]
    Overflow(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("unknown function '{0}'")]
    UnknownFunction(String),
}

impl EvalErrorKind {
    pub fn in_fee(self, fee: &str) -> EvalError {
        EvalError {
            fee: fee.to_string(),
            kind: self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use time::macros::date;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn value_display() {
        assert_eq!(Value::Bool(true).to_string(), "TRUE");
        assert_eq!(Value::Number(dec("10.50")).to_string(), "10.5");
        assert_eq!(
            Value::Amount {
                amount: dec("100.00"),
                currency: "EUR".to_string()
            }
            .to_string(),
            "100<EUR>"
        );
        assert_eq!(Value::Date(date!(2024 - 03 - 01)).to_string(), "2024-03-01");
        assert_eq!(
            Value::List(vec!["A".to_string(), "B".to_string()]).to_string(),
            "[A, B]"
        );
    }

    #[test]
    fn value_as_decimal() {
        assert_eq!(Value::Number(dec("3")).as_decimal().unwrap(), dec("3"));
        assert_eq!(
            Value::Amount {
                amount: dec("7.25"),
                currency: "USD".to_string()
            }
            .as_decimal()
            .unwrap(),
            dec("7.25")
        );
        assert!(Value::Text("x".to_string()).as_decimal().is_err());
    }

    #[test]
    fn error_carries_fee_name() {
        let err = EvalErrorKind::DivisionByZero.in_fee("ClaimFee");
        assert_eq!(err.to_string(), "fee 'ClaimFee': division by zero");
    }
}
