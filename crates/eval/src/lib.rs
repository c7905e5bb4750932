//! ipfee-eval: expression evaluator for fee schedule conditions and yields.
//!
//! Evaluates token sequences (as produced by `ipfee_core::tokenize`)
//! against a set of bound variables. All arithmetic is decimal and
//! checked; failures are returned as [`EvalError`] tagged with the fee
//! being evaluated.

pub mod expr;
pub mod numeric;
pub mod types;

use rust_decimal::Decimal;

pub use expr::{parse_date_literal, parse_number_literal, Expr};
pub use types::{Bindings, EvalError, EvalErrorKind, Value};

/// Evaluates condition and value token sequences for a fee.
pub trait Evaluator {
    /// Evaluate a boolean condition. An empty token sequence is `true`.
    fn evaluate_logic(
        &self,
        tokens: &[String],
        vars: &Bindings,
        fee_name: &str,
    ) -> Result<bool, EvalError>;

    /// Evaluate a value expression to a decimal. Amounts yield their
    /// magnitude; the currency is dropped.
    fn evaluate_expression(
        &self,
        tokens: &[String],
        vars: &Bindings,
        fee_name: &str,
    ) -> Result<Decimal, EvalError>;
}

/// Default evaluator: parses the tokens on every call and walks the tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenEvaluator;

impl TokenEvaluator {
    pub fn new() -> Self {
        TokenEvaluator
    }

    /// Evaluate tokens to a runtime value.
    pub fn evaluate_value(
        &self,
        tokens: &[String],
        vars: &Bindings,
        fee_name: &str,
    ) -> Result<Value, EvalError> {
        let tree = expr::parse(tokens).map_err(|k| k.in_fee(fee_name))?;
        let value = expr::eval(&tree, vars).map_err(|k| k.in_fee(fee_name))?;
        tracing::trace!(fee = fee_name, tokens = tokens.len(), %value, "evaluated");
        Ok(value)
    }
}

impl Evaluator for TokenEvaluator {
    fn evaluate_logic(
        &self,
        tokens: &[String],
        vars: &Bindings,
        fee_name: &str,
    ) -> Result<bool, EvalError> {
        if tokens.is_empty() {
            return Ok(true);
        }
        self.evaluate_value(tokens, vars, fee_name)?
            .as_bool()
            .map_err(|k| k.in_fee(fee_name))
    }

    fn evaluate_expression(
        &self,
        tokens: &[String],
        vars: &Bindings,
        fee_name: &str,
    ) -> Result<Decimal, EvalError> {
        self.evaluate_value(tokens, vars, fee_name)?
            .as_decimal()
            .map_err(|k| k.in_fee(fee_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(src: &str) -> Vec<String> {
        src.split_whitespace().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_logic_is_true() {
        let ev = TokenEvaluator::new();
        assert!(ev.evaluate_logic(&[], &Bindings::new(), "F").unwrap());
    }

    #[test]
    fn empty_expression_is_error() {
        let ev = TokenEvaluator::new();
        let err = ev
            .evaluate_expression(&[], &Bindings::new(), "F")
            .unwrap_err();
        assert_eq!(err.fee, "F");
        assert!(matches!(err.kind, EvalErrorKind::Syntax(_)));
    }

    #[test]
    fn logic_requires_bool() {
        let ev = TokenEvaluator::new();
        let err = ev
            .evaluate_logic(&toks("1 + 2"), &Bindings::new(), "F")
            .unwrap_err();
        assert!(matches!(err.kind, EvalErrorKind::TypeMismatch(_)));
    }

    #[test]
    fn amount_expression_yields_magnitude() {
        let ev = TokenEvaluator::new();
        let v = ev
            .evaluate_expression(&toks("40<EUR> * 2"), &Bindings::new(), "F")
            .unwrap();
        assert_eq!(v, Decimal::from(80));
    }
}
