//! Verification errors.

use ipfee_core::DeclError;

/// Errors raised while building domains, parsing conditions or
/// evaluating them against input combinations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    /// The input declarations could not be turned into domains.
    #[error(transparent)]
    Declaration(#[from] DeclError),

    /// A declared input has bounds that admit no value.
    #[error("invalid domain for '{name}': {reason}")]
    InvalidDomain { name: String, reason: String },

    /// Exhaustive enumeration was requested over a domain that is
    /// unbounded or larger than the configured cap.
    #[error(
        "domain too large for exhaustive enumeration ({}, limit {limit})",
        describe_size(.combinations)
    )]
    DomainTooLarge {
        combinations: Option<u64>,
        limit: u64,
    },

    /// A condition token sequence is malformed.
    #[error("condition syntax error: {0}")]
    ConditionSyntax(String),

    /// A comparison uses an operator outside `EQ NEQ LT LTE GT GTE IN NIN`.
    #[error("unknown operator '{0}'")]
    UnknownOperator(String),

    /// A comparison operator does not apply to the variable's value.
    #[error("operator {operator} not applicable to '{variable}' ({detail})")]
    OperatorNotApplicable {
        variable: String,
        operator: String,
        detail: String,
    },
}

fn describe_size(combinations: &Option<u64>) -> String {
    match combinations {
        Some(n) => format!("{} combinations", n),
        None => "unbounded".to_string(),
    }
}
