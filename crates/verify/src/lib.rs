//! ipfee-verify: completeness and monotonicity verification.
//!
//! Turns input declarations into enumerable domains, parses fee
//! conditions into logical expressions, and checks two properties of a
//! fee schedule without the caller supplying any inputs:
//!
//! - completeness: some yield matches every legal input combination
//! - monotonicity: a fee moves in one direction as a numeric input grows
//!
//! Domains small enough are enumerated exhaustively; larger or unbounded
//! ones are sampled at representative values, and the reports say so.

pub mod analyzer;
pub mod combination;
pub mod completeness;
pub mod conditions;
pub mod domain;
pub mod error;
pub mod limits;
pub mod logic;
pub mod monotonicity;
pub mod report;

pub use analyzer::{
    generate_all_combinations, generate_all_combinations_with_limits,
    generate_representative_combinations, total_size,
};
pub use combination::{Combinations, InputCombination, ValueSource};
pub use completeness::{
    check_completeness, check_completeness_with_limits, check_fee_completeness,
    check_fee_completeness_with_limits,
};
pub use conditions::{extract_fee_conditions, parse_condition, FeeCondition};
pub use domain::{extract_domain, extract_domains, DomainValue, InputDomain, VariableDomain};
pub use error::VerifyError;
pub use limits::VerifyLimits;
pub use logic::{Comparison, ComparisonOperator, Literal, LogicalExpression};
pub use monotonicity::{
    check_monotonicity, check_monotonicity_with, check_monotonicity_with_limits, fee_total,
};
pub use report::{
    CompletenessReport, FeeCompletenessReport, MonotonicityDirection, MonotonicityReport,
    MonotonicityViolation, VerificationMethod,
};
