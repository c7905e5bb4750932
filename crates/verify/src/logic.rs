//! Logical expressions over input combinations.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use ipfee_eval::parse_date_literal;
use rust_decimal::Decimal;

use crate::combination::InputCombination;
use crate::domain::DomainValue;
use crate::error::VerifyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    In,
    NotIn,
}

/// Condition keywords and the operators they name.
const OPERATOR_TABLE: [(&str, ComparisonOperator); 8] = [
    ("EQ", ComparisonOperator::Equal),
    ("NEQ", ComparisonOperator::NotEqual),
    ("LT", ComparisonOperator::LessThan),
    ("LTE", ComparisonOperator::LessThanOrEqual),
    ("GT", ComparisonOperator::GreaterThan),
    ("GTE", ComparisonOperator::GreaterThanOrEqual),
    ("IN", ComparisonOperator::In),
    ("NIN", ComparisonOperator::NotIn),
];

impl ComparisonOperator {
    pub fn from_token(token: &str) -> Option<ComparisonOperator> {
        OPERATOR_TABLE
            .iter()
            .find(|(kw, _)| *kw == token)
            .map(|(_, op)| *op)
    }

    pub fn keyword(self) -> &'static str {
        OPERATOR_TABLE
            .iter()
            .find(|(_, op)| *op == self)
            .map(|(kw, _)| *kw)
            .unwrap_or("?")
    }

    fn test_ordering(self, ord: Ordering) -> Option<bool> {
        match self {
            ComparisonOperator::Equal => Some(ord == Ordering::Equal),
            ComparisonOperator::NotEqual => Some(ord != Ordering::Equal),
            ComparisonOperator::LessThan => Some(ord == Ordering::Less),
            ComparisonOperator::LessThanOrEqual => Some(ord != Ordering::Greater),
            ComparisonOperator::GreaterThan => Some(ord == Ordering::Greater),
            ComparisonOperator::GreaterThanOrEqual => Some(ord != Ordering::Less),
            ComparisonOperator::In | ComparisonOperator::NotIn => None,
        }
    }

    fn test_equality(self, equal: bool) -> Option<bool> {
        match self {
            ComparisonOperator::Equal => Some(equal),
            ComparisonOperator::NotEqual => Some(!equal),
            _ => None,
        }
    }

    fn test_membership(self, member: bool) -> Option<bool> {
        match self {
            ComparisonOperator::In => Some(member),
            ComparisonOperator::NotIn => Some(!member),
            _ => None,
        }
    }
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Boolean(bool),
    Number(Decimal),
    Symbol(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Boolean(true) => write!(f, "TRUE"),
            Literal::Boolean(false) => write!(f, "FALSE"),
            Literal::Number(d) => write!(f, "{}", d.normalize()),
            Literal::Symbol(s) => write!(f, "{}", s),
        }
    }
}

/// `VARIABLE OPERATOR LITERAL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub variable: String,
    pub operator: ComparisonOperator,
    pub value: Literal,
}

impl Comparison {
    /// Evaluate against a combination. A variable missing from the
    /// combination makes the comparison false.
    pub fn evaluate(&self, combination: &InputCombination) -> Result<bool, VerifyError> {
        let Some(actual) = combination.get(&self.variable) else {
            return Ok(false);
        };
        let op = self.operator;
        let outcome = match (actual, &self.value) {
            (DomainValue::Boolean(b), Literal::Boolean(l)) => op.test_equality(b == l),
            (DomainValue::Symbol(s), Literal::Symbol(l)) => op.test_equality(s == l),
            (DomainValue::Numeric(n), Literal::Number(l))
            | (DomainValue::Amount { amount: n, .. }, Literal::Number(l)) => {
                op.test_ordering(n.cmp(l))
            }
            (DomainValue::Date(d), Literal::Symbol(l)) => {
                parse_date_literal(l).and_then(|l| op.test_ordering(d.cmp(&l)))
            }
            (DomainValue::MultiSelect(items), Literal::Symbol(l)) => {
                op.test_membership(items.contains(l))
            }
            _ => None,
        };
        outcome.ok_or_else(|| VerifyError::OperatorNotApplicable {
            variable: self.variable.clone(),
            operator: op.keyword().to_string(),
            detail: format!("{} value {} against {}", actual.kind_name(), actual, self.value),
        })
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.variable, self.operator.keyword(), self.value)
    }
}

/// Boolean expression tree parsed from a condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogicalExpression {
    True,
    False,
    And(Box<LogicalExpression>, Box<LogicalExpression>),
    Or(Box<LogicalExpression>, Box<LogicalExpression>),
    Not(Box<LogicalExpression>),
    Comparison(Comparison),
}

impl LogicalExpression {
    /// Conjunction that drops a `True` operand.
    pub fn and(left: LogicalExpression, right: LogicalExpression) -> LogicalExpression {
        match (left, right) {
            (LogicalExpression::True, other) | (other, LogicalExpression::True) => other,
            (l, r) => LogicalExpression::And(Box::new(l), Box::new(r)),
        }
    }

    pub fn evaluate(&self, combination: &InputCombination) -> Result<bool, VerifyError> {
        match self {
            LogicalExpression::True => Ok(true),
            LogicalExpression::False => Ok(false),
            LogicalExpression::And(l, r) => {
                Ok(l.evaluate(combination)? && r.evaluate(combination)?)
            }
            LogicalExpression::Or(l, r) => {
                Ok(l.evaluate(combination)? || r.evaluate(combination)?)
            }
            LogicalExpression::Not(e) => Ok(!e.evaluate(combination)?),
            LogicalExpression::Comparison(c) => c.evaluate(combination),
        }
    }

    /// Names of all variables compared anywhere in the tree.
    pub fn referenced_variables(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables(&self, out: &mut BTreeSet<String>) {
        match self {
            LogicalExpression::True | LogicalExpression::False => {}
            LogicalExpression::And(l, r) | LogicalExpression::Or(l, r) => {
                l.collect_variables(out);
                r.collect_variables(out);
            }
            LogicalExpression::Not(e) => e.collect_variables(out),
            LogicalExpression::Comparison(c) => {
                out.insert(c.variable.clone());
            }
        }
    }
}

impl fmt::Display for LogicalExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalExpression::True => write!(f, "TRUE"),
            LogicalExpression::False => write!(f, "FALSE"),
            LogicalExpression::And(l, r) => write!(f, "({} AND {})", l, r),
            LogicalExpression::Or(l, r) => write!(f, "({} OR {})", l, r),
            LogicalExpression::Not(e) => write!(f, "NOT {}", e),
            LogicalExpression::Comparison(c) => write!(f, "{}", c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn cmp(variable: &str, operator: ComparisonOperator, value: Literal) -> LogicalExpression {
        LogicalExpression::Comparison(Comparison {
            variable: variable.to_string(),
            operator,
            value,
        })
    }

    fn sym(s: &str) -> Literal {
        Literal::Symbol(s.to_string())
    }

    #[test]
    fn operator_table_round_trips() {
        for (kw, op) in OPERATOR_TABLE {
            assert_eq!(ComparisonOperator::from_token(kw), Some(op));
            assert_eq!(op.keyword(), kw);
        }
        assert_eq!(ComparisonOperator::from_token("LIKE"), None);
    }

    #[test]
    fn missing_variable_is_false() {
        let expr = cmp("Absent", ComparisonOperator::NotEqual, sym("x"));
        assert!(!expr.evaluate(&InputCombination::default()).unwrap());
    }

    #[test]
    fn symbol_equality_only() {
        let combo =
            InputCombination::default().with("EntityType", DomainValue::Symbol("Micro".into()));
        assert!(cmp("EntityType", ComparisonOperator::Equal, sym("Micro"))
            .evaluate(&combo)
            .unwrap());
        let err = cmp("EntityType", ComparisonOperator::LessThan, sym("Micro"))
            .evaluate(&combo)
            .unwrap_err();
        assert!(matches!(err, VerifyError::OperatorNotApplicable { .. }));
    }

    #[test]
    fn numeric_and_amount_ordering() {
        let combo = InputCombination::default()
            .with("N", DomainValue::Numeric(Decimal::from(10)))
            .with(
                "P",
                DomainValue::Amount {
                    amount: Decimal::from(100),
                    currency: "EUR".into(),
                },
            );
        let ten = Literal::Number(Decimal::from(10));
        assert!(cmp("N", ComparisonOperator::LessThanOrEqual, ten.clone())
            .evaluate(&combo)
            .unwrap());
        assert!(!cmp("N", ComparisonOperator::GreaterThan, ten.clone())
            .evaluate(&combo)
            .unwrap());
        assert!(cmp("P", ComparisonOperator::GreaterThan, ten)
            .evaluate(&combo)
            .unwrap());
    }

    #[test]
    fn date_compares_against_iso_symbol() {
        let combo = InputCombination::default().with("D", DomainValue::Date(date!(2024 - 06 - 01)));
        assert!(cmp("D", ComparisonOperator::GreaterThanOrEqual, sym("2024-01-01"))
            .evaluate(&combo)
            .unwrap());
        assert!(cmp("D", ComparisonOperator::Equal, sym("June"))
            .evaluate(&combo)
            .is_err());
    }

    #[test]
    fn multi_select_membership() {
        let combo = InputCombination::default()
            .with("Opts", DomainValue::MultiSelect(vec!["A".into(), "C".into()]));
        assert!(cmp("Opts", ComparisonOperator::In, sym("A"))
            .evaluate(&combo)
            .unwrap());
        assert!(cmp("Opts", ComparisonOperator::NotIn, sym("B"))
            .evaluate(&combo)
            .unwrap());
        assert!(cmp("Opts", ComparisonOperator::Equal, sym("A"))
            .evaluate(&combo)
            .is_err());
    }

    #[test]
    fn and_elides_true() {
        let c = cmp("X", ComparisonOperator::Equal, Literal::Boolean(true));
        assert_eq!(LogicalExpression::and(LogicalExpression::True, c.clone()), c);
        assert_eq!(LogicalExpression::and(c.clone(), LogicalExpression::True), c);
        assert_eq!(
            LogicalExpression::and(c.clone(), c.clone()).to_string(),
            "(X EQ TRUE AND X EQ TRUE)"
        );
    }

    #[test]
    fn referenced_variables_collects_all() {
        let expr = LogicalExpression::Or(
            Box::new(cmp("A", ComparisonOperator::Equal, Literal::Boolean(true))),
            Box::new(LogicalExpression::Not(Box::new(cmp(
                "B",
                ComparisonOperator::Equal,
                sym("x"),
            )))),
        );
        let vars: Vec<String> = expr.referenced_variables().into_iter().collect();
        assert_eq!(vars, vec!["A".to_string(), "B".to_string()]);
    }
}
