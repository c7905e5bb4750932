//! Condition extraction: token sequences to logical expressions.

use std::collections::BTreeSet;
use std::str::FromStr;

use ipfee_core::{FeeDecl, FeeItem};
use rust_decimal::Decimal;

use crate::error::VerifyError;
use crate::logic::{Comparison, ComparisonOperator, Literal, LogicalExpression};

/// One yield of a fee with its full guarding condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeCondition {
    pub fee_name: String,
    /// Case condition AND yield condition.
    pub expression: LogicalExpression,
    pub value: Vec<String>,
}

/// Parse a condition token sequence. An empty sequence is `True`.
///
/// `OR` binds looser than `AND`. The rightmost operator of the loosest
/// level found outside parentheses is split first, so chains associate
/// to the left.
pub fn parse_condition(tokens: &[String]) -> Result<LogicalExpression, VerifyError> {
    if tokens.is_empty() {
        return Ok(LogicalExpression::True);
    }
    parse_span(tokens)
}

fn parse_span(tokens: &[String]) -> Result<LogicalExpression, VerifyError> {
    let tokens = strip_outer_parens(tokens)?;
    if tokens.is_empty() {
        return Err(VerifyError::ConditionSyntax("empty condition".to_string()));
    }

    if let Some((pos, is_or)) = split_point(tokens)? {
        let (left, right) = (&tokens[..pos], &tokens[pos + 1..]);
        let keyword = if is_or { "OR" } else { "AND" };
        if left.is_empty() || right.is_empty() {
            return Err(VerifyError::ConditionSyntax(format!(
                "{} is missing an operand in '{}'",
                keyword,
                tokens.join(" ")
            )));
        }
        let (l, r) = (Box::new(parse_span(left)?), Box::new(parse_span(right)?));
        return Ok(if is_or {
            LogicalExpression::Or(l, r)
        } else {
            LogicalExpression::And(l, r)
        });
    }

    if tokens[0] == "NOT" {
        if tokens.len() == 1 {
            return Err(VerifyError::ConditionSyntax(
                "NOT is missing an operand".to_string(),
            ));
        }
        return Ok(LogicalExpression::Not(Box::new(parse_span(&tokens[1..])?)));
    }

    parse_comparison(tokens)
}

fn parse_comparison(tokens: &[String]) -> Result<LogicalExpression, VerifyError> {
    match tokens {
        [single] if single.eq_ignore_ascii_case("TRUE") => Ok(LogicalExpression::True),
        [single] if single.eq_ignore_ascii_case("FALSE") => Ok(LogicalExpression::False),
        [variable, operator, value] => {
            let operator = ComparisonOperator::from_token(operator)
                .ok_or_else(|| VerifyError::UnknownOperator(operator.clone()))?;
            Ok(LogicalExpression::Comparison(Comparison {
                variable: variable.clone(),
                operator,
                value: parse_literal(value),
            }))
        }
        _ => Err(VerifyError::ConditionSyntax(format!(
            "expected 'VARIABLE OPERATOR VALUE', got '{}'",
            tokens.join(" ")
        ))),
    }
}

/// Boolean, then decimal (ignoring a `<CUR>` suffix), else a symbol.
fn parse_literal(token: &str) -> Literal {
    if token.eq_ignore_ascii_case("TRUE") {
        return Literal::Boolean(true);
    }
    if token.eq_ignore_ascii_case("FALSE") {
        return Literal::Boolean(false);
    }
    let numeric = token.split_once('<').map_or(token, |(n, _)| n);
    match Decimal::from_str(numeric) {
        Ok(d) => Literal::Number(d),
        Err(_) => Literal::Symbol(token.to_string()),
    }
}

/// Drop parentheses wrapping the whole span, repeatedly.
fn strip_outer_parens(mut tokens: &[String]) -> Result<&[String], VerifyError> {
    while tokens.len() >= 2 && tokens[0] == "(" && tokens[tokens.len() - 1] == ")" {
        let mut depth = 0usize;
        let mut wraps = true;
        for (i, tok) in tokens.iter().enumerate() {
            match tok.as_str() {
                "(" => depth += 1,
                ")" => {
                    depth = depth.checked_sub(1).ok_or_else(|| unbalanced(tokens))?;
                    if depth == 0 && i < tokens.len() - 1 {
                        wraps = false;
                        break;
                    }
                }
                _ => {}
            }
        }
        if !wraps {
            break;
        }
        tokens = &tokens[1..tokens.len() - 1];
    }
    Ok(tokens)
}

/// Position of the rightmost loosest `AND`/`OR` at depth zero, and
/// whether it is an `OR`.
fn split_point(tokens: &[String]) -> Result<Option<(usize, bool)>, VerifyError> {
    let mut depth = 0usize;
    let mut best: Option<(usize, u8)> = None;
    for (i, tok) in tokens.iter().enumerate() {
        let precedence = match tok.as_str() {
            "(" => {
                depth += 1;
                continue;
            }
            ")" => {
                depth = depth.checked_sub(1).ok_or_else(|| unbalanced(tokens))?;
                continue;
            }
            "OR" => 1,
            "AND" => 2,
            _ => continue,
        };
        if depth == 0 && best.map_or(true, |(_, p)| precedence <= p) {
            best = Some((i, precedence));
        }
    }
    if depth != 0 {
        return Err(unbalanced(tokens));
    }
    Ok(best.map(|(i, p)| (i, p == 1)))
}

fn unbalanced(tokens: &[String]) -> VerifyError {
    VerifyError::ConditionSyntax(format!("unbalanced parentheses in '{}'", tokens.join(" ")))
}

/// Flatten a fee into one condition per yield, in declaration order.
pub fn extract_fee_conditions(fee: &FeeDecl) -> Result<Vec<FeeCondition>, VerifyError> {
    let mut out = Vec::new();
    for item in &fee.body {
        match item {
            FeeItem::Case(case) => {
                let case_expr = parse_condition(&case.condition)?;
                for y in &case.yields {
                    out.push(FeeCondition {
                        fee_name: fee.name.clone(),
                        expression: LogicalExpression::and(
                            case_expr.clone(),
                            parse_condition(&y.condition)?,
                        ),
                        value: y.value.clone(),
                    });
                }
            }
            FeeItem::Yield(y) => out.push(FeeCondition {
                fee_name: fee.name.clone(),
                expression: parse_condition(&y.condition)?,
                value: y.value.clone(),
            }),
        }
    }
    Ok(out)
}

/// Variables referenced by any of the conditions.
pub fn referenced_variables(conditions: &[FeeCondition]) -> BTreeSet<String> {
    conditions
        .iter()
        .flat_map(|c| c.expression.referenced_variables())
        .collect()
}
