//! Monotonicity: does a fee move consistently as one numeric input grows?

use ipfee_core::{FeeDecl, InputDecl};
use ipfee_eval::{EvalError, EvalErrorKind, Evaluator, TokenEvaluator, Value};
use rust_decimal::Decimal;

use crate::analyzer::generate_representative_combinations;
use crate::combination::InputCombination;
use crate::domain::{extract_domains, DomainValue, InputDomain, VariableDomain};
use crate::error::VerifyError;
use crate::limits::VerifyLimits;
use crate::report::{MonotonicityDirection, MonotonicityReport, MonotonicityViolation};

/// Evaluation-error notes recorded before further ones are only counted.
const MAX_ERROR_NOTES: usize = 10;

/// Check with the default limits and the token evaluator.
pub fn check_monotonicity(
    fee: &FeeDecl,
    inputs: &[InputDecl],
    target_variable: &str,
    direction: MonotonicityDirection,
) -> Result<MonotonicityReport, VerifyError> {
    check_monotonicity_with_limits(fee, inputs, target_variable, direction, &VerifyLimits::default())
}

pub fn check_monotonicity_with_limits(
    fee: &FeeDecl,
    inputs: &[InputDecl],
    target_variable: &str,
    direction: MonotonicityDirection,
    limits: &VerifyLimits,
) -> Result<MonotonicityReport, VerifyError> {
    check_monotonicity_with(
        &TokenEvaluator::new(),
        fee,
        inputs,
        target_variable,
        direction,
        limits,
    )
}

/// Check that `fee` follows `direction` as `target_variable` increases.
///
/// Every other declared input is held at each of its
/// representative combinations in turn. Within one context the target's
/// representative values are walked in ascending order and each
/// evaluated total is compared with the previous one. Points that fail
/// to evaluate are noted and skipped.
pub fn check_monotonicity_with<E: Evaluator + ?Sized>(
    evaluator: &E,
    fee: &FeeDecl,
    inputs: &[InputDecl],
    target_variable: &str,
    direction: MonotonicityDirection,
    limits: &VerifyLimits,
) -> Result<MonotonicityReport, VerifyError> {
    let domains = extract_domains(inputs)?;

    let mut report = MonotonicityReport {
        fee_name: fee.name.clone(),
        target_variable: target_variable.to_string(),
        direction,
        is_monotonic: false,
        points_checked: 0,
        violations: Vec::new(),
        notes: Vec::new(),
    };

    let Some(target) = domains.iter().find(|d| d.name == target_variable) else {
        report
            .notes
            .push(format!("Variable '{}' is not declared", target_variable));
        return Ok(report);
    };
    if !matches!(target.domain, InputDomain::Number { .. }) {
        report.notes.push(format!(
            "Variable '{}' is not numeric ({})",
            target_variable,
            target.domain.kind_name()
        ));
        return Ok(report);
    }

    let mut points: Vec<(Decimal, DomainValue)> = target
        .domain
        .representative_values(limits.monotonicity_samples)
        .into_iter()
        .filter_map(|v| v.as_decimal().map(|d| (d, v)))
        .collect();
    points.sort_by(|a, b| a.0.cmp(&b.0));

    let context_domains: Vec<VariableDomain> = domains
        .iter()
        .filter(|d| d.name != target_variable)
        .cloned()
        .collect();
    tracing::debug!(
        fee = %fee.name,
        target = target_variable,
        context = context_domains.len(),
        points = points.len(),
        "checking monotonicity"
    );

    let mut error_count = 0usize;
    let mut capped = false;
    'contexts: for context in
        generate_representative_combinations(&context_domains, limits.max_samples_per_domain)
    {
        let mut previous: Option<(Decimal, Decimal)> = None;
        for (value, domain_value) in &points {
            let point = context.with(target_variable, domain_value.clone());
            report.points_checked += 1;
            let total = match fee_total(evaluator, fee, &point) {
                Ok(total) => total,
                Err(e) => {
                    error_count += 1;
                    if error_count <= MAX_ERROR_NOTES {
                        report
                            .notes
                            .push(format!("Evaluation error at {}: {}", point, e));
                    }
                    continue;
                }
            };
            if let Some((from_value, from_total)) = previous {
                if direction.is_violated(from_total, total) {
                    report.violations.push(MonotonicityViolation {
                        context: context.clone(),
                        from_value,
                        from_total,
                        to_value: *value,
                        to_total: total,
                    });
                    if report.violations.len() >= limits.max_violations {
                        capped = true;
                        break 'contexts;
                    }
                }
            }
            previous = Some((*value, total));
        }
    }

    if error_count > MAX_ERROR_NOTES {
        report.notes.push(format!(
            "{} further evaluation error(s) not shown",
            error_count - MAX_ERROR_NOTES
        ));
    }
    if capped {
        report.notes.push(format!(
            "Stopped after {} violations",
            limits.max_violations
        ));
        tracing::warn!(fee = %fee.name, cap = limits.max_violations, "violation cap reached");
    }

    report.is_monotonic = report.violations.is_empty();
    tracing::info!(
        fee = %fee.name,
        target = target_variable,
        monotonic = report.is_monotonic,
        points = report.points_checked,
        violations = report.violations.len(),
        "monotonicity checked"
    );
    Ok(report)
}

/// Sum of every yield whose case and yield conditions hold at `point`.
///
/// `LET` bindings are evaluated first, in order, and are visible to
/// later bindings and to every condition and yield.
pub fn fee_total<E: Evaluator + ?Sized>(
    evaluator: &E,
    fee: &FeeDecl,
    point: &InputCombination,
) -> Result<Decimal, EvalError> {
    let mut vars = point.to_bindings();
    for binding in &fee.lets {
        let value = evaluator.evaluate_expression(&binding.value, &vars, &fee.name)?;
        vars.insert(binding.name.clone(), Value::Number(value));
    }

    let mut total = Decimal::ZERO;
    for (case, stmt) in fee.yields() {
        if let Some(case) = case {
            if !evaluator.evaluate_logic(&case.condition, &vars, &fee.name)? {
                continue;
            }
        }
        if !evaluator.evaluate_logic(&stmt.condition, &vars, &fee.name)? {
            continue;
        }
        let amount = evaluator.evaluate_expression(&stmt.value, &vars, &fee.name)?;
        total = total
            .checked_add(amount)
            .ok_or_else(|| EvalErrorKind::Overflow("fee total".to_string()).in_fee(&fee.name))?;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipfee_core::{tokenize, FeeItem, InputKind, LetBinding, YieldStmt};

    fn fee(name: &str, yields: &[(&str, &str)]) -> FeeDecl {
        let mut fee = FeeDecl::new(name);
        for (condition, value) in yields {
            fee.body.push(FeeItem::Yield(YieldStmt {
                condition: tokenize(condition),
                value: tokenize(value),
            }));
        }
        fee
    }

    fn claims() -> InputDecl {
        InputDecl::new("ClaimCount", InputKind::Number { min: 1, max: 20 })
    }

    #[test]
    fn linear_fee_is_non_decreasing() {
        let f = fee("ClaimFee", &[("", "ClaimCount * 10")]);
        let report = check_monotonicity(
            &f,
            &[claims()],
            "ClaimCount",
            MonotonicityDirection::NonDecreasing,
        )
        .unwrap();
        assert!(report.is_monotonic);
        assert!(report.violations.is_empty());
        assert!(report.points_checked > 2);
    }

    #[test]
    fn let_bindings_feed_yields() {
        let mut f = fee("ClaimFee", &[("Excess GT 0", "Excess * 25")]);
        f.lets.push(LetBinding {
            name: "Excess".to_string(),
            value: tokenize("MAX ( ClaimCount - 10 , 0 )"),
        });
        let total = fee_total(
            &TokenEvaluator::new(),
            &f,
            &InputCombination::default()
                .with("ClaimCount", DomainValue::Numeric(Decimal::from(14))),
        )
        .unwrap();
        assert_eq!(total, Decimal::from(100));
    }

    #[test]
    fn drop_at_boundary_is_violation() {
        let f = fee(
            "ClaimFee",
            &[("ClaimCount LTE 10", "100"), ("ClaimCount GT 10", "50")],
        );
        let report = check_monotonicity(
            &f,
            &[claims()],
            "ClaimCount",
            MonotonicityDirection::NonDecreasing,
        )
        .unwrap();
        assert!(!report.is_monotonic);
        let v = &report.violations[0];
        assert_eq!(v.from_total, Decimal::from(100));
        assert_eq!(v.to_total, Decimal::from(50));
        assert!(v.from_value <= Decimal::from(10));
        assert!(v.to_value > Decimal::from(10));
    }

    #[test]
    fn non_numeric_target_reports_note() {
        let inputs = vec![InputDecl::new(
            "EntityType",
            InputKind::List {
                choices: vec!["Normal".to_string(), "Micro".to_string()],
            },
        )];
        let f = fee("F", &[("", "1")]);
        let report =
            check_monotonicity(&f, &inputs, "EntityType", MonotonicityDirection::NonDecreasing)
                .unwrap();
        assert!(!report.is_monotonic);
        assert!(report.notes.iter().any(|n| n.contains("not numeric")));
    }

    #[test]
    fn missing_target_reports_note() {
        let f = fee("F", &[("", "1")]);
        let report =
            check_monotonicity(&f, &[claims()], "Pages", MonotonicityDirection::NonDecreasing)
                .unwrap();
        assert!(!report.is_monotonic);
        assert!(report.notes[0].contains("not declared"));
    }

    #[test]
    fn context_inputs_are_held_fixed() {
        let inputs = vec![
            claims(),
            InputDecl::new(
                "EntityType",
                InputKind::List {
                    choices: vec!["Normal".to_string(), "Micro".to_string()],
                },
            ),
            InputDecl::new("Unused", InputKind::Boolean),
        ];
        let f = fee(
            "F",
            &[
                ("EntityType EQ Normal", "ClaimCount * 10"),
                ("EntityType EQ Micro", "100 - ClaimCount"),
            ],
        );
        let report = check_monotonicity(
            &f,
            &inputs,
            "ClaimCount",
            MonotonicityDirection::NonDecreasing,
        )
        .unwrap();
        assert!(!report.is_monotonic);
            assert!(report
            .violations
            .iter()
            .all(|v| v.context.get("EntityType") == Some(&DomainValue::Symbol("Micro".to_string()))));
    }

    #[test]
    fn unreferenced_inputs_still_form_contexts() {
        let inputs = vec![
            claims(),
            InputDecl::new("Expedited", InputKind::Boolean),
            InputDecl::new(
                "EntityType",
                InputKind::List {
                    choices: vec![
                        "Normal".to_string(),
                        "Small".to_string(),
                        "Micro".to_string(),
                    ],
                },
            ),
        ];
        let f = fee(
            "BulkFee",
            &[("ClaimCount LTE 10", "100"), ("ClaimCount GT 10", "50")],
        );
        let report = check_monotonicity(
            &f,
            &inputs,
            "ClaimCount",
            MonotonicityDirection::NonDecreasing,
        )
        .unwrap();
        assert_eq!(report.points_checked, 6 * 19);
        assert_eq!(report.violations.len(), 6);
        let contexts: std::collections::BTreeSet<String> = report
            .violations
            .iter()
            .map(|v| v.context.to_string())
            .collect();
        assert_eq!(contexts.len(), 6);
        assert!(contexts.contains("{EntityType=Small, Expedited=FALSE}"));
    }

    #[test]
    fn evaluation_errors_are_skipped() {
        let f = fee("F", &[("", "100 / ( ClaimCount - 10 )")]);
        let report = check_monotonicity(
            &f,
            &[InputDecl::new("ClaimCount", InputKind::Number { min: 10, max: 12 })],
            "ClaimCount",
            MonotonicityDirection::NonIncreasing,
        )
        .unwrap();
        assert!(report
            .notes
            .iter()
            .any(|n| n.starts_with("Evaluation error at {ClaimCount=10}")));
        assert!(report.is_monotonic);
        assert_eq!(report.points_checked, 3);
    }

    #[test]
    fn violations_are_capped() {
        let f = fee("F", &[("", "0 - ClaimCount")]);
        let limits = VerifyLimits {
            max_violations: 2,
            ..VerifyLimits::default()
        };
        let report = check_monotonicity_with_limits(
            &f,
            &[claims()],
            "ClaimCount",
            MonotonicityDirection::StrictlyIncreasing,
            &limits,
        )
        .unwrap();
        assert_eq!(report.violations.len(), 2);
        assert!(report.notes.iter().any(|n| n.contains("Stopped after 2")));
    }
}
