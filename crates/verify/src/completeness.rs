//! Completeness: does some yield match every legal input combination?

use std::collections::BTreeSet;

use ipfee_core::{FeeDecl, InputDecl};

use crate::analyzer::{
    generate_all_combinations_with_limits, generate_representative_combinations, total_size,
};
use crate::combination::{Combinations, InputCombination};
use crate::conditions::{extract_fee_conditions, referenced_variables, FeeCondition};
use crate::domain::{extract_domains, VariableDomain};
use crate::error::VerifyError;
use crate::limits::VerifyLimits;
use crate::logic::LogicalExpression;
use crate::report::{CompletenessReport, FeeCompletenessReport, VerificationMethod};

/// Check every fee of a schedule with the default limits.
pub fn check_completeness(
    inputs: &[InputDecl],
    fees: &[FeeDecl],
) -> Result<CompletenessReport, VerifyError> {
    check_completeness_with_limits(inputs, fees, &VerifyLimits::default())
}

pub fn check_completeness_with_limits(
    inputs: &[InputDecl],
    fees: &[FeeDecl],
    limits: &VerifyLimits,
) -> Result<CompletenessReport, VerifyError> {
    let domains = extract_domains(inputs)?;
    let fees = fees
        .iter()
        .map(|fee| check_fee_completeness_with_limits(fee, &domains, limits))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CompletenessReport { fees })
}

/// Check one fee against the declared domains with the default limits.
pub fn check_fee_completeness(
    fee: &FeeDecl,
    domains: &[VariableDomain],
) -> Result<FeeCompletenessReport, VerifyError> {
    check_fee_completeness_with_limits(fee, domains, &VerifyLimits::default())
}

/// Check one fee against the declared domains.
///
/// Only the domains of variables the fee's conditions reference are
/// enumerated. Up to `exhaustive_threshold` combinations (never more than
/// `max_exhaustive_combinations`) are checked exhaustively; beyond that,
/// representative values are sampled. When no declared input is
/// referenced, the fee is complete only if every yield is unconditional.
pub fn check_fee_completeness_with_limits(
    fee: &FeeDecl,
    domains: &[VariableDomain],
    limits: &VerifyLimits,
) -> Result<FeeCompletenessReport, VerifyError> {
    let conditions = extract_fee_conditions(fee)?;
    let referenced = referenced_variables(&conditions);
    let relevant: Vec<VariableDomain> = domains
        .iter()
        .filter(|d| referenced.contains(&d.name))
        .cloned()
        .collect();
    let domain_size = total_size(&relevant);

    let mut report = FeeCompletenessReport {
        fee_name: fee.name.clone(),
        is_complete: false,
        method: VerificationMethod::Exhaustive,
        combinations_checked: 0,
        domain_size,
        gaps: Vec::new(),
        notes: Vec::new(),
    };

    let declared: BTreeSet<&str> = domains.iter().map(|d| d.name.as_str()).collect();
    let undeclared: Vec<&str> = referenced
        .iter()
        .map(|s| s.as_str())
        .filter(|name| !declared.contains(name))
        .collect();
    if !undeclared.is_empty() {
        report.notes.push(format!(
            "Conditions reference undeclared variable(s): {}",
            undeclared.join(", ")
        ));
    }

    if conditions.is_empty() {
        report.notes.push("Fee has no yields".to_string());
        tracing::info!(fee = %fee.name, "fee has no yields");
        return Ok(report);
    }

    if relevant.is_empty() {
        // Nothing to enumerate: only unconditional yields cover the fee.
        report.combinations_checked = 1;
        report.is_complete = conditions
            .iter()
            .all(|c| c.expression == LogicalExpression::True);
        if !report.is_complete {
            report.notes.push("Fee has no yields".to_string());
        }
        tracing::info!(fee = %fee.name, complete = report.is_complete, "no declared inputs referenced");
        return Ok(report);
    }

    let exhaustive_limit = limits
        .exhaustive_threshold
        .min(limits.max_exhaustive_combinations);
    let combinations: Combinations<'_> = match domain_size {
        Some(n) if n <= exhaustive_limit => {
            generate_all_combinations_with_limits(&relevant, limits)?
        }
        _ => {
            report.method = VerificationMethod::RepresentativeSampling;
            let size = match domain_size {
                Some(n) => format!("{} combinations", n),
                None => "unbounded".to_string(),
            };
            report.notes.push(format!(
                "Domain too large for exhaustive enumeration ({}); representative sampling may miss edge cases",
                size
            ));
            tracing::warn!(fee = %fee.name, domain = %size, "falling back to representative sampling");
            generate_representative_combinations(&relevant, limits.max_samples_per_domain)
        }
    };

    let mut truncated = false;
    for combination in combinations {
        report.combinations_checked += 1;
        if is_covered(&conditions, &combination)? {
            continue;
        }
        if report.gaps.len() >= limits.max_reported_gaps {
            truncated = true;
            break;
        }
        report.gaps.push(combination);
    }

    if truncated {
        report.notes.push(format!(
            "Gap list truncated at {}; stopped after {} combinations",
            limits.max_reported_gaps, report.combinations_checked
        ));
        tracing::warn!(fee = %fee.name, cap = limits.max_reported_gaps, "gap cap reached");
    }

    report.is_complete = report.gaps.is_empty() && !truncated;
    tracing::info!(
        fee = %fee.name,
        complete = report.is_complete,
        checked = report.combinations_checked,
        gaps = report.gaps.len(),
        "completeness checked"
    );
    Ok(report)
}

fn is_covered(
    conditions: &[FeeCondition],
    combination: &InputCombination,
) -> Result<bool, VerifyError> {
    for condition in conditions {
        if condition.expression.evaluate(combination)? {
            return Ok(true);
        }
    }
    Ok(false)
}
