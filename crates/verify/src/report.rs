//! Verification reports.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::combination::InputCombination;

/// How a completeness check covered the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VerificationMethod {
    Exhaustive,
    RepresentativeSampling,
}

impl fmt::Display for VerificationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationMethod::Exhaustive => write!(f, "Exhaustive enumeration"),
            VerificationMethod::RepresentativeSampling => write!(f, "Representative sampling"),
        }
    }
}

/// Completeness of a single fee.
#[derive(Debug, Clone, Serialize)]
pub struct FeeCompletenessReport {
    pub fee_name: String,
    pub is_complete: bool,
    pub method: VerificationMethod,
    pub combinations_checked: u64,
    /// Size of the referenced inputs' joint domain, if finite.
    pub domain_size: Option<u64>,
    pub gaps: Vec<InputCombination>,
    pub notes: Vec<String>,
}

impl FeeCompletenessReport {
    pub fn summary(&self) -> String {
        if self.is_complete {
            format!(
                "{}: complete ({}, {} combinations)",
                self.fee_name, self.method, self.combinations_checked
            )
        } else {
            format!(
                "{}: INCOMPLETE, {} gap(s) ({}, {} combinations)",
                self.fee_name,
                self.gaps.len(),
                self.method,
                self.combinations_checked
            )
        }
    }
}

/// Completeness of every fee in a schedule.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CompletenessReport {
    pub fees: Vec<FeeCompletenessReport>,
}

impl CompletenessReport {
    pub fn is_complete(&self) -> bool {
        self.fees.iter().all(|f| f.is_complete)
    }

    pub fn incomplete_fees(&self) -> impl Iterator<Item = &FeeCompletenessReport> {
        self.fees.iter().filter(|f| !f.is_complete)
    }

    pub fn summary(&self) -> String {
        let incomplete = self.incomplete_fees().count();
        if incomplete == 0 {
            format!("all {} fee(s) complete", self.fees.len())
        } else {
            format!("{} of {} fee(s) incomplete", incomplete, self.fees.len())
        }
    }
}

// ──────────────────────────────────────────────
// Monotonicity
// ──────────────────────────────────────────────

/// Required trend of a fee as one input increases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MonotonicityDirection {
    NonDecreasing,
    NonIncreasing,
    StrictlyIncreasing,
    StrictlyDecreasing,
}

impl MonotonicityDirection {
    /// Whether going from `earlier` to `later` breaks the direction.
    pub fn is_violated(self, earlier: Decimal, later: Decimal) -> bool {
        match self {
            MonotonicityDirection::NonDecreasing => later < earlier,
            MonotonicityDirection::NonIncreasing => later > earlier,
            MonotonicityDirection::StrictlyIncreasing => later <= earlier,
            MonotonicityDirection::StrictlyDecreasing => later >= earlier,
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            MonotonicityDirection::NonDecreasing => "non-decreasing",
            MonotonicityDirection::NonIncreasing => "non-increasing",
            MonotonicityDirection::StrictlyIncreasing => "strictly-increasing",
            MonotonicityDirection::StrictlyDecreasing => "strictly-decreasing",
        }
    }
}

impl fmt::Display for MonotonicityDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for MonotonicityDirection {
    type Err = String;

    /// Accepts `non-decreasing`, `NonDecreasing`, `non_decreasing`, ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match folded.as_str() {
            "nondecreasing" => Ok(MonotonicityDirection::NonDecreasing),
            "nonincreasing" => Ok(MonotonicityDirection::NonIncreasing),
            "strictlyincreasing" => Ok(MonotonicityDirection::StrictlyIncreasing),
            "strictlydecreasing" => Ok(MonotonicityDirection::StrictlyDecreasing),
            _ => Err(format!(
                "unknown direction '{}' (expected non-decreasing, non-increasing, \
                 strictly-increasing or strictly-decreasing)",
                s
            )),
        }
    }
}

/// Two adjacent points whose totals break the expected direction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonotonicityViolation {
    /// Values held fixed for the other inputs.
    pub context: InputCombination,
    pub from_value: Decimal,
    pub from_total: Decimal,
    pub to_value: Decimal,
    pub to_total: Decimal,
}

impl fmt::Display for MonotonicityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}: total {} -> {} with {}",
            self.from_value.normalize(),
            self.to_value.normalize(),
            self.from_total.normalize(),
            self.to_total.normalize(),
            self.context
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MonotonicityReport {
    pub fee_name: String,
    pub target_variable: String,
    pub direction: MonotonicityDirection,
    pub is_monotonic: bool,
    pub points_checked: u64,
    pub violations: Vec<MonotonicityViolation>,
    pub notes: Vec<String>,
}

impl MonotonicityReport {
    pub fn summary(&self) -> String {
        if self.is_monotonic {
            format!(
                "{} is {} in {} ({} points)",
                self.fee_name, self.direction, self.target_variable, self.points_checked
            )
        } else {
            format!(
                "{} is NOT {} in {}: {} violation(s) ({} points)",
                self.fee_name,
                self.direction,
                self.target_variable,
                self.violations.len(),
                self.points_checked
            )
        }
    }
}
