//! Input domains and the values drawn from them.
//!
//! Every declared input maps to an [`InputDomain`]: the set of legal
//! values it can take. A domain can report its cardinality, enumerate its
//! values lazily, and produce a small representative subset for sampling.

use std::collections::BTreeSet;
use std::fmt;

use ipfee_core::{InputDecl, InputKind};
use ipfee_eval::Value;
use rust_decimal::Decimal;
use time::Date;

use crate::error::VerifyError;

/// Power sets with more members than this are sampled instead of listed
/// in full when a representative subset is requested.
const MULTI_LIST_FULL_REPRESENTATIVE: u64 = 1024;

/// Fixed representative magnitudes for amount inputs, which declare no bounds.
const AMOUNT_REPRESENTATIVES: [i64; 3] = [0, 100, 1000];

// ──────────────────────────────────────────────
// Domain values
// ──────────────────────────────────────────────

/// One concrete value of an input, tagged by the input's kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DomainValue {
    Boolean(bool),
    Symbol(String),
    Numeric(Decimal),
    Amount { amount: Decimal, currency: String },
    Date(Date),
    /// Selected symbols, in declaration order.
    MultiSelect(Vec<String>),
}

impl DomainValue {
    /// Numeric magnitude of a numeric or amount value.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            DomainValue::Numeric(d) => Some(*d),
            DomainValue::Amount { amount, .. } => Some(*amount),
            _ => None,
        }
    }

    /// Convert into the evaluator's runtime representation.
    pub fn to_runtime(&self) -> Value {
        match self {
            DomainValue::Boolean(b) => Value::Bool(*b),
            DomainValue::Symbol(s) => Value::Text(s.clone()),
            DomainValue::Numeric(d) => Value::Number(*d),
            DomainValue::Amount { amount, currency } => Value::Amount {
                amount: *amount,
                currency: currency.clone(),
            },
            DomainValue::Date(d) => Value::Date(*d),
            DomainValue::MultiSelect(items) => Value::List(items.clone()),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            DomainValue::Boolean(_) => "boolean",
            DomainValue::Symbol(_) => "symbol",
            DomainValue::Numeric(_) => "number",
            DomainValue::Amount { .. } => "amount",
            DomainValue::Date(_) => "date",
            DomainValue::MultiSelect(_) => "multi-select",
        }
    }
}

impl fmt::Display for DomainValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainValue::Boolean(true) => write!(f, "TRUE"),
            DomainValue::Boolean(false) => write!(f, "FALSE"),
            DomainValue::Symbol(s) => write!(f, "{}", s),
            DomainValue::Numeric(d) => write!(f, "{}", d.normalize()),
            DomainValue::Amount { amount, currency } => {
                write!(f, "{}<{}>", amount.normalize(), currency)
            }
            DomainValue::Date(d) => write!(f, "{}", d),
            DomainValue::MultiSelect(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

// ──────────────────────────────────────────────
// Domains
// ──────────────────────────────────────────────

/// The legal value space of one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputDomain {
    Boolean,
    List(Vec<String>),
    /// Any subset of the choices.
    MultiList(Vec<String>),
    Number { min: i64, max: i64 },
    Date { min: Date, max: Date },
    /// Unbounded; only representative values can be drawn.
    Amount { currency: String },
}

impl InputDomain {
    pub fn kind_name(&self) -> &'static str {
        match self {
            InputDomain::Boolean => "boolean",
            InputDomain::List(_) => "list",
            InputDomain::MultiList(_) => "multilist",
            InputDomain::Number { .. } => "number",
            InputDomain::Date { .. } => "date",
            InputDomain::Amount { .. } => "amount",
        }
    }

    pub fn is_finite(&self) -> bool {
        !matches!(self, InputDomain::Amount { .. })
    }

    /// Number of values, or `None` when unbounded or not representable.
    pub fn cardinality(&self) -> Option<u64> {
        match self {
            InputDomain::Boolean => Some(2),
            InputDomain::List(choices) => u64::try_from(choices.len()).ok(),
            InputDomain::MultiList(choices) => {
                let n = u32::try_from(choices.len()).ok()?;
                1u64.checked_shl(n)
            }
            InputDomain::Number { min, max } => {
                let span = i128::from(*max) - i128::from(*min) + 1;
                u64::try_from(span.max(0)).ok()
            }
            InputDomain::Date { min, max } => {
                let days = (*max - *min).whole_days() + 1;
                u64::try_from(days.max(0)).ok()
            }
            InputDomain::Amount { .. } => None,
        }
    }

    /// Lazily enumerate every value of the domain.
    ///
    /// Amount domains and power sets too large to count yield their
    /// representative values instead.
    pub fn values(&self) -> Box<dyn Iterator<Item = DomainValue> + '_> {
        match self {
            InputDomain::Boolean => Box::new(
                [DomainValue::Boolean(true), DomainValue::Boolean(false)].into_iter(),
            ),
            InputDomain::List(choices) => {
                Box::new(choices.iter().map(|c| DomainValue::Symbol(c.clone())))
            }
            InputDomain::MultiList(choices) => match self.cardinality() {
                Some(count) => Box::new((0..count).map(move |mask| select(choices, mask))),
                None => Box::new(sparse_power_set(choices).into_iter()),
            },
            InputDomain::Number { min, max } => {
                Box::new((*min..=*max).map(|n| DomainValue::Numeric(Decimal::from(n))))
            }
            InputDomain::Date { min, max } => {
                let max = *max;
                Box::new(
                    std::iter::successors(Some(*min), |d| d.next_day())
                        .take_while(move |d| *d <= max)
                        .map(DomainValue::Date),
                )
            }
            InputDomain::Amount { currency } => Box::new(amount_representatives(currency).into_iter()),
        }
    }

    /// A small subset of the domain covering its boundaries.
    ///
    /// Numbers give min, max, midpoint and up to `max_samples - 3` evenly
    /// spaced interior points. Dates give min, max and midpoint. Amounts
    /// give a fixed set. Other domains are small enough to return whole.
    pub fn representative_values(&self, max_samples: usize) -> Vec<DomainValue> {
        match self {
            InputDomain::Number { min, max } => number_representatives(*min, *max, max_samples)
                .into_iter()
                .map(|n| DomainValue::Numeric(Decimal::from(n)))
                .collect(),
            InputDomain::Date { min, max } => {
                if min > max {
                    return Vec::new();
                }
                let mid = *min + (*max - *min) / 2;
                [*min, mid, *max]
                    .into_iter()
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .map(DomainValue::Date)
                    .collect()
            }
            InputDomain::Amount { currency } => amount_representatives(currency),
            InputDomain::MultiList(choices) => match self.cardinality() {
                Some(n) if n <= MULTI_LIST_FULL_REPRESENTATIVE => self.values().collect(),
                _ => sparse_power_set(choices),
            },
            InputDomain::Boolean | InputDomain::List(_) => self.values().collect(),
        }
    }
}

fn select(choices: &[String], mask: u64) -> DomainValue {
    DomainValue::MultiSelect(
        choices
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1u64 << i) != 0)
            .map(|(_, c)| c.clone())
            .collect(),
    )
}

/// Empty selection, each singleton, and the full selection.
fn sparse_power_set(choices: &[String]) -> Vec<DomainValue> {
    let mut out = vec![DomainValue::MultiSelect(Vec::new())];
    out.extend(
        choices
            .iter()
            .map(|c| DomainValue::MultiSelect(vec![c.clone()])),
    );
    if choices.len() > 1 {
        out.push(DomainValue::MultiSelect(choices.to_vec()));
    }
    out
}

fn amount_representatives(currency: &str) -> Vec<DomainValue> {
    AMOUNT_REPRESENTATIVES
        .iter()
        .map(|n| DomainValue::Amount {
            amount: Decimal::from(*n),
            currency: currency.to_string(),
        })
        .collect()
}

fn number_representatives(min: i64, max: i64, max_samples: usize) -> BTreeSet<i64> {
    let mut points = BTreeSet::new();
    if min > max {
        return points;
    }
    let (lo, hi) = (i128::from(min), i128::from(max));
    let span = hi - lo;
    points.insert(min);
    points.insert(max);
    points.extend(i64::try_from(lo + span / 2).ok());

    let interior = i128::try_from(max_samples.saturating_sub(3)).unwrap_or(0);
    for i in 1..=interior {
        points.extend(i64::try_from(lo + span * i / (interior + 1)).ok());
    }
    points
}

// ──────────────────────────────────────────────
// Extraction from declarations
// ──────────────────────────────────────────────

/// A named input together with its domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDomain {
    pub name: String,
    pub domain: InputDomain,
}

impl VariableDomain {
    pub fn new(name: impl Into<String>, domain: InputDomain) -> Self {
        VariableDomain {
            name: name.into(),
            domain,
        }
    }
}

/// Map one input declaration to its domain.
pub fn extract_domain(input: &InputDecl) -> Result<InputDomain, VerifyError> {
    let domain = match &input.kind {
        InputKind::Boolean => InputDomain::Boolean,
        InputKind::List { choices } => InputDomain::List(choices.clone()),
        InputKind::MultiList { choices } => InputDomain::MultiList(choices.clone()),
        InputKind::Number { min, max } => {
            if min > max {
                return Err(VerifyError::InvalidDomain {
                    name: input.name.clone(),
                    reason: format!("minimum {} exceeds maximum {}", min, max),
                });
            }
            InputDomain::Number {
                min: *min,
                max: *max,
            }
        }
        InputKind::Date { min, max } => {
            if min > max {
                return Err(VerifyError::InvalidDomain {
                    name: input.name.clone(),
                    reason: format!("first date {} is after last date {}", min, max),
                });
            }
            InputDomain::Date {
                min: *min,
                max: *max,
            }
        }
        InputKind::Amount { currency } => InputDomain::Amount {
            currency: currency.clone(),
        },
    };
    tracing::debug!(
        input = %input.name,
        kind = domain.kind_name(),
        cardinality = ?domain.cardinality(),
        "extracted domain"
    );
    Ok(domain)
}

/// Map every input declaration to a named domain, in declaration order.
pub fn extract_domains(inputs: &[InputDecl]) -> Result<Vec<VariableDomain>, VerifyError> {
    inputs
        .iter()
        .map(|input| Ok(VariableDomain::new(input.name.clone(), extract_domain(input)?)))
        .collect()
}
