//! Domain analysis: combined sizes and combination generation.

use crate::combination::{Combinations, ValueSource};
use crate::domain::VariableDomain;
use crate::error::VerifyError;
use crate::limits::VerifyLimits;

/// Product of the domains' cardinalities.
///
/// `None` when any domain is unbounded or the product overflows `u64`.
pub fn total_size(domains: &[VariableDomain]) -> Option<u64> {
    domains
        .iter()
        .try_fold(1u64, |acc, d| acc.checked_mul(d.domain.cardinality()?))
}

/// Every combination of the domains' values, under the default cap.
pub fn generate_all_combinations(
    domains: &[VariableDomain],
) -> Result<Combinations<'_>, VerifyError> {
    generate_all_combinations_with_limits(domains, &VerifyLimits::default())
}

/// Every combination of the domains' values.
///
/// Fails with [`VerifyError::DomainTooLarge`] when the combined size is
/// unknown or above `limits.max_exhaustive_combinations`; nothing is
/// enumerated in that case.
pub fn generate_all_combinations_with_limits<'a>(
    domains: &'a [VariableDomain],
    limits: &VerifyLimits,
) -> Result<Combinations<'a>, VerifyError> {
    let size = total_size(domains);
    match size {
        Some(n) if n <= limits.max_exhaustive_combinations => {
            tracing::debug!(combinations = n, "exhaustive enumeration");
            Ok(Combinations::new(domains, ValueSource::All))
        }
        _ => Err(VerifyError::DomainTooLarge {
            combinations: size,
            limit: limits.max_exhaustive_combinations,
        }),
    }
}

/// Combinations of each domain's representative values.
pub fn generate_representative_combinations(
    domains: &[VariableDomain],
    max_samples_per_domain: usize,
) -> Combinations<'_> {
    tracing::debug!(
        domains = domains.len(),
        max_samples_per_domain,
        "representative enumeration"
    );
    Combinations::new(domains, ValueSource::Representative(max_samples_per_domain))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::InputDomain;

    fn number(name: &str, min: i64, max: i64) -> VariableDomain {
        VariableDomain::new(name, InputDomain::Number { min, max })
    }

    #[test]
    fn size_multiplies_cardinalities() {
        let domains = vec![
            VariableDomain::new("X", InputDomain::Boolean),
            number("N", 1, 20),
        ];
        assert_eq!(total_size(&domains), Some(40));
        assert_eq!(total_size(&[]), Some(1));
    }

    #[test]
    fn size_overflow_is_none() {
        let domains = vec![number("A", 0, i64::MAX), number("B", 0, i64::MAX)];
        assert_eq!(total_size(&domains), None);
    }

    #[test]
    fn size_with_amount_is_none() {
        let domains = vec![
            VariableDomain::new("X", InputDomain::Boolean),
            VariableDomain::new(
                "P",
                InputDomain::Amount {
                    currency: "EUR".to_string(),
                },
            ),
        ];
        assert_eq!(total_size(&domains), None);
    }

    #[test]
    fn exhaustive_generation_over_cap_fails() {
        let domains = vec![number("A", 1, 10_000), number("B", 1, 10_000)];
        match generate_all_combinations(&domains) {
            Err(VerifyError::DomainTooLarge {
                combinations,
                limit,
            }) => {
                assert_eq!(combinations, Some(100_000_000));
                assert_eq!(limit, 10_000_000);
            }
            other => panic!("expected DomainTooLarge, got {:?}", other.map(|_| ())),
        };
    }

    #[test]
    fn exhaustive_generation_counts_match_size() {
        let domains = vec![
            VariableDomain::new("X", InputDomain::Boolean),
            number("N", 1, 5),
        ];
        let count = generate_all_combinations(&domains).unwrap().count();
        assert_eq!(Some(count as u64), total_size(&domains));
    }

    #[test]
    fn custom_cap_applies() {
        let limits = VerifyLimits {
            max_exhaustive_combinations: 3,
            ..VerifyLimits::default()
        };
        let domains = vec![number("N", 1, 4)];
        assert!(generate_all_combinations_with_limits(&domains, &limits).is_err());
    }
}
