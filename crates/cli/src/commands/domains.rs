use std::path::Path;
use std::process;

use ipfee_verify::{extract_domains, total_size, VariableDomain, VerifyLimits};
use serde::Serialize;

use crate::{load_schedule, print_json, report_error, OutputFormat};

/// One input's domain as shown to the user.
#[derive(Debug, Serialize)]
struct DomainSummary {
    name: String,
    kind: &'static str,
    finite: bool,
    cardinality: Option<u64>,
    representatives: Vec<String>,
}

impl DomainSummary {
    fn new(domain: &VariableDomain, max_samples: usize) -> Self {
        DomainSummary {
            name: domain.name.clone(),
            kind: domain.domain.kind_name(),
            finite: domain.domain.is_finite(),
            cardinality: domain.domain.cardinality(),
            representatives: domain
                .domain
                .representative_values(max_samples)
                .iter()
                .map(|v| v.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DomainsOutput {
    domains: Vec<DomainSummary>,
    total_size: Option<u64>,
}

pub(crate) fn cmd_domains(file: &Path, limits: &VerifyLimits, output: OutputFormat, quiet: bool) {
    let schedule = load_schedule(file, output, quiet);

    let domains = match extract_domains(&schedule.inputs) {
        Ok(d) => d,
        Err(e) => {
            report_error(&format!("domain error: {}", e), output, quiet);
            process::exit(1);
        }
    };

    let out = DomainsOutput {
        domains: domains
            .iter()
            .map(|d| DomainSummary::new(d, limits.max_samples_per_domain))
            .collect(),
        total_size: total_size(&domains),
    };

    if quiet {
        return;
    }
    match output {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Text => {
            println!("Input Domains");
            println!("=============");
            println!();
            for d in &out.domains {
                let size = match (d.cardinality, d.finite) {
                    (Some(n), _) => n.to_string(),
                    (None, true) => "too large to count".to_string(),
                    (None, false) => "unbounded".to_string(),
                };
                println!("  {} ({}): {} value(s)", d.name, d.kind, size);
                println!("    representatives: {}", d.representatives.join(", "));
            }
            println!();
            match out.total_size {
                Some(n) => println!("Combined size: {}", n),
                None => println!("Combined size: unbounded"),
            }
        }
    }
}
