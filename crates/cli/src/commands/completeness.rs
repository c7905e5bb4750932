use std::path::Path;
use std::process;

use ipfee_verify::{check_completeness_with_limits, CompletenessReport, VerifyLimits};

use crate::{load_schedule, print_json, report_error, OutputFormat, EXIT_PROPERTY_FAILED};

pub(crate) fn cmd_completeness(
    file: &Path,
    fee: Option<&str>,
    limits: &VerifyLimits,
    output: OutputFormat,
    quiet: bool,
) {
    let schedule = load_schedule(file, output, quiet);

    let fees = match fee {
        Some(name) => match schedule.fee(name) {
            Some(f) => vec![f.clone()],
            None => {
                report_error(&format!("unknown fee '{}'", name), output, quiet);
                process::exit(1);
            }
        },
        None => schedule.fees.clone(),
    };

    let report = match check_completeness_with_limits(&schedule.inputs, &fees, limits) {
        Ok(r) => r,
        Err(e) => {
            report_error(&format!("completeness error: {}", e), output, quiet);
            process::exit(1);
        }
    };

    if !quiet {
        match output {
            OutputFormat::Json => print_json(&report),
            OutputFormat::Text => print_text(&report),
        }
    }

    if !report.is_complete() {
        process::exit(EXIT_PROPERTY_FAILED);
    }
}

fn print_text(report: &CompletenessReport) {
    println!("Completeness Report");
    println!("===================");
    println!();
    for fee in &report.fees {
        println!("  {}", fee.summary());
        for gap in &fee.gaps {
            println!("    gap: {}", gap);
        }
        for note in &fee.notes {
            println!("    note: {}", note);
        }
    }
    println!();
    println!("{}", report.summary());
}
