use std::path::Path;
use std::process;

use ipfee_verify::{
    check_monotonicity_with_limits, MonotonicityDirection, MonotonicityReport, VerifyLimits,
};

use crate::{load_schedule, print_json, report_error, OutputFormat, EXIT_PROPERTY_FAILED};

pub(crate) fn cmd_monotonicity(
    file: &Path,
    fee: &str,
    input: &str,
    direction: MonotonicityDirection,
    limits: &VerifyLimits,
    output: OutputFormat,
    quiet: bool,
) {
    let schedule = load_schedule(file, output, quiet);

    let Some(fee_decl) = schedule.fee(fee) else {
        report_error(&format!("unknown fee '{}'", fee), output, quiet);
        process::exit(1);
    };

    let report = match check_monotonicity_with_limits(
        fee_decl,
        &schedule.inputs,
        input,
        direction,
        limits,
    ) {
        Ok(r) => r,
        Err(e) => {
            report_error(&format!("monotonicity error: {}", e), output, quiet);
            process::exit(1);
        }
    };

    if !quiet {
        match output {
            OutputFormat::Json => print_json(&report),
            OutputFormat::Text => print_text(&report),
        }
    }

    if !report.is_monotonic {
        process::exit(EXIT_PROPERTY_FAILED);
    }
}

fn print_text(report: &MonotonicityReport) {
    println!("Monotonicity Report");
    println!("===================");
    println!();
    println!("  {}", report.summary());
    for violation in &report.violations {
        println!("    violation: {}", violation);
    }
    for note in &report.notes {
        println!("    note: {}", note);
    }
}
