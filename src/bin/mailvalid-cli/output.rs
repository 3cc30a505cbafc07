use anyhow::{Result, bail};

use mailvalid_lib::{CheckOutcome, Severity, ValidationConfig, ValidationReport};

pub fn write_reports(
    reports: &[ValidationReport],
    format: &str,
    config: &ValidationConfig,
) -> Result<()> {
    match format {
        "human" => {
            for report in reports {
                println!("{}", render_human(report, config.verbose));
            }
            Ok(())
        }
        "json" => write_json(reports),
        other => bail!("unknown --format '{other}', use: human|json"),
    }
}

pub fn any_invalid(reports: &[ValidationReport]) -> bool {
    reports.iter().any(|report| !report.is_valid())
}

fn symbol(outcome: &CheckOutcome) -> &'static str {
    match (outcome.passed, outcome.severity) {
        (true, _) => "✓",
        (false, Severity::Fatal) => "✗",
        (false, _) => "!",
    }
}

pub fn render_human(report: &ValidationReport, verbose: bool) -> String {
    let mut out = String::new();
    if verbose {
        for outcome in &report.outcomes {
            out.push_str(&format!(
                "  {} [{}] {}\n",
                symbol(outcome),
                outcome.stage,
                outcome.message
            ));
        }
    }
    if report.is_valid() {
        out.push_str(&format!("✓ {} is a valid email address.", report.address));
    } else {
        out.push_str(&format!(
            "✗ {} is NOT a valid email address.",
            report.address
        ));
    }
    out
}

#[cfg(feature = "with-serde")]
fn write_json(reports: &[ValidationReport]) -> Result<()> {
    #[derive(serde::Serialize)]
    struct Row<'a> {
        #[serde(flatten)]
        report: &'a ValidationReport,
        valid: bool,
    }

    let rows: Vec<Row<'_>> = reports
        .iter()
        .map(|report| Row {
            report,
            valid: report.is_valid(),
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

#[cfg(not(feature = "with-serde"))]
fn write_json(_reports: &[ValidationReport]) -> Result<()> {
    bail!("format=json nécessite la feature 'with-serde'")
}
