use colored::{ColoredString, Colorize};
use std::collections::HashMap;
use std::error::Error;
use std::path::Path;

use crate::scanner::report::{Finding, Severity};

const SEVERITY_ORDER: &[Severity] = &[
    Severity::Critical,
    Severity::High,
    Severity::Medium,
    Severity::Low,
    Severity::Info,
];

/// Writes a finding list as pretty-printed UTF-8 JSON. Non-ASCII snippet
/// content is preserved verbatim.
pub fn save_json(findings: &[Finding], path: &Path) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(findings)?;
    std::fs::write(path, json)?;
    Ok(())
}

fn severity_heading(severity: Severity) -> ColoredString {
    let heading = format!("═══ {} SEVERITY ═══", severity.to_string().to_uppercase());
    match severity {
        Severity::Critical => heading.red().bold(),
        Severity::High => heading.red(),
        Severity::Medium => heading.yellow(),
        Severity::Low => heading.blue(),
        Severity::Info => heading.cyan(),
    }
}

/// Prints the cleaned findings grouped by severity, then by type.
pub fn display_results(findings: &[Finding]) {
    println!("\n{}", "=".repeat(60));
    println!("{}", "[🔍] SCAN RESULTS".cyan().bold());
    println!("{}\n", "=".repeat(60));

    if findings.is_empty() {
        println!("{}", "[✓] No sensitive data found".green());
        return;
    }

    for &severity in SEVERITY_ORDER {
        let mut type_order: Vec<&str> = Vec::new();
        let mut by_type: HashMap<&str, Vec<&Finding>> = HashMap::new();
        for finding in findings.iter().filter(|f| f.severity == severity) {
            by_type
                .entry(finding.kind.as_str())
                .or_insert_with(|| {
                    type_order.push(finding.kind.as_str());
                    Vec::new()
                })
                .push(finding);
        }
        if type_order.is_empty() {
            continue;
        }

        println!("\n{}", severity_heading(severity));
        for kind in type_order {
            let items = &by_type[kind];
            println!("\n{} ({} found)", kind.bold(), items.len());
            for finding in items {
                println!(
                    "  {}:{}  {}",
                    finding.file.cyan(),
                    finding.line.to_string().green(),
                    finding.snippet
                );
            }
        }
    }
}

/// Run-end summary, printed regardless of individual failures.
pub fn display_summary(
    files_processed: usize,
    raw_count: usize,
    cleaned_count: usize,
    elapsed_secs: f64,
) {
    println!("\n{}", "=".repeat(60));
    println!("{}", "Run statistics:".cyan());
    println!("{} {files_processed}", "Files processed:".green());
    println!("{} {raw_count}", "Findings before cleanup:".green());
    println!("{} {cleaned_count}", "Findings after cleanup:".green());
    println!("{} {elapsed_secs:.2}s", "Elapsed:".green());
    println!("{}", "=".repeat(60));
}
