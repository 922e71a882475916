mod dedup;
mod output;
mod scanner;
mod walker;

use colored::Colorize;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use dedup::DuplicateFinder;
use scanner::cache::ScanCache;
use scanner::coordinator::ScanCoordinator;
use scanner::engine::{FileScanner, ScanOptions};
use scanner::patterns::PATTERN_DICTIONARY;
use scanner::registry::PatternRegistry;

const BANNER: &str = r"
 ███████╗███████╗ ██████╗██████╗ ███████╗████████╗    ██╗  ██╗ ██████╗ ██╗   ██╗███╗   ██╗██████╗
 ██╔════╝██╔════╝██╔════╝██╔══██╗██╔════╝╚══██╔══╝    ██║  ██║██╔═══██╗██║   ██║████╗  ██║██╔══██╗
 ███████╗█████╗  ██║     ██████╔╝█████╗     ██║       ███████║██║   ██║██║   ██║██╔██╗ ██║██║  ██║
 ╚════██║██╔══╝  ██║     ██╔══██╗██╔══╝     ██║       ██╔══██║██║   ██║██║   ██║██║╚██╗██║██║  ██║
 ███████║███████╗╚██████╗██║  ██║███████╗   ██║       ██║  ██║╚██████╔╝╚██████╔╝██║ ╚████║██████╔╝
 ╚══════╝╚══════╝ ╚═════╝╚═╝  ╚═╝╚══════╝   ╚═╝       ╚═╝  ╚═╝ ╚═════╝  ╚═════╝ ╚═╝  ╚═══╝╚═════╝

 A powerful tool for sniffing out secrets in your codebase
";

const USAGE: &str = "Usage: secrethound -t <target> [options]

Options:
  -t, --target <path>      Directory or file to scan (required)
  -d, --domains <list>     Custom domains: a file with one domain per line,
                           or a comma-separated list
  -c, --cache <dir>        Directory for caching per-file results
  -s, --search <term>      Search for a literal string instead of patterns
  -ud, --decode-unicode    Decode unicode-escape sequences before scanning
  -h, --help               Show this help";

#[derive(Debug, Default)]
struct CliArgs {
    target: PathBuf,
    domains: Option<String>,
    cache_dir: Option<PathBuf>,
    search_term: Option<String>,
    decode_unicode: bool,
}

fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut target = None;
    let mut parsed = CliArgs::default();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-t" | "--target" => {
                target = Some(PathBuf::from(
                    iter.next().ok_or("missing value for --target")?,
                ));
            }
            "-d" | "--domains" => {
                parsed.domains = Some(iter.next().ok_or("missing value for --domains")?.clone());
            }
            "-c" | "--cache" => {
                parsed.cache_dir = Some(PathBuf::from(
                    iter.next().ok_or("missing value for --cache")?,
                ));
            }
            "-s" | "--search" => {
                parsed.search_term =
                    Some(iter.next().ok_or("missing value for --search")?.clone());
            }
            "-ud" | "--decode-unicode" => parsed.decode_unicode = true,
            "-h" | "--help" => return Err(String::new()),
            other => return Err(format!("unknown argument: {other}")),
        }
    }

    parsed.target = target.ok_or("--target is required")?;
    Ok(parsed)
}

/// Custom domains come either from a file (one per line) or inline as a
/// comma-separated list; blank entries are dropped.
fn load_custom_domains(value: &str) -> Vec<String> {
    if Path::new(value).is_file() {
        match std::fs::read_to_string(value) {
            Ok(content) => {
                println!("{}", format!("Loaded custom domains from file: {value}").cyan());
                content
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect()
            }
            Err(err) => {
                eprintln!(
                    "{}",
                    format!("[WARNING] Cannot read domains file {value}: {err}").yellow()
                );
                Vec::new()
            }
        }
    } else {
        let domains: Vec<String> = value
            .split(',')
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .collect();
        if domains.is_empty() {
            eprintln!(
                "{}",
                format!("[WARNING] No domains parsed from: {value}").yellow()
            );
        } else {
            println!(
                "{}",
                format!("Using custom domains: {}", domains.join(", ")).cyan()
            );
        }
        domains
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    println!("{}", BANNER.cyan());

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(message) => {
            if !message.is_empty() {
                eprintln!("{}", format!("[ERROR] {message}").red());
            }
            println!("{USAGE}");
            std::process::exit(if message.is_empty() { 0 } else { 2 });
        }
    };

    let started = Instant::now();

    let custom_domains = cli
        .domains
        .as_deref()
        .map(load_custom_domains)
        .unwrap_or_default();

    // A malformed rule invalidates every subsequent scan: fatal at startup.
    let registry = Arc::new(PatternRegistry::compile(PATTERN_DICTIONARY, &custom_domains)?);

    let files = match walker::collect_files(&cli.target) {
        Ok(files) => files,
        Err(err) => {
            eprintln!(
                "{}",
                format!("[ERROR] Cannot read scan target {}: {err}", cli.target.display()).red()
            );
            std::process::exit(1);
        }
    };
    if files.is_empty() {
        println!("{}", "No files to scan".yellow());
        return Ok(());
    }

    // Relative paths are computed against the scan root; a single-file
    // target uses its parent directory.
    let resolved = cli.target.canonicalize()?;
    let scan_root = if resolved.is_file() {
        resolved.parent().unwrap_or(&resolved).to_path_buf()
    } else {
        resolved
    };

    if let Some(term) = &cli.search_term {
        println!("{}", format!("Searching for: {term}").cyan());
    }

    let scanner = Arc::new(FileScanner::new(
        registry,
        ScanCache::new(cli.cache_dir.clone()),
        ScanOptions {
            search_term: cli.search_term.clone(),
            decode_unicode: cli.decode_unicode,
        },
    ));
    let coordinator = ScanCoordinator::new(scanner);
    let raw_findings = coordinator.scan_files(&files, &scan_root).await;

    let raw_path = Path::new("output/raw_scan_results.json");
    output::save_json(&raw_findings, raw_path)?;
    println!(
        "{}",
        format!("Raw results saved to {}", raw_path.display()).green()
    );

    let finder = DuplicateFinder::new();
    let (cleaned, removed) = finder.clean_duplicates(&raw_findings);
    println!("{}", format!("Removed {removed} duplicates").yellow());

    let cleaned_path = Path::new("output/scan_results.json");
    output::save_json(&cleaned, cleaned_path)?;
    println!(
        "{}",
        format!("Cleaned results saved to {}", cleaned_path.display()).green()
    );

    output::display_results(&cleaned);
    output::display_summary(
        files.len(),
        raw_findings.len(),
        cleaned.len(),
        started.elapsed().as_secs_f64(),
    );

    Ok(())
}
