use colored::Colorize;
use std::collections::HashSet;
use std::io;
use std::path::{Component, Path};
use std::sync::Arc;
use tokio::io::AsyncReadExt;

use crate::scanner::cache::ScanCache;
use crate::scanner::patterns::EXCLUDE_DIRS;
use crate::scanner::registry::{self, PatternRegistry};
use crate::scanner::report::{Finding, Severity};

const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;
const CHUNKED_READ_THRESHOLD: u64 = 10 * 1024 * 1024;
const READ_CHUNK_SIZE: usize = 1024 * 1024;
const SNIPPET_MAX_CHARS: usize = 100;
const SEARCH_YIELD_EVERY_MATCHES: usize = 1000;

pub const USER_SEARCH_TYPE: &str = "User Search";
pub const CUSTOM_DOMAIN_TYPE: &str = "Custom Domain URL";

/// Per-run options affecting every file scan.
#[derive(Debug, Default, Clone)]
pub struct ScanOptions {
    /// Verbatim, case-sensitive term. When set, pattern scanning is skipped
    /// entirely and every occurrence of the term is reported as a
    /// "User Search" finding.
    pub search_term: Option<String>,
    /// Decode unicode-escape sequences in each file (rewriting it) before
    /// scanning.
    pub decode_unicode: bool,
}

/// Turns one file's content into a list of findings. Shared across the
/// batch via `Arc`; all state is immutable after construction.
pub struct FileScanner {
    registry: Arc<PatternRegistry>,
    cache: ScanCache,
    options: ScanOptions,
}

impl FileScanner {
    pub fn new(registry: Arc<PatternRegistry>, cache: ScanCache, options: ScanOptions) -> Self {
        Self {
            registry,
            cache,
            options,
        }
    }

    /// Skip policy: oversized or unstatable files, and anything under an
    /// excluded directory. The coordinator memoizes this per path for the
    /// batch.
    pub fn should_skip(&self, path: &Path) -> bool {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > MAX_FILE_SIZE => true,
            Err(_) => true,
            Ok(_) => path.components().any(|component| {
                matches!(component, Component::Normal(name)
                    if EXCLUDE_DIRS.contains(&name.to_str().unwrap_or_default()))
            }),
        }
    }

    /// Scans one file. Any read or decode failure yields an empty list plus
    /// a warning; a single file never aborts the batch.
    pub async fn scan_path(&self, path: &Path, root: &Path) -> Vec<Finding> {
        match self.scan_path_inner(path, root).await {
            Ok(findings) => findings,
            Err(err) => {
                eprintln!(
                    "{}",
                    format!("[WARNING] Cannot scan {}: {err}", path.display()).yellow()
                );
                Vec::new()
            }
        }
    }

    async fn scan_path_inner(&self, path: &Path, root: &Path) -> io::Result<Vec<Finding>> {
        if self.options.decode_unicode {
            predecode_file(path);
        }

        let bytes = self.read_bytes(path).await?;
        let rel_path = path.strip_prefix(root).unwrap_or(path).display().to_string();

        // Search-term runs bypass the cache in both directions: the key is
        // content-only and a record written under a term would poison
        // pattern-scan results for the same content.
        if let Some(term) = &self.options.search_term {
            let content = String::from_utf8_lossy(&bytes);
            return Ok(self.search_content(&content, term, &rel_path).await);
        }

        let key = ScanCache::content_key(&bytes);
        if let Some(cached) = self.cache.load(&key) {
            return Ok(cached);
        }

        let content = String::from_utf8_lossy(&bytes);
        let findings = self.scan_content(&content, &rel_path).await;
        self.cache.store(&key, &findings);
        Ok(findings)
    }

    /// Reads the full byte content. Files above the streaming threshold are
    /// read in fixed-size chunks with a yield between chunks so one large
    /// file cannot starve concurrently scheduled scans.
    async fn read_bytes(&self, path: &Path) -> io::Result<Vec<u8>> {
        let meta = tokio::fs::metadata(path).await?;
        if meta.len() <= CHUNKED_READ_THRESHOLD {
            return tokio::fs::read(path).await;
        }

        let mut file = tokio::fs::File::open(path).await?;
        let mut content = Vec::with_capacity(meta.len() as usize);
        let mut chunk = vec![0u8; READ_CHUNK_SIZE];
        loop {
            let n = file.read(&mut chunk).await?;
            if n == 0 {
                break;
            }
            content.extend_from_slice(&chunk[..n]);
            tokio::task::yield_now().await;
        }
        Ok(content)
    }

    /// Runs every compiled rule over the entire content (not line-by-line),
    /// then the custom-domain matcher if configured. Output order is rule
    /// iteration order, then match order.
    pub async fn scan_content(&self, content: &str, rel_path: &str) -> Vec<Finding> {
        let newline_offsets: Vec<usize> = content.match_indices('\n').map(|(i, _)| i).collect();
        let mut findings = Vec::new();
        let mut seen: HashSet<(String, String, usize, String)> = HashSet::new();

        for rule in self.registry.rules() {
            for m in rule.regex.find_iter(content) {
                push_unique(
                    &mut findings,
                    &mut seen,
                    rule.name.clone(),
                    rel_path,
                    line_for_offset(&newline_offsets, m.start()),
                    truncate_chars(m.as_str(), SNIPPET_MAX_CHARS),
                    registry::severity_for(&rule.name),
                );
            }
            tokio::task::yield_now().await;
        }

        if let Some(domain_rule) = self.registry.custom_domain() {
            for m in domain_rule.find_iter(content) {
                push_unique(
                    &mut findings,
                    &mut seen,
                    CUSTOM_DOMAIN_TYPE.to_string(),
                    rel_path,
                    line_for_offset(&newline_offsets, m.start()),
                    truncate_chars(m.as_str(), SNIPPET_MAX_CHARS),
                    Severity::Medium,
                );
            }
        }

        findings
    }

    /// Verbatim, case-sensitive search: one finding per occurrence of the
    /// term, with the line recovered from the occurrence's byte offset.
    /// Yields to the scheduler periodically on match-heavy files.
    async fn search_content(&self, content: &str, term: &str, rel_path: &str) -> Vec<Finding> {
        let newline_offsets: Vec<usize> = content.match_indices('\n').map(|(i, _)| i).collect();
        let mut findings = Vec::new();
        for (count, (offset, matched)) in content.match_indices(term).enumerate() {
            findings.push(Finding {
                file: rel_path.to_string(),
                line: line_for_offset(&newline_offsets, offset),
                kind: USER_SEARCH_TYPE.to_string(),
                snippet: truncate_chars(matched.trim(), SNIPPET_MAX_CHARS),
                severity: Severity::Info,
            });
            if (count + 1) % SEARCH_YIELD_EVERY_MATCHES == 0 {
                tokio::task::yield_now().await;
            }
        }
        findings
    }
}

/// 1-based line number for a byte offset: one plus the count of newlines
/// before it. Holds for multi-line matches, which use their first byte.
fn line_for_offset(newline_offsets: &[usize], offset: usize) -> usize {
    newline_offsets.partition_point(|&i| i < offset) + 1
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[allow(clippy::too_many_arguments)]
fn push_unique(
    findings: &mut Vec<Finding>,
    seen: &mut HashSet<(String, String, usize, String)>,
    kind: String,
    rel_path: &str,
    line: usize,
    snippet: String,
    severity: Severity,
) {
    let key = (kind.clone(), rel_path.to_string(), line, snippet.clone());
    if seen.insert(key) {
        findings.push(Finding {
            file: rel_path.to_string(),
            line,
            kind,
            snippet,
            severity,
        });
    }
}

/// Decodes unicode-escape sequences in a file and overwrites it. Best
/// effort: unreadable or unchanged files are left alone.
fn predecode_file(path: &Path) {
    let Ok(content) = std::fs::read_to_string(path) else {
        return;
    };
    let decoded = decode_unicode_escapes(&content);
    if decoded != content {
        let _ = std::fs::write(path, decoded);
    }
}

/// Interprets `\uXXXX`, `\xNN` and the common single-character escapes.
/// Malformed sequences are kept literally.
fn decode_unicode_escapes(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some('u') => {
                chars.next();
                let digits: String = chars.clone().take(4).collect();
                match u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32) {
                    Some(decoded) if digits.len() == 4 => {
                        for _ in 0..4 {
                            chars.next();
                        }
                        out.push(decoded);
                    }
                    _ => {
                        out.push('\\');
                        out.push('u');
                    }
                }
            }
            Some('x') => {
                chars.next();
                let digits: String = chars.clone().take(2).collect();
                match u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32) {
                    Some(decoded) if digits.len() == 2 => {
                        for _ in 0..2 {
                            chars.next();
                        }
                        out.push(decoded);
                    }
                    _ => {
                        out.push('\\');
                        out.push('x');
                    }
                }
            }
            Some('n') => {
                chars.next();
                out.push('\n');
            }
            Some('t') => {
                chars.next();
                out.push('\t');
            }
            Some('r') => {
                chars.next();
                out.push('\r');
            }
            Some('\\') => {
                chars.next();
                out.push('\\');
            }
            Some('\'') => {
                chars.next();
                out.push('\'');
            }
            Some('"') => {
                chars.next();
                out.push('"');
            }
            Some('0') => {
                chars.next();
                out.push('\0');
            }
            _ => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn scanner_with(dictionary: &[(&str, &str)], options: ScanOptions) -> FileScanner {
        let registry = Arc::new(PatternRegistry::compile(dictionary, &[]).unwrap());
        FileScanner::new(registry, ScanCache::disabled(), options)
    }

    fn default_scanner() -> FileScanner {
        scanner_with(
            crate::scanner::patterns::PATTERN_DICTIONARY,
            ScanOptions::default(),
        )
    }

    #[test]
    fn line_for_offset_counts_preceding_newlines() {
        let content = "one\ntwo\nthree";
        let newlines: Vec<usize> = content.match_indices('\n').map(|(i, _)| i).collect();
        assert_eq!(line_for_offset(&newlines, 0), 1);
        assert_eq!(line_for_offset(&newlines, 3), 1); // the newline itself
        assert_eq!(line_for_offset(&newlines, 4), 2);
        assert_eq!(line_for_offset(&newlines, 8), 3);
    }

    #[tokio::test]
    async fn password_on_line_three_is_critical() {
        let scanner = default_scanner();
        let content = "HOST=localhost\nPORT=5432\npassword: abc123XYZsupersecret\n";
        let findings = scanner.scan_content(content, "config.env").await;

        let password = findings
            .iter()
            .find(|f| f.kind == "Password")
            .expect("password finding");
        assert_eq!(password.file, "config.env");
        assert_eq!(password.line, 3);
        assert_eq!(password.severity, Severity::Critical);
        assert_eq!(password.snippet, "password: abc123XYZsupersecret");
    }

    #[tokio::test]
    async fn multi_line_match_reports_starting_line() {
        let dictionary = [("Block", r"BEGIN[\s\S]*?END")];
        let scanner = scanner_with(&dictionary, ScanOptions::default());
        let content = "first\nsecond BEGIN\nmiddle\nEND tail\n";
        let findings = scanner.scan_content(content, "block.txt").await;
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, 2);
    }

    #[tokio::test]
    async fn repeated_match_on_same_line_is_deduplicated() {
        let dictionary = [
            ("Token A", r"tok_[a-z]{4}"),
            ("Token A again", r"tok_[a-z]{4}"),
        ];
        let scanner = scanner_with(&dictionary, ScanOptions::default());
        let findings = scanner
            .scan_content("x tok_abcd y tok_abcd\n", "dup.txt")
            .await;
        // same snippet+line under two rule names: both kept (different type),
        // but the literal repeat within one rule collapses
        assert_eq!(
            findings.iter().filter(|f| f.kind == "Token A").count(),
            1
        );
        assert_eq!(
            findings.iter().filter(|f| f.kind == "Token A again").count(),
            1
        );
    }

    #[tokio::test]
    async fn snippet_is_truncated_to_100_chars() {
        let dictionary = [("Long Run", r"A{150}")];
        let scanner = scanner_with(&dictionary, ScanOptions::default());
        let content = "A".repeat(150);
        let findings = scanner.scan_content(&content, "long.txt").await;
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].snippet.chars().count(), 100);
    }

    #[tokio::test]
    async fn search_term_mode_ignores_patterns() {
        let options = ScanOptions {
            search_term: Some("TODO".to_string()),
            decode_unicode: false,
        };
        let scanner = scanner_with(crate::scanner::patterns::PATTERN_DICTIONARY, options);
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "password: hunter2secretvalue\n  TODO fix this\n").unwrap();

        let findings = scanner.scan_path(&path, dir.path()).await;
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, USER_SEARCH_TYPE);
        assert_eq!(findings[0].severity, Severity::Info);
        assert_eq!(findings[0].line, 2);
        assert_eq!(findings[0].snippet, "TODO");
    }

    #[tokio::test]
    async fn search_reports_every_occurrence() {
        let options = ScanOptions {
            search_term: Some("TODO".to_string()),
            decode_unicode: false,
        };
        let scanner = scanner_with(&[], options);
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "TODO one and TODO two\nthen a third TODO\n").unwrap();

        let findings = scanner.scan_path(&path, dir.path()).await;
        assert_eq!(findings.len(), 3);
        let lines: Vec<usize> = findings.iter().map(|f| f.line).collect();
        assert_eq!(lines, vec![1, 1, 2]);
        assert!(findings.iter().all(|f| f.snippet == "TODO"));
    }

    #[tokio::test]
    async fn search_term_is_case_sensitive() {
        let options = ScanOptions {
            search_term: Some("TODO".to_string()),
            decode_unicode: false,
        };
        let scanner = scanner_with(&[], options);
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "todo lowercase only\n").unwrap();
        assert!(scanner.scan_path(&path, dir.path()).await.is_empty());
    }

    #[test]
    fn oversized_file_is_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("huge.log");
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(60 * 1024 * 1024).unwrap();

        let scanner = default_scanner();
        assert!(scanner.should_skip(&path));
    }

    #[test]
    fn excluded_directories_are_skipped() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("node_modules").join("pkg");
        std::fs::create_dir_all(&nested).unwrap();
        let path = nested.join("index.js");
        std::fs::write(&path, "const x = 1;\n").unwrap();

        let kept = dir.path().join("kept.js");
        std::fs::write(&kept, "const x = 1;\n").unwrap();

        let scanner = default_scanner();
        assert!(scanner.should_skip(&path));
        assert!(!scanner.should_skip(&kept));
    }

    #[tokio::test]
    async fn unreadable_file_yields_empty_list() {
        let dir = tempdir().unwrap();
        let scanner = default_scanner();
        let findings = scanner.scan_path(&dir.path().join("missing.txt"), dir.path()).await;
        assert!(findings.is_empty());
    }

    #[tokio::test]
    async fn invalid_utf8_is_substituted_not_fatal() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mixed.log");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"password: abc123XYZsupersecret\n\xff\xfe garbage\n")
            .unwrap();

        let scanner = default_scanner();
        let findings = scanner.scan_path(&path, dir.path()).await;
        assert!(findings.iter().any(|f| f.kind == "Password"));
    }

    #[tokio::test]
    async fn cache_hit_matches_fresh_scan() {
        let content = b"password: abc123XYZsupersecret\n";
        let cache_dir = tempdir().unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.env");
        std::fs::write(&path, content).unwrap();

        let registry =
            Arc::new(PatternRegistry::compile(crate::scanner::patterns::PATTERN_DICTIONARY, &[]).unwrap());
        let scanner = FileScanner::new(
            Arc::clone(&registry),
            ScanCache::new(Some(cache_dir.path().to_path_buf())),
            ScanOptions::default(),
        );

        let fresh = scanner.scan_path(&path, dir.path()).await;
        assert!(!fresh.is_empty());
        // record exists now; a second scan must return the identical list
        let key = ScanCache::content_key(content);
        assert!(cache_dir.path().join(format!("{key}.json")).exists());
        let cached = scanner.scan_path(&path, dir.path()).await;
        assert_eq!(cached, fresh);
    }

    #[tokio::test]
    async fn custom_domain_pass_emits_medium_findings() {
        let domains = vec!["corp.example".to_string()];
        let registry = Arc::new(PatternRegistry::compile(&[], &domains).unwrap());
        let scanner = FileScanner::new(registry, ScanCache::disabled(), ScanOptions::default());

        let findings = scanner
            .scan_content("see https://api.corp.example:8080/v2\n", "app.js")
            .await;
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, CUSTOM_DOMAIN_TYPE);
        assert_eq!(findings[0].severity, Severity::Medium);
        assert_eq!(findings[0].snippet, "https://api.corp.example:8080/v2");
    }

    #[test]
    fn unicode_escape_decoding() {
        assert_eq!(decode_unicode_escapes(r"café"), "café");
        assert_eq!(decode_unicode_escapes(r"tab\there"), "tab\there");
        assert_eq!(decode_unicode_escapes(r"\x41BC"), "ABC");
        // malformed sequences stay literal
        assert_eq!(decode_unicode_escapes(r"\uZZZZ"), r"\uZZZZ");
        assert_eq!(decode_unicode_escapes(r"trailing\"), r"trailing\");
    }
}
