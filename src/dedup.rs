use sha2::{Digest, Sha256};
use std::collections::HashMap;

use crate::scanner::report::Finding;

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.85;

/// Collapses near-duplicate findings. Findings are grouped by `type` first
/// and never compared across types; output preserves the order in which
/// type groups were first encountered.
pub struct DuplicateFinder {
    similarity_threshold: f64,
}

impl Default for DuplicateFinder {
    fn default() -> Self {
        Self::new()
    }
}

impl DuplicateFinder {
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_SIMILARITY_THRESHOLD)
    }

    pub fn with_threshold(similarity_threshold: f64) -> Self {
        Self {
            similarity_threshold,
        }
    }

    /// Keeps the first finding per normalized-snippet hash within each type.
    /// On a collision the finding with the shorter `file` path survives (a
    /// deterministic tie-break that downstream consumers may rely on).
    /// Returns the reduced list and the removed count. Idempotent.
    pub fn clean_duplicates(&self, findings: &[Finding]) -> (Vec<Finding>, usize) {
        let mut cleaned = Vec::new();
        let mut removed = 0usize;

        for (_, members) in group_by_type(findings) {
            let mut order: Vec<String> = Vec::new();
            let mut survivors: HashMap<String, &Finding> = HashMap::new();

            for finding in members {
                let key = content_hash(&finding.snippet);
                match survivors.get(&key) {
                    None => {
                        order.push(key.clone());
                        survivors.insert(key, finding);
                    }
                    Some(existing) => {
                        if finding.file.len() < existing.file.len() {
                            survivors.insert(key, finding);
                        }
                        removed += 1;
                    }
                }
            }

            for key in &order {
                let survivor: &Finding = survivors[key];
                cleaned.push(survivor.clone());
            }
        }

        (cleaned, removed)
    }

    /// Diagnostic variant: reports pairs whose normalized hashes collide and
    /// whose raw snippets are similar at or above the threshold. Only
    /// hash-colliding pairs are evaluated, not all pairs.
    pub fn find_duplicates(&self, findings: &[Finding]) -> Vec<(Finding, Finding, f64)> {
        let mut duplicates = Vec::new();

        for (_, members) in group_by_type(findings) {
            // one representative per hash: the first finding seen
            let mut buckets: HashMap<String, &Finding> = HashMap::new();

            for finding in members {
                let key = content_hash(&finding.snippet);
                match buckets.get(&key) {
                    None => {
                        buckets.insert(key, finding);
                    }
                    Some(&first) => {
                        if first == finding {
                            continue;
                        }
                        let ratio = similarity_ratio(&finding.snippet, &first.snippet);
                        if ratio >= self.similarity_threshold {
                            duplicates.push((finding.clone(), first.clone(), ratio));
                        }
                    }
                }
            }
        }

        duplicates
    }
}

/// Groups findings by type, preserving first-encounter order of the groups
/// and input order within each group.
fn group_by_type(findings: &[Finding]) -> Vec<(&str, Vec<&Finding>)> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&Finding>> = HashMap::new();
    for finding in findings {
        groups
            .entry(finding.kind.as_str())
            .or_insert_with(|| {
                order.push(finding.kind.as_str());
                Vec::new()
            })
            .push(finding);
    }
    order
        .into_iter()
        .map(|kind| {
            let members = groups.remove(kind).unwrap_or_default();
            (kind, members)
        })
        .collect()
}

/// Digest of the normalized snippet: lowercased and trimmed, whitespace
/// runs collapsed, everything that is not a word character or space
/// dropped, then leading scheme and "www." stripped and ".internal."
/// collapsed to "internal". The step order matters: because the character
/// filter runs first, "https://x" and "x" hash differently and are never
/// merged.
fn content_hash(content: &str) -> String {
    format!("{:x}", Sha256::digest(normalize(content).as_bytes()))
}

fn normalize(content: &str) -> String {
    let lowered = content.to_lowercase();
    let mut normalized: String = lowered
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == ' ')
        .collect();
    for prefix in ["https://", "http://"] {
        if let Some(rest) = normalized.strip_prefix(prefix) {
            normalized = rest.to_string();
            break;
        }
    }
    if let Some(rest) = normalized.strip_prefix("www.") {
        normalized = rest.to_string();
    }
    normalized.replace(".internal.", "internal")
}

/// Similarity of two snippets as 2·LCS / (|a| + |b|) over characters.
fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }

    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for &ca in &a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
        curr[0] = 0;
    }

    2.0 * prev[b.len()] as f64 / (a.len() + b.len()) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::report::Severity;

    fn finding(file: &str, line: usize, kind: &str, snippet: &str) -> Finding {
        Finding {
            file: file.to_string(),
            line,
            kind: kind.to_string(),
            snippet: snippet.to_string(),
            severity: Severity::Medium,
        }
    }

    #[test]
    fn shorter_file_path_wins_on_collision() {
        let input = vec![
            finding("b/nested/config.env", 5, "Password", "password: topsecret99"),
            finding("a/config.env", 3, "Password", "Password:  topsecret99"),
        ];
        let (cleaned, removed) = DuplicateFinder::new().clean_duplicates(&input);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(removed, 1);
        assert_eq!(cleaned[0].file, "a/config.env");
    }

    #[test]
    fn clean_duplicates_is_idempotent() {
        let input = vec![
            finding("a.txt", 1, "Password", "password=one"),
            finding("b.txt", 2, "Password", "password=one"),
            finding("a.txt", 3, "Email Address", "a@b.co"),
            finding("c.txt", 4, "Password", "password=two"),
        ];
        let finder = DuplicateFinder::new();
        let (once, removed) = finder.clean_duplicates(&input);
        assert_eq!(removed, 1);
        let (twice, removed_again) = finder.clean_duplicates(&once);
        assert_eq!(removed_again, 0);
        assert_eq!(twice, once);
    }

    #[test]
    fn findings_of_different_types_are_never_merged() {
        let input = vec![
            finding("a.txt", 1, "Password", "secret-value-123"),
            finding("a.txt", 1, "Hardcoded API Key", "secret-value-123"),
        ];
        let (cleaned, removed) = DuplicateFinder::new().clean_duplicates(&input);
        assert_eq!(cleaned.len(), 2);
        assert_eq!(removed, 0);
    }

    #[test]
    fn output_preserves_type_group_encounter_order() {
        let input = vec![
            finding("a.txt", 1, "Email Address", "x@y.co"),
            finding("a.txt", 2, "Password", "password=1234"),
            finding("b.txt", 3, "Email Address", "z@w.co"),
        ];
        let (cleaned, _) = DuplicateFinder::new().clean_duplicates(&input);
        let kinds: Vec<&str> = cleaned.iter().map(|f| f.kind.as_str()).collect();
        assert_eq!(
            kinds,
            vec!["Email Address", "Email Address", "Password"]
        );
    }

    #[test]
    fn normalization_folds_case_whitespace_and_punctuation() {
        assert_eq!(normalize("  Hello   World  "), "hello world");
        assert_eq!(
            normalize("https://www.Example.com/path"),
            "httpswwwexamplecompath"
        );
        assert_eq!(normalize("http://db.internal.corp"), "httpdbinternalcorp");
        assert_eq!(normalize("key=val!!"), "keyval");
    }

    #[test]
    fn scheme_only_variants_stay_distinct() {
        // the character filter runs before the prefix strips, so a scheme
        // still distinguishes the normalized forms
        assert_ne!(
            normalize("https://example.com/path"),
            normalize("example.com/path")
        );

        let input = vec![
            finding("a.txt", 1, "Internal URL/IP", "https://db.example.com/x"),
            finding("b.txt", 2, "Internal URL/IP", "db.example.com/x"),
        ];
        let (cleaned, removed) = DuplicateFinder::new().clean_duplicates(&input);
        assert_eq!(cleaned.len(), 2);
        assert_eq!(removed, 0);
    }

    #[test]
    fn fuzzy_pass_reports_colliding_similar_pairs() {
        let input = vec![
            finding("a.txt", 1, "Password", "password: topsecret99"),
            finding("b.txt", 2, "Password", "password:  topsecret99"),
        ];
        let duplicates = DuplicateFinder::new().find_duplicates(&input);
        assert_eq!(duplicates.len(), 1);
        assert!(duplicates[0].2 >= DEFAULT_SIMILARITY_THRESHOLD);
    }

    #[test]
    fn fuzzy_pass_is_scoped_to_hash_collisions() {
        // near-identical snippets that normalize differently are never
        // compared
        let input = vec![
            finding("a.txt", 1, "Password", "password: topsecret99"),
            finding("b.txt", 2, "Password", "password: topsecret98"),
        ];
        let duplicates = DuplicateFinder::with_threshold(0.5).find_duplicates(&input);
        assert!(duplicates.is_empty());
    }

    #[test]
    fn fuzzy_pass_never_crosses_types() {
        let input = vec![
            finding("a.txt", 1, "Password", "identical-snippet-value"),
            finding("b.txt", 2, "Hardcoded API Key", "identical-snippet-value"),
        ];
        let duplicates = DuplicateFinder::new().find_duplicates(&input);
        assert!(duplicates.is_empty());
    }

    #[test]
    fn similarity_ratio_bounds() {
        assert_eq!(similarity_ratio("abc", "abc"), 1.0);
        assert_eq!(similarity_ratio("abc", "xyz"), 0.0);
        let mid = similarity_ratio("abcd", "abxd");
        assert!(mid > 0.5 && mid < 1.0);
    }
}
