use regex::{Regex, RegexBuilder};

use crate::scanner::report::Severity;

/// A named, compiled detection rule. Immutable once built.
#[derive(Debug, Clone)]
pub struct PatternRule {
    pub name: String,
    pub regex: Regex,
}

/// Compiled pattern set shared by every file scan. Built once at startup;
/// a malformed rule is a fatal configuration error.
#[derive(Debug)]
pub struct PatternRegistry {
    rules: Vec<PatternRule>,
    custom_domain: Option<Regex>,
}

impl PatternRegistry {
    pub fn compile(
        dictionary: &[(&str, &str)],
        custom_domains: &[String],
    ) -> Result<Self, regex::Error> {
        let mut rules = Vec::with_capacity(dictionary.len());
        for (name, source) in dictionary {
            let regex = RegexBuilder::new(source)
                .case_insensitive(true)
                .multi_line(true)
                .build()?;
            rules.push(PatternRule {
                name: (*name).to_string(),
                regex,
            });
        }
        Ok(Self {
            rules,
            custom_domain: compile_custom_domains(custom_domains)?,
        })
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    pub fn custom_domain(&self) -> Option<&Regex> {
        self.custom_domain.as_ref()
    }
}

/// Builds one matcher recognizing URLs pointing at any of the given bare
/// domains: scheme, optional subdomain chain, optional port and path.
/// An empty or all-blank list yields no matcher.
fn compile_custom_domains(domains: &[String]) -> Result<Option<Regex>, regex::Error> {
    let escaped: Vec<String> = domains
        .iter()
        .map(|d| d.trim())
        .filter(|d| !d.is_empty())
        .map(regex::escape)
        .collect();
    if escaped.is_empty() {
        return Ok(None);
    }
    let source = format!(
        r"https?://(?:[\w-]+\.)*(?:{})(?::\d+)?(?:/\S*)?",
        escaped.join("|")
    );
    let regex = RegexBuilder::new(&source)
        .case_insensitive(true)
        .multi_line(true)
        .build()?;
    Ok(Some(regex))
}

const CRITICAL_TYPES: &[&str] = &["private key pem", "password", "credit card", "api key"];
const HIGH_TYPES: &[&str] = &["jwt token", "certificate", "bank account"];

/// Severity is a pure function of the rule name: case-insensitive substring
/// membership against the fixed tier lists, defaulting to medium.
pub fn severity_for(pattern_name: &str) -> Severity {
    let name = pattern_name.to_lowercase();
    if CRITICAL_TYPES.iter().any(|t| name.contains(t)) {
        Severity::Critical
    } else if HIGH_TYPES.iter().any(|t| name.contains(t)) {
        Severity::High
    } else {
        Severity::Medium
    }
}
