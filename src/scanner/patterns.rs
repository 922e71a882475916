use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Detection rules as plain data: rule name -> regex source. Every entry is
/// compiled by the `PatternRegistry` with case-insensitive + multi-line
/// semantics, so no inline flags appear here.
pub static PATTERN_DICTIONARY: &[(&str, &str)] = &[
    // === 1. Critical credentials and access keys ===
    ("Private Key PEM", r"-----BEGIN\s+(?:RSA\s+)?PRIVATE KEY-----"),
    ("AWS Access Key", r"\bAKI[A-Z0-9]{16}\b"),
    ("AWS Secret Key", r"\b[0-9a-zA-Z]{40}\b"),
    ("GitHub Personal Access Token", r"\bghp_[0-9A-Za-z]{40}\b"),
    ("Slack Bot Token", r"\bxoxb-[0-9]{11}-[0-9]{11}-[0-9a-zA-Z]{24}\b"),
    ("Firebase Secret", r"\bAAAA[A-Za-z0-9_-]{120,}\b"),
    ("Bearer/OAuth Token", r"\b(?:Bearer|OAuth)\s+[A-Za-z0-9\-_]+\b"),
    ("JWT Token", r"\beyJ[A-Za-z0-9\-_]+\.[A-Za-z0-9\-_]+\.[A-Za-z0-9\-_]+\b"),
    (
        "Hardcoded API Key",
        r#"(?:api|apikey|key|secret|token|password)["']?\s*[:=]\s*["']?[A-Za-z0-9-_]{16,}["']?"#,
    ),
    ("Sentry DSN", r"https://[a-zA-Z0-9]+@[a-zA-Z0-9.-]+/\d+"),

    // === 2. Critical service paths ===
    ("Admin Panel Path", r"\b(?:/admin|/dashboard|/manager|/controlpanel)\b"),
    ("Log File Path", r"\b(?:/logs|/log|/error_log|/access_log)\b"),
    ("Config File", r"\b(?:\.env|\.env\.local|\.env\.production|\.env\.dev)\b"),
    ("API Path", r"/api/[A-Za-z0-9\-/_.?=&]+"),
    (
        "Internal URL/IP",
        r"(?:localhost|127\.0\.0\.1|10\.\d+\.\d+\.\d+|192\.168\.\d+\.\d+|\.svc\.k8s\.|\.internal\.|https?://[^/]+\.internal\.[^/\s]+)",
    ),

    // === 3. Credentials and sessions ===
    ("Username/Login", r"\b(?:логин|username)[\s:=]*\w+\b"),
    ("Password", r"\b(?:пароль|password)[\s:=]*\S+\b"),
    ("Session ID", r"\bsession[_-]?id=\w+\b"),
    ("MD5 Hash", r"\b[A-Fa-f0-9]{32}\b"),
    ("SHA-256 Hash", r"\b[A-Fa-f0-9]{64}\b"),
    ("Public SSH Key", r"ssh-rsa\s+[A-Za-z0-9+/=]{100,}"),
    ("Certificate PEM", r"-----BEGIN\s+CERTIFICATE-----"),
    ("XSRF Token", r"\bXSRF-TOKEN=[A-Za-z0-9\-_]+\b"),
    ("JWT Cookie", r"\b(?:jwt|auth_token)=ey[A-Za-z0-9\-_]+\.[A-Za-z0-9\-_]+\b"),

    // === 4. Financial data ===
    ("Credit Card Visa/MC", r"(?:4[0-9]{12}(?:[0-9]{3})?|5[1-5][0-9]{14})"),
    ("Credit Card Amex", r"3[47][0-9]{13}"),
    ("CVV/CVC 3 digits", r"\b(?:CVV2?|CVC)[\s:=]*\d{3}\b"),
    ("IBAN", r"\b[A-Z]{2}\d{2}[A-Z0-9]{4}(?:\s?[A-Z0-9]{4}){2,}\b"),
    ("SWIFT/BIC INT", r"\bSWIFT[\s:=]?[A-Z]{6}[A-Z0-9]{2}(?:[A-Z0-9]{3})?\b"),
    ("Bank Account RU", r"\b\d{20}\b"),
    ("Routing Number US", r"\b\d{9}\b"),
    ("Bitcoin Address", r"\b(?:bc1|[13][a-zA-HJ-NP-Z0-9]{25,39})\b"),
    ("PayPal Transaction ID", r"\b(?:PP-|PAY-)[A-Z0-9]{8,12}\b"),

    // === 5. Personal identifiers (PII) ===
    ("Passport (RU)", r"паспорт\s*(?:серия\s*)?\d{2}[\s-]?\d{2}[\s-]?\d{6}"),
    ("Passport (EN)", r"Passport\s*(?:No\.?|number)?\s*\d{6,9}"),
    ("SNILS", r"\b\d{3}-\d{3}-\d{3}\s*\d{2}\b"),
    ("Social Security Number (SSN)", r"\b\d{3}-\d{2}-\d{4}\b"),
    ("Medical Record Number", r"\bMRN\d{8}\b"),
    ("Insurance Policy Number", r"\bINS\d{10,15}\b"),

    // === 6. Contact information ===
    ("Email Address", r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b"),
    (
        "Personal Email",
        r"\b[A-Za-z0-9._%+-]+@(?:gmail|yahoo|hotmail|outlook|mail|yandex|protonmail|icloud|aol|zoho|mailru|rambler)\.(?:com|ru|net|org|info|co|ua|kz|by|me|de|fr|es|it)\b",
    ),
    (
        "Phone Number",
        r"\+?(?:\d{1,3}[\s\-\.]?)?\(?\d{3,4}\)?[\s\-\.]?\d{3}[\s\-\.]?\d{2,4}[\s\-\.]?\d{2,4}",
    ),
    ("GPS Coordinates", r"\b[-+]?\d{1,3}\.\d+,\s*[-+]?\d{1,3}\.\d+\b"),
    ("IP Address", r"\bIP[\s:=]?\d{1,3}(?:\.\d{1,3}){3}\b"),

    // === 7. Legal and commercial information ===
    (
        "Confidential Tag",
        r"\b(?:Конфиденциально|Confidential|INTERNAL_USE_ONLY|RESTRICTED|TOP_SECRET)\b",
    ),
    ("Contract Number", r"\b(?:Договор|Contract)\s+№\s*\d+\b"),
    ("NDA Agreement", r"\b(?:NDA|Non-Disclosure\s+Agreement)\b"),

    // === 8. Miscellaneous sensitive data ===
    ("Birth Date", r"\b\d{1,2}[/.\-]\d{1,2}[/.\-]\d{2,4}\b"),
    ("File/Doc Links", r"https?://[^\s]+\.(?:pdf|docx?|xlsx?|csv|pptx?|txt)"),
    ("Crypto Wallet Address", r"\b0x[a-fA-F0-9]{40}\b"),
    ("Database Connection String", r"\b(?:mongodb|mysql|postgresql|redis)://[^\s]+\b"),
    ("OAuth2 Refresh Token", r"\brefresh_token=[A-Za-z0-9\-_]+\b"),
    ("Internal Project ID", r"\b(?:project_id|internal_key|internal_token)=\w+\b"),
];

/// Directory components that are never descended into or scanned.
pub static EXCLUDE_DIRS: &[&str] = &[".git", "__pycache__", "venv", "node_modules", ".vscode"];

/// Extensions eligible for scanning during a directory walk. A target that
/// is itself a file is always scanned, whatever its extension.
pub static SUPPORTED_EXTENSIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        ".py", ".js", ".ts", ".java", ".c", ".cpp", ".rb", ".php", ".cs", ".go", ".rs", ".json",
        ".yaml", ".yml", ".env", ".log", ".txt", ".html", ".xml", ".sql", ".md", ".conf",
        ".properties",
    ]
    .into_iter()
    .collect()
});
