//! The fixed instruction-pattern catalog.

use regex::Regex;
use std::sync::LazyLock;

/// Replacement for a catalog match.
pub const REDACTED_INSTRUCTION: &str = "[REDACTED_INSTRUCTION]";

/// Replacement for a whole step line.
pub const REDACTED_STEP_LINE: &str = "[REDACTED_STEP_LINE]";

pub(crate) const STEP_LINE_LABEL: &str = "step_line";

/// `(label, pattern)` pairs, applied in order, all case-insensitive.
pub const INSTRUCTION_PATTERNS: &[(&str, &str)] = &[
    (
        "ignore_instructions",
        r"\b(?:ignore|disregard|override)\s+(?:all\s+)?(?:previous\s+|prior\s+)?instructions\b",
    ),
    ("role_reassignment", r"\byou\s+are\s+now\b"),
    ("do_not_follow", r"\bdo\s+not\s+follow\b"),
    ("call_tool", r"\bcall\s+(?:the\s+)?tool\b"),
    ("tool_send_email", r"\bsend_email\b"),
    ("tool_db_query", r"\bdb_query\b"),
    ("tool_http_get", r"\bhttp_get\b"),
    ("debug_mode", r"\bdebug\s+mode\b"),
];

/// A line opening with an ordinal step marker followed by a separator.
/// Stops before any `\r` so CRLF line endings survive redaction.
const STEP_LINE_PATTERN: &str = r"(?im)^[ \t]*(?:step|paso)[ \t]*\d+[ \t]*[:\-][^\r\n]*";

/// A compiled catalog entry.
#[derive(Debug)]
pub struct CatalogEntry {
    pub label: &'static str,
    pub regex: Regex,
}

static CATALOG: LazyLock<Vec<CatalogEntry>> = LazyLock::new(|| {
    INSTRUCTION_PATTERNS
        .iter()
        .map(|&(label, pattern)| CatalogEntry {
            label,
            regex: Regex::new(&format!("(?i){pattern}")).expect("instruction pattern"),
        })
        .collect()
});

static STEP_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(STEP_LINE_PATTERN).expect("step line pattern"));

pub(crate) fn instruction_catalog() -> &'static [CatalogEntry] {
    &CATALOG
}

pub(crate) fn step_line() -> &'static Regex {
    &STEP_LINE
}
