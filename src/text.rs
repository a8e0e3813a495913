//! Text cleanup applied to code coming back from the backend

use regex::Regex;
use std::sync::OnceLock;

/// Markdown fence markers with an optional language tag and trailing newline
fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(r"```[a-zA-Z]*\n?").expect("fence pattern is valid"))
}

/// Remove every markdown code-fence marker and trim surrounding whitespace.
///
/// LLM output routinely wraps code in ```` ```java ```` blocks; the backend
/// passes those through verbatim.
pub fn strip_code_fences(text: &str) -> String {
    fence_regex().replace_all(text, "").trim().to_string()
}

/// Split text on `\n` or `\r\n`, keeping empty segments.
///
/// The number of returned lines is always the number of newline-delimited
/// segments, so an empty string yields one empty line.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

/// Drop a run of concatenated line numbers glued to the front of patched code.
///
/// Copying a rendered preview can pick up the gutter ("12345678910package
/// com.example;"). When the text starts with digits and a `package`
/// declaration follows, everything before the declaration is discarded.
pub fn strip_line_number_artifact(patched: &str) -> &str {
    let trimmed = patched.trim();
    if !trimmed.starts_with(|c: char| c.is_ascii_digit()) {
        return trimmed;
    }
    match trimmed.find("package") {
        Some(start) if start > 0 => &trimmed[start..],
        _ => trimmed,
    }
}

/// Phrases the backend emits when the build's Java toolchain does not match
const JAVA_MISMATCH_PHRASES: &[&str] = &[
    "java version",
    "unsupported class file",
    "could not determine java version",
    "no compatible java",
];

/// Remediation steps shown alongside a Java toolchain mismatch
pub const JAVA_REMEDIATION_HINTS: &[&str] = &[
    "Install Java 8 or Java 17 (recommended)",
    "Set JAVA_HOME environment variable correctly",
    "Ensure Gradle/Maven project specifies supported Java version",
];

pub fn is_java_version_mismatch(error: &str) -> bool {
    let lower = error.to_lowercase();
    JAVA_MISMATCH_PHRASES.iter().any(|p| lower.contains(p))
}
