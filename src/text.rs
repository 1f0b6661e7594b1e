//! Free-text sanitization.
//!
//! Assessment payloads come out of LLM-assisted tooling and carry inline
//! citation markers (`[cite: ...]`) and source attributions
//! (`(Source: ...)`) that must not reach the generated workbook. This
//! module strips them and also scrubs filename components for the output
//! naming scheme.

use regex::Regex;
use std::sync::OnceLock;

/// `[cite: ...]` markers, case-insensitive, may span lines, swallowed
/// together with surrounding blanks.
fn cite_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)\s*\[\s*cite\s*:.*?\]\s*").expect("valid cite pattern"))
}

/// `(Source ...)` / `(source: ...)` parentheticals.
fn source_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\(\s*source\b[^)]*\)").expect("valid source pattern"))
}

/// Runs of horizontal whitespace. Newlines are deliberately excluded so
/// bullet lists keep their line structure.
fn hspace_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ \t]+").expect("valid whitespace pattern"))
}

/// Characters that are illegal in filenames on common filesystems.
fn invalid_filename_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"[<>:"/\\|?*]+"#).expect("valid filename pattern"))
}

/// Remove citation and source markers from free text.
///
/// Each match is replaced with a single space, then runs of spaces/tabs
/// are collapsed and the ends trimmed. Newlines outside the matched
/// spans survive.
pub fn strip_markers(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let cleaned = cite_pattern().replace_all(text, " ");
    let cleaned = source_pattern().replace_all(&cleaned, " ");
    hspace_pattern().replace_all(&cleaned, " ").trim().to_string()
}

/// Scrub a string for use as a filename component.
///
/// Runs of illegal characters become a single space; the result is
/// trimmed of whitespace and surrounding dots. An empty input or an
/// empty result yields `fallback`.
pub fn sanitize_filename_component(s: &str, fallback: &str) -> String {
    if s.is_empty() {
        return fallback.to_string();
    }
    let cleaned = invalid_filename_pattern().replace_all(s, " ");
    let cleaned = cleaned.trim().trim_matches('.');
    if cleaned.is_empty() {
        fallback.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Render items as `* {item}` lines, skipping blanks.
pub fn bullet_lines<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .filter_map(|i| {
            let trimmed = i.as_ref().trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(format!("* {}", trimmed))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
