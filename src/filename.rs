//! Filename conventions.
//!
//! Upload names of the form `{org}_{role tokens...}_{markers...}.txt`
//! encode the organization and role (Non Track) or job (Track) that end
//! up both in the workbook header cells and in the output file name.
//! Trailing `skill` / `HC 제외` markers are bookkeeping suffixes and are
//! dropped.

/// Organization + role (or job) parsed from an upload name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    pub org: String,
    /// Role in Non Track mode, job identifier in Track mode.
    pub role: String,
}

/// Filename stem: everything before the final `.` of the last path
/// component.
fn stem(file_name: &str) -> &str {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);
    match base.rfind('.') {
        Some(0) | None => base,
        Some(idx) => &base[..idx],
    }
}

/// Trailing tokens excluded from the role: `skill` and `HC 제외`,
/// compared lower-cased with internal spaces removed.
fn is_trailing_excluded(token: &str) -> bool {
    let t: String = token.to_lowercase().replace(' ', "");
    t == "skill" || t == "hc제외"
}

/// Parse an upload name under the Non Track rule.
///
/// The stem is split on `_` with empty tokens discarded. The first token
/// is the organization; the rest form the role after trailing excluded
/// tokens are dropped. When dropping would leave no role token at all,
/// the exclusion is skipped and every token after the organization is
/// kept.
pub fn parse_non_track(file_name: &str) -> ParsedName {
    let toks: Vec<&str> = stem(file_name)
        .split('_')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();
    let Some((org, rest)) = toks.split_first() else {
        return ParsedName {
            org: "unknown".to_string(),
            role: String::new(),
        };
    };

    let mut end = rest.len();
    while end > 0 && is_trailing_excluded(rest[end - 1]) {
        end -= 1;
    }
    let role_tokens = if end == 0 { rest } else { &rest[..end] };

    ParsedName {
        org: (*org).to_string(),
        role: role_tokens.join(" "),
    }
}

/// Parse an upload name under the Track rule.
///
/// The stem is split on `_` without empty-token filtering; the first
/// token (trimmed) is the organization. Trailing excluded tokens are
/// popped unconditionally and the survivors are re-joined with `_` to
/// form the job identifier.
pub fn parse_track(file_name: &str) -> ParsedName {
    let toks: Vec<&str> = stem(file_name).split('_').collect();
    let Some((org, rest)) = toks.split_first() else {
        return ParsedName {
            org: String::new(),
            role: String::new(),
        };
    };

    let mut end = rest.len();
    while end > 0 && is_trailing_excluded(rest[end - 1].trim()) {
        end -= 1;
    }

    ParsedName {
        org: org.trim().to_string(),
        role: rest[..end].join("_"),
    }
}
