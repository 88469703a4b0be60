//! Line-by-line listfile parser.

use regex::Regex;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::{Directives, Entry, EntryKey, ListFormat, ParseError, Selector, VersionConstraint};
use crate::channel::Channel;

const URL_SCHEME: &str = "https://";

/// Parses a listfile from `reader`.
///
/// Consumes the whole stream; the version statement may appear anywhere.
pub fn parse<R: BufRead>(reader: R, format: &ListFormat) -> Result<Directives, ParseError> {
    let mut entries = Vec::new();
    let mut seen = HashSet::new();
    let mut exclusions = Vec::new();
    let mut version: Option<VersionConstraint> = None;
    let mut warnings = Vec::new();

    for (index, raw) in reader.lines().enumerate() {
        let raw = raw.map_err(ParseError::Io)?;
        let line = raw.trim();
        let line_no = index + 1;

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(pattern) = line.strip_prefix("exclude ") {
            let rule = Regex::new(pattern.trim()).map_err(|source| ParseError::InvalidPattern {
                line_no,
                line: line.to_string(),
                source,
            })?;
            exclusions.push(rule);
        } else if let Some(rest) = line.strip_prefix("version ") {
            if version.is_some() {
                return Err(ParseError::DuplicateVersion {
                    line_no,
                    line: line.to_string(),
                });
            }
            version = VersionConstraint::new(rest);
        } else {
            let entry = parse_entry(line_no, line, format, &mut warnings)?;
            if !seen.insert(entry.key.clone()) {
                return Err(ParseError::DuplicateEntry {
                    line_no,
                    line: line.to_string(),
                });
            }
            entries.push(entry);
        }
    }

    let version = version.ok_or(ParseError::MissingVersion)?;
    tracing::debug!(
        entries = entries.len(),
        exclusions = exclusions.len(),
        version = %version,
        "parsed listfile"
    );
    Ok(Directives {
        entries,
        exclusions,
        version,
        warnings,
    })
}

/// Opens `path` and parses it.
pub fn parse_file(path: &Path, format: &ListFormat) -> Result<Directives, ParseError> {
    let file = File::open(path).map_err(|source| ParseError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    parse(BufReader::new(file), format)
}

fn parse_entry(
    line_no: usize,
    line: &str,
    format: &ListFormat,
    warnings: &mut Vec<String>,
) -> Result<Entry, ParseError> {
    match format {
        ListFormat::Ids => parse_id_entry(line_no, line),
        ListFormat::Urls { prefix } => {
            let url = normalize_url(line, prefix);
            if !url.starts_with(prefix.as_str()) {
                let warning = format!(
                    "line {}: URL doesn't start with \"{}\": \"{}\"",
                    line_no, prefix, url
                );
                tracing::warn!("{}", warning);
                warnings.push(warning);
            }
            Ok(Entry {
                key: EntryKey::Url(url),
                selector: Selector::Latest,
            })
        }
    }
}

fn parse_id_entry(line_no: usize, line: &str) -> Result<Entry, ParseError> {
    let invalid = || ParseError::InvalidSyntax {
        line_no,
        line: line.to_string(),
    };

    let mut tokens = line.split_whitespace();
    let id = tokens
        .next()
        .and_then(|t| t.parse::<u64>().ok())
        .ok_or_else(invalid)?;

    let selector = match tokens.next() {
        None => Selector::Latest,
        Some(token) => {
            if let Ok(file_id) = token.parse::<u64>() {
                Selector::Pinned(file_id)
            } else if let Some(channel) = Channel::from_name(token) {
                Selector::Channel(channel)
            } else {
                return Err(ParseError::UnknownReleaseType {
                    line_no,
                    line: line.to_string(),
                    token: token.to_string(),
                });
            }
        }
    };

    if tokens.next().is_some() {
        return Err(invalid());
    }

    Ok(Entry {
        key: EntryKey::Id(id),
        selector,
    })
}

/// Full URLs are kept as written; anything else is treated as a slug under `prefix`.
fn normalize_url(line: &str, prefix: &str) -> String {
    if line.starts_with(URL_SCHEME) {
        line.to_string()
    } else {
        format!("{}{}", prefix, line)
    }
}
