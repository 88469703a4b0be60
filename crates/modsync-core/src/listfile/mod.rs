//! Listfile (`mods.txt`) model and parser.
//!
//! A listfile is line-oriented: comments start with `#`, `exclude <regex>`
//! protects matching local files from deletion, `version <tokens>` declares the
//! target game version exactly once, and every other line declares an entry.
//! Entries are numeric project IDs or project URLs depending on [`ListFormat`].

mod parse;

use regex::Regex;
use std::fmt;
use std::path::PathBuf;

use crate::channel::Channel;

pub use parse::{parse, parse_file};

/// How entry lines are interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListFormat {
    /// `<project id> [<file id> | release | beta | alpha]`
    Ids,
    /// A project URL, or a slug that is appended to `prefix`.
    Urls { prefix: String },
}

/// Identifier of a remote project.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryKey {
    Id(u64),
    Url(String),
}

impl EntryKey {
    pub fn as_id(&self) -> Option<u64> {
        match self {
            EntryKey::Id(id) => Some(*id),
            EntryKey::Url(_) => None,
        }
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKey::Id(id) => write!(f, "{}", id),
            EntryKey::Url(url) => f.write_str(url),
        }
    }
}

/// Which file of a project an entry wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selector {
    /// Newest file matching the version constraint, any channel.
    #[default]
    Latest,
    /// Exactly this file ID. Takes precedence over channel filtering.
    Pinned(u64),
    /// Newest file at this channel or a more stable one.
    Channel(Channel),
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Latest => f.write_str("latest file on any channel"),
            Selector::Pinned(id) => write!(f, "pinned file ID {}", id),
            Selector::Channel(channel) => write!(f, "release type {} or more stable", channel),
        }
    }
}

/// One project declared in the listfile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: EntryKey,
    pub selector: Selector,
}

impl Entry {
    pub fn is_pinned(&self) -> bool {
        matches!(self.selector, Selector::Pinned(_))
    }
}

/// Target game version tokens, e.g. `1.16.5 Fabric`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConstraint(String);

impl VersionConstraint {
    /// Returns `None` when `raw` holds no tokens.
    pub fn new(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            None
        } else {
            Some(VersionConstraint(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Independent tokens; a file must satisfy every one of them.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.0.split_whitespace()
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything a listfile declares. Entries keep first-appearance order.
#[derive(Debug, Clone)]
pub struct Directives {
    pub entries: Vec<Entry>,
    pub exclusions: Vec<Regex>,
    pub version: VersionConstraint,
    /// Non-fatal remarks, e.g. URLs outside the configured prefix.
    pub warnings: Vec<String>,
}

impl Directives {
    /// True if `file_name` matches any exclusion rule.
    pub fn is_excluded(&self, file_name: &str) -> bool {
        self.exclusions.iter().any(|rule| rule.is_match(file_name))
    }
}

/// Listfile read or content error. `line_no` is 1-based.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("error opening listfile {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error reading listfile")]
    Io(#[source] std::io::Error),

    #[error("line {line_no}: invalid entry \"{line}\"")]
    InvalidSyntax { line_no: usize, line: String },

    #[error("line {line_no}: invalid exclude pattern \"{line}\"")]
    InvalidPattern {
        line_no: usize,
        line: String,
        #[source]
        source: regex::Error,
    },

    #[error("line {line_no}: duplicated entry \"{line}\"")]
    DuplicateEntry { line_no: usize, line: String },

    #[error("line {line_no}: duplicated version statement \"{line}\"")]
    DuplicateVersion { line_no: usize, line: String },

    #[error("line {line_no}: unknown release type or file ID \"{token}\" in \"{line}\"")]
    UnknownReleaseType {
        line_no: usize,
        line: String,
        token: String,
    },

    #[error("version statement missing")]
    MissingVersion,
}

impl ParseError {
    /// True for failures to read the listfile, as opposed to malformed content.
    pub fn is_io(&self) -> bool {
        matches!(self, ParseError::Open { .. } | ParseError::Io(_))
    }
}

#[cfg(test)]
mod tests;
