//! File selection: newest file matching the version tokens and the entry's selector.

use crate::catalog::KnownFile;
use crate::listfile::{Selector, VersionConstraint};

/// A file matches a token if its display name contains it (case-insensitive)
/// or its supported-version list contains it exactly.
fn matches_version(file: &KnownFile, version: &VersionConstraint) -> bool {
    let display = file.display_name.to_lowercase();
    version.tokens().all(|token| {
        display.contains(&token.to_lowercase()) || file.game_versions.iter().any(|v| v == token)
    })
}

fn matches_selector(file: &KnownFile, selector: &Selector) -> bool {
    match selector {
        Selector::Latest => true,
        Selector::Pinned(id) => file.id == *id,
        Selector::Channel(channel) => channel.accepts(file.channel),
    }
}

/// Returns the most recently uploaded file satisfying `version` and `selector`.
///
/// On equal timestamps the earlier-listed file wins.
pub fn find_latest_matching<'a>(
    files: &'a [KnownFile],
    version: &VersionConstraint,
    selector: &Selector,
) -> Option<&'a KnownFile> {
    let mut best: Option<&KnownFile> = None;
    for file in files {
        if !matches_version(file, version) || !matches_selector(file, selector) {
            continue;
        }
        if best.map_or(true, |b| file.uploaded_at > b.uploaded_at) {
            best = Some(file);
        }
    }
    best
}
