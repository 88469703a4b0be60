//! `modsync check` – parse the listfile and summarize it.

use anyhow::{Context, Result};
use modsync_core::listfile::{self, Directives, ListFormat};
use std::path::Path;

pub fn run_check(path: &Path, format: &ListFormat) -> Result<()> {
    let directives = listfile::parse_file(path, format)
        .with_context(|| format!("checking {}", path.display()))?;
    for line in summary_lines(&directives) {
        println!("{line}");
    }
    Ok(())
}

pub(crate) fn summary_lines(directives: &Directives) -> Vec<String> {
    let mut lines = vec![
        format!("version: {}", directives.version),
        format!(
            "{} entries, {} exclusions",
            directives.entries.len(),
            directives.exclusions.len()
        ),
    ];
    for entry in &directives.entries {
        lines.push(format!("  {} ({})", entry.key, entry.selector));
    }
    for rule in &directives.exclusions {
        lines.push(format!("  exclude {}", rule.as_str()));
    }
    lines.extend(directives.warnings.iter().map(|w| format!("warning: {w}")));
    lines
}
