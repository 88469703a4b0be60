//! Per-phase progress bars on stderr. Purely observational.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Hands out one bar per sync phase (resolve, delete, fetch).
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    enabled: bool,
}

impl Progress {
    /// Bars drawn to stderr.
    pub fn stderr() -> Self {
        Self { enabled: true }
    }

    /// No output; for tests and non-interactive runs.
    pub fn hidden() -> Self {
        Self { enabled: false }
    }

    /// A bar of `total` units labelled `label`. Hidden when disabled or when there is no work.
    pub fn phase(&self, label: &str, total: usize) -> ProgressBar {
        if !self.enabled || total == 0 {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::with_draw_target(Some(total as u64), ProgressDrawTarget::stderr());
        let style = ProgressStyle::with_template("{prefix:>10} [{elapsed_precise}] {wide_bar} {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-");
        bar.set_style(style);
        bar.set_prefix(label.to_string());
        bar
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::stderr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_progress_hands_out_hidden_bars() {
        assert!(Progress::hidden().phase("fetch", 5).is_hidden());
    }

    #[test]
    fn empty_phase_is_hidden() {
        assert!(Progress::stderr().phase("delete", 0).is_hidden());
    }

    #[test]
    fn bar_length_matches_total() {
        let bar = Progress::stderr().phase("resolve", 3);
        assert_eq!(bar.length(), Some(3));
        bar.finish_and_clear();
    }
}
