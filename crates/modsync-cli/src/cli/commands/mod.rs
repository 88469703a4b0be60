//! One handler per subcommand.

mod check;
mod plan;
mod sync;

pub use check::run_check;
pub use plan::run_plan;
pub use sync::{run_sync, SyncFlags};

#[cfg(test)]
pub(crate) use check::summary_lines;
#[cfg(test)]
pub(crate) use plan::plan_lines;
#[cfg(test)]
pub(crate) use sync::{deletion_lines, report_lines};
