//! Bounded fail-fast worker pool shared by the resolve, delete and fetch phases.
//!
//! Keeps up to `workers` tasks running at once; when one finishes the next item
//! is started. The first error stops scheduling, aborts the remaining tasks and
//! is returned. Work already handed to `spawn_blocking` still runs to completion.

use indicatif::ProgressBar;
use std::future::Future;
use tokio::task::{JoinError, JoinSet};

/// Runs `task` for every item with at most `workers` in flight.
///
/// Results come back in input order. `progress` is ticked once per finished item.
pub(crate) async fn run_bounded<I, T, E, F, Fut>(
    items: I,
    workers: usize,
    progress: &ProgressBar,
    mut task: F,
) -> Result<Vec<T>, E>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: From<JoinError> + Send + 'static,
{
    let workers = workers.max(1);
    let mut pending = items.into_iter().enumerate();
    let mut join_set = JoinSet::new();
    let mut results: Vec<(usize, T)> = Vec::new();

    loop {
        while join_set.len() < workers {
            let Some((index, item)) = pending.next() else {
                break;
            };
            let fut = task(item);
            join_set.spawn(async move { fut.await.map(|value| (index, value)) });
        }

        let Some(joined) = join_set.join_next().await else {
            break;
        };
        match joined {
            Ok(Ok(item)) => {
                results.push(item);
                progress.inc(1);
            }
            Ok(Err(err)) => {
                join_set.abort_all();
                return Err(err);
            }
            Err(err) => {
                join_set.abort_all();
                return Err(E::from(err));
            }
        }
    }

    results.sort_by_key(|(index, _)| *index);
    Ok(results.into_iter().map(|(_, value)| value).collect())
}
