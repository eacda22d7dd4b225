//! Optimistic updates with rollback.

use std::future::Future;

use parking_lot::Mutex;

/// Result of an optimistic update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Optimistic<R, E> {
    /// Nothing to update; no remote call was made.
    Missing,
    /// The remote call succeeded and the tentative value stays.
    Committed(R),
    /// The remote call failed and the prior value was restored.
    RolledBack(E),
}

/// Applies a tentative value, runs the remote call, and restores the prior
/// value if that call fails.
///
/// `read` takes the snapshot; returning `None` aborts before anything is
/// written. `next` derives the tentative value from the snapshot and `remote`
/// receives the tentative value. The lock is only taken for the synchronous
/// read and write steps, never across the remote call.
pub async fn update<S, T, R, E, Fut>(
    state: &Mutex<S>,
    read: impl FnOnce(&S) -> Option<T>,
    write: impl Fn(&mut S, T),
    next: impl FnOnce(&T) -> T,
    remote: impl FnOnce(T) -> Fut,
) -> Optimistic<R, E>
where
    T: Clone,
    Fut: Future<Output = Result<R, E>>,
{
    let (prior, tentative) = {
        let mut guard = state.lock();
        let Some(prior) = read(&*guard) else {
            return Optimistic::Missing;
        };
        let tentative = next(&prior);
        write(&mut *guard, tentative.clone());
        (prior, tentative)
    };

    match remote(tentative).await {
        Ok(response) => Optimistic::Committed(response),
        Err(error) => {
            write(&mut *state.lock(), prior);
            Optimistic::RolledBack(error)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
