use std::fmt::Display;
use std::future::Future;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::task::{JoinError, JoinHandle};
use tracing::warn;

/// Runs independent fallible tasks in parallel and reports the first failure.
///
/// `join` always waits for every task to finish, so nothing spawned here is
/// still touching the filesystem once it returns. Dropping the group before
/// `join` completes aborts whatever is still running.
pub struct TaskGroup<E> {
    tasks: FuturesUnordered<JoinHandle<Result<(), E>>>,
}

impl<E> Default for TaskGroup<E> {
    fn default() -> Self {
        Self {
            tasks: FuturesUnordered::new(),
        }
    }
}

impl<E> TaskGroup<E>
where
    E: From<JoinError> + Display + Send + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
    {
        self.tasks.push(tokio::spawn(task));
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Wait for all tasks; return the error of the first one to fail.
    pub async fn join(mut self) -> Result<(), E> {
        let mut first_error = None;

        while let Some(joined) = self.tasks.next().await {
            let outcome = joined.map_err(E::from).and_then(|result| result);
            if let Err(e) = outcome {
                if first_error.is_none() {
                    first_error = Some(e);
                } else {
                    warn!("Additional task failure: {}", e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl<E> Drop for TaskGroup<E> {
    fn drop(&mut self) {
        for handle in self.tasks.iter() {
            handle.abort();
        }
    }
}
