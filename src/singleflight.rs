//! Single Flight Module
//!
//! Collapses concurrent calls for the same key into one execution.
//!
//! The first caller for a key becomes the executor of a new generation.
//! Callers arriving while it runs wait on a `watch` channel and receive a
//! clone of its result. The entry is removed as soon as the work returns,
//! so the next caller starts a fresh generation.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::debug;

type Slot<T, E> = Option<Result<T, E>>;

// == Flight ==
/// Deduplicates in-flight work per key.
#[derive(Debug)]
pub struct Flight<T, E> {
    calls: Mutex<HashMap<String, watch::Receiver<Slot<T, E>>>>,
}

impl<T, E> Default for Flight<T, E> {
    fn default() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
        }
    }
}

/// Outcome of registering interest in a key.
enum Role<T, E> {
    Executor(watch::Sender<Slot<T, E>>),
    Waiter(watch::Receiver<Slot<T, E>>),
}

impl<T, E> Flight<T, E>
where
    T: Clone + Send + Sync,
    E: Clone + Send + Sync,
{
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, watch::Receiver<Slot<T, E>>>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn join(&self, key: &str) -> Role<T, E> {
        let mut calls = self.lock();
        match calls.get(key) {
            Some(rx) => Role::Waiter(rx.clone()),
            None => {
                let (tx, rx) = watch::channel(None);
                calls.insert(key.to_string(), rx);
                Role::Executor(tx)
            }
        }
    }

    // == Run ==
    /// Runs `work` unless a call for `key` is already in flight, in which
    /// case waits for that call and returns its result.
    pub async fn run<F, Fut>(&self, key: &str, work: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let tx = loop {
            let mut rx = match self.join(key) {
                Role::Executor(tx) => break tx,
                Role::Waiter(rx) => rx,
            };

            if let Ok(slot) = rx.wait_for(Option::is_some).await {
                if let Some(result) = &*slot {
                    return result.clone();
                }
            }
            // The executor was dropped before publishing; start over
            debug!(key, "in-flight call abandoned, retrying");
        };

        let guard = CallGuard { flight: self, key };
        let result = work().await;
        tx.send_replace(Some(result.clone()));
        drop(guard);
        result
    }

    /// Number of keys currently in flight.
    pub fn in_flight(&self) -> usize {
        self.lock().len()
    }
}

// == Call Guard ==
/// Removes the key's entry when the executor finishes or is dropped.
struct CallGuard<'a, T, E> {
    flight: &'a Flight<T, E>,
    key: &'a str,
}

impl<T, E> Drop for CallGuard<'_, T, E> {
    fn drop(&mut self) {
        self.flight
            .calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(self.key);
    }
}
