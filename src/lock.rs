//! Shared state behind a named mutex.
//!
//! Page handlers run while the dispatcher holds no lock, but the detect form
//! and the synthesizer are still locked from handler code. A panic there
//! poisons the mutex; [`Shared`] takes the state back, logs the owner's name
//! once, and clears the poison so later callers see a healthy lock.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::log_debug;

pub(crate) struct Shared<T> {
    inner: Arc<Mutex<T>>,
    name: &'static str,
}

impl<T> Shared<T> {
    pub(crate) fn new(name: &'static str, value: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(value)),
            name,
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, T> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log_debug(&format!(
                    "{} poisoned by a panicking holder; recovering",
                    self.name
                ));
                let guard = poisoned.into_inner();
                self.inner.clear_poison();
                guard
            }
        }
    }

    /// Run `f` with the state locked.
    pub(crate) fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.lock())
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            name: self.name,
        }
    }
}

impl<T> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shared")
            .field("name", &self.name)
            .field("poisoned", &self.inner.is_poisoned())
            .finish()
    }
}
