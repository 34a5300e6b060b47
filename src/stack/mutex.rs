use std::sync::{Mutex, MutexGuard, PoisonError};

use super::ConcurrentStack;

/// A stack guarded by a single mutex.
///
/// Same contract as [`TreiberStack`](super::TreiberStack); every operation holds the lock for its
/// whole duration.
#[derive(Debug)]
pub struct MutexStack<T> {
    inner: Mutex<Vec<T>>,
}

impl<T> Default for MutexStack<T> {
    fn default() -> Self {
        Self {
            inner: Mutex::new(Vec::new()),
        }
    }
}

impl<T> MutexStack<T> {
    /// Creates a new, empty stack.
    pub fn new() -> MutexStack<T> {
        Self::default()
    }

    // A panic while the lock is held cannot leave the `Vec` half-updated, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, Vec<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pushes a value on top of the stack.
    pub fn push(&self, t: T) {
        self.lock().push(t);
    }

    /// Pops the top element from the stack.
    ///
    /// Returns `None` if the stack is empty.
    pub fn pop(&self) -> Option<T> {
        self.lock().pop()
    }

    /// Returns `true` if the stack is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl<T> ConcurrentStack<T> for MutexStack<T> {
    fn push(&self, t: T) {
        self.push(t);
    }

    fn pop(&self) -> Option<T> {
        self.pop()
    }

    fn is_empty(&self) -> bool {
        self.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};

    #[test]
    fn poisoned() {
        let stack = MutexStack::new();
        stack.push(1);

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let _guard = stack.lock();
            panic!("poison the lock");
        }));
        assert!(result.is_err());

        stack.push(2);
        assert_eq!(stack.pop(), Some(2));
        assert_eq!(stack.pop(), Some(1));
        assert!(stack.is_empty());
    }
}
