//! Concurrent stacks.

mod mutex;
mod treiber;

pub use mutex::MutexStack;
pub use treiber::TreiberStack;

/// Concurrent LIFO stack interface.
///
/// Implemented by both the lock-free and the mutex-guarded stack so they can be swapped for each
/// other in tests and benchmarks.
pub trait ConcurrentStack<T>: Default {
    /// Pushes a value on top of the stack.
    fn push(&self, t: T);

    /// Pops the top value.
    ///
    /// Returns `None` if the stack was empty.
    fn pop(&self) -> Option<T>;

    /// Returns `true` if the stack is empty.
    fn is_empty(&self) -> bool;
}
