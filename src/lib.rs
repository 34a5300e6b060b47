//! Lock-free LIFO stack.
//!
//! [`TreiberStack`] is a Treiber stack whose only shared state is the top pointer, updated by
//! compare-and-swap and retried with an alternating spin/yield [`Backoff`] under contention.
//! Popped nodes are reclaimed with `crossbeam_epoch`. [`MutexStack`] implements the same
//! [`ConcurrentStack`] interface behind a mutex, for comparison.

#![warn(missing_docs, missing_debug_implementations)]
#![allow(clippy::result_unit_err)]
#![deny(unsafe_op_in_unsafe_fn)]

mod backoff;
pub mod stack;

pub use backoff::Backoff;
pub use stack::{ConcurrentStack, MutexStack, TreiberStack};
