//! Treiber's lock-free stack.
//!
//! R. K. Treiber.  Systems Programming: Coping with Parallelism.  IBM Almaden Research Center,
//! Technical Report RJ 5118, 1986.

use core::mem::{self, ManuallyDrop};
use core::ptr;
use core::sync::atomic::Ordering;

use crossbeam_epoch::{Atomic, Guard, Owned, Shared};
use crossbeam_utils::CachePadded;

use super::ConcurrentStack;
use crate::Backoff;

// `data` is moved out by the popping thread, so dropping a node never drops it. A node that is
// never linked must give its value back through `into_inner`.
//
// `next` is written while the node is still private to the pushing thread and never changes once
// the node is reachable from the stack.
#[derive(Debug)]
struct Node<T> {
    data: ManuallyDrop<T>,
    next: *const Node<T>,
}

impl<T> Node<T> {
    fn new(t: T) -> Self {
        Self {
            data: ManuallyDrop::new(t),
            next: ptr::null(),
        }
    }

    /// Takes the value back out of a node that was never linked.
    fn into_inner(node: Owned<Self>) -> T {
        ManuallyDrop::into_inner(node.into_box().data)
    }
}

/// Treiber's lock-free stack.
///
/// Usable with any number of producers and consumers. Popped nodes are reclaimed through
/// `crossbeam_epoch`, so a node another thread has just loaded as its top snapshot is never freed
/// under it.
#[derive(Debug)]
pub struct TreiberStack<T> {
    head: CachePadded<Atomic<Node<T>>>,
    backoff: Backoff,
}

// SAFETY: Any particular `T` is only ever owned by one thread at a time, so no need for `T: Sync`.
unsafe impl<T: Send> Send for TreiberStack<T> {}
unsafe impl<T: Send> Sync for TreiberStack<T> {}

impl<T> Default for TreiberStack<T> {
    fn default() -> Self {
        Self::with_backoff(Backoff::default())
    }
}

impl<T> TreiberStack<T> {
    /// Creates a new, empty stack.
    pub fn new() -> TreiberStack<T> {
        Self::default()
    }

    /// Creates a new, empty stack that backs off with `backoff` on contention.
    pub fn with_backoff(backoff: Backoff) -> TreiberStack<T> {
        Self {
            head: CachePadded::new(Atomic::null()),
            backoff,
        }
    }

    /// Returns the backoff used by `push` and `pop`.
    pub fn backoff(&self) -> Backoff {
        self.backoff
    }

    /// Links `node` on top of `head` if `head` is still the top.
    ///
    /// Returns `Err(node)` otherwise, so that the same allocation can be retried.
    fn try_link<'g>(
        &self,
        mut node: Owned<Node<T>>,
        head: Shared<'g, Node<T>>,
        guard: &'g Guard,
    ) -> Result<(), Owned<Node<T>>> {
        node.next = head.as_raw();

        self.head
            .compare_exchange(head, node, Ordering::Release, Ordering::Relaxed, guard)
            .map(|_| ())
            .map_err(|e| e.new)
    }

    /// Tries to push `t` on top of the stack once.
    ///
    /// Returns `Err(t)` if another thread changed the top in the meantime.
    pub fn try_push(&self, t: T, guard: &Guard) -> Result<(), T> {
        let head = self.head.load(Ordering::Relaxed, guard);
        self.try_link(Owned::new(Node::new(t)), head, guard).map_err(Node::into_inner)
    }

    /// Tries to unlink the top node once.
    ///
    /// Returns `Ok(Some(v))` if `v` is popped; `Ok(None)` if the stack is empty; and `Err(())` if
    /// CAS failed.
    pub fn try_pop(&self, guard: &Guard) -> Result<Option<T>, ()> {
        let head = self.head.load(Ordering::Acquire, guard);

        // SAFETY: Nodes are only freed via `defer_destroy`, and `guard` keeps the current epoch
        // pinned, so `head` is valid even if another thread pops it concurrently.
        let Some(h) = (unsafe { head.as_ref() }) else {
            return Ok(None);
        };
        let next = Shared::from(h.next);

        let _ = self
            .head
            .compare_exchange(head, next, Ordering::Relaxed, Ordering::Relaxed, guard)
            .map_err(|_| ())?;

        // Since the above `compare_exchange()` succeeded, `head` is detached from `self` and no
        // other thread can win a CAS on it anymore.

        // SAFETY: We take ownership of `data` by copying it out with `ptr::read()`. Only the
        // thread whose CAS unlinked `head` reaches this point, and the node's destructor does not
        // drop `data`, so it is never used again.
        let data = ManuallyDrop::into_inner(unsafe { ptr::read(&h.data) });

        // SAFETY: `head` is unreachable from `self`, and we no longer access it.
        unsafe { guard.defer_destroy(head) };

        Ok(Some(data))
    }

    /// Pushes a value on top of the stack.
    pub fn push(&self, t: T) {
        let mut node = Owned::new(Node::new(t));
        let guard = crossbeam_epoch::pin();

        let mut retry = 0usize;
        loop {
            let head = self.head.load(Ordering::Relaxed, &guard);
            match self.try_link(node, head, &guard) {
                Ok(()) => return,
                Err(n) => node = n,
            }
            self.backoff.snooze(retry);
            retry = retry.wrapping_add(1);
        }
    }

    /// Attempts to pop the top element from the stack.
    ///
    /// Returns `None` if the stack is empty.
    pub fn pop(&self) -> Option<T> {
        let guard = crossbeam_epoch::pin();

        let mut retry = 0usize;
        loop {
            if let Ok(result) = self.try_pop(&guard) {
                return result;
            }
            self.backoff.snooze(retry);
            retry = retry.wrapping_add(1);
        }
    }

    /// Returns `true` if the stack is empty.
    pub fn is_empty(&self) -> bool {
        let guard = crossbeam_epoch::pin();
        self.head.load(Ordering::Acquire, &guard).is_null()
    }
}

impl<T> ConcurrentStack<T> for TreiberStack<T> {
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

impl<T> Drop for TreiberStack<T> {
    fn drop(&mut self) {
        let mut o_curr = mem::take(&mut *self.head);

        // SAFETY: All non-null nodes made were valid, and we have unique ownership via `&mut self`.
        while let Some(curr) = unsafe { o_curr.try_into_owned() }.map(Owned::into_box) {
            drop(ManuallyDrop::into_inner(curr.data));
            o_curr = curr.next.into();
        }
    }
}
