//! Memo table and the caching layer over it
//!
//! The table is a sharded `DashMap`. A miss is stored through the entry API,
//! so the first value inserted for a key is the only one ever observed.
//! Racing misses may both run the engine; no lock is held while computing.

use super::Fibonacci;
use crate::context::RequestContext;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, debug_span};

/// Decides whether a new entry may be stored.
pub trait RetentionPolicy: Send + Sync + fmt::Debug {
    /// Called with the current entry count before storing a new key.
    fn admit(&self, len: usize) -> bool;
}

/// Keep everything for the life of the process.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unbounded;

impl RetentionPolicy for Unbounded {
    fn admit(&self, _len: usize) -> bool {
        true
    }
}

/// Stop storing new keys once the table holds this many entries.
/// Values past the cap are still computed and returned, just not remembered.
#[derive(Debug, Clone, Copy)]
pub struct MaxEntries(pub usize);

impl RetentionPolicy for MaxEntries {
    fn admit(&self, len: usize) -> bool {
        len < self.0
    }
}

/// Append-only mapping from index to computed term.
pub struct MemoTable {
    values: DashMap<u64, i64>,
    // Admitted entries; reserved before the vacant slot is filled.
    admitted: AtomicUsize,
    policy: Box<dyn RetentionPolicy>,
}

impl MemoTable {
    pub fn new() -> Self {
        Self::with_policy(Unbounded)
    }

    pub fn with_policy(policy: impl RetentionPolicy + 'static) -> Self {
        Self {
            values: DashMap::new(),
            admitted: AtomicUsize::new(0),
            policy: Box::new(policy),
        }
    }

    pub fn get(&self, n: u64) -> Option<i64> {
        self.values.get(&n).map(|entry| *entry.value())
    }

    /// Store `value` under `n` unless a value is already there.
    ///
    /// Returns the value the table holds for `n` afterwards, or `value`
    /// itself when the policy refused the entry.
    pub fn insert(&self, n: u64, value: i64) -> i64 {
        if let Some(existing) = self.get(n) {
            return existing;
        }
        match self.values.entry(n) {
            Entry::Occupied(occupied) => *occupied.get(),
            Entry::Vacant(vacant) => {
                if !self.reserve_slot() {
                    debug!(n, "memo table full, not storing");
                    return value;
                }
                *vacant.insert(value)
            }
        }
    }

    fn reserve_slot(&self) -> bool {
        self.admitted
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |len| {
                self.policy.admit(len).then_some(len + 1)
            })
            .is_ok()
    }

    pub fn contains(&self, n: u64) -> bool {
        self.values.contains_key(&n)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Default for MemoTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoTable")
            .field("len", &self.values.len())
            .field("policy", &self.policy)
            .finish()
    }
}

/// Consults the memo table before delegating to `inner`.
pub struct CachedFib<F> {
    inner: F,
    table: Arc<MemoTable>,
}

impl<F: Fibonacci> CachedFib<F> {
    pub fn new(inner: F, table: Arc<MemoTable>) -> Self {
        Self { inner, table }
    }

    pub fn table(&self) -> &MemoTable {
        &self.table
    }
}

impl<F: Fibonacci> Fibonacci for CachedFib<F> {
    fn fib(&self, ctx: &RequestContext, n: u64) -> i64 {
        let span = debug_span!(parent: ctx.span(), "fib.cached", n);
        let _guard = span.enter();

        if let Some(value) = self.table.get(n) {
            debug!(f = n, "value cached");
            return value;
        }

        let ctx = ctx.clone().with_span(span.clone());
        let value = self.inner.fib(&ctx, n);
        self.table.insert(n, value)
    }
}
