//! Fibonacci engine and the decorators layered over it
//!
//! Every layer implements [`Fibonacci`], so the production stack is built by
//! plain composition at startup:
//!
//! ```
//! use fibcache_core::{CachedFib, Fibonacci, MathFib, MemoTable, RequestContext, TracedFib};
//! use std::sync::Arc;
//!
//! let fib = TracedFib::new(CachedFib::new(MathFib, Arc::new(MemoTable::new())));
//! assert_eq!(fib.fib(&RequestContext::new(), 10), 89);
//! ```

mod memo;
mod traced;

pub use memo::{CachedFib, MaxEntries, MemoTable, RetentionPolicy, Unbounded};
pub use traced::TracedFib;

use crate::context::RequestContext;
use std::sync::Arc;

/// Anything that can answer "what is the n-th term".
pub trait Fibonacci: Send + Sync {
    fn fib(&self, ctx: &RequestContext, n: u64) -> i64;
}

impl<T: Fibonacci + ?Sized> Fibonacci for Arc<T> {
    fn fib(&self, ctx: &RequestContext, n: u64) -> i64 {
        (**self).fib(ctx, n)
    }
}

impl<T: Fibonacci + ?Sized> Fibonacci for Box<T> {
    fn fib(&self, ctx: &RequestContext, n: u64) -> i64 {
        (**self).fib(ctx, n)
    }
}

/// Iterative recurrence seeded `a = 0, b = 1`, returning `b` after `n` steps,
/// so `compute(0) == 1` and `compute(10) == 89`.
///
/// Overflow wraps silently; `compute(92)` is the first wrapped value in `i64`.
pub fn compute(n: u64) -> i64 {
    let (mut a, mut b): (i64, i64) = (0, 1);
    for _ in 0..n {
        let next = a.wrapping_add(b);
        a = b;
        b = next;
    }
    b
}

/// The untraced, uncached engine.
#[derive(Debug, Default, Clone, Copy)]
pub struct MathFib;

impl Fibonacci for MathFib {
    fn fib(&self, _ctx: &RequestContext, n: u64) -> i64 {
        compute(n)
    }
}
