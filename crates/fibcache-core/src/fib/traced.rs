//! Instrumentation layer

use super::Fibonacci;
use crate::context::RequestContext;
use tracing::info_span;

/// Opens a `fib.invocation` span around the wrapped call and forwards it unchanged.
pub struct TracedFib<F> {
    inner: F,
}

impl<F: Fibonacci> TracedFib<F> {
    pub fn new(inner: F) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }
}

impl<F: Fibonacci> Fibonacci for TracedFib<F> {
    fn fib(&self, ctx: &RequestContext, n: u64) -> i64 {
        let span = info_span!(parent: ctx.span(), "fib.invocation", fib_requested = n);
        let _guard = span.enter();
        let ctx = ctx.clone().with_span(span.clone());
        self.inner.fib(&ctx, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fib::{CachedFib, MathFib, MemoTable};
    use crate::test_util::CapturedLogs;
    use std::sync::Arc;
    use tracing::Level;

    #[test]
    fn test_forwards_unchanged() {
        let ctx = RequestContext::new();
        let traced = TracedFib::new(MathFib);
        assert_eq!(traced.fib(&ctx, 10), 89);
    }

    #[test]
    fn test_cache_hits_visible_through_tracing_layer() {
        let table = Arc::new(MemoTable::new());
        let traced = TracedFib::new(CachedFib::new(MathFib, table.clone()));
        let ctx = RequestContext::new();

        assert_eq!(traced.fib(&ctx, 12), 233);
        assert_eq!(traced.fib(&ctx, 12), 233);
        assert_eq!(traced.inner().table().len(), 1);
        assert_eq!(table.get(12), Some(233));
    }

    #[test]
    fn test_cache_hit_event_emitted_through_tracing_layer() {
        let (logs, _guard) = CapturedLogs::install(Level::DEBUG);
        let traced = TracedFib::new(CachedFib::new(MathFib, Arc::new(MemoTable::new())));
        let ctx = RequestContext::new();

        assert_eq!(traced.fib(&ctx, 12), 233);
        assert!(!logs.contents().contains("value cached"), "{}", logs.contents());

        logs.clear();
        assert_eq!(traced.fib(&ctx, 12), 233);
        let output = logs.contents();
        assert!(output.contains("value cached"), "{output}");
        assert!(output.contains("f=12"), "{output}");
        assert!(output.contains("fib.invocation"), "{output}");
    }
}
