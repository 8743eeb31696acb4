//! Authenticated Fibonacci flow
//!
//! Token lookup always happens before `n` is parsed, so an unauthenticated
//! request with a malformed `n` is reported as `Unauthenticated`, and the
//! engine is never reached without a valid session.

use crate::context::RequestContext;
use crate::error::{Result, ServiceError, StoreError};
use crate::fib::Fibonacci;
use crate::session::SessionCache;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Largest index accepted from callers unless configured otherwise.
/// The engine is linear in `n` and runs on the request thread.
pub const DEFAULT_MAX_INDEX: u64 = 100_000;

pub struct FibService {
    fib: Arc<dyn Fibonacci>,
    sessions: Arc<SessionCache>,
    max_index: u64,
}

impl FibService {
    pub fn new(fib: Arc<dyn Fibonacci>, sessions: Arc<SessionCache>) -> Self {
        Self {
            fib,
            sessions,
            max_index: DEFAULT_MAX_INDEX,
        }
    }

    pub fn with_max_index(mut self, max_index: u64) -> Self {
        self.max_index = max_index;
        self
    }

    pub fn max_index(&self) -> u64 {
        self.max_index
    }

    pub fn sessions(&self) -> &SessionCache {
        &self.sessions
    }

    /// Unauthenticated access to the memoized engine.
    pub fn fib(&self, ctx: &RequestContext, n: u64) -> i64 {
        self.fib.fib(ctx, n)
    }

    /// Resolve a session token to the user id stored under it.
    pub async fn authenticate(&self, ctx: &RequestContext, token: &str) -> Result<String> {
        if token.is_empty() {
            return Err(ServiceError::Unauthenticated);
        }

        match self.sessions.get(ctx, token).await {
            Ok(user) if !user.is_empty() => Ok(String::from_utf8_lossy(&user).into_owned()),
            Ok(_) | Err(StoreError::NotFound(_)) => {
                warn!("Rejected unknown session token");
                Err(ServiceError::Unauthenticated)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Authenticate `token`, then parse `raw_n` and compute.
    pub async fn authorized_fib(
        &self,
        ctx: &RequestContext,
        token: &str,
        raw_n: &str,
    ) -> Result<i64> {
        let user = self.authenticate(ctx, token).await?;
        let n = parse_index(raw_n, self.max_index)?;
        debug!("Computing fib({}) for {}", n, user);
        Ok(self.fib.fib(ctx, n))
    }

    /// Issue a fresh token for `user_id` and store it in the session cache.
    pub async fn login(&self, ctx: &RequestContext, user_id: &str) -> Result<String> {
        if user_id.is_empty() {
            return Err(ServiceError::InvalidInput("user id is empty".to_string()));
        }

        let token = uuid::Uuid::new_v4().to_string();
        self.sessions.save(ctx, &token, user_id.as_bytes()).await?;
        info!("Issued session token for {}", user_id);
        Ok(token)
    }

    /// Revoke a token. Unknown tokens report `NotFound`.
    pub async fn logout(&self, ctx: &RequestContext, token: &str) -> Result<()> {
        self.sessions.remove(ctx, token).await?;
        Ok(())
    }
}

/// Parse a non-negative term index no larger than `max`.
pub fn parse_index(raw: &str, max: u64) -> Result<u64> {
    let n = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| ServiceError::InvalidInput(format!("Input is not a number: {:?}", raw)))?;
    if n > max {
        return Err(ServiceError::InvalidInput(format!(
            "Input {} is above the maximum of {}",
            n, max
        )));
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fib::{CachedFib, MathFib, MemoTable, TracedFib};
    use crate::storage::MemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingFib {
        calls: AtomicUsize,
    }

    impl Fibonacci for CountingFib {
        fn fib(&self, ctx: &RequestContext, n: u64) -> i64 {
            self.calls.fetch_add(1, Ordering::SeqCst);
            MathFib.fib(ctx, n)
        }
    }

    fn service() -> (FibService, Arc<CountingFib>) {
        let engine = Arc::new(CountingFib::default());
        let fib = TracedFib::new(CachedFib::new(engine.clone(), Arc::new(MemoTable::new())));
        let sessions = Arc::new(SessionCache::new(Arc::new(MemoryStore::new())));
        (FibService::new(Arc::new(fib), sessions), engine)
    }

    #[test]
    fn test_parse_index() {
        assert_eq!(parse_index("10", DEFAULT_MAX_INDEX), Ok(10));
        assert_eq!(parse_index(" 7 ", DEFAULT_MAX_INDEX), Ok(7));
        for raw in ["-1", "ten", ""] {
            assert!(
                matches!(parse_index(raw, DEFAULT_MAX_INDEX), Err(ServiceError::InvalidInput(_))),
                "{raw:?}"
            );
        }
    }

    #[test]
    fn test_parse_index_rejects_out_of_range() {
        assert_eq!(parse_index("100000", DEFAULT_MAX_INDEX), Ok(100_000));
        assert!(matches!(
            parse_index("100001", DEFAULT_MAX_INDEX),
            Err(ServiceError::InvalidInput(_))
        ));
        assert!(matches!(
            parse_index("18446744073709551615", DEFAULT_MAX_INDEX),
            Err(ServiceError::InvalidInput(_))
        ));
        assert!(matches!(parse_index("93", 92), Err(ServiceError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_huge_index_never_reaches_engine() {
        let (service, engine) = service();
        let service = service.with_max_index(1_000);
        let ctx = RequestContext::new();
        let token = service.login(&ctx, "user1").await.unwrap();

        for raw in ["1001", "18446744073709551615"] {
            assert!(matches!(
                service.authorized_fib(&ctx, &token, raw).await,
                Err(ServiceError::InvalidInput(_))
            ));
        }
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);

        assert_eq!(service.authorized_fib(&ctx, &token, "10").await, Ok(89));
        assert_eq!(engine.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_session_then_cached_fib_scenario() {
        let (service, engine) = service();
        let ctx = RequestContext::new();

        service
            .sessions()
            .save(&ctx, "tok1", b"user1")
            .await
            .unwrap();
        assert_eq!(
            service.sessions().get(&ctx, "tok1").await,
            Ok(b"user1".to_vec())
        );

        assert_eq!(service.authorized_fib(&ctx, "tok1", "10").await, Ok(89));
        assert_eq!(engine.calls.load(Ordering::SeqCst), 1);

        assert_eq!(service.authorized_fib(&ctx, "tok1", "10").await, Ok(89));
        assert_eq!(engine.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_token_never_reaches_engine() {
        let (service, engine) = service();
        let ctx = RequestContext::new();

        assert_eq!(
            service.authorized_fib(&ctx, "nope", "10").await,
            Err(ServiceError::Unauthenticated)
        );
        assert_eq!(
            service.authorized_fib(&ctx, "", "10").await,
            Err(ServiceError::Unauthenticated)
        );
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_auth_failure_takes_precedence_over_bad_input() {
        let (service, engine) = service();
        let ctx = RequestContext::new();

        assert_eq!(
            service.authorized_fib(&ctx, "nope", "not-a-number").await,
            Err(ServiceError::Unauthenticated)
        );

        let token = service.login(&ctx, "user1").await.unwrap();
        assert!(matches!(
            service.authorized_fib(&ctx, &token, "not-a-number").await,
            Err(ServiceError::InvalidInput(_))
        ));
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_session_value_is_unauthenticated() {
        let (service, _) = service();
        let ctx = RequestContext::new();

        service.sessions().save(&ctx, "blank", b"").await.unwrap();
        assert_eq!(
            service.authenticate(&ctx, "blank").await,
            Err(ServiceError::Unauthenticated)
        );
    }

    #[tokio::test]
    async fn test_login_and_logout() {
        let (service, _) = service();
        let ctx = RequestContext::new();

        let token = service.login(&ctx, "user2").await.unwrap();
        assert_eq!(service.authenticate(&ctx, &token).await, Ok("user2".to_string()));

        service.logout(&ctx, &token).await.unwrap();
        assert_eq!(
            service.authenticate(&ctx, &token).await,
            Err(ServiceError::Unauthenticated)
        );
        assert!(matches!(
            service.logout(&ctx, &token).await,
            Err(ServiceError::Store(StoreError::NotFound(_)))
        ));
        assert!(matches!(
            service.login(&ctx, "").await,
            Err(ServiceError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_boundary_values_through_service() {
        let (service, _) = service();
        let ctx = RequestContext::new();

        assert_eq!(service.fib(&ctx, 45), 1_836_311_903);
        assert_eq!(service.fib(&ctx, 46), 2_971_215_073);
    }
}
