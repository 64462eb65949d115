//! Request correlation identifier.
//!
//! The `Trace` middleware opens a scope per request; errors built inside it
//! pick the id up and the response echoes it in the `trace-id` header.
//! Task-locals do not follow spawned tasks or blocking threads, so work moved
//! off the request task goes through [`TraceId::in_blocking`].

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tokio::task_local;
use uuid::Uuid;

task_local! {
    static TRACE_ID: TraceId;
}

/// UUID identifying one request across logs, error bodies and headers.
///
/// # Examples
/// ```
/// use accounts::TraceId;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let trace_id: TraceId = "00000000-0000-0000-0000-000000000000"
///     .parse()
///     .expect("valid UUID");
/// let observed = TraceId::scope(trace_id, async move { TraceId::current() }).await;
/// assert_eq!(observed, Some(trace_id));
/// # });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Fresh random (v4) identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Identifier of the enclosing request, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        TRACE_ID.try_with(|id| *id).ok()
    }

    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Drive `fut` with `trace_id` in scope.
    pub async fn scope<Fut>(trace_id: Self, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        TRACE_ID.scope(trace_id, fut).await
    }

    /// Run synchronous `work` with `trace_id` in scope.
    ///
    /// Used where a future is constructed eagerly, such as calling the next
    /// service in a middleware chain.
    pub fn sync_scope<R>(trace_id: Self, work: impl FnOnce() -> R) -> R {
        TRACE_ID.sync_scope(trace_id, work)
    }

    /// Wrap `work` so it sees the caller's trace id when run elsewhere.
    pub fn in_blocking<R>(work: impl FnOnce() -> R) -> impl FnOnce() -> R {
        let captured = Self::current();
        move || match captured {
            Some(id) => Self::sync_scope(id, work),
            None => work(),
        }
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}
