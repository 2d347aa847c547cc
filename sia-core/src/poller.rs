use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::condition::FilePredicate;
use crate::error::SiaError;
use crate::model::{FileListing, FileRecord};

/// Bounds for a convergence wait. The default waits forever at the client's
/// configured interval.
#[derive(Debug, Clone, Default)]
pub struct WaitOptions {
    pub interval: Option<Duration>,
    pub timeout: Option<Duration>,
    pub cancel: Option<CancellationToken>,
}

impl WaitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Anything that can produce a fresh files listing on demand.
pub(crate) trait FileSource {
    fn fetch_files(&self) -> impl Future<Output = Result<FileListing, SiaError>> + Send;
}

/// Re-fetches the listing until some record satisfies `predicate`.
///
/// Fetch failures end the wait immediately. Once the deadline passes or the
/// token fires, no further fetch is started and any fetch in flight is dropped.
pub(crate) async fn wait_until<S, P>(
    source: &S,
    predicate: &P,
    options: &WaitOptions,
    default_interval: Duration,
) -> Result<FileRecord, SiaError>
where
    S: FileSource + Sync + ?Sized,
    P: FilePredicate + Sync + ?Sized,
{
    let started = Instant::now();
    let deadline = options.timeout.map(|timeout| started + timeout);
    let interval = options.interval.unwrap_or(default_interval);
    let cancel = options.cancel.as_ref();
    let mut attempts = 0u32;

    loop {
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            debug!(attempts, "convergence wait cancelled");
            return Err(SiaError::Cancelled { attempts });
        }
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(timed_out(started, attempts));
        }

        attempts += 1;
        let listing = match bounded(source.fetch_files(), deadline, cancel).await {
            Bounded::Done(result) => result?,
            Bounded::Expired => return Err(timed_out(started, attempts)),
            Bounded::Cancelled => {
                debug!(attempts, "convergence wait cancelled");
                return Err(SiaError::Cancelled { attempts });
            }
        };
        trace!(attempt = attempts, files = listing.len(), "listing fetched");

        if let Some(found) = listing.into_iter().find(|file| predicate.matches(file)) {
            debug!(attempts, siapath = %found.siapath, "condition met");
            return Ok(found);
        }

        match bounded(tokio::time::sleep(interval), deadline, cancel).await {
            Bounded::Done(()) => {}
            Bounded::Expired => return Err(timed_out(started, attempts)),
            Bounded::Cancelled => {
                debug!(attempts, "convergence wait cancelled");
                return Err(SiaError::Cancelled { attempts });
            }
        }
    }
}

fn timed_out(started: Instant, attempts: u32) -> SiaError {
    let waited = started.elapsed();
    debug!(attempts, ?waited, "convergence wait timed out");
    SiaError::TimedOut { waited, attempts }
}

enum Bounded<T> {
    Done(T),
    Expired,
    Cancelled,
}

async fn bounded<F: Future>(
    future: F,
    deadline: Option<Instant>,
    cancel: Option<&CancellationToken>,
) -> Bounded<F::Output> {
    let expired = async {
        match deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => std::future::pending().await,
        }
    };
    let cancelled = async {
        match cancel {
            Some(token) => token.cancelled().await,
            None => std::future::pending().await,
        }
    };
    tokio::select! {
        biased;
        _ = cancelled => Bounded::Cancelled,
        output = future => Bounded::Done(output),
        _ = expired => Bounded::Expired,
    }
}
