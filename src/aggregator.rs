//! Fetch → count → aggregate pipeline
//!
//! [`Aggregator`] resolves one target ([`Aggregator::resolve_one`]) or every
//! target in the registry ([`Aggregator::resolve_all`]).
//!
//! A batch fans out one task per target on a [`JoinSet`] and joins on all of
//! them before building the response. Each task owns exactly one slot in a
//! buffer allocated for that call, indexed by target id, so the output order
//! is the registry order no matter which fetch finishes first. Nothing
//! accumulated during a call outlives it.
//!
//! A failing target never fails the batch: its slot carries a
//! [`TargetError`] and a zero link count. Dropping the returned future (for
//! example when the client disconnects) aborts every in-flight fetch, and the
//! caller's [`CancellationToken`] does the same explicitly.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::counter::count_links;
use crate::fetcher::{FetchError, Fetcher};
use crate::humanize::{format_elapsed, serialize_elapsed};
use crate::registry::{RegistryError, Target, TargetRegistry};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregateError {
    #[error("invalid target: {0}")]
    InvalidTarget(#[from] RegistryError),
}

/// Error marker carried by a result whose target could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetError {
    pub kind: &'static str,
    pub message: String,
}

impl From<&FetchError> for TargetError {
    fn from(err: &FetchError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl TargetError {
    fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: "internal",
            message: message.into(),
        }
    }
}

/// Outcome of resolving one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkCountResult {
    pub id: usize,
    pub url: String,
    pub links: usize,
    #[serde(rename = "time", serialize_with = "serialize_elapsed")]
    pub elapsed: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<TargetError>,
}

impl LinkCountResult {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    fn failed(target: &Target, elapsed: Duration, error: TargetError) -> Self {
        Self {
            id: target.id,
            url: target.url.clone(),
            links: 0,
            elapsed,
            error: Some(error),
        }
    }
}

/// Results of one operation, ordered by target id
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateResponse {
    #[serde(rename = "links")]
    pub results: Vec<LinkCountResult>,
    #[serde(rename = "time", serialize_with = "serialize_elapsed")]
    pub total_elapsed: Duration,
}

impl AggregateResponse {
    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| !r.is_ok()).count()
    }
}

/// Drives fetch and count over the target registry.
///
/// Holds only shared read-only handles; every call allocates its own result
/// buffer, so one instance can serve concurrent requests.
#[derive(Clone)]
pub struct Aggregator {
    registry: TargetRegistry,
    fetcher: Arc<dyn Fetcher>,
    max_parallelism: Option<usize>,
}

impl Aggregator {
    pub fn new(registry: TargetRegistry, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            registry,
            fetcher,
            max_parallelism: None,
        }
    }

    /// Bound the number of fetches a batch runs at once
    pub fn with_max_parallelism(mut self, limit: Option<usize>) -> Self {
        self.max_parallelism = limit.filter(|n| *n > 0);
        self
    }

    pub fn registry(&self) -> &TargetRegistry {
        &self.registry
    }

    /// Resolve a single target by id.
    ///
    /// Invalid ids fail before any network call. A fetch failure is reported
    /// through the result's error marker, not as an `Err`.
    pub async fn resolve_one(
        &self,
        id: i64,
        cancel: &CancellationToken,
    ) -> Result<AggregateResponse, AggregateError> {
        let start = Instant::now();
        let target = self.registry.get(id)?.clone();

        let result = resolve_target(self.fetcher.as_ref(), &target, cancel).await;
        let total_elapsed = start.elapsed();

        info!(
            id = result.id,
            url = %result.url,
            links = result.links,
            elapsed = %format_elapsed(total_elapsed),
            "Finished searching link"
        );

        Ok(AggregateResponse {
            results: vec![result],
            total_elapsed,
        })
    }

    /// Resolve every target concurrently and return them in id order
    pub async fn resolve_all(&self, cancel: &CancellationToken) -> AggregateResponse {
        let batch_id = Uuid::now_v7();
        let span = info_span!("batch", %batch_id, targets = self.registry.count());

        self.run_batch(cancel).instrument(span).await
    }

    async fn run_batch(&self, cancel: &CancellationToken) -> AggregateResponse {
        let start = Instant::now();
        info!("Starting to search links");

        let limiter = self.max_parallelism.map(|n| Arc::new(Semaphore::new(n)));
        let mut slots: Vec<Option<LinkCountResult>> = vec![None; self.registry.count()];
        let mut workers = JoinSet::new();
        let mut owners = HashMap::with_capacity(slots.len());

        for target in self.registry.iter() {
            let target = target.clone();
            let fetcher = Arc::clone(&self.fetcher);
            let limiter = limiter.clone();
            let cancel = cancel.clone();
            let index = target.id;

            let handle = workers.spawn(
                async move {
                    // Held until the unit finishes; the semaphore is never closed
                    let _permit = match limiter {
                        Some(semaphore) => semaphore.acquire_owned().await.ok(),
                        None => None,
                    };
                    let result = resolve_target(fetcher.as_ref(), &target, &cancel).await;
                    (index, result)
                }
                .in_current_span(),
            );
            owners.insert(handle.id(), index);
        }

        while let Some(joined) = workers.join_next_with_id().await {
            match joined {
                Ok((_, (index, result))) => slots[index] = Some(result),
                Err(err) => {
                    let Some(&index) = owners.get(&err.id()) else {
                        continue;
                    };
                    warn!(id = index, error = %err, "Worker did not complete");
                    slots[index] = self
                        .registry
                        .by_index(index)
                        .map(|target| worker_failure(target, &err));
                }
            }
        }

        let total_elapsed = start.elapsed();
        let results: Vec<LinkCountResult> = slots
            .into_iter()
            .zip(self.registry.iter())
            .map(|(slot, target)| {
                slot.unwrap_or_else(|| {
                    LinkCountResult::failed(
                        target,
                        total_elapsed,
                        TargetError::internal("worker produced no result"),
                    )
                })
            })
            .collect();

        let response = AggregateResponse {
            results,
            total_elapsed,
        };

        info!(
            failed = response.failed_count(),
            elapsed = %format_elapsed(total_elapsed),
            "Finished searching links"
        );

        response
    }
}

/// One unit of work: fetch the target and count its links
async fn resolve_target(
    fetcher: &dyn Fetcher,
    target: &Target,
    cancel: &CancellationToken,
) -> LinkCountResult {
    let start = Instant::now();

    let fetched = tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(FetchError::Cancelled),
        fetched = fetcher.fetch(&target.url) => fetched,
    };
    let elapsed = start.elapsed();

    match fetched {
        Ok(content) => {
            let links = count_links(&content);
            debug!(id = target.id, url = %target.url, links, "Counted links");
            LinkCountResult {
                id: target.id,
                url: target.url.clone(),
                links,
                elapsed,
                error: None,
            }
        }
        Err(err) => {
            warn!(id = target.id, url = %target.url, error = %err, "Fetch failed");
            LinkCountResult::failed(target, elapsed, TargetError::from(&err))
        }
    }
}

fn worker_failure(target: &Target, err: &tokio::task::JoinError) -> LinkCountResult {
    let message = if err.is_panic() {
        "worker panicked"
    } else {
        "worker cancelled"
    };

    LinkCountResult::failed(target, Duration::ZERO, TargetError::internal(message))
}
