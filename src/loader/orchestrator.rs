//! Concurrent resource downloads
//!
//! Every planned resource is downloaded by its own task. A semaphore bounds
//! how many run at once. Outcomes are stored in one slot per resource,
//! indexed by the resource's position in the plan.

use crate::config::FailurePolicy;
use crate::html::PlannedResource;
use crate::loader::fetcher::download_to;
use crate::LoadError;
use reqwest::Client;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Knobs for one `fetch_all` run
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    /// Maximum number of downloads in flight
    pub max_concurrent: usize,

    /// What a failed download does to the run
    pub policy: FailurePolicy,
}

/// Result of one resource download
#[derive(Debug)]
pub enum FetchStatus {
    Succeeded { bytes: u64 },
    Failed(LoadError),
}

/// Outcome of one planned resource
#[derive(Debug)]
pub struct FetchOutcome {
    pub resource: PlannedResource,
    pub status: FetchStatus,
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, FetchStatus::Succeeded { .. })
    }
}

/// Aggregated outcomes of a `fetch_all` run, in plan order
#[derive(Debug, Default)]
pub struct FetchReport {
    pub outcomes: Vec<FetchOutcome>,
}

impl FetchReport {
    /// Resources that were written to disk
    pub fn succeeded(&self) -> impl Iterator<Item = &FetchOutcome> {
        self.outcomes.iter().filter(|o| o.is_success())
    }

    /// Resources whose download failed
    pub fn failed(&self) -> impl Iterator<Item = &FetchOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    /// True when every planned resource was written
    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(FetchOutcome::is_success)
    }
}

/// Downloads every planned resource into `resource_dir`
///
/// Under `FailurePolicy::FailFast` the first failure aborts the downloads
/// still in flight and is returned; files already written stay on disk.
/// Under `FailurePolicy::BestEffort` every resource is attempted and failures
/// are recorded in the report.
pub async fn fetch_all(
    client: &Client,
    links: &[PlannedResource],
    resource_dir: &Path,
    options: &FetchOptions,
) -> Result<FetchReport, LoadError> {
    let semaphore = Arc::new(Semaphore::new(options.max_concurrent.max(1)));
    let mut tasks = JoinSet::new();

    for (index, link) in links.iter().enumerate() {
        let client = client.clone();
        let semaphore = Arc::clone(&semaphore);
        let url = link.url.clone();
        let target = resource_dir.join(&link.file_name);

        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok();
            tracing::debug!("Fetching resource {}", url);
            (index, download_to(&client, &url, &target).await)
        });
    }

    let mut slots: Vec<Option<FetchStatus>> = links.iter().map(|_| None).collect();

    while let Some(joined) = tasks.join_next().await {
        let (index, result) = match joined {
            Ok(done) => done,
            Err(e) => {
                tasks.abort_all();
                return Err(LoadError::Task(e));
            }
        };

        let status = match result {
            Ok(bytes) => {
                tracing::info!(
                    "Resource {} saved as {}",
                    links[index].url,
                    links[index].file_name
                );
                FetchStatus::Succeeded { bytes }
            }
            Err(e) => match options.policy {
                FailurePolicy::FailFast => {
                    tracing::warn!("Resource {} failed: {}", links[index].url, e);
                    tasks.abort_all();
                    return Err(e);
                }
                FailurePolicy::BestEffort => {
                    tracing::warn!("Resource {} failed, continuing: {}", links[index].url, e);
                    FetchStatus::Failed(e)
                }
            },
        };

        slots[index] = Some(status);
    }

    let outcomes = slots
        .into_iter()
        .zip(links)
        .filter_map(|(status, resource)| {
            status.map(|status| FetchOutcome {
                resource: resource.clone(),
                status,
            })
        })
        .collect();

    Ok(FetchReport { outcomes })
}
