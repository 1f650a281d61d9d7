//! Page loader - composition root of a page load
//!
//! This module drives one load through its stages:
//! - Fetching the root document
//! - Discovering and rewriting resource references
//! - Creating the resource directory
//! - Downloading resources
//! - Writing the rewritten document

use crate::config::{validate, Config};
use crate::html::{self, TagTable};
use crate::loader::orchestrator::{fetch_all, FetchOptions, FetchReport};
use crate::loader::{build_http_client, fetch_page};
use crate::naming::{name_for_url, parse_absolute, NameRole};
use crate::state::LoadState;
use crate::{LoadError, UrlError};
use reqwest::Client;
use std::path::{Path, PathBuf};
use url::Url;

/// Outcome of a successful page load
#[derive(Debug)]
pub struct LoadResult {
    /// Path of the rewritten HTML file
    pub filepath: PathBuf,

    /// Path of the sibling resource directory
    pub resource_dir: PathBuf,

    /// Per-resource download outcomes
    pub report: FetchReport,
}

/// Loads pages into a local directory
pub struct PageLoader {
    config: Config,
    client: Client,
    tags: TagTable,
}

impl PageLoader {
    /// Creates a new loader
    ///
    /// # Arguments
    ///
    /// * `config` - The loader configuration
    ///
    /// # Returns
    ///
    /// * `Ok(PageLoader)` - Successfully created loader
    /// * `Err(LoadError)` - Invalid configuration or HTTP client setup failure
    pub fn new(config: Config) -> Result<Self, LoadError> {
        validate(&config)?;
        let client = build_http_client(&config.http).map_err(LoadError::Client)?;

        Ok(Self {
            config,
            client,
            tags: TagTable::default(),
        })
    }

    /// Returns the active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Mirrors the page at `url` into `output_dir`
    ///
    /// Nothing touches the network or the filesystem until `url` parses as an
    /// absolute http(s) URL.
    pub async fn load(
        &self,
        url: &str,
        output_dir: impl AsRef<Path>,
    ) -> Result<LoadResult, LoadError> {
        let root_url = parse_page_url(url)?;
        let mut progress = Progress::new(root_url.clone());

        match self.run(&root_url, output_dir.as_ref(), &mut progress).await {
            Ok(result) => Ok(result),
            Err(e) => {
                progress.fail(&e);
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        root_url: &Url,
        output_dir: &Path,
        progress: &mut Progress,
    ) -> Result<LoadResult, LoadError> {
        tracing::info!("Loading {} into {}", root_url, output_dir.display());

        let fetched = fetch_page(&self.client, root_url).await?;

        progress.advance(LoadState::ParsingAndRewriting)?;
        let encoding = html::detect_encoding(&fetched.body, fetched.content_type.as_deref());
        tracing::debug!("Reading {} as {}", root_url, encoding.name());
        let page = html::process(&fetched.body, encoding, root_url, &self.tags);
        tracing::debug!(
            "Found {} resources to mirror: {:?}",
            page.links.len(),
            page.links.iter().map(|l| l.url.as_str()).collect::<Vec<_>>()
        );

        progress.advance(LoadState::CreatingResourceDir)?;
        let resource_dir = output_dir.join(&page.resource_dir_name);
        tokio::fs::create_dir(&resource_dir)
            .await
            .map_err(|e| LoadError::filesystem(&resource_dir, e))?;
        tracing::debug!("Created resource directory {}", resource_dir.display());

        progress.advance(LoadState::FetchingResources)?;
        let options = FetchOptions {
            max_concurrent: self.config.loader.max_concurrent_fetches,
            policy: self.config.loader.failure_policy,
        };
        let report = fetch_all(&self.client, &page.links, &resource_dir, &options).await?;

        progress.advance(LoadState::WritingHtml)?;
        let filepath = output_dir.join(name_for_url(root_url, NameRole::HtmlDocument));
        tokio::fs::write(&filepath, &page.html)
            .await
            .map_err(|e| LoadError::filesystem(&filepath, e))?;

        progress.advance(LoadState::Done)?;
        tracing::info!(
            "Saved {} ({} of {} resources)",
            filepath.display(),
            report.succeeded().count(),
            report.outcomes.len()
        );

        Ok(LoadResult {
            filepath,
            resource_dir,
            report,
        })
    }
}

/// Parses the page URL, accepting only absolute http(s) URLs with a host
fn parse_page_url(url: &str) -> Result<Url, LoadError> {
    let invalid = |source: UrlError| LoadError::InvalidUrl {
        url: url.to_string(),
        source,
    };

    let parsed = parse_absolute(url).map_err(invalid)?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(invalid(UrlError::InvalidScheme(parsed.scheme().to_string())));
    }

    Ok(parsed)
}

/// Tracks the stage of one load
struct Progress {
    url: Url,
    state: LoadState,
}

impl Progress {
    fn new(url: Url) -> Self {
        Self {
            url,
            state: LoadState::FetchingRoot,
        }
    }

    fn advance(&mut self, to: LoadState) -> Result<(), LoadError> {
        if !self.state.can_transition_to(to) {
            return Err(LoadError::InvalidTransition {
                from: self.state,
                to,
            });
        }

        tracing::debug!("{}: {} -> {}", self.url, self.state, to);
        self.state = to;
        Ok(())
    }

    fn fail(&mut self, error: &LoadError) {
        tracing::warn!("{}: failed while {}: {}", self.url, self.state, error);
        self.state = LoadState::Failed;
    }
}
