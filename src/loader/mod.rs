//! Loader module for mirroring one page
//!
//! This module contains the page loading logic, including:
//! - HTTP fetching of the root document and its resources
//! - Bounded concurrent resource downloads
//! - Overall load coordination

mod coordinator;
mod fetcher;
mod orchestrator;

pub use coordinator::{LoadResult, PageLoader};
pub use fetcher::{build_http_client, download_to, fetch_page, FetchedPage};
pub use orchestrator::{fetch_all, FetchOptions, FetchOutcome, FetchReport, FetchStatus};
