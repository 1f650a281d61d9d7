//! HTML worker: reference discovery and rewriting
//!
//! This module turns a fetched page into:
//! - the ordered, de-duplicated list of same-host resources to mirror
//! - the page source with those references pointing into the resource directory
//!
//! References to other hosts are never touched and never fetched.

mod encoding;
mod references;
mod rewrite;
mod tags;

pub use encoding::detect_encoding;
pub use references::{collect_references, is_in_scope, resolve_reference, ResourceReference};
pub use rewrite::rewrite_attributes;
pub use tags::{TagEntry, TagTable};

use crate::naming::{name_for_url, split_extension, NameRole};
use encoding_rs::Encoding;
use scraper::Html;
use std::collections::{HashMap, HashSet};
use url::Url;

/// A resource scheduled for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedResource {
    /// Absolute URL to fetch
    pub url: Url,

    /// File name inside the resource directory
    pub file_name: String,
}

/// Result of processing one page
#[derive(Debug, Clone)]
pub struct ProcessedPage {
    /// Resources to fetch, in first-occurrence order
    pub links: Vec<PlannedResource>,

    /// The rewritten document, in the encoding of the source
    pub html: Vec<u8>,

    /// Name of the sibling resource directory the references point into
    pub resource_dir_name: String,
}

/// Processes a page: finds in-scope references, plans local names, rewrites the source
///
/// Duplicate references (same resolved URL, query included) are fetched once
/// and rewritten to the same local path. If two different URLs map to the same
/// file name, later ones get a `-2`, `-3`... suffix so every planned file is
/// unique within the page.
///
/// `source` is read in `encoding`; the rewritten document keeps that encoding
/// and every byte outside the replaced values. Documents in an encoding that
/// is not ASCII-compatible (UTF-16) are returned unchanged with no resources.
///
/// # Example
///
/// ```
/// use page_mirror::html::{process, TagTable};
/// use url::Url;
///
/// let root = Url::parse("https://site.com/blog/about").unwrap();
/// let page = process(
///     br#"<img src="/photos/me.jpg">"#,
///     encoding_rs::UTF_8,
///     &root,
///     &TagTable::default(),
/// );
///
/// assert_eq!(page.links[0].file_name, "site-com-photos-me.jpg");
/// assert_eq!(
///     page.html,
///     br#"<img src="site-com-blog-about_files/site-com-photos-me.jpg">"#
/// );
/// ```
pub fn process(
    source: &[u8],
    encoding: &'static Encoding,
    root_url: &Url,
    tags: &TagTable,
) -> ProcessedPage {
    let resource_dir_name = name_for_url(root_url, NameRole::ResourceDirectory);

    let (text, encoding, _) = encoding.decode(source);
    if !encoding.is_ascii_compatible() {
        tracing::warn!(
            "{} is encoded as {}, saving it without local resources",
            root_url,
            encoding.name()
        );
        return ProcessedPage {
            links: Vec::new(),
            html: source.to_vec(),
            resource_dir_name,
        };
    }

    let document = Html::parse_document(&text);

    let mut links = Vec::new();
    let mut planned: HashMap<String, String> = HashMap::new();
    let mut used_names: HashSet<String> = HashSet::new();
    let mut replacements: HashMap<String, String> = HashMap::new();

    for reference in collect_references(&document, root_url, tags) {
        if !is_in_scope(&reference.resolved_url, root_url) {
            tracing::trace!(
                "Leaving cross-origin <{}> reference {}",
                reference.element,
                reference.original_value
            );
            continue;
        }

        let key = reference.resolved_url.to_string();
        let file_name = match planned.get(&key) {
            Some(name) => name.clone(),
            None => {
                let base = name_for_url(&reference.resolved_url, NameRole::ResourceFile);
                let name = unique_name(base, &mut used_names);
                tracing::trace!(
                    "Planning <{}> {} as {}",
                    reference.element,
                    reference.resolved_url,
                    name
                );
                planned.insert(key, name.clone());
                links.push(PlannedResource {
                    url: reference.resolved_url.clone(),
                    file_name: name.clone(),
                });
                name
            }
        };

        replacements.insert(
            reference.original_value,
            format!("{}/{}", resource_dir_name, file_name),
        );
    }

    let html = rewrite_attributes(source, encoding, tags, &replacements);

    ProcessedPage {
        links,
        html,
        resource_dir_name,
    }
}

/// Returns `base`, or `base` with the first free numeric suffix before its extension
fn unique_name(base: String, used: &mut HashSet<String>) -> String {
    if used.insert(base.clone()) {
        return base;
    }

    let (stem, extension) = split_extension(&base);
    let extension = extension.unwrap_or("");

    let mut n = 2;
    loop {
        let candidate = format!("{stem}-{n}{extension}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}
