//! Reference discovery over the parsed document tree

use crate::html::TagTable;
use scraper::{Html, Selector};
use url::Url;

/// A resource reference found on one element of the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceReference {
    /// Lowercase element name (`link`, `script`, `img`...)
    pub element: String,

    /// Attribute the reference was read from
    pub attribute: &'static str,

    /// Attribute value as the parser decoded it
    pub original_value: String,

    /// Absolute URL the value resolves to, without fragment
    pub resolved_url: Url,
}

/// Collects every resolvable reference of the tracked elements in document order
///
/// References that cannot point at a fetchable resource are skipped:
/// empty values, fragment-only values, and anything that does not resolve
/// to an http(s) URL (`data:`, `javascript:`, `mailto:`...).
pub fn collect_references(
    document: &Html,
    base_url: &Url,
    tags: &TagTable,
) -> Vec<ResourceReference> {
    let mut references = Vec::new();

    let selector = match Selector::parse(&tags.selector()) {
        Ok(selector) => selector,
        Err(e) => {
            tracing::warn!("Invalid tag table selector: {:?}", e);
            return references;
        }
    };

    for element in document.select(&selector) {
        let name = element.value().name();
        let Some(attribute) = tags.attribute_for(name) else {
            continue;
        };
        let Some(value) = element.value().attr(attribute) else {
            continue;
        };

        if let Some(resolved_url) = resolve_reference(value, base_url) {
            references.push(ResourceReference {
                element: name.to_ascii_lowercase(),
                attribute,
                original_value: value.to_string(),
                resolved_url,
            });
        }
    }

    references
}

/// Resolves an attribute value against the page URL
///
/// Returns None if the value should not be mirrored.
pub fn resolve_reference(value: &str, base_url: &Url) -> Option<Url> {
    let value = value.trim();

    if value.is_empty() || value.starts_with('#') {
        return None;
    }

    let mut resolved = base_url.join(value).ok()?;
    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return None;
    }

    resolved.set_fragment(None);
    Some(resolved)
}

/// Returns true if `url` is served by the same host as the page
///
/// The host includes an explicit non-default port, so `site.com:8443` is a
/// different host than `site.com`. The scheme does not matter.
pub fn is_in_scope(url: &Url, root_url: &Url) -> bool {
    let same_host = match (url.host_str(), root_url.host_str()) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    };

    same_host && url.port() == root_url.port()
}
