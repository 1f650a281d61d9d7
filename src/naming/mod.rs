//! Local name mapping for mirrored pages
//!
//! Every remote URL maps to a deterministic local name. The mapping depends
//! only on the URL and the role the name plays in the mirror, so it can be
//! recomputed anywhere without being stored.
//!
//! The slug source is `host[:port]` followed by the URL path. Query strings
//! and fragments never take part in the name.

mod slug;

pub use slug::{slugify, split_extension};

use crate::{UrlError, UrlResult};
use url::Url;

/// Suffix marking the sibling directory that holds a page's resources
pub const RESOURCE_DIR_SUFFIX: &str = "_files";

/// Extension used for documents and resources whose path has none
pub const DEFAULT_EXTENSION: &str = ".html";

/// The role a local name plays in the mirror
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameRole {
    /// The rewritten root document
    HtmlDocument,
    /// The sibling directory holding every resource of one document
    ResourceDirectory,
    /// A single mirrored resource inside the resource directory
    ResourceFile,
}

/// Maps a URL string to its local name for the given role
///
/// # Errors
///
/// Returns `UrlError` when `url` is not an absolute URL with a host.
///
/// # Examples
///
/// ```
/// use page_mirror::naming::{name_for, NameRole};
///
/// let url = "https://site.com/blog/about";
/// assert_eq!(name_for(url, NameRole::HtmlDocument).unwrap(), "site-com-blog-about.html");
/// assert_eq!(name_for(url, NameRole::ResourceDirectory).unwrap(), "site-com-blog-about_files");
/// assert_eq!(
///     name_for("https://site.com/photos/me.jpg", NameRole::ResourceFile).unwrap(),
///     "site-com-photos-me.jpg"
/// );
/// ```
pub fn name_for(url: &str, role: NameRole) -> UrlResult<String> {
    let url = parse_absolute(url)?;
    Ok(name_for_url(&url, role))
}

/// Maps an already parsed URL to its local name for the given role
///
/// URLs without a host produce names derived from the path alone.
pub fn name_for_url(url: &Url, role: NameRole) -> String {
    let host = host_with_port(url);
    let path = url.path();

    match role {
        NameRole::ResourceDirectory => {
            format!("{}{}", slugify(&format!("{host}{path}")), RESOURCE_DIR_SUFFIX)
        }
        NameRole::HtmlDocument | NameRole::ResourceFile => {
            let (stem, extension) = split_extension(path);
            format!(
                "{}{}",
                slugify(&format!("{host}{stem}")),
                extension.unwrap_or(DEFAULT_EXTENSION)
            )
        }
    }
}

/// Parses `input` as an absolute URL that carries a host
pub fn parse_absolute(input: &str) -> UrlResult<Url> {
    let url = Url::parse(input.trim()).map_err(|e| UrlError::Parse(format!("{input}: {e}")))?;

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    Ok(url)
}

/// The URL host, with the port appended when it is not the scheme default
fn host_with_port(url: &Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    }
}
