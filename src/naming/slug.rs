//! Slug helpers used by the name mapper

/// Collapses every run of non-alphanumeric characters into a single hyphen
///
/// Leading and trailing hyphens are stripped. Characters are only ever
/// classified as alphanumeric or not; nothing is transliterated.
///
/// # Examples
///
/// ```
/// use page_mirror::naming::slugify;
///
/// assert_eq!(slugify("site.com/blog/about"), "site-com-blog-about");
/// assert_eq!(slugify("--a__b//c--"), "a-b-c");
/// ```
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for c in input.chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Splits a URL path into (path without extension, extension)
///
/// The extension is taken from the last path segment only and includes the
/// leading dot. A segment whose only dot is its first character (a dotfile
/// such as `.well-known`) has no extension, nor does a trailing dot.
pub fn split_extension(path: &str) -> (&str, Option<&str>) {
    let segment_start = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    let segment = &path[segment_start..];

    match segment.rfind('.') {
        Some(0) | None => (path, None),
        Some(dot) if dot + 1 == segment.len() => (path, None),
        Some(dot) => {
            let split_at = segment_start + dot;
            (&path[..split_at], Some(&path[split_at..]))
        }
    }
}
