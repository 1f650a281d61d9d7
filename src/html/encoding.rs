//! Character encoding of fetched documents
//!
//! The page is written back with its original bytes, so the encoding is only
//! needed to read it: to build the tree and to compare attribute values.

use encoding_rs::{Encoding, UTF_8};

/// How many leading bytes are searched for a `charset=` declaration
const PRESCAN_LIMIT: usize = 1024;

/// Picks the encoding of an HTML body
///
/// A byte order mark wins, then the `charset` parameter of the Content-Type
/// header, then a `charset=` declaration near the start of the document.
/// Anything else is read as UTF-8.
pub fn detect_encoding(body: &[u8], content_type: Option<&str>) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(body) {
        return encoding;
    }

    if let Some(encoding) = content_type
        .and_then(charset_from_content_type)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        return encoding;
    }

    // A document cannot declare itself UTF-16 from inside its own bytes
    charset_from_html_prefix(body)
        .map(Encoding::output_encoding)
        .unwrap_or(UTF_8)
}

fn charset_from_content_type(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|part| {
        let (name, value) = part.split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        let label = value.trim().trim_matches('"').trim_matches('\'');
        (!label.is_empty()).then_some(label)
    })
}

fn charset_from_html_prefix(body: &[u8]) -> Option<&'static Encoding> {
    let prefix = body[..body.len().min(PRESCAN_LIMIT)].to_ascii_lowercase();
    let needle = b"charset=";

    let mut from = 0;
    while let Some(offset) = prefix[from..]
        .windows(needle.len())
        .position(|window| window == needle)
    {
        let start = from + offset + needle.len();
        if let Some(encoding) = charset_label(&prefix[start..]).and_then(Encoding::for_label) {
            return Some(encoding);
        }
        from = start;
    }

    None
}

fn charset_label(input: &[u8]) -> Option<&[u8]> {
    let skip = input
        .iter()
        .take_while(|b| b.is_ascii_whitespace())
        .count();
    let input = &input[skip..];
    let (input, quoted) = match input.first() {
        Some(&quote @ (b'"' | b'\'')) => (&input[1..], Some(quote)),
        _ => (input, None),
    };

    let end = input
        .iter()
        .position(|&b| match quoted {
            Some(quote) => b == quote,
            None => b.is_ascii_whitespace() || matches!(b, b'"' | b'\'' | b';' | b'>' | b'/'),
        })
        .unwrap_or(input.len());

    let label = &input[..end];
    let label_end = label
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(0, |last| last + 1);
    (label_end > 0).then_some(&label[..label_end])
}
