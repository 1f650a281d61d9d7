//! Attribute splicing over the raw document bytes
//!
//! The tree built by `scraper` decides which references exist, but
//! serializing that tree would reformat the whole document. Instead the
//! source is scanned lexically for start tags of the tracked elements and
//! only the value span of their reference attribute is replaced. Every other
//! byte is copied through unchanged, whatever the document's encoding.
//!
//! Attribute values are decoded by handing the raw span back to the HTML
//! parser, so a span matches exactly when the tree reported the same value.

use crate::html::TagTable;
use encoding_rs::Encoding;
use scraper::Html;
use std::collections::HashMap;

/// Elements whose content is text that may contain `<` without starting a tag
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "textarea", "title", "xmp", "iframe", "noembed", "noframes", "noscript",
];

/// Everything after this start tag is text
const PLAINTEXT_ELEMENT: &str = "plaintext";

/// Location of one attribute value inside the source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ValueSpan {
    start: usize,
    end: usize,
    quote: Option<u8>,
}

/// One lexically scanned start tag
#[derive(Debug)]
struct StartTag<'a> {
    name: &'a [u8],
    attributes: Vec<(&'a [u8], ValueSpan)>,
    end: usize,
}

/// Replaces tracked attribute values found in `replacements`
///
/// `replacements` is keyed by the decoded attribute value, as the tree parser
/// reports it. Tags whose value has no entry are left untouched. Markup that
/// cannot be scanned (an unterminated tag or comment) is copied as opaque
/// text. `encoding` must be ASCII-compatible.
pub fn rewrite_attributes(
    source: &[u8],
    encoding: &'static Encoding,
    tags: &TagTable,
    replacements: &HashMap<String, String>,
) -> Vec<u8> {
    if replacements.is_empty() {
        return source.to_vec();
    }

    let mut output = Vec::with_capacity(source.len());
    let mut copied = 0;
    let mut pos = 0;

    while let Some(lt) = find(source, pos, b"<") {
        let rest = &source[lt..];

        if rest.starts_with(b"<!--") {
            match comment_end(source, lt + 4) {
                Some(end) => pos = end,
                None => break,
            }
            continue;
        }

        if rest.starts_with(b"<!") || rest.starts_with(b"<?") || rest.starts_with(b"</") {
            match find(source, lt, b">") {
                Some(gt) => pos = gt + 1,
                None => break,
            }
            continue;
        }

        if !source.get(lt + 1).is_some_and(u8::is_ascii_alphabetic) {
            pos = lt + 1;
            continue;
        }

        let Some(tag) = scan_start_tag(source, lt) else {
            break;
        };

        let attribute = std::str::from_utf8(tag.name)
            .ok()
            .and_then(|name| tags.attribute_for(name));

        if let Some(attribute) = attribute {
            let span = tag
                .attributes
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(attribute.as_bytes()))
                .map(|(_, span)| *span);

            if let Some(span) = span {
                let raw = &source[span.start..span.end];
                let replacement = attribute_value(raw, span.quote, encoding)
                    .and_then(|value| replacements.get(&value));

                if let Some(replacement) = replacement {
                    let escaped = escape_value(replacement, span.quote);
                    let (encoded, _, _) = encoding.encode(&escaped);
                    output.extend_from_slice(&source[copied..span.start]);
                    output.extend_from_slice(&encoded);
                    copied = span.end;
                }
            }
        }

        pos = tag.end;

        if tag.name.eq_ignore_ascii_case(PLAINTEXT_ELEMENT.as_bytes()) {
            break;
        }

        if RAW_TEXT_ELEMENTS
            .iter()
            .any(|raw| raw.as_bytes().eq_ignore_ascii_case(tag.name))
        {
            match find_closing_tag(source, pos, tag.name) {
                Some(close) => pos = close,
                None => break,
            }
        }
    }

    output.extend_from_slice(&source[copied..]);
    output
}

/// Decodes a raw attribute value exactly as the tree parser does
///
/// The span is re-tokenized as the value of a lone `img` tag with the same
/// quoting, so character references follow the parser's own rules.
fn attribute_value(raw: &[u8], quote: Option<u8>, encoding: &'static Encoding) -> Option<String> {
    let (text, _) = encoding.decode_without_bom_handling(raw);
    let snippet = match quote {
        Some(quote) => {
            let quote = quote as char;
            format!("<img src={quote}{text}{quote}>")
        }
        None => format!("<img src={text}>"),
    };

    let fragment = Html::parse_fragment(&snippet);
    let value = fragment
        .root_element()
        .descendants()
        .filter_map(|node| node.value().as_element())
        .find(|element| element.name() == "img")
        .and_then(|element| element.attr("src"))
        .map(str::to_string);
    value
}

/// Returns the position just past the comment whose body starts at `from`
fn comment_end(source: &[u8], from: usize) -> Option<usize> {
    let body = &source[from..];
    if body.starts_with(b">") {
        return Some(from + 1);
    }
    if body.starts_with(b"->") {
        return Some(from + 2);
    }

    let mut pos = from;
    while let Some(dashes) = find(source, pos, b"--") {
        match source.get(dashes + 2) {
            Some(b'>') => return Some(dashes + 3),
            Some(b'!') if source.get(dashes + 3) == Some(&b'>') => return Some(dashes + 4),
            _ => pos = dashes + 1,
        }
    }

    None
}

/// Scans the start tag opening at `lt`; None when it never terminates
fn scan_start_tag(source: &[u8], lt: usize) -> Option<StartTag<'_>> {
    let mut i = lt + 1;

    let name_start = i;
    while i < source.len() && !is_tag_delimiter(source[i]) {
        i += 1;
    }
    let name = &source[name_start..i];

    let mut attributes = Vec::new();

    loop {
        while i < source.len() && (source[i].is_ascii_whitespace() || source[i] == b'/') {
            i += 1;
        }
        match source.get(i) {
            None => return None,
            Some(b'>') => break,
            Some(_) => {}
        }

        let attr_start = i;
        while i < source.len() && !is_tag_delimiter(source[i]) && source[i] != b'=' {
            i += 1;
        }
        // A stray `=` with no name is consumed as a one-byte name
        if i == attr_start {
            i += 1;
        }
        let attr_name = &source[attr_start..i];

        let mut j = i;
        while j < source.len() && source[j].is_ascii_whitespace() {
            j += 1;
        }
        if source.get(j) != Some(&b'=') {
            continue;
        }
        j += 1;
        while j < source.len() && source[j].is_ascii_whitespace() {
            j += 1;
        }

        let span = match source.get(j) {
            None => return None,
            Some(&quote @ (b'"' | b'\'')) => {
                let start = j + 1;
                let end = find(source, start, &[quote])?;
                i = end + 1;
                ValueSpan {
                    start,
                    end,
                    quote: Some(quote),
                }
            }
            Some(_) => {
                let start = j;
                while j < source.len() && !source[j].is_ascii_whitespace() && source[j] != b'>' {
                    j += 1;
                }
                i = j;
                ValueSpan {
                    start,
                    end: j,
                    quote: None,
                }
            }
        };

        attributes.push((attr_name, span));
    }

    Some(StartTag {
        name,
        attributes,
        end: i + 1,
    })
}

fn is_tag_delimiter(b: u8) -> bool {
    b.is_ascii_whitespace() || b == b'>' || b == b'/'
}

/// Finds the position of `</name` (case-insensitive) at or after `from`
fn find_closing_tag(source: &[u8], from: usize, name: &[u8]) -> Option<usize> {
    let mut pos = from;

    while let Some(start) = find(source, pos, b"</") {
        let end = start + 2 + name.len();
        if source
            .get(start + 2..end)
            .is_some_and(|candidate| candidate.eq_ignore_ascii_case(name))
            && source.get(end).map_or(true, |b| is_tag_delimiter(*b))
        {
            return Some(start);
        }
        pos = start + 2;
    }

    None
}

fn find(haystack: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|offset| from + offset)
}

/// Escapes a replacement value for the quoting style of the original attribute
fn escape_value(value: &str, quote: Option<u8>) -> String {
    let mut escaped = value.replace('&', "&amp;");
    match quote {
        Some(b'\'') => escaped = escaped.replace('\'', "&#39;"),
        _ => escaped = escaped.replace('"', "&quot;"),
    }
    escaped
}
