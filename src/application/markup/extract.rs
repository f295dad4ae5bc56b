//! Plain-text views of author text and rendered markup.

use crate::domain::markup::inline_plain_text;

use super::blocks::ordered_marker_len;
use super::inline::parse_inline;

pub const DEFAULT_PREVIEW_LENGTH: usize = 150;
pub const ELLIPSIS: &str = "...";
pub const BULLET: &str = "• ";

const WORDS_PER_MINUTE: usize = 200;

/// Tags replaced by a space when stripped so adjacent blocks do not run together.
const BLOCK_TAGS: [&str; 13] = [
    "p", "br", "div", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote",
];

/// One-line teaser of author text: formatting removed, whitespace collapsed,
/// cut to `max_len` characters with a trailing ellipsis when longer.
pub fn format_text_preview(text: &str, max_len: usize) -> String {
    let flattened = text
        .lines()
        .map(preview_line)
        .collect::<Vec<_>>()
        .join(" ");
    let collapsed = collapse_whitespace(&flattened);
    truncate_chars(&collapsed, max_len)
}

fn preview_line(line: &str) -> String {
    let trimmed = line.trim_start();
    if let Some(rest) = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
    {
        return format!("{BULLET}{}", inline_plain_text(&parse_inline(rest)));
    }
    if let Some(len) = ordered_marker_len(trimmed) {
        return format!(
            "{BULLET}{}",
            inline_plain_text(&parse_inline(&trimmed[len..]))
        );
    }
    let without_heading = match trimmed.trim_start_matches('#') {
        rest if rest.len() != trimmed.len() && rest.starts_with(' ') => rest,
        _ => trimmed,
    };
    inline_plain_text(&parse_inline(without_heading))
}

/// Text content of HTML-like markup: tags removed, entities decoded,
/// whitespace collapsed and trimmed.
///
/// Literal `<` and `>` that do not form a tag are kept. Brackets written as
/// `&lt;`/`&gt;` are dropped, so the text of rendered markup never contains
/// angle brackets.
pub fn extract_plain_text(html: &str) -> String {
    let stripped = strip_tags(html);
    let decoded = decode_entities(&stripped);
    collapse_whitespace(&decoded)
}

/// Rough reading time at 200 words per minute, rounded up.
pub fn estimate_reading_minutes(text: &str) -> u32 {
    let words = text.split_whitespace().count();
    let minutes = words.div_ceil(WORDS_PER_MINUTE);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "")
        .replace("&gt;", "")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        let candidate = &rest[open..];
        match tag_len(candidate) {
            Some(len) => {
                if is_block_tag(&candidate[1..len - 1]) {
                    out.push(' ');
                }
                rest = &candidate[len..];
            }
            None => {
                out.push('<');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);

    out
}

/// Byte length of the tag starting at `text[0] == '<'`, including both
/// brackets. A tag name starts with a letter, `/` or `!`; attribute values
/// quoted right after `=` may contain `>`.
fn tag_len(text: &str) -> Option<usize> {
    let opens_tag = text[1..]
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '!'));
    if !opens_tag {
        return None;
    }

    let mut quote = None;
    let mut prev = '<';
    for (idx, c) in text.char_indices().skip(1) {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') if prev == '=' => quote = Some(c),
            (None, '>') => return Some(idx + 1),
            (None, '<') => return None,
            (None, _) => {}
        }
        prev = c;
    }
    None
}

fn is_block_tag(tag: &str) -> bool {
    let name: String = tag
        .trim_start_matches('/')
        .chars()
        .take_while(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_ascii_lowercase();
    BLOCK_TAGS.contains(&name.as_str())
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cut to at most `max_len` chars; never splits a code point.
fn truncate_chars(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_len).collect();
    format!("{}{ELLIPSIS}", cut.trim_end())
}
