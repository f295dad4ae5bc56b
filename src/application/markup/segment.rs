//! Paragraph segmentation.
//!
//! Blank lines are the primary boundary. Upstream content sometimes arrives
//! without blank lines between paragraphs, so long segments get two extra
//! heuristic passes: newline followed by an uppercase letter, then sentence
//! breaks for single-line walls of text.

/// Segments longer than this (in chars) that contain newlines are split on
/// newlines that start with an uppercase letter.
pub const SECONDARY_SPLIT_THRESHOLD: usize = 200;

/// Single-line segments longer than this (in chars) are split into sentences.
pub const TERTIARY_SPLIT_THRESHOLD: usize = 400;

/// Split a document into trimmed, non-empty paragraph segments in input order.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");

    let mut segments = Vec::new();
    for primary in split_on_blank_lines(&normalized) {
        for secondary in split_on_capitalized_lines(&primary) {
            segments.extend(split_sentences(&secondary));
        }
    }
    segments
}

fn split_on_blank_lines(text: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.split('\n') {
        if line.trim().is_empty() {
            flush_lines(&mut current, &mut segments);
        } else {
            current.push(line);
        }
    }
    flush_lines(&mut current, &mut segments);

    segments
}

fn flush_lines(lines: &mut Vec<&str>, segments: &mut Vec<String>) {
    if lines.is_empty() {
        return;
    }
    let joined = lines.join("\n");
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        segments.push(trimmed.to_string());
    }
    lines.clear();
}

fn split_on_capitalized_lines(segment: &str) -> Vec<String> {
    if segment.chars().count() <= SECONDARY_SPLIT_THRESHOLD || !segment.contains('\n') {
        return vec![segment.to_string()];
    }

    let mut pieces = Vec::new();
    let mut current = String::new();
    for line in segment.split('\n') {
        let starts_upper = line.chars().next().is_some_and(char::is_uppercase);
        if starts_upper && !current.is_empty() {
            pieces.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }
    if !current.is_empty() {
        pieces.push(current);
    }

    pieces
        .into_iter()
        .map(|piece| piece.trim().to_string())
        .filter(|piece| !piece.is_empty())
        .collect()
}

fn split_sentences(segment: &str) -> Vec<String> {
    if segment.contains('\n')
        || segment.chars().count() <= TERTIARY_SPLIT_THRESHOLD
        || is_structural_line(segment)
    {
        return vec![segment.to_string()];
    }

    let chars: Vec<char> = segment.chars().collect();
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i + 2 < chars.len() {
        if chars[i] == '.' && chars[i + 1] == ' ' && chars[i + 2].is_uppercase() {
            pieces.push(chars[start..=i].iter().collect::<String>());
            start = i + 2;
            i += 2;
            continue;
        }
        i += 1;
    }
    if pieces.is_empty() {
        return vec![segment.to_string()];
    }
    pieces.push(chars[start..].iter().collect::<String>());

    pieces
        .into_iter()
        .map(|piece| piece.trim().to_string())
        .filter(|piece| !piece.is_empty())
        .map(|piece| {
            if piece.ends_with(['.', '!', '?']) {
                piece
            } else {
                format!("{piece}.")
            }
        })
        .collect()
}

/// Lines that carry a list or heading marker are never sentence-split.
fn is_structural_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("- ")
        || trimmed.starts_with("* ")
        || trimmed.starts_with('#')
        || super::blocks::ordered_marker_len(trimmed).is_some()
}
