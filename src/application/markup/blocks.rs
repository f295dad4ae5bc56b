//! Block assembly: lines of a paragraph segment become paragraphs, headings and lists.

use crate::domain::markup::{Block, Tone};

use super::inline::parse_inline;

const SOURCE_FRAGMENTS_SENTINEL: &str = "source fragment";

#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Unordered(&'a str),
    Ordered(&'a str),
    Text(&'a str),
}

fn classify(line: &str) -> Line<'_> {
    let trimmed = line.trim_start();
    if let Some(rest) = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
    {
        return Line::Unordered(rest.trim());
    }
    if let Some(len) = ordered_marker_len(trimmed) {
        return Line::Ordered(trimmed[len..].trim());
    }
    Line::Text(line)
}

/// Byte length of a leading `<digits>. ` marker, if present.
pub(super) fn ordered_marker_len(line: &str) -> Option<usize> {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    line[digits..].starts_with(". ").then_some(digits + 2)
}

/// `#`, `##` and `### ` prefixes mark headings 1 to 3.
fn heading(text: &str) -> Option<(u8, &str)> {
    let hashes = text.bytes().take_while(|b| *b == b'#').count();
    if !(1..=3).contains(&hashes) {
        return None;
    }
    let rest = text[hashes..].strip_prefix(' ')?.trim();
    (!rest.is_empty()).then_some((hashes as u8, rest))
}

#[derive(Default)]
struct SegmentBuilder {
    blocks: Vec<Block>,
    paragraph: Vec<String>,
    list: Option<(bool, Vec<String>)>,
}

impl SegmentBuilder {
    fn push_line(&mut self, line: &str) {
        match classify(line) {
            Line::Unordered(item) => self.push_item(false, item),
            Line::Ordered(item) => self.push_item(true, item),
            Line::Text(text) => {
                self.flush_list();
                self.paragraph.push(text.trim().to_string());
            }
        }
    }

    fn push_item(&mut self, ordered: bool, item: &str) {
        self.flush_paragraph();
        match self.list.as_mut() {
            Some((active, items)) if *active == ordered => items.push(item.to_string()),
            _ => {
                self.flush_list();
                self.list = Some((ordered, vec![item.to_string()]));
            }
        }
    }

    fn flush_paragraph(&mut self) {
        if self.paragraph.is_empty() {
            return;
        }
        let lines = std::mem::take(&mut self.paragraph);
        let text = lines.join("\n");
        if text.trim().is_empty() {
            return;
        }
        let block = match (lines.len(), heading(&text)) {
            (1, Some((level, rest))) => Block::heading(level, parse_inline(rest)),
            _ => Block::paragraph(parse_inline(&text)),
        };
        self.blocks.push(block);
    }

    fn flush_list(&mut self) {
        if let Some((ordered, items)) = self.list.take() {
            let items = items.iter().map(|item| parse_inline(item)).collect();
            self.blocks.push(Block::list(ordered, items));
        }
    }

    fn finish(mut self) -> Vec<Block> {
        self.flush_paragraph();
        self.flush_list();
        self.blocks
    }
}

/// Build the blocks of one paragraph segment, in line order.
pub fn build_segment_blocks(segment: &str) -> Vec<Block> {
    let mut builder = SegmentBuilder::default();
    for line in segment.lines() {
        builder.push_line(line);
    }
    builder.finish()
}

/// Tag the first block mentioning source fragments and subdue everything after it.
pub fn apply_source_fragment_tone(blocks: &mut [Block]) {
    let Some(split) = blocks.iter().position(|block| {
        block
            .plain_text()
            .to_lowercase()
            .contains(SOURCE_FRAGMENTS_SENTINEL)
    }) else {
        return;
    };

    blocks[split].tone = Tone::FragmentsHeader;
    for block in &mut blocks[split + 1..] {
        block.tone = Tone::Fragment;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::markup::{BlockKind, Inline};

    #[test]
    fn classify_markers() {
        assert_eq!(classify("- item"), Line::Unordered("item"));
        assert_eq!(classify("  * item"), Line::Unordered("item"));
        assert_eq!(classify("12. item"), Line::Ordered("item"));
        assert_eq!(classify("*italic* start"), Line::Text("*italic* start"));
        assert_eq!(classify("3.14 is pi"), Line::Text("3.14 is pi"));
    }

    #[test]
    fn heading_levels() {
        assert_eq!(heading("# Top"), Some((1, "Top")));
        assert_eq!(heading("### Third"), Some((3, "Third")));
        assert_eq!(heading("#### Too deep"), None);
        assert_eq!(heading("#hashtag"), None);
        assert_eq!(heading("# "), None);
    }

    #[test]
    fn paragraph_followed_by_list() {
        let blocks = build_segment_blocks("Intro:\n- one\n- two");
        assert_eq!(blocks.len(), 2);
        assert!(matches!(blocks[0].kind, BlockKind::Paragraph { .. }));
        assert_eq!(
            blocks[1].kind,
            BlockKind::List {
                ordered: false,
                items: vec![vec![Inline::text("one")], vec![Inline::text("two")]],
            }
        );
    }

    #[test]
    fn marker_change_starts_a_new_list() {
        let blocks = build_segment_blocks("- a\n- b\n1. c\n2. d");
        assert_eq!(blocks.len(), 2);
        assert!(matches!(blocks[0].kind, BlockKind::List { ordered: false, .. }));
        assert!(matches!(blocks[1].kind, BlockKind::List { ordered: true, .. }));
    }

    #[test]
    fn text_line_ends_the_list() {
        let blocks = build_segment_blocks("1. a\n2. b\nafterwards");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].plain_text(), "afterwards");
    }

    #[test]
    fn heading_only_when_it_is_the_whole_block() {
        let blocks = build_segment_blocks("## Section");
        assert!(matches!(blocks[0].kind, BlockKind::Heading { level: 2, .. }));

        let blocks = build_segment_blocks("# Title\nwith body");
        assert!(matches!(blocks[0].kind, BlockKind::Paragraph { .. }));
    }

    #[test]
    fn fragment_tone_starts_at_first_mention() {
        let mut blocks = vec![
            Block::paragraph(vec![Inline::text("Lead")]),
            Block::paragraph(vec![Inline::text("SOURCE FRAGMENTS follow")]),
            Block::paragraph(vec![Inline::text("one")]),
            Block::paragraph(vec![Inline::text("another source fragment")]),
        ];
        apply_source_fragment_tone(&mut blocks);
        let tones: Vec<Tone> = blocks.iter().map(|b| b.tone).collect();
        assert_eq!(tones, vec![
            Tone::Normal,
            Tone::FragmentsHeader,
            Tone::Fragment,
            Tone::Fragment,
        ]);
    }
}
