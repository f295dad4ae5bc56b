//! Markdown-lite renderer for article bodies, comments and descriptions.
//!
//! Rendering is a pipeline of pure stages: paragraph segmentation, block
//! assembly with inline parsing, source-fragment tagging, and HTML
//! serialization. Every stage is total; malformed markup degrades to escaped
//! literal text.

mod blocks;
mod extract;
mod html;
mod inline;
mod segment;

use tracing::trace;

use crate::domain::markup::Block;

pub use extract::{
    BULLET, DEFAULT_PREVIEW_LENGTH, ELLIPSIS, estimate_reading_minutes, extract_plain_text,
    format_text_preview,
};
pub use html::{FRAGMENT_CLASS, FRAGMENTS_HEADER_CLASS, render_blocks_html};
pub use inline::parse_inline;
pub use segment::{SECONDARY_SPLIT_THRESHOLD, TERTIARY_SPLIT_THRESHOLD, split_paragraphs};

/// Parse author text into its block tree.
pub fn render_blocks(text: &str) -> Vec<Block> {
    let mut blocks: Vec<Block> = split_paragraphs(text)
        .iter()
        .flat_map(|segment| blocks::build_segment_blocks(segment))
        .collect();
    blocks::apply_source_fragment_tone(&mut blocks);
    trace!(input_len = text.len(), blocks = blocks.len(), "Markup parsed");
    blocks
}

/// Render author text to HTML block markup. Blocks are separated by a newline.
pub fn render_markup(text: &str) -> String {
    render_blocks_html(&render_blocks(text))
}
