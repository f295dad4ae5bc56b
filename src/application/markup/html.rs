//! HTML serialization of the block tree.
//!
//! Every piece of author text goes through `html_escape` before it is placed
//! between tags. Link targets are attribute-escaped and script-capable schemes
//! are dropped, leaving only the label.

use std::fmt::Write as _;

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::domain::markup::{Block, BlockKind, Inline, Tone};

pub const FRAGMENTS_HEADER_CLASS: &str = "source-fragments-header";
pub const FRAGMENT_CLASS: &str = "source-fragment";

const BLOCKED_SCHEMES: [&str; 3] = ["javascript:", "vbscript:", "data:"];

pub fn render_blocks_html(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(render_block)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_block(block: &Block) -> String {
    let class_attr = match block.tone {
        Tone::FragmentsHeader => format!(" class=\"{FRAGMENTS_HEADER_CLASS}\""),
        Tone::Normal | Tone::Fragment => String::new(),
    };

    match &block.kind {
        BlockKind::Paragraph { content } => {
            let inner = subdued(block.tone, render_inline(content));
            format!("<p{class_attr}>{inner}</p>")
        }
        BlockKind::Heading { level, content } => {
            let inner = subdued(block.tone, render_inline(content));
            format!("<h{level}{class_attr}>{inner}</h{level}>")
        }
        BlockKind::List { ordered, items } => {
            let tag = if *ordered { "ol" } else { "ul" };
            let mut html = format!("<{tag}{class_attr}>");
            for item in items {
                let inner = subdued(block.tone, render_inline(item));
                let _ = write!(html, "<li>{inner}</li>");
            }
            let _ = write!(html, "</{tag}>");
            html
        }
    }
}

fn subdued(tone: Tone, inner: String) -> String {
    match tone {
        Tone::Fragment => format!("<small class=\"{FRAGMENT_CLASS}\">{inner}</small>"),
        Tone::Normal | Tone::FragmentsHeader => inner,
    }
}

fn render_inline(nodes: &[Inline]) -> String {
    let mut html = String::new();
    push_inline(nodes, &mut html);
    html
}

fn push_inline(nodes: &[Inline], html: &mut String) {
    for node in nodes {
        match node {
            Inline::Text { text } => push_text(text, html),
            Inline::Strong { children } => wrap("strong", children, html),
            Inline::Emphasis { children } => wrap("em", children, html),
            Inline::Strikethrough { children } => wrap("del", children, html),
            Inline::Code { code } => {
                let _ = write!(html, "<code>{}</code>", encode_text(code));
            }
            Inline::Link { label, url } => {
                if is_safe_url(url) {
                    let _ = write!(
                        html,
                        "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">",
                        encode_double_quoted_attribute(url)
                    );
                    push_inline(label, html);
                    html.push_str("</a>");
                } else {
                    push_inline(label, html);
                }
            }
        }
    }
}

fn wrap(tag: &str, children: &[Inline], html: &mut String) {
    let _ = write!(html, "<{tag}>");
    push_inline(children, html);
    let _ = write!(html, "</{tag}>");
}

/// Single newlines inside a paragraph become line breaks.
fn push_text(text: &str, html: &mut String) {
    let mut lines = text.split('\n');
    if let Some(first) = lines.next() {
        html.push_str(&encode_text(first));
    }
    for line in lines {
        html.push_str("<br />\n");
        html.push_str(&encode_text(line));
    }
}

fn is_safe_url(url: &str) -> bool {
    let normalized: String = url
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    !BLOCKED_SCHEMES
        .iter()
        .any(|scheme| normalized.starts_with(scheme))
}
