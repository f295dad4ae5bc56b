//! Block and inline tree produced by the markup renderer.

use serde::Serialize;

/// Inline content inside a single block. Formatting never spans blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Inline {
    Text { text: String },
    Strong { children: Vec<Inline> },
    Emphasis { children: Vec<Inline> },
    Strikethrough { children: Vec<Inline> },
    Code { code: String },
    Link { label: Vec<Inline>, url: String },
}

impl Inline {
    pub fn text(value: impl Into<String>) -> Self {
        Inline::Text { text: value.into() }
    }
}

/// Visual weight applied to a block by the source-fragments convention.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    #[default]
    Normal,
    /// Block holding the first "source fragment" mention.
    FragmentsHeader,
    /// Any block after the fragments header.
    Fragment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockKind {
    Paragraph { content: Vec<Inline> },
    Heading { level: u8, content: Vec<Inline> },
    List { ordered: bool, items: Vec<Vec<Inline>> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub kind: BlockKind,
    pub tone: Tone,
}

impl Block {
    pub fn paragraph(content: Vec<Inline>) -> Self {
        Self {
            kind: BlockKind::Paragraph { content },
            tone: Tone::Normal,
        }
    }

    pub fn heading(level: u8, content: Vec<Inline>) -> Self {
        Self {
            kind: BlockKind::Heading { level, content },
            tone: Tone::Normal,
        }
    }

    pub fn list(ordered: bool, items: Vec<Vec<Inline>>) -> Self {
        Self {
            kind: BlockKind::List { ordered, items },
            tone: Tone::Normal,
        }
    }

    /// Text of the block with all formatting removed. List items are joined by a space.
    pub fn plain_text(&self) -> String {
        match &self.kind {
            BlockKind::Paragraph { content } | BlockKind::Heading { content, .. } => {
                inline_plain_text(content)
            }
            BlockKind::List { items, .. } => items
                .iter()
                .map(|item| inline_plain_text(item))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

/// Concatenated text of inline nodes: link labels replace links, code keeps its content.
pub fn inline_plain_text(nodes: &[Inline]) -> String {
    let mut out = String::new();
    push_plain_text(nodes, &mut out);
    out
}

fn push_plain_text(nodes: &[Inline], out: &mut String) {
    for node in nodes {
        match node {
            Inline::Text { text } => out.push_str(text),
            Inline::Code { code } => out.push_str(code),
            Inline::Strong { children }
            | Inline::Emphasis { children }
            | Inline::Strikethrough { children } => push_plain_text(children, out),
            Inline::Link { label, .. } => push_plain_text(label, out),
        }
    }
}
