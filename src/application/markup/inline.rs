//! Inline scanner.
//!
//! A single left-to-right pass over the characters of one block. At each
//! delimiter the scanner looks ahead for a matching closer and, when found,
//! recurses into the enclosed span. Delimiters without a closer are kept as
//! literal text.
//!
//! Precedence at a shared delimiter character: a doubled `**`/`__` is always
//! tried as strong first, and a single `*`/`_` adjacent to another copy of
//! itself never opens emphasis, so a bold marker is never read as two italics.
//! Code spans are opaque: nothing inside them is formatted and delimiters inside
//! them never close an outer span.
//!
//! Look-ahead stays linear per span: single-character closers come from
//! precomputed next-occurrence tables, and a closer search that fails marks
//! the positions it walked so later openers of the same kind stop there.

use crate::domain::markup::Inline;

/// Parse one block's text into inline nodes.
pub fn parse_inline(text: &str) -> Vec<Inline> {
    let chars: Vec<char> = text.chars().collect();
    parse_span(&chars)
}

fn parse_span(s: &[char]) -> Vec<Inline> {
    let mut scanner = Scanner::new(s);
    let mut out = InlineBuffer::default();
    let mut i = 0;
    while i < s.len() {
        match scanner.scan_markup(i) {
            Some((node, next)) => {
                out.push_node(node);
                i = next;
            }
            None => {
                out.push_char(s[i]);
                i += 1;
            }
        }
    }
    out.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delim {
    StrongStar,
    StrongUnderscore,
    EmphasisStar,
    EmphasisUnderscore,
    Strike,
}

impl Delim {
    const COUNT: usize = 5;

    fn strong(d: char) -> Self {
        if d == '*' {
            Delim::StrongStar
        } else {
            Delim::StrongUnderscore
        }
    }

    fn emphasis(d: char) -> Self {
        if d == '*' {
            Delim::EmphasisStar
        } else {
            Delim::EmphasisUnderscore
        }
    }
}

enum Step {
    Close(usize),
    Advance(usize),
}

struct Scanner<'a> {
    s: &'a [char],
    next_tick: Vec<usize>,
    next_bracket: Vec<usize>,
    next_paren: Vec<usize>,
    /// Positions already walked by a closer search of each kind that failed.
    dead: [Vec<bool>; Delim::COUNT],
}

impl<'a> Scanner<'a> {
    fn new(s: &'a [char]) -> Self {
        Self {
            s,
            next_tick: next_positions(s, '`'),
            next_bracket: next_positions(s, ']'),
            next_paren: next_positions(s, ')'),
            dead: Default::default(),
        }
    }

    fn scan_markup(&mut self, i: usize) -> Option<(Inline, usize)> {
        match self.s[i] {
            '*' | '_' => self.scan_strong(i).or_else(|| self.scan_emphasis(i)),
            '~' => self.scan_strikethrough(i),
            '`' => self.scan_code(i),
            '[' => self.scan_link(i),
            _ => None,
        }
    }

    /// Walk from `from` looking for a closer of `kind`, skipping code spans.
    ///
    /// The walk is deterministic from any position, so reaching a position a
    /// failed walk of the same kind already visited ends the search early.
    fn search(
        &mut self,
        kind: Delim,
        from: usize,
        step: impl Fn(&[char], usize) -> Step,
    ) -> Option<usize> {
        let s = self.s;
        let k = kind as usize;
        let mut trail = Vec::new();
        let mut j = from;
        while j < s.len() {
            if self.dead[k].get(j).copied().unwrap_or(false) {
                break;
            }
            trail.push(j);
            if let Some(after) = self.skip_code_span(j) {
                j = after;
                continue;
            }
            match step(s, j) {
                Step::Close(close) => return Some(close),
                Step::Advance(n) => j += n,
            }
        }

        let dead = &mut self.dead[k];
        if dead.is_empty() {
            dead.resize(s.len(), false);
        }
        for pos in trail {
            dead[pos] = true;
        }
        None
    }

    fn scan_strong(&mut self, i: usize) -> Option<(Inline, usize)> {
        let s = self.s;
        let d = s[i];
        if s.get(i + 1) != Some(&d) || !left_flank_ok(s, i, d) {
            return None;
        }
        let content_start = i + 2;
        if s.get(content_start).is_none_or(|c| c.is_whitespace()) {
            return None;
        }

        let close = self.search(Delim::strong(d), content_start + 1, |s, j| {
            if s[j] != d {
                return Step::Advance(1);
            }
            let run = run_length(s, j, d);
            if run >= 2 {
                // In a run like `***`, the last two close the strong span.
                let close = j + run - 2;
                if !s[close - 1].is_whitespace() && right_flank_ok(s, close + 2, d) {
                    return Step::Close(close);
                }
            }
            Step::Advance(run)
        })?;

        let children = parse_span(&s[content_start..close]);
        Some((Inline::Strong { children }, close + 2))
    }

    fn scan_emphasis(&mut self, i: usize) -> Option<(Inline, usize)> {
        let s = self.s;
        let d = s[i];
        if s.get(i + 1) == Some(&d) || (i > 0 && s[i - 1] == d) || !left_flank_ok(s, i, d) {
            return None;
        }
        let content_start = i + 1;
        if s.get(content_start).is_none_or(|c| c.is_whitespace()) {
            return None;
        }

        let close = self.search(Delim::emphasis(d), content_start + 1, |s, j| {
            if s[j] != d {
                return Step::Advance(1);
            }
            let run = run_length(s, j, d);
            if run == 1 && !s[j - 1].is_whitespace() && right_flank_ok(s, j + 1, d) {
                return Step::Close(j);
            }
            Step::Advance(run)
        })?;

        let children = parse_span(&s[content_start..close]);
        Some((Inline::Emphasis { children }, close + 1))
    }

    fn scan_strikethrough(&mut self, i: usize) -> Option<(Inline, usize)> {
        let s = self.s;
        if s.get(i + 1) != Some(&'~') {
            return None;
        }
        let content_start = i + 2;
        if s.get(content_start).is_none_or(|c| c.is_whitespace() || *c == '~') {
            return None;
        }

        let close = self.search(Delim::Strike, content_start + 1, |s, j| {
            if s[j] == '~' && s.get(j + 1) == Some(&'~') && !s[j - 1].is_whitespace() {
                Step::Close(j)
            } else {
                Step::Advance(1)
            }
        })?;

        let children = parse_span(&s[content_start..close]);
        Some((Inline::Strikethrough { children }, close + 2))
    }

    fn scan_code(&self, i: usize) -> Option<(Inline, usize)> {
        let close = self.find(&self.next_tick, i + 1)?;
        if close == i + 1 {
            return None;
        }
        let code: String = self.s[i + 1..close].iter().collect();
        Some((Inline::Code { code }, close + 1))
    }

    fn scan_link(&self, i: usize) -> Option<(Inline, usize)> {
        let s = self.s;
        let label_end = self.find(&self.next_bracket, i + 1)?;
        if label_end == i + 1 || s.get(label_end + 1) != Some(&'(') {
            return None;
        }
        let url_start = label_end + 2;
        let url_end = self.find(&self.next_paren, url_start)?;
        let url: String = s[url_start..url_end].iter().collect();
        let url = url.trim();
        if url.is_empty() || url.chars().any(char::is_whitespace) {
            return None;
        }

        let label = parse_span(&s[i + 1..label_end]);
        Some((
            Inline::Link {
                label,
                url: url.to_string(),
            },
            url_end + 1,
        ))
    }

    /// If a closed code span starts at `j`, return the index just past it.
    fn skip_code_span(&self, j: usize) -> Option<usize> {
        if self.s[j] != '`' {
            return None;
        }
        self.find(&self.next_tick, j + 1)
            .filter(|close| *close > j + 1)
            .map(|close| close + 1)
    }

    fn find(&self, table: &[usize], from: usize) -> Option<usize> {
        table
            .get(from)
            .copied()
            .filter(|pos| *pos < self.s.len())
    }
}

/// `table[i]` is the first index `>= i` holding `target`, or `s.len()`.
fn next_positions(s: &[char], target: char) -> Vec<usize> {
    let mut table = vec![s.len(); s.len() + 1];
    for i in (0..s.len()).rev() {
        table[i] = if s[i] == target { i } else { table[i + 1] };
    }
    table
}

fn run_length(s: &[char], from: usize, d: char) -> usize {
    s[from..].iter().take_while(|c| **c == d).count()
}

/// Underscore delimiters only open at a word boundary, so `snake_case` stays literal.
fn left_flank_ok(s: &[char], i: usize, d: char) -> bool {
    d != '_' || i == 0 || !s[i - 1].is_alphanumeric()
}

fn right_flank_ok(s: &[char], after: usize, d: char) -> bool {
    d != '_' || s.get(after).is_none_or(|c| !c.is_alphanumeric())
}

#[derive(Default)]
struct InlineBuffer {
    nodes: Vec<Inline>,
    text: String,
}

impl InlineBuffer {
    fn push_char(&mut self, c: char) {
        self.text.push(c);
    }

    fn push_node(&mut self, node: Inline) {
        self.flush_text();
        self.nodes.push(node);
    }

    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            self.nodes.push(Inline::Text {
                text: std::mem::take(&mut self.text),
            });
        }
    }

    fn finish(mut self) -> Vec<Inline> {
        self.flush_text();
        self.nodes
    }
}
