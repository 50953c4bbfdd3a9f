//! Markdown deck → ordered slides.
//!
//! Slides are separated by thematic breaks (`---`). A slide's first heading
//! is its title and the source of its id; the body is flattened into plain
//! text lines the terminal viewer can lay out.

use std::collections::HashSet;
use std::sync::LazyLock;
use std::time::Instant;

use anyhow::bail;
use log::info;
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use regex::Regex;

static NON_SLUG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Heading(u8),
    Text,
    Bullet,
    Code,
    Quote,
    Blank,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeckLine {
    pub kind: LineKind,
    /// Nesting depth (lists, quotes).
    pub indent: u16,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct DeckSlide {
    pub id: String,
    pub title: Option<String>,
    pub lines: Vec<DeckLine>,
}

/// A laid-out terminal row.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub kind: LineKind,
    pub text: String,
}

#[derive(Debug)]
enum Container {
    Heading(u8),
    Paragraph,
    List { ordered: Option<u64> },
    Item,
    CodeBlock,
    BlockQuote,
}

#[derive(Default)]
struct SlideBuilder {
    title: Option<String>,
    lines: Vec<DeckLine>,
}

impl SlideBuilder {
    fn is_empty(&self) -> bool {
        self.title.is_none() && self.lines.iter().all(|l| l.kind == LineKind::Blank)
    }

    fn push(&mut self, kind: LineKind, indent: u16, text: String) {
        if kind == LineKind::Blank && self.lines.last().is_none_or(|l| l.kind == LineKind::Blank) {
            return;
        }
        self.lines.push(DeckLine { kind, indent, text });
    }

    fn finish(mut self) -> SlideBuilder {
        while self.lines.last().is_some_and(|l| l.kind == LineKind::Blank) {
            self.lines.pop();
        }
        self
    }
}

/// Lowercase, ASCII alphanumerics joined by single dashes.
pub fn slugify(title: &str) -> String {
    let lower = title.to_lowercase();
    NON_SLUG.replace_all(&lower, "-").trim_matches('-').to_string()
}

/// Parse a Markdown deck. Fails when no slide has any content.
pub fn parse_deck(markdown: &str) -> anyhow::Result<Vec<DeckSlide>> {
    let start = Instant::now();
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(markdown, options);

    let mut builders: Vec<SlideBuilder> = Vec::new();
    let mut current = SlideBuilder::default();
    let mut stack: Vec<Container> = Vec::new();
    let mut buf = String::new();
    // Item numbering per open ordered list.
    let mut counters: Vec<u64> = Vec::new();
    let mut item_prefix: Option<String> = None;

    for event in parser {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                buf.clear();
                stack.push(Container::Heading(level as u8));
            }
            Event::End(TagEnd::Heading(_)) => {
                let level = match stack.pop() {
                    Some(Container::Heading(l)) => l,
                    _ => 1,
                };
                let text = std::mem::take(&mut buf).trim().to_string();
                if current.title.is_none() && !text.is_empty() {
                    current.title = Some(text.clone());
                }
                current.push(LineKind::Heading(level), 0, text);
                current.push(LineKind::Blank, 0, String::new());
            }
            Event::Start(Tag::Paragraph) => {
                if !stack.iter().any(|c| matches!(c, Container::Item)) {
                    buf.clear();
                }
                stack.push(Container::Paragraph);
            }
            Event::End(TagEnd::Paragraph) => {
                stack.pop();
                if stack.iter().any(|c| matches!(c, Container::Item)) {
                    // Tight text inside an item is flushed at the item's end.
                    buf.push(' ');
                    continue;
                }
                let kind = if quoted(&stack) { LineKind::Quote } else { LineKind::Text };
                let indent = if quoted(&stack) { depth(&stack) + 1 } else { 0 };
                for line in std::mem::take(&mut buf).split('\n') {
                    current.push(kind, indent, line.trim().to_string());
                }
                current.push(LineKind::Blank, 0, String::new());
            }
            Event::Start(Tag::BlockQuote(_)) => {
                stack.push(Container::BlockQuote);
            }
            Event::End(TagEnd::BlockQuote(_)) => {
                stack.pop();
            }
            Event::Start(Tag::List(first)) => {
                flush_item(&mut current, &mut buf, &mut item_prefix, depth(&stack));
                counters.push(first.unwrap_or(0));
                stack.push(Container::List { ordered: first });
            }
            Event::End(TagEnd::List(_)) => {
                flush_item(&mut current, &mut buf, &mut item_prefix, depth(&stack));
                stack.pop();
                counters.pop();
                if !stack.iter().any(|c| matches!(c, Container::List { .. })) {
                    current.push(LineKind::Blank, 0, String::new());
                }
            }
            Event::Start(Tag::Item) => {
                flush_item(&mut current, &mut buf, &mut item_prefix, depth(&stack));
                let prefix = match stack.last() {
                    Some(Container::List { ordered: Some(_) }) => {
                        let n = counters.last_mut().map(|c| {
                            let n = *c;
                            *c += 1;
                            n
                        });
                        format!("{}. ", n.unwrap_or(1))
                    }
                    _ => "• ".to_string(),
                };
                item_prefix = Some(prefix);
                stack.push(Container::Item);
            }
            Event::End(TagEnd::Item) => {
                stack.pop();
                flush_item(&mut current, &mut buf, &mut item_prefix, depth(&stack));
            }
            Event::Start(Tag::CodeBlock(_)) => {
                buf.clear();
                stack.push(Container::CodeBlock);
            }
            Event::End(TagEnd::CodeBlock) => {
                stack.pop();
                let code = std::mem::take(&mut buf);
                for line in code.trim_end_matches('\n').split('\n') {
                    current.push(LineKind::Code, 1, line.to_string());
                }
                current.push(LineKind::Blank, 0, String::new());
            }
            Event::Text(text) => buf.push_str(&text),
            Event::Code(code) => {
                buf.push('`');
                buf.push_str(&code);
                buf.push('`');
            }
            Event::SoftBreak => buf.push(' '),
            Event::HardBreak => buf.push('\n'),
            Event::Rule => {
                builders.push(std::mem::take(&mut current).finish());
            }
            _ => {}
        }
    }
    builders.push(current.finish());

    let builders: Vec<SlideBuilder> = builders.into_iter().filter(|b| !b.is_empty()).collect();
    if builders.is_empty() {
        bail!("deck has no slides (empty or only separators)");
    }

    let mut used: HashSet<String> = HashSet::new();
    let slides: Vec<DeckSlide> = builders
        .into_iter()
        .enumerate()
        .map(|(i, b)| {
            let base = b
                .title
                .as_deref()
                .map(slugify)
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| format!("slide-{}", i + 1));
            let mut id = base.clone();
            let mut n = 1;
            while !used.insert(id.clone()) {
                n += 1;
                id = format!("{base}-{n}");
            }
            DeckSlide {
                id,
                title: b.title,
                lines: b.lines,
            }
        })
        .collect();

    info!(
        "deck: parsed {} slide(s) in {:.1}ms",
        slides.len(),
        start.elapsed().as_secs_f64() * 1000.0
    );
    Ok(slides)
}

/// Nesting depth of the innermost list or quote (0 for top level).
fn depth(stack: &[Container]) -> u16 {
    stack
        .iter()
        .filter(|c| matches!(c, Container::List { .. } | Container::BlockQuote))
        .count()
        .saturating_sub(1) as u16
}

fn quoted(stack: &[Container]) -> bool {
    stack.iter().any(|c| matches!(c, Container::BlockQuote))
}

fn flush_item(current: &mut SlideBuilder, buf: &mut String, prefix: &mut Option<String>, indent: u16) {
    let Some(p) = prefix.take() else {
        return;
    };
    let text = std::mem::take(buf);
    current.push(LineKind::Bullet, indent, format!("{p}{}", text.trim()));
}

impl DeckSlide {
    /// Sidebar label: the title, or the id when the slide has no heading.
    pub fn label(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }

    /// Lay the slide out into rows no wider than `width` columns.
    pub fn layout(&self, width: usize) -> Vec<Row> {
        let width = width.max(8);
        let mut rows = Vec::new();
        for line in &self.lines {
            let indent = "  ".repeat(line.indent as usize);
            match line.kind {
                LineKind::Blank => rows.push(Row {
                    kind: LineKind::Blank,
                    text: String::new(),
                }),
                // Code keeps its own spacing and is truncated, not wrapped.
                LineKind::Code => rows.push(Row {
                    kind: LineKind::Code,
                    text: format!("{indent}{}", line.text).chars().take(width).collect(),
                }),
                kind => {
                    let avail = width.saturating_sub(indent.chars().count()).max(4);
                    for (i, piece) in wrap(&line.text, avail).into_iter().enumerate() {
                        // Continuation rows of a bullet line up under its text.
                        let lead = if kind == LineKind::Bullet && i > 0 { "  " } else { "" };
                        rows.push(Row {
                            kind,
                            text: format!("{indent}{lead}{piece}"),
                        });
                    }
                }
            }
        }
        rows
    }
}

/// Whole deck as plain text, one page per slide separated by form feeds,
/// for printing or paging outside the viewer.
pub fn render_text(slides: &[DeckSlide], width: usize) -> String {
    let mut out = String::new();
    for (i, slide) in slides.iter().enumerate() {
        if i > 0 {
            out.push('\u{c}');
            out.push('\n');
        }
        for row in slide.layout(width) {
            out.push_str(row.text.trim_end());
            out.push('\n');
        }
    }
    out
}

/// Greedy word wrap by character count. Words longer than `width` are split;
/// a zero width is treated as one column.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut out = Vec::new();
    let mut line = String::new();
    let mut len = 0;
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if len > 0 {
                out.push(std::mem::take(&mut line));
                len = 0;
            }
            let rest = word.split_off(width);
            out.push(word.into_iter().collect());
            word = rest;
        }
        if len > 0 && len + 1 + word.len() > width {
            out.push(std::mem::take(&mut line));
            len = 0;
        }
        if len > 0 {
            line.push(' ');
            len += 1;
        }
        len += word.len();
        line.extend(word);
    }
    if !line.is_empty() || out.is_empty() {
        out.push(line);
    }
    out
}
