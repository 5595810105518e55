//! Lightweight markdown rendering for generated answers
//!
//! Models answer in a small markdown subset: paragraphs, `#` headings,
//! bullet and numbered lists, `**bold**`, `*italic*` and `` `code` ``.
//! Anything else passes through as text. HTML output escapes the raw
//! answer before adding markup.

use serde::Deserialize;
use serde::Serialize;

/// Target display format for answers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerFormat {
    /// HTML fragment for the web layer
    #[default]
    Html,
    /// Terminal text with markup removed
    Plain,
}

#[derive(Debug, PartialEq, Eq)]
enum Block {
    Heading(String),
    Paragraph(Vec<String>),
    List { ordered: bool, items: Vec<String> },
}

/// Render a raw model answer for display
pub fn format_answer(raw: &str, format: AnswerFormat) -> String {
    let blocks = parse_blocks(raw);
    match format {
        AnswerFormat::Html => render_html(&blocks),
        AnswerFormat::Plain => render_plain(&blocks),
    }
}

fn parse_blocks(raw: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut paragraph: Vec<String> = Vec::new();
    let mut list: Option<(bool, Vec<String>)> = None;

    fn flush(
        blocks: &mut Vec<Block>,
        paragraph: &mut Vec<String>,
        list: &mut Option<(bool, Vec<String>)>,
    ) {
        if !paragraph.is_empty() {
            blocks.push(Block::Paragraph(std::mem::take(paragraph)));
        }
        if let Some((ordered, items)) = list.take() {
            blocks.push(Block::List { ordered, items });
        }
    }

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            flush(&mut blocks, &mut paragraph, &mut list);
            continue;
        }

        if let Some(heading) = heading_text(line) {
            flush(&mut blocks, &mut paragraph, &mut list);
            blocks.push(Block::Heading(heading.to_string()));
            continue;
        }

        if let Some((ordered, item)) = list_item(line) {
            if !paragraph.is_empty() {
                blocks.push(Block::Paragraph(std::mem::take(&mut paragraph)));
            }
            match &mut list {
                Some((kind, items)) if *kind == ordered => items.push(item.to_string()),
                _ => {
                    if let Some((kind, items)) = list.take() {
                        blocks.push(Block::List {
                            ordered: kind,
                            items,
                        });
                    }
                    list = Some((ordered, vec![item.to_string()]));
                }
            }
            continue;
        }

        if let Some((ordered, items)) = list.take() {
            blocks.push(Block::List { ordered, items });
        }
        paragraph.push(line.to_string());
    }

    flush(&mut blocks, &mut paragraph, &mut list);
    blocks
}

fn heading_text(line: &str) -> Option<&str> {
    let stripped = line.trim_start_matches('#');
    let level = line.len() - stripped.len();
    if (1..=6).contains(&level) && stripped.starts_with(' ') {
        Some(stripped.trim())
    } else {
        None
    }
}

/// `(ordered, item text)` for list lines
fn list_item(line: &str) -> Option<(bool, &str)> {
    for marker in ["- ", "* ", "+ ", "• "] {
        if let Some(item) = line.strip_prefix(marker) {
            return Some((false, item.trim()));
        }
    }

    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 && digits <= 3 {
        let rest = &line[digits..];
        if let Some(item) = rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") ")) {
            return Some((true, item.trim()));
        }
    }
    None
}

fn render_html(blocks: &[Block]) -> String {
    let mut out = Vec::with_capacity(blocks.len());
    for block in blocks {
        match block {
            Block::Heading(text) => out.push(format!("<h3>{}</h3>", inline_html(text))),
            Block::Paragraph(lines) => {
                let lines: Vec<String> = lines.iter().map(|l| inline_html(l)).collect();
                out.push(format!("<p>{}</p>", lines.join("<br>")));
            }
            Block::List { ordered, items } => {
                let tag = if *ordered { "ol" } else { "ul" };
                let items: String = items
                    .iter()
                    .map(|item| format!("<li>{}</li>", inline_html(item)))
                    .collect();
                out.push(format!("<{tag}>{items}</{tag}>"));
            }
        }
    }
    out.join("\n")
}

fn render_plain(blocks: &[Block]) -> String {
    let mut out = Vec::with_capacity(blocks.len());
    for block in blocks {
        match block {
            Block::Heading(text) => out.push(inline_plain(text)),
            Block::Paragraph(lines) => {
                let lines: Vec<String> = lines.iter().map(|l| inline_plain(l)).collect();
                out.push(lines.join("\n"));
            }
            Block::List { ordered, items } => {
                let lines: Vec<String> = items
                    .iter()
                    .enumerate()
                    .map(|(idx, item)| {
                        if *ordered {
                            format!("{}. {}", idx + 1, inline_plain(item))
                        } else {
                            format!("• {}", inline_plain(item))
                        }
                    })
                    .collect();
                out.push(lines.join("\n"));
            }
        }
    }
    out.join("\n\n")
}

/// Opening and closing markup for one inline style
type Markup = (&'static str, &'static str);

const HTML_CODE: Markup = ("<code>", "</code>");
const HTML_STRONG: Markup = ("<strong>", "</strong>");
const HTML_EM: Markup = ("<em>", "</em>");
const BARE: Markup = ("", "");

fn inline_html(text: &str) -> String {
    render_inline(&escape_html(text), HTML_CODE, HTML_STRONG, HTML_EM)
}

fn inline_plain(text: &str) -> String {
    render_inline(text, BARE, BARE, BARE)
}

/// Code spans first; emphasis applies only to the text between them
fn render_inline(text: &str, code: Markup, strong: Markup, em: Markup) -> String {
    let emphasis = |segment: &str| {
        let bold = wrap_delimited(segment, "**", strong.0, strong.1);
        wrap_delimited(&bold, "*", em.0, em.1)
    };

    let mut out = String::with_capacity(text.len());
    let mut pending = String::new();
    let mut rest = text;

    while let Some(start) = rest.find('`') {
        let after = &rest[start + 1..];
        match after.find('`') {
            Some(end) if end > 0 && !after[..end].starts_with(' ') => {
                pending.push_str(&rest[..start]);
                out.push_str(&emphasis(&pending));
                pending.clear();
                out.push_str(code.0);
                out.push_str(&after[..end]);
                out.push_str(code.1);
                rest = &after[end + 1..];
            }
            _ => {
                pending.push_str(&rest[..=start]);
                rest = after;
            }
        }
    }
    pending.push_str(rest);
    out.push_str(&emphasis(&pending));
    out
}

/// Replace balanced `delim ... delim` pairs; unpaired delimiters stay literal
fn wrap_delimited(text: &str, delim: &str, open: &str, close: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find(delim) {
        let after = &rest[start + delim.len()..];
        match after.find(delim) {
            Some(end) if end > 0 && !after[..end].starts_with(' ') => {
                out.push_str(&rest[..start]);
                out.push_str(open);
                out.push_str(&after[..end]);
                out.push_str(close);
                rest = &after[end + delim.len()..];
            }
            _ => {
                out.push_str(&rest[..start + delim.len()]);
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
