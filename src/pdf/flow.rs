//! HTML → block flow.
//!
//! Rendered letters use a small vocabulary of markup: headings, paragraphs,
//! line breaks, bold runs, rules, lists and tables. Everything else is
//! treated as an inline container and its text kept.

use scraper::{ElementRef, Html};

/// A word (or glued fragment) of text.
#[derive(Debug, Clone, PartialEq)]
pub enum Run {
    Word {
        text: String,
        bold: bool,
        /// Whether whitespace separated this word from the previous one.
        space_before: bool,
    },
    Break,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub runs: Vec<Run>,
    pub font_size: f32,
    pub align: Align,
    /// Extra space below the paragraph, in points.
    pub space_after: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableCell {
    pub runs: Vec<Run>,
    pub header: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Vec<Vec<TableCell>>),
    Rule,
}

/// Parsed document: metadata title plus body blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct Flow {
    pub title: Option<String>,
    pub blocks: Vec<Block>,
}

pub const BODY_FONT_SIZE: f32 = 11.0;

#[derive(Debug, Clone, Copy)]
struct Inline {
    bold: bool,
    font_size: f32,
    align: Align,
}

impl Default for Inline {
    fn default() -> Self {
        Self {
            bold: false,
            font_size: BODY_FONT_SIZE,
            align: Align::Left,
        }
    }
}

#[derive(Default)]
struct Builder {
    blocks: Vec<Block>,
    runs: Vec<Run>,
    pending_space: bool,
}

impl Builder {
    fn push_text(&mut self, text: &str, bold: bool) {
        if text.starts_with(char::is_whitespace) {
            self.pending_space = true;
        }
        let mut first = true;
        for word in text.split_whitespace() {
            let space_before = !self.runs.is_empty()
                && !matches!(self.runs.last(), Some(Run::Break))
                && (!first || self.pending_space);
            self.runs.push(Run::Word {
                text: word.to_string(),
                bold,
                space_before,
            });
            first = false;
            self.pending_space = false;
        }
        if !first && text.ends_with(char::is_whitespace) {
            self.pending_space = true;
        }
    }

    fn push_break(&mut self) {
        self.runs.push(Run::Break);
        self.pending_space = false;
    }

    /// Close the open paragraph, if it has any words.
    fn finish(&mut self, style: Inline, space_after: f32) {
        while matches!(self.runs.last(), Some(Run::Break)) {
            self.runs.pop();
        }
        self.pending_space = false;
        if self.runs.is_empty() {
            return;
        }
        let runs = std::mem::take(&mut self.runs);
        self.blocks.push(Block::Paragraph(Paragraph {
            runs,
            font_size: style.font_size,
            align: style.align,
            space_after,
        }));
    }

    /// Flatten every collected paragraph into one run list.
    fn into_runs(mut self) -> Vec<Run> {
        self.finish(Inline::default(), 0.0);
        let mut runs = Vec::new();
        for block in self.blocks {
            if let Block::Paragraph(paragraph) = block {
                if !runs.is_empty() {
                    runs.push(Run::Break);
                }
                runs.extend(paragraph.runs);
            }
        }
        runs
    }
}

/// Parse an HTML document into a flow of blocks.
pub fn parse(html: &str) -> Flow {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let title = root
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "title")
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty());

    let mut builder = Builder::default();
    walk_children(root, Inline::default(), &mut builder);
    builder.finish(Inline::default(), paragraph_gap());

    Flow {
        title,
        blocks: builder.blocks,
    }
}

fn paragraph_gap() -> f32 {
    BODY_FONT_SIZE * 0.6
}

fn walk_children(element: ElementRef<'_>, style: Inline, builder: &mut Builder) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            builder.push_text(text, style.bold);
        } else if let Some(child_element) = ElementRef::wrap(child) {
            walk_element(child_element, style, builder);
        }
    }
}

fn walk_element(element: ElementRef<'_>, style: Inline, builder: &mut Builder) {
    let name = element.value().name();
    match name {
        "head" | "title" | "script" | "style" => {}
        "br" => builder.push_break(),
        "hr" => {
            builder.finish(style, paragraph_gap());
            builder.blocks.push(Block::Rule);
        }
        "b" | "strong" | "th" => walk_children(element, Inline { bold: true, ..style }, builder),
        "h1" | "h2" | "h3" | "h4" => {
            let font_size = match name {
                "h1" => 18.0,
                "h2" => 15.0,
                "h3" => 13.0,
                _ => 12.0,
            };
            let heading = Inline {
                bold: true,
                font_size,
                align: alignment(element).unwrap_or(style.align),
            };
            builder.finish(style, paragraph_gap());
            walk_children(element, heading, builder);
            builder.finish(heading, font_size * 0.5);
        }
        "p" | "div" | "section" | "header" | "footer" | "address" | "article" | "body"
        | "html" | "ul" | "ol" => {
            let block = Inline {
                align: alignment(element).unwrap_or(style.align),
                ..style
            };
            builder.finish(style, paragraph_gap());
            walk_children(element, block, builder);
            builder.finish(block, paragraph_gap());
        }
        "li" => {
            builder.finish(style, paragraph_gap());
            builder.push_text("\u{2022} ", false);
            walk_children(element, style, builder);
            builder.finish(style, BODY_FONT_SIZE * 0.3);
        }
        "table" => {
            builder.finish(style, paragraph_gap());
            let rows = parse_table(element);
            if !rows.is_empty() {
                builder.blocks.push(Block::Table(rows));
            }
        }
        _ => walk_children(element, style, builder),
    }
}

fn parse_table(table: ElementRef<'_>) -> Vec<Vec<TableCell>> {
    table
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "tr")
        .map(|row| {
            row.children()
                .filter_map(ElementRef::wrap)
                .filter(|cell| matches!(cell.value().name(), "td" | "th"))
                .map(|cell| {
                    let header = cell.value().name() == "th";
                    let mut builder = Builder::default();
                    walk_children(
                        cell,
                        Inline {
                            bold: header,
                            ..Inline::default()
                        },
                        &mut builder,
                    );
                    TableCell {
                        runs: builder.into_runs(),
                        header,
                    }
                })
                .collect::<Vec<_>>()
        })
        .filter(|cells| !cells.is_empty())
        .collect()
}

/// Alignment from an `align` attribute or an inline `text-align` style.
fn alignment(element: ElementRef<'_>) -> Option<Align> {
    let from_keyword = |value: &str| match value.trim().to_ascii_lowercase().as_str() {
        "center" => Some(Align::Center),
        "right" => Some(Align::Right),
        "left" | "justify" => Some(Align::Left),
        _ => None,
    };

    if let Some(align) = element.value().attr("align").and_then(from_keyword) {
        return Some(align);
    }

    element.value().attr("style").and_then(|style| {
        style
            .split(';')
            .filter_map(|decl| decl.split_once(':'))
            .find(|(property, _)| property.trim().eq_ignore_ascii_case("text-align"))
            .and_then(|(_, value)| from_keyword(value))
    })
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
