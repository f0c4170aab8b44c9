//! Line breaking and pagination.
//!
//! Coordinates are in points with the origin at the top-left corner of the
//! page; the renderer flips them into PDF space.

use super::flow::{Align, Block, Flow, Paragraph, Run, TableCell};

pub const A4_WIDTH_PT: f32 = 595.28;
pub const A4_HEIGHT_PT: f32 = 841.89;
pub const PAGE_MARGIN_PT: f32 = 56.0;

const TABLE_FONT_SIZE: f32 = 10.0;
const CELL_PADDING: f32 = 4.0;
const MIN_COLUMN_WIDTH: f32 = 36.0;
const LINE_SPACING: f32 = 1.35;

#[derive(Debug, Clone, Copy)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            width: A4_WIDTH_PT,
            height: A4_HEIGHT_PT,
            margin: PAGE_MARGIN_PT,
        }
    }
}

impl PageGeometry {
    fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    fn bottom_limit(&self) -> f32 {
        self.height - self.margin
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// `y` is the text baseline.
    Text {
        x: f32,
        y: f32,
        size: f32,
        bold: bool,
        text: String,
    },
    Line { x1: f32, y1: f32, x2: f32, y2: f32 },
    Rect { x: f32, y: f32, width: f32, height: f32 },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaidOutPage {
    pub items: Vec<Item>,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum LayoutError {
    #[error("table with {columns} columns does not fit the page width")]
    TableTooWide { columns: usize },
}

/// Horizontal advance of `text` in builtin Helvetica.
pub fn text_width(text: &str, size: f32, bold: bool) -> f32 {
    let units: f32 = text.chars().map(char_units).sum();
    let weight = if bold { 1.05 } else { 1.0 };
    units * size / 1000.0 * weight
}

fn char_units(c: char) -> f32 {
    match c {
        'i' | 'j' | 'l' | '\'' | '|' => 222.0,
        ' ' | '.' | ',' | ':' | ';' | '!' | 'f' | 't' | 'I' | '/' | '(' | ')' | '[' | ']' => 278.0,
        'r' | '-' | '"' => 333.0,
        'c' | 'k' | 's' | 'v' | 'x' | 'y' | 'z' | 'J' => 500.0,
        'm' | 'M' => 833.0,
        'w' => 722.0,
        'W' => 944.0,
        '@' => 1015.0,
        c if c.is_ascii_digit() => 556.0,
        c if c.is_ascii_uppercase() => 667.0,
        _ => 556.0,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub x: f32,
    pub text: String,
    pub bold: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextLine {
    pub segments: Vec<Segment>,
    pub width: f32,
}

impl TextLine {
    fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    fn append(&mut self, word: &str, bold: bool, gap: f32, size: f32) {
        let word_width = text_width(word, size, bold);
        match self.segments.last_mut() {
            Some(last) if last.bold == bold => {
                if gap > 0.0 {
                    last.text.push(' ');
                }
                last.text.push_str(word);
            }
            _ => self.segments.push(Segment {
                x: self.width + gap,
                text: word.to_string(),
                bold,
            }),
        }
        self.width += gap + word_width;
    }
}

/// Greedy line breaking. Words longer than a full line are split.
pub fn wrap(runs: &[Run], max_width: f32, size: f32) -> Vec<TextLine> {
    let space = text_width(" ", size, false);
    let mut lines = Vec::new();
    let mut line = TextLine::default();

    for run in runs {
        let (text, bold, space_before) = match run {
            Run::Break => {
                lines.push(std::mem::take(&mut line));
                continue;
            }
            Run::Word {
                text,
                bold,
                space_before,
            } => (text.as_str(), *bold, *space_before),
        };

        let width = text_width(text, size, bold);
        let mut gap = if space_before && !line.is_empty() {
            space
        } else {
            0.0
        };

        if !line.is_empty() && line.width + gap + width > max_width {
            lines.push(std::mem::take(&mut line));
            gap = 0.0;
        }

        if width <= max_width {
            line.append(text, bold, gap, size);
            continue;
        }

        for chunk in split_to_width(text, max_width, size, bold) {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            line.append(&chunk, bold, 0.0, size);
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

fn split_to_width(word: &str, max_width: f32, size: f32, bold: bool) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    for c in word.chars() {
        current.push(c);
        if current.chars().count() > 1 && text_width(&current, size, bold) > max_width {
            current.pop();
            chunks.push(std::mem::take(&mut current));
            current.push(c);
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

struct Cursor {
    geometry: PageGeometry,
    pages: Vec<LaidOutPage>,
    current: LaidOutPage,
    y: f32,
}

impl Cursor {
    fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            pages: Vec::new(),
            current: LaidOutPage::default(),
            y: geometry.margin,
        }
    }

    fn at_top(&self) -> bool {
        self.y <= self.geometry.margin
    }

    /// Start a new page unless `height` still fits on this one.
    fn reserve(&mut self, height: f32) {
        if !self.at_top() && self.y + height > self.geometry.bottom_limit() {
            self.pages.push(std::mem::take(&mut self.current));
            self.y = self.geometry.margin;
        }
    }

    fn push(&mut self, item: Item) {
        self.current.items.push(item);
    }

    fn finish(mut self) -> Vec<LaidOutPage> {
        if !self.current.items.is_empty() || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}

/// Place every block of `flow` onto pages.
pub fn layout(flow: &Flow, geometry: PageGeometry) -> Result<Vec<LaidOutPage>, LayoutError> {
    let mut cursor = Cursor::new(geometry);

    for block in &flow.blocks {
        match block {
            Block::Paragraph(paragraph) => place_paragraph(&mut cursor, paragraph),
            Block::Table(rows) => place_table(&mut cursor, rows)?,
            Block::Rule => {
                cursor.reserve(10.0);
                let y = cursor.y + 4.0;
                cursor.push(Item::Line {
                    x1: geometry.margin,
                    y1: y,
                    x2: geometry.width - geometry.margin,
                    y2: y,
                });
                cursor.y += 10.0;
            }
        }
    }

    Ok(cursor.finish())
}

fn place_paragraph(cursor: &mut Cursor, paragraph: &Paragraph) {
    let size = paragraph.font_size;
    let line_height = size * LINE_SPACING;
    let content_width = cursor.geometry.content_width();
    let margin = cursor.geometry.margin;

    for line in wrap(&paragraph.runs, content_width, size) {
        cursor.reserve(line_height);
        let offset = match paragraph.align {
            Align::Left => 0.0,
            Align::Center => (content_width - line.width).max(0.0) / 2.0,
            Align::Right => (content_width - line.width).max(0.0),
        };
        let baseline = cursor.y + size * 0.8;
        for segment in line.segments {
            cursor.push(Item::Text {
                x: margin + offset + segment.x,
                y: baseline,
                size,
                bold: segment.bold,
                text: segment.text,
            });
        }
        cursor.y += line_height;
    }
    cursor.y += paragraph.space_after;
}

fn place_table(cursor: &mut Cursor, rows: &[Vec<TableCell>]) -> Result<(), LayoutError> {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    if columns == 0 {
        return Ok(());
    }

    let column_width = cursor.geometry.content_width() / columns as f32;
    if column_width < MIN_COLUMN_WIDTH {
        return Err(LayoutError::TableTooWide { columns });
    }

    let line_height = TABLE_FONT_SIZE * LINE_SPACING;
    let inner_width = column_width - 2.0 * CELL_PADDING;
    let margin = cursor.geometry.margin;

    for row in rows {
        let wrapped: Vec<Vec<TextLine>> = row
            .iter()
            .map(|cell| wrap(&cell.runs, inner_width, TABLE_FONT_SIZE))
            .collect();
        let tallest = wrapped.iter().map(Vec::len).max().unwrap_or(0).max(1);
        let row_height = tallest as f32 * line_height + 2.0 * CELL_PADDING;

        cursor.reserve(row_height);
        let top = cursor.y;

        for column in 0..columns {
            let x = margin + column as f32 * column_width;
            cursor.push(Item::Rect {
                x,
                y: top,
                width: column_width,
                height: row_height,
            });

            let Some(lines) = wrapped.get(column) else {
                continue;
            };
            for (index, line) in lines.iter().enumerate() {
                let baseline =
                    top + CELL_PADDING + index as f32 * line_height + TABLE_FONT_SIZE * 0.8;
                for segment in &line.segments {
                    cursor.push(Item::Text {
                        x: x + CELL_PADDING + segment.x,
                        y: baseline,
                        size: TABLE_FONT_SIZE,
                        bold: segment.bold,
                        text: segment.text.clone(),
                    });
                }
            }
        }
        cursor.y += row_height;
    }

    cursor.y += TABLE_FONT_SIZE * 0.8;
    Ok(())
}
