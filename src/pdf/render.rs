//! PDF writer – turns laid-out pages into PDF bytes using `printpdf`
//! builtin fonts.
//!
//! Builtin fonts are declared with `/WinAnsiEncoding`, but printpdf writes
//! their text operands as UTF-8. Text is therefore emitted as a raw `Tj`
//! with WinAnsi bytes, which requires saving with `secure: false`.

use printpdf::{
    BuiltinFont, Color, DictItem, Line, LinePoint, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions,
    Point, Pt, Rgb,
};

use super::layout::{Item, LaidOutPage, PageGeometry};

const PT_TO_MM: f32 = 0.352778;

fn black() -> Color {
    Color::Rgb(Rgb {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        icc_profile: None,
    })
}

/// Render laid-out pages into a complete PDF file.
pub fn render_pdf(title: &str, pages: &[LaidOutPage], geometry: PageGeometry) -> Vec<u8> {
    let page_w = Mm(geometry.width * PT_TO_MM);
    let page_h = Mm(geometry.height * PT_TO_MM);

    let mut doc = PdfDocument::new(title);
    let pdf_pages: Vec<PdfPage> = pages
        .iter()
        .map(|page| {
            let mut ops = Vec::new();
            for item in &page.items {
                render_item(&mut ops, item, geometry.height);
            }
            PdfPage::new(page_w, page_h, ops)
        })
        .collect();

    doc.with_pages(pdf_pages);

    let mut warnings = Vec::new();
    let options = PdfSaveOptions {
        secure: false,
        ..PdfSaveOptions::default()
    };
    let bytes = doc.save(&options, &mut warnings);
    if !warnings.is_empty() {
        log::debug!("PDF writer reported {} warnings", warnings.len());
    }
    bytes
}

fn point(x: f32, y: f32) -> LinePoint {
    LinePoint {
        p: Point { x: Pt(x), y: Pt(y) },
        bezier: false,
    }
}

fn render_item(ops: &mut Vec<Op>, item: &Item, page_height: f32) {
    // Layout origin is top-left, PDF origin is bottom-left.
    match item {
        Item::Text {
            x,
            y,
            size,
            bold,
            text,
        } => {
            let font = if *bold {
                BuiltinFont::HelveticaBold
            } else {
                BuiltinFont::Helvetica
            };
            ops.push(Op::StartTextSection);
            ops.push(Op::SetTextCursor {
                pos: Point {
                    x: Pt(*x),
                    y: Pt(page_height - *y),
                },
            });
            ops.push(Op::SetFontSizeBuiltinFont {
                size: Pt(*size),
                font,
            });
            ops.push(Op::SetFillColor { col: black() });
            // An empty write registers the font in the page resources.
            ops.push(Op::WriteTextBuiltinFont {
                items: Vec::new(),
                font,
            });
            ops.push(Op::Unknown {
                key: "Tj".to_string(),
                value: vec![DictItem::String {
                    data: to_win_ansi(text),
                    literal: false,
                }],
            });
            ops.push(Op::EndTextSection);
        }
        Item::Line { x1, y1, x2, y2 } => {
            ops.push(Op::SetOutlineColor { col: black() });
            ops.push(Op::SetOutlineThickness { pt: Pt(0.75) });
            ops.push(Op::DrawLine {
                line: Line {
                    points: vec![
                        point(*x1, page_height - *y1),
                        point(*x2, page_height - *y2),
                    ],
                    is_closed: false,
                },
            });
        }
        Item::Rect {
            x,
            y,
            width,
            height,
        } => {
            let top = page_height - *y;
            let bottom = top - *height;
            ops.push(Op::SetOutlineColor { col: black() });
            ops.push(Op::SetOutlineThickness { pt: Pt(0.5) });
            ops.push(Op::DrawLine {
                line: Line {
                    points: vec![
                        point(*x, top),
                        point(*x + *width, top),
                        point(*x + *width, bottom),
                        point(*x, bottom),
                    ],
                    is_closed: true,
                },
            });
        }
    }
}

/// Encode text as WinAnsi (Windows-1252) bytes. Latin-1 passes through,
/// typographic punctuation takes its 0x80..0x9F slot, and characters the
/// builtin fonts cannot show become `?`.
fn to_win_ansi(text: &str) -> Vec<u8> {
    let mut replaced = 0usize;
    let bytes = text
        .chars()
        .map(|c| match c {
            '\u{20AC}' => 0x80,
            '\u{201A}' => 0x82,
            '\u{201E}' => 0x84,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{2122}' => 0x99,
            '\u{00A0}' => b' ',
            c if (' '..='~').contains(&c) || ('\u{00A1}'..='\u{00FF}').contains(&c) => c as u8,
            _ => {
                replaced += 1;
                b'?'
            }
        })
        .collect();
    if replaced > 0 {
        log::warn!(
            "{} character(s) outside WinAnsi replaced with '?' in {:?}",
            replaced,
            text
        );
    }
    bytes
}
